use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::word::Definition;

/// Errors raised while composing vocabularies into a dictionary.
///
/// These are construction-time failures: a dictionary that would dispatch
/// ambiguously or loop forever is never built at all.
#[derive(Debug, Clone, Error)]
pub enum CompositionError {
    /// Two distinct definitions share a name after transitive resolution
    #[error("duplicate word ':{word}' from vocabularies '{first}' and '{second}'")]
    DuplicateWord {
        word: String,
        first: String,
        second: String,
    },

    /// The dependency graph contains a cycle
    #[error("vocabulary dependency cycle through '{name}'")]
    DependencyCycle { name: String },

    /// A dependency names a vocabulary absent from the composition set
    #[error("vocabulary '{name}' depends on unknown vocabulary '{dependency}'")]
    UnknownVocabulary {
        name: String,
        dependency: String,
    },
}

/// A named, ordered set of definitions plus the vocabularies it depends on.
///
/// Dependencies are declared by name and resolved when a set of
/// vocabularies is composed, so a malformed graph (cycle, missing
/// dependency) is a composition error rather than something the type
/// system merely makes awkward. Vocabularies are built once at startup;
/// the same instance may be depended on from several paths (a diamond)
/// without tripping duplicate detection.
#[derive(Debug)]
pub struct Vocabulary {
    name: &'static str,
    depends_on: Vec<&'static str>,
    definitions: Vec<Arc<Definition>>,
}

impl Vocabulary {
    pub fn new(
        name: &'static str,
        depends_on: Vec<&'static str>,
        definitions: Vec<Definition>,
    ) -> Vocabulary {
        Vocabulary {
            name,
            depends_on,
            definitions: definitions.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn depends_on(&self) -> &[&'static str] {
        &self.depends_on
    }

    pub fn definitions(&self) -> &[Arc<Definition>] {
        &self.definitions
    }
}

/// Compose `root` and its transitive dependencies (resolved against
/// `available`) into one dictionary.
///
/// Dependencies contribute first, in declaration order, so a composed
/// dictionary lists foundational words before the ones built on them.
/// Fails on a duplicate name (unless both references are the same
/// definition instance), a dependency cycle, or an unresolvable
/// dependency name.
pub fn compose(
    root: &Arc<Vocabulary>,
    available: &[Arc<Vocabulary>],
) -> Result<Dictionary, CompositionError> {
    let by_name: HashMap<&str, &Arc<Vocabulary>> =
        available.iter().map(|v| (v.name(), v)).collect();

    let mut words: HashMap<String, (Arc<Definition>, &'static str)> = HashMap::new();
    let mut ordered: Vec<Arc<Definition>> = Vec::new();
    let mut in_progress: Vec<&'static str> = Vec::new();
    let mut done: Vec<&'static str> = Vec::new();
    collect(
        root,
        &by_name,
        &mut words,
        &mut ordered,
        &mut in_progress,
        &mut done,
    )?;
    debug!(
        "composed dictionary '{}': {} definitions",
        root.name(),
        ordered.len()
    );
    Ok(Dictionary { words, ordered })
}

fn collect(
    vocab: &Arc<Vocabulary>,
    by_name: &HashMap<&str, &Arc<Vocabulary>>,
    words: &mut HashMap<String, (Arc<Definition>, &'static str)>,
    ordered: &mut Vec<Arc<Definition>>,
    in_progress: &mut Vec<&'static str>,
    done: &mut Vec<&'static str>,
) -> Result<(), CompositionError> {
    if done.contains(&vocab.name()) {
        return Ok(());
    }
    if in_progress.contains(&vocab.name()) {
        return Err(CompositionError::DependencyCycle {
            name: vocab.name().to_string(),
        });
    }

    in_progress.push(vocab.name());
    for dep in &vocab.depends_on {
        let resolved = by_name.get(*dep).copied().ok_or_else(|| {
            CompositionError::UnknownVocabulary {
                name: vocab.name().to_string(),
                dependency: dep.to_string(),
            }
        })?;
        collect(resolved, by_name, words, ordered, in_progress, done)?;
    }
    in_progress.pop();

    for def in vocab.definitions() {
        match words.get(def.name()) {
            Some((existing, owner)) if !Arc::ptr_eq(existing, def) => {
                return Err(CompositionError::DuplicateWord {
                    word: def.name().to_string(),
                    first: owner.to_string(),
                    second: vocab.name().to_string(),
                });
            }
            Some(_) => {}
            None => {
                words.insert(def.name().to_string(), (Arc::clone(def), vocab.name()));
                ordered.push(Arc::clone(def));
            }
        }
    }
    done.push(vocab.name());
    Ok(())
}

/// The immutable name → definition map a composition yields.
///
/// Safe to share read-only across any number of concurrent evaluations;
/// nothing mutates after construction.
#[derive(Debug)]
pub struct Dictionary {
    words: HashMap<String, (Arc<Definition>, &'static str)>,
    ordered: Vec<Arc<Definition>>,
}

impl Dictionary {
    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.words.get(name).map(|(def, _)| def.as_ref())
    }

    /// The vocabulary a word came from, for documentation tooling.
    pub fn owner(&self, name: &str) -> Option<&'static str> {
        self.words.get(name).map(|(_, owner)| *owner)
    }

    /// All definitions, dependencies first, in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.ordered.iter().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
