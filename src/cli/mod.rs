//! CLI support for gauge-lang
//!
//! Provides programmatic access to gauge CLI functionality for embedding
//! in other tools (dashboards, alert linters).

use std::io;

use thiserror::Error;

use crate::interpreter::{EvalError, Interpreter};
use crate::output::{to_json, to_json_pretty};
use crate::vocab::CompositionError;
use crate::word::Definition;
use crate::words;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Vocabulary composition error
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No program provided
    #[error("No program provided. Pass it as an argument or pipe it to stdin.")]
    NoProgram,
    /// Unknown word name
    #[error("Unknown word ':{0}'\nRun 'gauge words' to list the dictionary.")]
    UnknownWord(String),
}

/// Options for `gauge eval`
pub struct EvalOptions {
    pub program: String,
    pub pretty: bool,
}

/// Evaluate a program against the standard dictionary, as JSON.
pub fn execute_eval(options: &EvalOptions) -> Result<String, CliError> {
    let interp = Interpreter::new(words::compose_math()?);
    let stack = interp.execute(&options.program)?;
    Ok(if options.pretty {
        to_json_pretty(&stack)
    } else {
        to_json(&stack)
    })
}

/// One line per word in the standard dictionary.
pub fn list_words() -> Result<String, CliError> {
    let dict = words::compose_math()?;
    let mut out = String::new();
    for def in dict.definitions() {
        let owner = dict.owner(def.name()).unwrap_or("?");
        out.push_str(&format!(
            ":{:<12} [{}] {}\n",
            def.name(),
            owner,
            def.summary().split('.').next().unwrap_or("")
        ));
    }
    Ok(out)
}

/// Full metadata for one word, as JSON.
pub fn word_doc(name: &str) -> Result<String, CliError> {
    let name = name.trim_start_matches(':');
    let dict = words::compose_math()?;
    let def = dict
        .lookup(name)
        .ok_or_else(|| CliError::UnknownWord(name.to_string()))?;
    let body = serde_json::json!({
        "name": def.name(),
        "vocabulary": dict.owner(def.name()),
        "signature": def.signature(),
        "summary": def.summary(),
        "examples": def.examples(),
        "kind": match def {
            Definition::Word(_) => "word",
            Definition::Macro(_) => "macro",
        },
    });
    serde_json::to_string_pretty(&body).map_err(|e| CliError::Io(io::Error::other(e)))
}
