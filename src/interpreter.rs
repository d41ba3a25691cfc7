use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, trace};
use thiserror::Error;

use crate::value::{stack_kinds, Stack, StackValue};
use crate::vocab::Dictionary;
use crate::word::Definition;

/// Default bound on macro expansion depth.
///
/// The shipped vocabulary never self-references, but expansion is purely
/// textual and the mechanism permits cycles; the bound turns them into an
/// error instead of an endless queue.
pub const DEFAULT_EXPANSION_LIMIT: usize = 10;

/// Errors that can occur while evaluating a token program.
///
/// Every variant is fatal for the evaluation that raised it: the
/// interpreter returns the error and no partial stack escapes.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// Token did not resolve to any word in the composed dictionary
    #[error("unknown word ':{token}' at position {position}")]
    UnknownWord { token: String, position: usize },

    /// A word's capability check failed against the current stack
    #[error(
        "no rule for ':{word}' matches the stack at position {position}; \
         expected {signature}, stack top: [{stack}]"
    )]
    Match {
        word: String,
        signature: String,
        stack: String,
        position: usize,
    },

    /// A literal token failed to parse into its target type
    #[error("invalid {target} literal '{token}'")]
    Literal {
        token: String,
        target: &'static str,
    },

    /// Macro expansion exceeded the configured depth bound
    #[error("expansion depth {depth} exceeded by macro ':{name}'")]
    ExpansionLimit { name: String, depth: usize },

    /// A `(` without its `)`, or a stray `)`
    #[error("unbalanced list delimiter at position {position}")]
    UnbalancedList { position: usize },

    /// Series arity clash between binary operands during numeric evaluation
    #[error("cannot combine {left} series with {right} series")]
    DataMismatch { left: usize, right: usize },
}

/// A token waiting to be processed, with the position it was charged to
/// and the macro depth it was injected at.
#[derive(Debug, Clone)]
struct Pending {
    token: String,
    position: usize,
    depth: usize,
}

/// Evaluates token programs against a composed dictionary.
///
/// The interpreter owns no mutable state between runs; each call to
/// [`Interpreter::execute`] works on its own stack and pending-token
/// queue, so one interpreter can serve arbitrarily many threads.
///
/// # Examples
///
/// ```
/// use gauge_lang::{words, Interpreter};
///
/// let interp = Interpreter::new(words::compose_math().unwrap());
/// let stack = interp.execute("name,sps,:eq,:sum").unwrap();
/// assert_eq!(stack.len(), 1);
/// ```
pub struct Interpreter {
    dict: Arc<Dictionary>,
    expansion_limit: usize,
}

impl Interpreter {
    pub fn new(dict: Arc<Dictionary>) -> Interpreter {
        Interpreter {
            dict,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }

    pub fn with_expansion_limit(dict: Arc<Dictionary>, limit: usize) -> Interpreter {
        Interpreter {
            dict,
            expansion_limit: limit,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Split and evaluate a comma-joined program.
    pub fn execute(&self, program: &str) -> Result<Stack, EvalError> {
        self.execute_tokens(split(program))
    }

    /// Evaluate a flat token sequence.
    ///
    /// Tokens beginning with `:` dispatch words; `(`…`)` collects a string
    /// list; anything else pushes a literal string. Macro words re-inject
    /// their expansion at the front of the pending queue, so a macro may
    /// reference other macros without recursing in-process.
    pub fn execute_tokens(&self, tokens: Vec<String>) -> Result<Stack, EvalError> {
        let mut queue: VecDeque<Pending> = tokens
            .into_iter()
            .enumerate()
            .map(|(position, token)| Pending {
                token,
                position,
                depth: 0,
            })
            .collect();
        let mut stack: Stack = Vec::new();

        while let Some(pending) = queue.pop_front() {
            if pending.token == "(" {
                let items = collect_list(&mut queue, pending.position)?;
                stack.push(StackValue::StringList(items));
            } else if pending.token == ")" {
                return Err(EvalError::UnbalancedList {
                    position: pending.position,
                });
            } else if let Some(name) = word_name(&pending.token) {
                let name = name.to_string();
                self.dispatch(&name, &pending, &mut queue, &mut stack)?;
            } else {
                stack.push(StackValue::Str(pending.token));
            }
        }

        Ok(stack)
    }

    fn dispatch(
        &self,
        name: &str,
        pending: &Pending,
        queue: &mut VecDeque<Pending>,
        stack: &mut Stack,
    ) -> Result<(), EvalError> {
        let def = self
            .dict
            .lookup(name)
            .ok_or_else(|| EvalError::UnknownWord {
                token: name.to_string(),
                position: pending.position,
            })?;

        match def {
            Definition::Word(word) => {
                trace!("dispatch :{} on stack of {}", name, stack.len());
                match word.run(stack) {
                    Some(Ok(next)) => {
                        *stack = next;
                        Ok(())
                    }
                    Some(Err(e)) => Err(e),
                    None => Err(EvalError::Match {
                        word: word.name().to_string(),
                        signature: word.signature().to_string(),
                        stack: stack_kinds(stack),
                        position: pending.position,
                    }),
                }
            }
            Definition::Macro(mac) => {
                let depth = pending.depth + 1;
                if depth > self.expansion_limit {
                    return Err(EvalError::ExpansionLimit {
                        name: mac.name().to_string(),
                        depth,
                    });
                }

                // No operands at the point of invocation means the caller
                // supplied no context; fall back to the macro's default.
                let context: &[&str] = if stack.is_empty() {
                    mac.default_context()
                } else {
                    &[]
                };
                debug!(
                    "expanding :{} at depth {} ({} context tokens)",
                    mac.name(),
                    depth,
                    context.len()
                );
                for token in context.iter().chain(mac.expansion()).rev() {
                    queue.push_front(Pending {
                        token: token.to_string(),
                        position: pending.position,
                        depth,
                    });
                }
                Ok(())
            }
        }
    }
}

/// The word a token invokes, if it is a word invocation at all.
fn word_name(token: &str) -> Option<&str> {
    token.strip_prefix(':').filter(|name| !name.is_empty())
}

/// Collect tokens up to the matching `)`.
///
/// Inner parens are kept verbatim so a nested group survives as raw
/// tokens; only balance is tracked here.
fn collect_list(
    queue: &mut VecDeque<Pending>,
    open_position: usize,
) -> Result<Vec<String>, EvalError> {
    let mut items = Vec::new();
    let mut depth = 1usize;
    while let Some(pending) = queue.pop_front() {
        if pending.token == "(" {
            depth += 1;
        } else if pending.token == ")" {
            depth -= 1;
            if depth == 0 {
                return Ok(items);
            }
        }
        items.push(pending.token);
    }
    Err(EvalError::UnbalancedList {
        position: open_position,
    })
}

/// Split a comma-joined program into its flat token list.
///
/// The surrounding platform applies exactly this split before handing
/// tokens to the core; empty segments (doubled commas, stray whitespace)
/// are dropped.
pub fn split(program: &str) -> Vec<String> {
    program
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
