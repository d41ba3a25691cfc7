use crate::interpreter::EvalError;
use crate::value::Stack;

/// Outcome of attempting a word against a stack.
///
/// `None` means the stack does not match the word's input shape; the
/// interpreter reports that as a `MatchError`. `Some(Err(..))` means the
/// shape matched but a literal inside failed to parse.
pub type WordResult = Option<Result<Stack, EvalError>>;

/// A named stack operation.
///
/// The capability check required by the dispatch contract is *derived*:
/// a word matches a stack exactly when [`Word::run`] returns `Some` for it.
/// There is no second predicate to keep in sync: `run` is the single
/// source of truth for both "can this execute" and "what does it do".
///
/// Words are pure functions of the stack; `run` receives a snapshot and
/// returns the replacement stack.
#[derive(Clone)]
pub struct Word {
    name: &'static str,
    signature: &'static str,
    summary: &'static str,
    examples: &'static [&'static str],
    run: fn(&Stack) -> WordResult,
}

impl Word {
    pub fn new(
        name: &'static str,
        signature: &'static str,
        summary: &'static str,
        examples: &'static [&'static str],
        run: fn(&Stack) -> WordResult,
    ) -> Word {
        Word {
            name,
            signature,
            summary,
            examples,
            run,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stack-effect documentation, `InputTypes -- OutputTypes`.
    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    pub fn examples(&self) -> &'static [&'static str] {
        self.examples
    }

    /// Attempt the word. See [`WordResult`] for the contract.
    pub fn run(&self, stack: &Stack) -> WordResult {
        (self.run)(stack)
    }

    /// Capability check: would `run` execute on this stack?
    pub fn matches(&self, stack: &Stack) -> bool {
        self.run(stack).is_some()
    }
}

impl std::fmt::Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Word")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// A word defined as an expansion into other tokens.
///
/// Invoking a macro never touches the stack directly; the interpreter
/// re-injects `expansion` into its pending token queue. When the stack is
/// empty at the point of invocation (the caller supplied no context),
/// `default_context` is injected ahead of the expansion.
#[derive(Debug, Clone)]
pub struct Macro {
    name: &'static str,
    summary: &'static str,
    expansion: &'static [&'static str],
    default_context: &'static [&'static str],
    examples: &'static [&'static str],
}

impl Macro {
    pub fn new(
        name: &'static str,
        summary: &'static str,
        expansion: &'static [&'static str],
        default_context: &'static [&'static str],
        examples: &'static [&'static str],
    ) -> Macro {
        Macro {
            name,
            summary,
            expansion,
            default_context,
            examples,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    pub fn expansion(&self) -> &'static [&'static str] {
        self.expansion
    }

    pub fn default_context(&self) -> &'static [&'static str] {
        self.default_context
    }

    pub fn examples(&self) -> &'static [&'static str] {
        self.examples
    }
}

/// What a vocabulary lists and a dictionary stores: a word or a macro.
#[derive(Debug, Clone)]
pub enum Definition {
    Word(Word),
    Macro(Macro),
}

impl Definition {
    pub fn name(&self) -> &'static str {
        match self {
            Definition::Word(w) => w.name(),
            Definition::Macro(m) => m.name(),
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Definition::Word(w) => w.summary(),
            Definition::Macro(m) => m.summary(),
        }
    }

    /// Stack-effect string; macros document their expansion instead.
    pub fn signature(&self) -> String {
        match self {
            Definition::Word(w) => w.signature().to_string(),
            Definition::Macro(m) => format!("macro: {}", m.expansion().join(",")),
        }
    }

    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Definition::Word(w) => w.examples(),
            Definition::Macro(m) => m.examples(),
        }
    }
}
