use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("grammar has no productions")]
    Empty,
    #[error("non-terminal {0} is used but has no productions")]
    UndefinedNonTerminal(String),
    #[error("start symbol {0} is not a non-terminal with productions")]
    UnknownStart(String),
    #[error("ε must be the only symbol of a production of {0}")]
    MixedEpsilon(String),
    #[error("end-marker $ used in a production of {0}")]
    ReservedSymbol(String),
    #[error("unknown parser {0}, expected ll1 or slr")]
    UnknownParser(String),
}
