//! Error types for the SQL console core

use thiserror::Error;

use crate::sql::statement::ErrorKind;

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Error taxonomy of the console core.
///
/// The runner loop recovers differently per variant: `Io` and `Interrupted`
/// always abort the session, everything else is reported and, in REPL mode,
/// the loop re-prompts.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine invariant violation (wrong transaction state, etc.),
    /// with the 1-based source position of the offending statement.
    #[error("{message} (line {line}, column {column})")]
    Engine {
        message: String,
        line: usize,
        column: usize,
    },

    /// An erroneous statement reached the engine.
    #[error("{message} (line {line}, column {column})")]
    Statement {
        kind: ErrorKind,
        message: String,
        line: usize,
        column: usize,
    },

    /// Server-side failure reported by the SQL processor.
    #[error("server error: {0}")]
    Server(String),

    /// Cooperative cancellation of an in-flight call.
    #[error("operation interrupted")]
    Interrupted,

    /// An error whose message is the whole story (e.g. ambiguous flags).
    #[error("{0}")]
    Message(String),
}

impl ConsoleError {
    /// Whether the REPL loop may report this error and keep running.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ConsoleError::Io(_) | ConsoleError::Interrupted)
    }
}
