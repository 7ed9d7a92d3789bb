//! sqlcon - SQL console core for a transactional database
//!
//! Reads free-form text (interactive lines, script files, or a single
//! statement), splits it into statements, classifies each into a typed
//! statement model, and drives a one-transaction-at-a-time state machine
//! that dispatches SQL execution, transaction control, and meta-commands to
//! an abstract database client.
//!
//! ## Architecture
//! - `sql`: TokenScanner -> SegmentScanner -> SegmentAnalyzer -> Statement
//! - `engine`: ExecutionEngine state machine + collaborator traits
//! - `runner`: script and REPL driver loops

pub mod config;
pub mod engine;
pub mod runner;
pub mod sql;

mod error;

pub use config::{CommitMode, ConsoleConfig, ScannerConfig};
pub use engine::{
    DiscardResults, DryRunProcessor, ExecutionEngine, NullReporter, Reporter, ResultProcessor,
    SqlProcessor, StdoutReporter, TransactionOption,
};
pub use error::{ConsoleError, Result};
pub use runner::{ReplControl, ReplRunner, ScriptRunner};
pub use sql::{SqlParser, Statement};
