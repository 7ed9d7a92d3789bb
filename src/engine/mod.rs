//! Statement execution: state machine, collaborator traits, transaction model

pub mod executor;
pub mod processor;
pub mod reporter;
pub mod transaction;

pub use executor::{ExecutionEngine, HELP_TEXT};
pub use processor::{
    DiscardResults, DryRunProcessor, ResultProcessor, SqlProcessor, StatementMetadata,
};
pub use reporter::{NullReporter, Reporter, StdoutReporter};
pub use transaction::TransactionOption;
