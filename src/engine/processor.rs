//! Collaborator interfaces toward the database client
//!
//! The engine drives these narrow traits; the actual network client lives
//! outside the core and implements them.

use super::transaction::TransactionOption;
use crate::error::Result;
use crate::sql::region::Region;
use crate::sql::statement::CommitStatus;

/// Planning metadata returned by `explain`.
#[derive(Debug, Clone)]
pub struct StatementMetadata {
    pub plan: String,
}

/// The SQL-processing collaborator: owns the transaction-state resource and
/// talks to the server. Server-side failures surface as
/// `ConsoleError::Server`, I/O failures as `ConsoleError::Io`, cancellation
/// as `ConsoleError::Interrupted` - all distinct from engine invariant
/// violations.
pub trait SqlProcessor {
    /// Server-side result handle type; the core never inspects its contents.
    type ResultSet;

    fn start_transaction(&mut self, option: &TransactionOption) -> Result<()>;

    fn commit_transaction(&mut self, status: Option<CommitStatus>) -> Result<()>;

    fn rollback_transaction(&mut self) -> Result<()>;

    fn is_transaction_active(&self) -> bool;

    /// Execute SQL text verbatim. `None` means the statement produced no
    /// result set. Blocking; may raise `Interrupted` on cancellation.
    fn execute(&mut self, text: &str, region: Region) -> Result<Option<Self::ResultSet>>;

    fn explain(&mut self, text: &str, region: Region) -> Result<StatementMetadata>;
}

/// Consumes result sets produced by `SqlProcessor::execute`.
pub trait ResultProcessor<T> {
    fn process(&mut self, result: T) -> Result<()>;
}

/// Result processor that drops everything; useful when results are not
/// wanted (dry runs, tests).
#[derive(Debug, Default)]
pub struct DiscardResults;

impl<T> ResultProcessor<T> for DiscardResults {
    fn process(&mut self, _result: T) -> Result<()> {
        Ok(())
    }
}

/// In-process processor with no backing server: tracks only the
/// transaction-active flag and accepts every statement. Used by the binary
/// for script syntax checking and by tests.
#[derive(Debug, Default)]
pub struct DryRunProcessor {
    active: bool,
}

impl DryRunProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlProcessor for DryRunProcessor {
    type ResultSet = ();

    fn start_transaction(&mut self, _option: &TransactionOption) -> Result<()> {
        self.active = true;
        Ok(())
    }

    fn commit_transaction(&mut self, _status: Option<CommitStatus>) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn is_transaction_active(&self) -> bool {
        self.active
    }

    fn execute(&mut self, _text: &str, _region: Region) -> Result<Option<()>> {
        Ok(None)
    }

    fn explain(&mut self, text: &str, _region: Region) -> Result<StatementMetadata> {
        Ok(StatementMetadata {
            plan: format!("dry-run: {}", text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_transaction_flag() {
        let mut processor = DryRunProcessor::new();
        assert!(!processor.is_transaction_active());
        processor
            .start_transaction(&TransactionOption::default())
            .unwrap();
        assert!(processor.is_transaction_active());
        processor.commit_transaction(None).unwrap();
        assert!(!processor.is_transaction_active());
    }
}
