//! Typed statement model produced by segment analysis
//!
//! One variant per statement kind, dispatched by exhaustive match. Adding a
//! kind is a compile-time-checked event at every call site.

use serde::{Deserialize, Serialize};

use super::region::{Region, Regioned};

/// Long-running vs. short (optimistic) transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionMode {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadWriteMode {
    ReadOnly,
    ReadOnlyDeferrable,
    ReadWrite,
}

/// Execution priority of an exclusive transaction:
/// (PRIOR | EXCLUDING) x (DEFERRABLE | IMMEDIATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusiveMode {
    PriorDeferrable,
    PriorImmediate,
    ExcludingDeferrable,
    ExcludingImmediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitStatus {
    Accepted,
    Available,
    Stored,
    Propagated,
}

/// Classification failure categories carried by erroneous statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    MissingToken,
    UnknownToken,
    UnknownCommand,
}

/// Fields of a `START TRANSACTION` statement. Every sub-value keeps the
/// region it was parsed from for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct StartTransactionFields {
    pub transaction_mode: Option<Regioned<TransactionMode>>,
    pub read_write_mode: Option<Regioned<ReadWriteMode>>,
    pub exclusive_mode: Option<Regioned<ExclusiveMode>>,
    pub write_preserve: Vec<Regioned<String>>,
    pub include_ddl: bool,
    pub read_area_include: Vec<Regioned<String>>,
    pub read_area_exclude: Vec<Regioned<String>>,
    pub label: Option<Regioned<String>>,
    pub properties: Vec<(Regioned<String>, Regioned<String>)>,
}

/// A statement classified from one segment. Immutable; `text` and `region`
/// always fall within the originating segment.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Only whitespace and comments up to the delimiter.
    Empty { text: String, region: Region },

    /// Any SQL the console does not interpret; handed to the SQL processor
    /// verbatim.
    Generic { text: String, region: Region },

    StartTransaction {
        text: String,
        region: Region,
        fields: StartTransactionFields,
    },

    Commit {
        text: String,
        region: Region,
        status: Option<Regioned<CommitStatus>>,
    },

    Rollback { text: String, region: Region },

    /// `CALL ...`; kept verbatim so the engine can fall back to generic
    /// execution.
    Call { text: String, region: Region },

    /// Backslash meta-command with its raw option words.
    Special {
        text: String,
        region: Region,
        command: Regioned<String>,
        options: Vec<Regioned<String>>,
    },

    /// A parse failure carried as data rather than an exception.
    Erroneous {
        text: String,
        region: Region,
        kind: ErrorKind,
        occurrence: Region,
        message: String,
    },
}

impl Statement {
    pub fn text(&self) -> &str {
        match self {
            Statement::Empty { text, .. }
            | Statement::Generic { text, .. }
            | Statement::StartTransaction { text, .. }
            | Statement::Commit { text, .. }
            | Statement::Rollback { text, .. }
            | Statement::Call { text, .. }
            | Statement::Special { text, .. }
            | Statement::Erroneous { text, .. } => text,
        }
    }

    pub fn region(&self) -> Region {
        match self {
            Statement::Empty { region, .. }
            | Statement::Generic { region, .. }
            | Statement::StartTransaction { region, .. }
            | Statement::Commit { region, .. }
            | Statement::Rollback { region, .. }
            | Statement::Call { region, .. }
            | Statement::Special { region, .. }
            | Statement::Erroneous { region, .. } => *region,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Statement::Empty { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let stmt = Statement::Generic {
            text: "select 1".to_string(),
            region: Region::new(0, 8, 1, 1),
        };
        assert_eq!(stmt.text(), "select 1");
        assert_eq!(stmt.region().length, 8);
        assert!(!stmt.is_empty());
    }
}
