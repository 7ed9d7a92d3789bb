//! Console configuration: commit-mode policy and scanner toggles
//!
//! All settings are read once at startup and never change for the lifetime
//! of a session.

use serde::{Deserialize, Serialize};

use crate::engine::transaction::TransactionOption;

/// Session-level policy governing whether and when the engine opens and
/// closes transactions implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMode {
    /// Each statement runs in its own transaction: the engine starts one
    /// implicitly when needed, commits after success and rolls back on
    /// failure.
    AutoCommit,

    /// Fully explicit: the user starts, commits, and rolls back. The engine
    /// never opens a transaction on its own.
    NoAutoCommit,

    /// Script mode: a transaction may be opened implicitly and is committed
    /// at the end of the run if it succeeded, rolled back otherwise.
    Commit,

    /// Script dry-run: like `Commit`, but the final transaction is always
    /// rolled back regardless of the outcome.
    NoCommit,
}

impl Default for CommitMode {
    fn default() -> Self {
        CommitMode::AutoCommit
    }
}

impl CommitMode {
    /// Whether this mode allows the engine to start a transaction implicitly
    /// before a generic statement. `NoAutoCommit` is the one fully explicit
    /// mode.
    pub fn allows_implicit_start(&self) -> bool {
        !matches!(self, CommitMode::NoAutoCommit)
    }
}

/// Comment handling in the token scanner. Regular and documentation comments
/// (`/** ... */`) are independently suppressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Drop `--`, `//` and plain `/* */` comments instead of emitting tokens.
    pub skip_regular_comments: bool,
    /// Drop `/** */` documentation comments instead of emitting tokens.
    pub skip_documentation_comments: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            skip_regular_comments: false,
            skip_documentation_comments: false,
        }
    }
}

/// Top-level console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub commit_mode: CommitMode,

    /// Transaction option used when the engine starts a transaction
    /// implicitly. `None` disables implicit starts entirely.
    pub implicit_transaction: Option<TransactionOption>,

    /// Label applied to transactions started without an explicit `AS` label.
    pub transaction_label: Option<String>,

    pub scanner: ScannerConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            commit_mode: CommitMode::default(),
            implicit_transaction: Some(TransactionOption::default()),
            transaction_label: None,
            scanner: ScannerConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn with_commit_mode(commit_mode: CommitMode) -> Self {
        Self {
            commit_mode,
            ..Self::default()
        }
    }
}
