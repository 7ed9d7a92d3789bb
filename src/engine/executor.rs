//! Execution engine - the per-statement transaction state machine
//!
//! Consumes one classified statement at a time, enforces the
//! transaction-active invariants, applies the commit-mode policy, and
//! delegates real work to the SQL processor. The engine itself holds no
//! transaction state; it observes and mutates the collaborator's.

use super::processor::{ResultProcessor, SqlProcessor};
use super::reporter::Reporter;
use super::transaction::TransactionOption;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::sql::region::{Region, Regioned};
use crate::sql::statement::{ErrorKind, Statement};

/// Static `\help` output.
pub const HELP_TEXT: &[&str] = &[
    "available statements:",
    "  <sql>;                          execute SQL in the current transaction",
    "  START TRANSACTION <options>;    open a transaction explicitly",
    "  COMMIT [WAIT [FOR] <status>];   commit the current transaction",
    "  ROLLBACK;                       roll back the current transaction",
    "special commands:",
    "  \\help      show this message",
    "  \\status    show whether a transaction is active",
    "  \\exit      leave the console (no transaction may be active)",
    "  \\halt      leave the console immediately",
];

pub struct ExecutionEngine<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    processor: P,
    results: Q,
    reporter: R,
    config: ConsoleConfig,
}

impl<P, Q, R> ExecutionEngine<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    pub fn new(processor: P, results: Q, reporter: R, config: ConsoleConfig) -> Self {
        Self {
            processor,
            results,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Execute one statement. `Ok(true)` means the session continues,
    /// `Ok(false)` means a special command ended the loop.
    pub fn execute(&mut self, statement: &Statement) -> Result<bool> {
        match statement {
            Statement::Empty { .. } => Ok(true),

            Statement::Generic { text, region } => self.execute_sql(text, *region),

            // CALL has no specialized handling; the transaction-activation
            // rules of generic execution apply.
            Statement::Call { text, region } => self.execute_sql(text, *region),

            Statement::StartTransaction { region, fields, .. } => {
                if self.processor.is_transaction_active() {
                    return Err(engine_error("transaction is running", *region));
                }
                let option = TransactionOption::from_fields(fields, &self.config);
                self.processor.start_transaction(&option)?;
                self.reporter.report_transaction_started(&option);
                Ok(true)
            }

            Statement::Commit { region, status, .. } => {
                if !self.processor.is_transaction_active() {
                    return Err(engine_error("transaction is not started", *region));
                }
                let status = status.as_ref().map(|s| s.value);
                self.processor.commit_transaction(status)?;
                self.reporter.report_transaction_committed(status);
                Ok(true)
            }

            Statement::Rollback { region, .. } => {
                if !self.processor.is_transaction_active() {
                    return Err(engine_error("transaction is not started", *region));
                }
                self.processor.rollback_transaction()?;
                self.reporter.report_transaction_rollbacked();
                Ok(true)
            }

            Statement::Special {
                text,
                region,
                command,
                ..
            } => self.execute_special(text, *region, command),

            Statement::Erroneous {
                kind,
                occurrence,
                message,
                ..
            } => Err(ConsoleError::Statement {
                kind: *kind,
                message: message.clone(),
                line: occurrence.line,
                column: occurrence.column,
            }),
        }
    }

    /// End-of-session hook. `succeed` reports whether the script or REPL run
    /// as a whole succeeded.
    pub fn finish(&mut self, succeed: bool) -> Result<()> {
        use crate::config::CommitMode::*;
        match self.config.commit_mode {
            Commit => {
                if self.processor.is_transaction_active() {
                    if succeed {
                        self.processor.commit_transaction(None)?;
                        self.reporter.report_transaction_committed_implicitly(None);
                    } else {
                        self.processor.rollback_transaction()?;
                        self.reporter.report_transaction_rollbacked_implicitly();
                    }
                }
            }
            NoCommit => {
                // Dry-run mode: the outcome never persists.
                if self.processor.is_transaction_active() {
                    self.processor.rollback_transaction()?;
                    self.reporter.report_transaction_rollbacked_implicitly();
                }
            }
            AutoCommit | NoAutoCommit => {}
        }
        Ok(())
    }

    fn execute_sql(&mut self, text: &str, region: Region) -> Result<bool> {
        if !self.processor.is_transaction_active() {
            let option = match (
                self.config.commit_mode.allows_implicit_start(),
                &self.config.implicit_transaction,
            ) {
                (true, Some(option)) => option.clone(),
                _ => return Err(engine_error("transaction is not started", region)),
            };
            self.processor.start_transaction(&option)?;
            self.reporter.report_transaction_started_implicitly(&option);
        }

        let auto_commit = self.config.commit_mode == crate::config::CommitMode::AutoCommit;

        let outcome = self
            .processor
            .execute(text, region)
            .and_then(|result| match result {
                Some(result_set) => self.results.process(result_set),
                None => Ok(()),
            });

        match outcome {
            Ok(()) => {
                self.reporter.succeed("execution succeeded");
                if auto_commit {
                    self.processor.commit_transaction(None)?;
                    self.reporter.report_transaction_committed_implicitly(None);
                }
                Ok(true)
            }
            Err(error) => {
                if auto_commit {
                    // Roll back before re-raising; a failing rollback must
                    // not mask the original error.
                    match self.processor.rollback_transaction() {
                        Ok(()) => self.reporter.report_transaction_rollbacked_implicitly(),
                        Err(rollback_error) => self
                            .reporter
                            .warn(&format!("rollback failed: {}", rollback_error)),
                    }
                }
                Err(error)
            }
        }
    }

    fn execute_special(
        &mut self,
        text: &str,
        region: Region,
        command: &Regioned<String>,
    ) -> Result<bool> {
        match command.value.to_lowercase().as_str() {
            "exit" => {
                if self.processor.is_transaction_active() {
                    return Err(engine_error("transaction is running", region));
                }
                Ok(false)
            }
            "halt" => Ok(false),
            "status" => {
                self.reporter
                    .report_transaction_status(self.processor.is_transaction_active());
                Ok(true)
            }
            "help" => {
                self.reporter.report_help(HELP_TEXT);
                Ok(true)
            }
            _ => {
                // Unknown commands go back through the erroneous path rather
                // than being silently ignored.
                let erroneous = Statement::Erroneous {
                    text: text.to_string(),
                    region,
                    kind: ErrorKind::UnknownCommand,
                    occurrence: command.region,
                    message: format!("unknown command \"\\{}\"", command.value),
                };
                self.execute(&erroneous)
            }
        }
    }
}

fn engine_error(message: &str, region: Region) -> ConsoleError {
    ConsoleError::Engine {
        message: message.to_string(),
        line: region.line,
        column: region.column,
    }
}
