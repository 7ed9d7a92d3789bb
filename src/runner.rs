//! Runner loops - script execution and the interactive line loop
//!
//! Both drive the same engine. Script mode aborts the whole run on the first
//! error; REPL mode reports recoverable errors and keeps prompting, and uses
//! the scanner's end-of-input signal to ask for continuation lines.

use crate::engine::executor::ExecutionEngine;
use crate::engine::processor::{ResultProcessor, SqlProcessor};
use crate::engine::reporter::Reporter;
use crate::error::Result;
use crate::sql::parser::SqlParser;
use crate::sql::statement::Statement;

/// What the REPL driver should do after feeding a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplControl {
    /// Line fully handled; show the primary prompt.
    Ready,
    /// A statement ran off the end of the line; show the continuation
    /// prompt.
    NeedMore,
    /// A special command ended the session.
    Exit,
}

/// One-shot script execution: pulls every statement from a source text,
/// aborts on the first error, and closes the session through
/// `ExecutionEngine::finish`.
pub struct ScriptRunner<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    engine: ExecutionEngine<P, Q, R>,
}

impl<P, Q, R> ScriptRunner<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    pub fn new(engine: ExecutionEngine<P, Q, R>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ExecutionEngine<P, Q, R> {
        &self.engine
    }

    pub fn run(&mut self, source: &str) -> Result<()> {
        let scanner_config = self.engine.config().scanner;
        let mut parser = SqlParser::new(source, scanner_config);

        let mut outcome = Ok(());
        while let Some(statement) = parser.next() {
            match self.engine.execute(&statement) {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    outcome = Err(error);
                    break;
                }
            }
        }

        let finish = self.engine.finish(outcome.is_ok());
        outcome.and(finish)
    }
}

/// Interactive line loop: buffers input until each statement is complete,
/// executes, and recovers from statement-level failures without ending the
/// session.
pub struct ReplRunner<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    engine: ExecutionEngine<P, Q, R>,
    pending: String,
}

impl<P, Q, R> ReplRunner<P, Q, R>
where
    P: SqlProcessor,
    Q: ResultProcessor<P::ResultSet>,
    R: Reporter,
{
    pub fn new(engine: ExecutionEngine<P, Q, R>) -> Self {
        Self {
            engine,
            pending: String::new(),
        }
    }

    pub fn engine(&self) -> &ExecutionEngine<P, Q, R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ExecutionEngine<P, Q, R> {
        &mut self.engine
    }

    /// Whether a continuation line is expected.
    pub fn needs_more(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed one input line. Complete statements execute immediately; an
    /// incomplete trailing statement is buffered until a later line
    /// delivers its delimiter.
    pub fn feed_line(&mut self, line: &str) -> Result<ReplControl> {
        self.pending.push_str(line);
        self.pending.push('\n');
        let buffer = std::mem::take(&mut self.pending);

        let scanner_config = self.engine.config().scanner;
        let mut parser = SqlParser::new(&buffer, scanner_config);
        let mut statements = Vec::new();
        let mut tail_offset = None;
        while let Some(statement) = parser.next() {
            if parser.saw_eof() {
                if !statement.is_empty() {
                    tail_offset = Some(statement.region().offset);
                }
                break;
            }
            statements.push(statement);
        }
        if let Some(offset) = tail_offset {
            self.pending = buffer[offset..].to_string();
        }

        match self.execute_batch(&statements)? {
            ReplControl::Exit => Ok(ReplControl::Exit),
            _ if self.needs_more() => Ok(ReplControl::NeedMore),
            control => Ok(control),
        }
    }

    /// Flush a buffered delimiter-less statement at end of session (a final
    /// statement terminated by EOF is still a statement).
    pub fn finish_input(&mut self) -> Result<ReplControl> {
        if self.pending.is_empty() {
            return Ok(ReplControl::Ready);
        }
        let buffer = std::mem::take(&mut self.pending);
        let scanner_config = self.engine.config().scanner;
        let mut parser = SqlParser::new(&buffer, scanner_config);
        let mut statements = Vec::new();
        while let Some(statement) = parser.next() {
            statements.push(statement);
        }
        self.execute_batch(&statements)
    }

    /// Close the session.
    pub fn finish(&mut self, succeed: bool) -> Result<()> {
        self.engine.finish(succeed)
    }

    fn execute_batch(&mut self, statements: &[Statement]) -> Result<ReplControl> {
        for (index, statement) in statements.iter().enumerate() {
            if index > 0 && !statement.is_empty() {
                // The user never saw this statement echoed by the line
                // editor; announce it before executing.
                let text = statement.text().to_string();
                self.engine.reporter_mut().implicit(&text);
            }
            match self.engine.execute(statement) {
                Ok(true) => {}
                Ok(false) => {
                    self.pending.clear();
                    return Ok(ReplControl::Exit);
                }
                Err(error) if error.is_recoverable() => {
                    self.engine.reporter_mut().warn(&error.to_string());
                    self.pending.clear();
                    return Ok(ReplControl::Ready);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(ReplControl::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommitMode, ConsoleConfig};
    use crate::engine::processor::{DiscardResults, StatementMetadata};
    use crate::engine::transaction::TransactionOption;
    use crate::error::ConsoleError;
    use crate::sql::region::Region;
    use crate::sql::statement::CommitStatus;

    #[derive(Default)]
    struct RecordingProcessor {
        active: bool,
        calls: Vec<String>,
        fail_execute: bool,
    }

    impl SqlProcessor for RecordingProcessor {
        type ResultSet = ();

        fn start_transaction(&mut self, _option: &TransactionOption) -> crate::error::Result<()> {
            self.calls.push("start".to_string());
            self.active = true;
            Ok(())
        }

        fn commit_transaction(
            &mut self,
            _status: Option<CommitStatus>,
        ) -> crate::error::Result<()> {
            self.calls.push("commit".to_string());
            self.active = false;
            Ok(())
        }

        fn rollback_transaction(&mut self) -> crate::error::Result<()> {
            self.calls.push("rollback".to_string());
            self.active = false;
            Ok(())
        }

        fn is_transaction_active(&self) -> bool {
            self.active
        }

        fn execute(&mut self, text: &str, _region: Region) -> crate::error::Result<Option<()>> {
            self.calls.push(format!("execute {}", text));
            if self.fail_execute {
                return Err(ConsoleError::Server("refused".to_string()));
            }
            Ok(None)
        }

        fn explain(
            &mut self,
            _text: &str,
            _region: Region,
        ) -> crate::error::Result<StatementMetadata> {
            unimplemented!("not used by the runner")
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        lines: Vec<(&'static str, String)>,
    }

    impl Reporter for RecordingReporter {
        fn info(&mut self, message: &str) {
            self.lines.push(("info", message.to_string()));
        }
        fn warn(&mut self, message: &str) {
            self.lines.push(("warn", message.to_string()));
        }
        fn succeed(&mut self, message: &str) {
            self.lines.push(("succeed", message.to_string()));
        }
        fn implicit(&mut self, message: &str) {
            self.lines.push(("implicit", message.to_string()));
        }
    }

    fn engine(config: ConsoleConfig) -> ExecutionEngine<RecordingProcessor, DiscardResults, RecordingReporter> {
        ExecutionEngine::new(
            RecordingProcessor::default(),
            DiscardResults,
            RecordingReporter::default(),
            config,
        )
    }

    #[test]
    fn test_script_runs_to_completion() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::NoAutoCommit);
        let mut runner = ScriptRunner::new(engine(config));
        runner
            .run("start transaction; select 1; select 2; commit;")
            .unwrap();
        assert_eq!(
            runner.engine().processor().calls,
            vec!["start", "execute select 1", "execute select 2", "commit"]
        );
    }

    #[test]
    fn test_script_aborts_on_first_error() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::NoAutoCommit);
        let mut runner = ScriptRunner::new(engine(config));
        let error = runner.run("select 1; select 2;").unwrap_err();
        // No transaction was ever started; nothing after the failure ran.
        assert!(error.to_string().contains("transaction is not started"));
        assert!(runner.engine().processor().calls.is_empty());
    }

    #[test]
    fn test_script_commit_mode_rolls_back_failed_run() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::Commit);
        let mut runner = ScriptRunner::new(engine(config));
        let error = runner
            .run("select 1; start transaction; select 2;")
            .unwrap_err();
        // `start transaction` while the implicit transaction is active.
        assert!(error.to_string().contains("transaction is running"));
        // finish(false) under Commit mode rolls the open transaction back.
        assert_eq!(runner.engine().processor().calls.last().unwrap(), "rollback");
    }

    #[test]
    fn test_script_commit_mode_commits_successful_run() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::Commit);
        let mut runner = ScriptRunner::new(engine(config));
        runner.run("select 1; select 2;").unwrap();
        assert_eq!(
            runner.engine().processor().calls,
            vec!["start", "execute select 1", "execute select 2", "commit"]
        );
    }

    #[test]
    fn test_script_stops_at_halt() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::Commit);
        let mut runner = ScriptRunner::new(engine(config));
        runner.run("select 1;\n\\halt\nselect 2;").unwrap();
        let calls = &runner.engine().processor().calls;
        assert!(calls.contains(&"execute select 1".to_string()));
        assert!(!calls.iter().any(|c| c.contains("select 2")));
    }

    #[test]
    fn test_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.sql");
        std::fs::write(&path, "select 1;\nselect 2;\n").unwrap();
        let source = std::fs::read_to_string(&path).unwrap();

        let config = ConsoleConfig::with_commit_mode(CommitMode::NoCommit);
        let mut runner = ScriptRunner::new(engine(config));
        runner.run(&source).unwrap();
        assert_eq!(runner.engine().processor().calls.last().unwrap(), "rollback");
    }

    #[test]
    fn test_repl_multiple_statements_per_line_echo() {
        let mut repl = ReplRunner::new(engine(ConsoleConfig::default()));
        let control = repl.feed_line("select 1;select 2;").unwrap();
        assert_eq!(control, ReplControl::Ready);

        // The second statement was announced before execution.
        assert!(repl
            .engine_mut()
            .reporter_mut()
            .lines
            .iter()
            .any(|(channel, message)| *channel == "implicit" && message.as_str() == "select 2"));
    }

    #[test]
    fn test_repl_continuation() {
        let mut repl = ReplRunner::new(engine(ConsoleConfig::default()));
        assert_eq!(repl.feed_line("select").unwrap(), ReplControl::NeedMore);
        assert!(repl.needs_more());
        assert!(repl.engine().processor().calls.is_empty());

        assert_eq!(repl.feed_line("1;").unwrap(), ReplControl::Ready);
        assert!(repl
            .engine()
            .processor()
            .calls
            .iter()
            .any(|c| c.contains("select\n1")));
    }

    #[test]
    fn test_repl_recoverable_error_continues() {
        let config = ConsoleConfig::with_commit_mode(CommitMode::NoAutoCommit);
        let mut repl = ReplRunner::new(engine(config));
        let control = repl.feed_line("select 1;").unwrap();
        assert_eq!(control, ReplControl::Ready);
        assert!(repl
            .engine_mut()
            .reporter_mut()
            .lines
            .iter()
            .any(|(channel, message)| *channel == "warn"
                && message.contains("transaction is not started")));

        // The session is still usable.
        assert_eq!(
            repl.feed_line("start transaction;").unwrap(),
            ReplControl::Ready
        );
        assert!(repl.engine().processor().is_transaction_active());
    }

    #[test]
    fn test_repl_exit() {
        let mut repl = ReplRunner::new(engine(ConsoleConfig::default()));
        assert_eq!(repl.feed_line("\\exit").unwrap(), ReplControl::Exit);
    }

    #[test]
    fn test_repl_finish_input_flushes_pending() {
        let mut repl = ReplRunner::new(engine(ConsoleConfig::default()));
        assert_eq!(repl.feed_line("select 1").unwrap(), ReplControl::NeedMore);
        repl.finish_input().unwrap();
        assert!(repl
            .engine()
            .processor()
            .calls
            .iter()
            .any(|c| c.contains("select 1")));
    }
}
