//! Reporting collaborator - decouples presentation from engine control flow
//!
//! The engine calls exactly one semantic hook per state transition; the
//! default hook bodies render a message through the four base channels, so
//! most implementations only provide those.

use super::transaction::TransactionOption;
use crate::sql::statement::CommitStatus;

pub trait Reporter {
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn succeed(&mut self, message: &str);
    /// Actions the engine took on its own (implicit transaction control,
    /// echo of statements the user never saw).
    fn implicit(&mut self, message: &str);

    fn report_transaction_started(&mut self, option: &TransactionOption) {
        self.succeed(&started_message(option));
    }

    fn report_transaction_started_implicitly(&mut self, option: &TransactionOption) {
        self.implicit(&started_message(option));
    }

    fn report_transaction_committed(&mut self, status: Option<CommitStatus>) {
        self.succeed(&committed_message(status));
    }

    fn report_transaction_committed_implicitly(&mut self, status: Option<CommitStatus>) {
        self.implicit(&committed_message(status));
    }

    fn report_transaction_rollbacked(&mut self) {
        self.succeed("transaction rollbacked");
    }

    fn report_transaction_rollbacked_implicitly(&mut self) {
        self.implicit("transaction rollbacked");
    }

    fn report_transaction_status(&mut self, active: bool) {
        if active {
            self.info("transaction is active");
        } else {
            self.info("transaction is inactive");
        }
    }

    fn report_help(&mut self, lines: &[&str]) {
        for line in lines {
            self.info(line);
        }
    }
}

fn started_message(option: &TransactionOption) -> String {
    match &option.label {
        Some(label) => format!("transaction started ({:?}, label={})", option.transaction_mode, label),
        None => format!("transaction started ({:?})", option.transaction_mode),
    }
}

fn committed_message(status: Option<CommitStatus>) -> String {
    match status {
        Some(status) => format!("transaction committed (wait for {:?})", status),
        None => "transaction committed".to_string(),
    }
}

/// Plain stdout/stderr reporter used by the binary.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {}", message);
    }

    fn succeed(&mut self, message: &str) {
        println!("{}", message);
    }

    fn implicit(&mut self, message: &str) {
        println!("(implicit) {}", message);
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
    fn succeed(&mut self, _message: &str) {}
    fn implicit(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        lines: Vec<(&'static str, String)>,
    }

    impl Reporter for Capture {
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

    #[test]
    fn test_default_hooks_route_to_channels() {
        let mut reporter = Capture::default();
        reporter.report_transaction_started(&TransactionOption::default());
        reporter.report_transaction_committed_implicitly(Some(CommitStatus::Stored));
        reporter.report_transaction_status(false);

        assert_eq!(reporter.lines[0].0, "succeed");
        assert_eq!(reporter.lines[1].0, "implicit");
        assert!(reporter.lines[1].1.contains("Stored"));
        assert_eq!(reporter.lines[2], ("info", "transaction is inactive".to_string()));
    }
}
