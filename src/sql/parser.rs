//! SQL parser - the public parsing boundary
//!
//! Pulls segments, classifies them, and converts every classification
//! failure into a `Statement::Erroneous` value. Parsing never raises past
//! this entry point.

use super::analyzer::SegmentAnalyzer;
use super::segment::SegmentScanner;
use super::statement::Statement;
use crate::config::ScannerConfig;

pub struct SqlParser<'a> {
    segments: SegmentScanner<'a>,
}

impl<'a> SqlParser<'a> {
    pub fn new(input: &'a str, config: ScannerConfig) -> Self {
        Self {
            segments: SegmentScanner::new(input, config),
        }
    }

    /// The next statement, or `None` at end of input. Failed classification
    /// yields `Statement::Erroneous`, never an error.
    pub fn next(&mut self) -> Option<Statement> {
        let segment = self.segments.next()?;
        let statement = match SegmentAnalyzer::analyze(&segment) {
            Ok(statement) => statement,
            Err(failure) => {
                // Errors-as-data boundary: the caller decides whether an
                // erroneous statement is fatal.
                let content: Vec<_> = segment.content_tokens().collect();
                let first = content.first();
                let last = content.last();
                let region = match (first, last) {
                    (Some(first), Some(last)) => first.region().union(&last.region()),
                    _ => failure.region,
                };
                let text = first
                    .map(|t| {
                        let start = t.offset - segment.offset;
                        let end = region.end() - segment.offset;
                        segment.text[start..end].to_string()
                    })
                    .unwrap_or_default();
                Statement::Erroneous {
                    text,
                    region,
                    kind: failure.kind,
                    occurrence: failure.region,
                    message: failure.message,
                }
            }
        };
        Some(statement)
    }

    /// Whether the most recent segment ran off the end of the input without
    /// a delimiter (continuation-prompt signal).
    pub fn saw_eof(&self) -> bool {
        self.segments.saw_eof()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use crate::sql::statement::ErrorKind;

    fn parse_all(input: &str) -> Vec<Statement> {
        let mut parser = SqlParser::new(input, ScannerConfig::default());
        let mut statements = Vec::new();
        while let Some(statement) = parser.next() {
            statements.push(statement);
        }
        statements
    }

    #[test]
    fn test_script_sequence() {
        let statements = parse_all("start transaction read only; select 1; commit;");
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], Statement::StartTransaction { .. }));
        assert!(matches!(statements[1], Statement::Generic { .. }));
        assert_eq!(statements[1].text(), "select 1");
        assert!(matches!(statements[2], Statement::Commit { status: None, .. }));
    }

    #[test]
    fn test_erroneous_is_data_not_error() {
        let statements = parse_all("start transaction bogus; select 1;");
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::Erroneous { kind, message, occurrence, .. } => {
                assert_eq!(*kind, ErrorKind::UnexpectedToken);
                assert!(message.contains("bogus"));
                assert_eq!(occurrence.line, 1);
            }
            other => panic!("expected erroneous, got {:?}", other),
        }
        assert!(matches!(statements[1], Statement::Generic { .. }));
    }

    #[test]
    fn test_erroneous_region_covers_statement() {
        let statements = parse_all("rollback now;");
        match &statements[0] {
            Statement::Erroneous { text, region, occurrence, .. } => {
                assert_eq!(text, "rollback now");
                assert_eq!(region.offset, 0);
                assert_eq!(region.length, 12);
                assert_eq!(occurrence.offset, 9);
            }
            other => panic!("expected erroneous, got {:?}", other),
        }
    }

    #[test]
    fn test_saw_eof_continuation_signal() {
        let mut parser = SqlParser::new("select 1", ScannerConfig::default());
        assert!(parser.next().is_some());
        assert!(parser.saw_eof());

        let mut parser = SqlParser::new("select 1;", ScannerConfig::default());
        assert!(parser.next().is_some());
        assert!(!parser.saw_eof());
    }

    #[test]
    fn test_empty_script() {
        let statements = parse_all("  \n -- just a comment\n");
        assert_eq!(statements.len(), 1);
        assert!(statements[0].is_empty());
    }
}
