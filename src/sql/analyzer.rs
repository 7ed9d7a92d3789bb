//! Segment analyzer - classifies token runs into typed statements
//!
//! Classification errors are data (`ParseFailure`), not panics or escaping
//! errors: the parser boundary converts them into `Statement::Erroneous`.

use super::region::{Region, Regioned};
use super::segment::Segment;
use super::statement::{
    CommitStatus, ErrorKind, ExclusiveMode, ReadWriteMode, StartTransactionFields, Statement,
    TransactionMode,
};
use super::token::{ControlKeyword, Token, TokenKind};

/// A structured classification failure: what went wrong, where, and a
/// human-readable message.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub kind: ErrorKind,
    pub region: Region,
    pub message: String,
}

pub type ParseResult<T> = std::result::Result<T, ParseFailure>;

pub struct SegmentAnalyzer;

impl SegmentAnalyzer {
    /// Classify a segment. The caller (`SqlParser`) converts failures into
    /// `Statement::Erroneous`; nothing raised here crosses the public API.
    pub fn analyze(segment: &Segment) -> ParseResult<Statement> {
        let content: Vec<&Token> = segment.content_tokens().collect();

        if content.is_empty() {
            let anchor = segment.tokens.first();
            let region = anchor
                .map(|t| Region::new(t.offset, 0, t.line, t.column))
                .unwrap_or(Region::new(segment.offset, 0, 1, 1));
            return Ok(Statement::Empty {
                text: String::new(),
                region,
            });
        }

        let (text, region) = statement_span(segment, &content);
        let first = content[0];

        if first.kind == TokenKind::SpecialCommand {
            return Ok(analyze_special(segment, &content, text, region));
        }

        if first.kind == TokenKind::Identifier {
            // Matching is on identifier text, not a reserved-word table: an
            // identifier spelled like a control keyword in initial position
            // classifies as that control statement.
            match ControlKeyword::from_identifier(segment.token_text(first)) {
                Some(ControlKeyword::Start) | Some(ControlKeyword::Begin) => {
                    let mut cursor = TokenCursor::new(segment, content, region);
                    return cursor.parse_start_transaction(text);
                }
                Some(ControlKeyword::Commit) => {
                    let mut cursor = TokenCursor::new(segment, content, region);
                    return cursor.parse_commit(text);
                }
                Some(ControlKeyword::Rollback) => {
                    let mut cursor = TokenCursor::new(segment, content, region);
                    return cursor.parse_rollback(text);
                }
                Some(ControlKeyword::Call) => {
                    return Ok(Statement::Call { text, region });
                }
                None => {}
            }
        }

        Ok(Statement::Generic { text, region })
    }
}

/// Statement text and region: from the first content token through the last,
/// delimiter excluded.
fn statement_span(segment: &Segment, content: &[&Token]) -> (String, Region) {
    let first = content[0];
    let last = content[content.len() - 1];
    let start = first.offset - segment.offset;
    let end = last.offset + last.length - segment.offset;
    let text = segment.text[start..end].to_string();
    let region = Region::new(first.offset, end - start, first.line, first.column);
    (text, region)
}

fn analyze_special(
    segment: &Segment,
    content: &[&Token],
    text: String,
    region: Region,
) -> Statement {
    let command_token = content[0];
    let raw = segment.token_text(command_token);
    let name = raw.strip_prefix('\\').unwrap_or(raw).to_string();
    let options = content[1..]
        .iter()
        .map(|t| Regioned::new(segment.token_text(t).to_string(), t.region()))
        .collect();
    Statement::Special {
        text,
        region,
        command: Regioned::new(name, command_token.region()),
        options,
    }
}

/// Cursor over the content tokens of one segment, with the small helpers the
/// transaction-control sub-grammar needs.
struct TokenCursor<'a> {
    segment: &'a Segment,
    tokens: Vec<&'a Token>,
    position: usize,
    statement_region: Region,
}

impl<'a> TokenCursor<'a> {
    fn new(segment: &'a Segment, tokens: Vec<&'a Token>, statement_region: Region) -> Self {
        Self {
            segment,
            tokens,
            position: 0,
            statement_region,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn text(&self, token: &Token) -> &'a str {
        self.segment.token_text(token)
    }

    /// Case-insensitive match of a regular identifier keyword.
    fn is_keyword(&self, token: &Token, keyword: &str) -> bool {
        token.kind == TokenKind::Identifier && self.text(token).eq_ignore_ascii_case(keyword)
    }

    fn match_keyword(&mut self, keyword: &str) -> Option<&'a Token> {
        match self.peek() {
            Some(token) if self.is_keyword(token, keyword) => self.next(),
            _ => None,
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<&'a Token> {
        match self.next() {
            Some(token) if self.is_keyword(token, keyword) => Ok(token),
            Some(token) => Err(self.unexpected(token)),
            None => Err(self.missing(keyword)),
        }
    }

    fn expect_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(token) => Err(self.unexpected(token)),
            None => Ok(()),
        }
    }

    fn unexpected(&self, token: &Token) -> ParseFailure {
        let kind = if token.kind == TokenKind::UnhandledText {
            ErrorKind::UnknownToken
        } else {
            ErrorKind::UnexpectedToken
        };
        ParseFailure {
            kind,
            region: token.region(),
            message: format!("unexpected token \"{}\"", self.text(token)),
        }
    }

    fn missing(&self, expected: &str) -> ParseFailure {
        // Point past the last consumed token, where the missing one belongs.
        let region = match self.tokens[..self.position].last() {
            Some(token) => Region::new(
                token.offset + token.length,
                0,
                token.line,
                token.column + token.length,
            ),
            None => Region::new(
                self.statement_region.offset,
                0,
                self.statement_region.line,
                self.statement_region.column,
            ),
        };
        ParseFailure {
            kind: ErrorKind::MissingToken,
            region,
            message: format!("expected {} before end of statement", expected.to_uppercase()),
        }
    }

    // START/BEGIN [SHORT|LONG] TRANSACTION <options>

    fn parse_start_transaction(&mut self, text: String) -> ParseResult<Statement> {
        let head = self.next().expect("classified on first token");
        let started_with_start = self.is_keyword(head, "start");

        let mut fields = StartTransactionFields::default();

        if let Some(token) = self.match_keyword("short") {
            fields.transaction_mode = Some(Regioned::new(TransactionMode::Short, token.region()));
        } else if let Some(token) = self.match_keyword("long") {
            fields.transaction_mode = Some(Regioned::new(TransactionMode::Long, token.region()));
        }

        // START always takes TRANSACTION; bare BEGIN is accepted, but a mode
        // keyword commits it to the full form.
        if started_with_start || fields.transaction_mode.is_some() {
            self.expect_keyword("transaction")?;
        } else {
            self.match_keyword("transaction");
        }

        while let Some(token) = self.next() {
            if self.is_keyword(token, "read") {
                self.parse_read_option(token, &mut fields)?;
            } else if self.is_keyword(token, "write") {
                self.expect_keyword("preserve")?;
                fields.write_preserve.append(&mut self.parse_table_list()?);
            } else if self.is_keyword(token, "include") {
                self.expect_keyword("ddl")?;
                fields.include_ddl = true;
            } else if self.is_keyword(token, "execute") {
                fields.exclusive_mode = Some(self.parse_exclusive_mode(token)?);
            } else if self.is_keyword(token, "as") {
                fields.label = Some(self.parse_value_token("label")?);
            } else if self.is_keyword(token, "with") {
                self.parse_properties(&mut fields)?;
            } else {
                return Err(self.unexpected(token));
            }
        }

        Ok(Statement::StartTransaction {
            text,
            region: self.statement_region,
            fields,
        })
    }

    fn parse_read_option(
        &mut self,
        read_token: &Token,
        fields: &mut StartTransactionFields,
    ) -> ParseResult<()> {
        if let Some(only) = self.match_keyword("only") {
            let (mode, end) = match self.match_keyword("deferrable") {
                Some(deferrable) => (ReadWriteMode::ReadOnlyDeferrable, deferrable.region()),
                None => (ReadWriteMode::ReadOnly, only.region()),
            };
            fields.read_write_mode =
                Some(Regioned::new(mode, read_token.region().union(&end)));
            return Ok(());
        }
        if let Some(write) = self.match_keyword("write") {
            fields.read_write_mode = Some(Regioned::new(
                ReadWriteMode::ReadWrite,
                read_token.region().union(&write.region()),
            ));
            return Ok(());
        }
        if self.match_keyword("area").is_some() {
            let mut matched = false;
            loop {
                if self.match_keyword("include").is_some() {
                    fields.read_area_include.append(&mut self.parse_table_list()?);
                    matched = true;
                } else if self.match_keyword("exclude").is_some() {
                    fields.read_area_exclude.append(&mut self.parse_table_list()?);
                    matched = true;
                } else {
                    break;
                }
            }
            if !matched {
                return Err(match self.peek() {
                    Some(token) => self.unexpected(token),
                    None => self.missing("include or exclude"),
                });
            }
            return Ok(());
        }
        match self.peek() {
            Some(token) => Err(self.unexpected(token)),
            None => Err(self.missing("only, write or area")),
        }
    }

    fn parse_exclusive_mode(&mut self, execute_token: &Token) -> ParseResult<Regioned<ExclusiveMode>> {
        let prior = if let Some(token) = self.match_keyword("prior") {
            (true, token)
        } else if let Some(token) = self.match_keyword("excluding") {
            (false, token)
        } else {
            return Err(match self.peek() {
                Some(token) => self.unexpected(token),
                None => self.missing("prior or excluding"),
            });
        };

        let (immediate, end) = if let Some(token) = self.match_keyword("immediate") {
            (true, token.region())
        } else if let Some(token) = self.match_keyword("deferrable") {
            (false, token.region())
        } else {
            (false, prior.1.region())
        };

        let mode = match (prior.0, immediate) {
            (true, false) => ExclusiveMode::PriorDeferrable,
            (true, true) => ExclusiveMode::PriorImmediate,
            (false, false) => ExclusiveMode::ExcludingDeferrable,
            (false, true) => ExclusiveMode::ExcludingImmediate,
        };
        Ok(Regioned::new(mode, execute_token.region().union(&end)))
    }

    /// Comma-separated table names (plain, delimited, or string form).
    fn parse_table_list(&mut self) -> ParseResult<Vec<Regioned<String>>> {
        let mut tables = Vec::new();
        loop {
            tables.push(self.parse_value_token("table name")?);
            match self.peek() {
                Some(token) if token.kind == TokenKind::Comma => {
                    self.next();
                }
                _ => break,
            }
        }
        Ok(tables)
    }

    /// A name-like value: identifier, delimited identifier, or string
    /// literal (quotes removed).
    fn parse_value_token(&mut self, what: &str) -> ParseResult<Regioned<String>> {
        match self.next() {
            Some(token) => match token.kind {
                TokenKind::Identifier => {
                    Ok(Regioned::new(self.text(token).to_string(), token.region()))
                }
                TokenKind::DelimitedIdentifier | TokenKind::CharacterStringLiteral => {
                    Ok(Regioned::new(unquote(self.text(token)), token.region()))
                }
                _ => Err(self.unexpected(token)),
            },
            None => Err(self.missing(what)),
        }
    }

    // WITH key=value[,...]

    fn parse_properties(&mut self, fields: &mut StartTransactionFields) -> ParseResult<()> {
        loop {
            let key = self.parse_value_token("property key")?;
            match self.next() {
                Some(token) if token.kind == TokenKind::Equal => {}
                Some(token) => return Err(self.unexpected(token)),
                None => return Err(self.missing("=")),
            }
            let value = self.parse_property_value()?;
            fields.properties.push((key, value));
            match self.peek() {
                Some(token) if token.kind == TokenKind::Comma => {
                    self.next();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_property_value(&mut self) -> ParseResult<Regioned<String>> {
        match self.next() {
            Some(token) => match token.kind {
                TokenKind::Identifier
                | TokenKind::NumberLiteral
                | TokenKind::TrueLiteral
                | TokenKind::FalseLiteral
                | TokenKind::NullLiteral => {
                    Ok(Regioned::new(self.text(token).to_string(), token.region()))
                }
                TokenKind::DelimitedIdentifier | TokenKind::CharacterStringLiteral => {
                    Ok(Regioned::new(unquote(self.text(token)), token.region()))
                }
                _ => Err(self.unexpected(token)),
            },
            None => Err(self.missing("property value")),
        }
    }

    // COMMIT [WAIT [FOR] (ACCEPTED|AVAILABLE|STORED|PROPAGATED)]

    fn parse_commit(&mut self, text: String) -> ParseResult<Statement> {
        self.next(); // COMMIT

        let status = if self.match_keyword("wait").is_some() {
            self.match_keyword("for");
            Some(self.parse_commit_status()?)
        } else {
            None
        };
        self.expect_end()?;

        Ok(Statement::Commit {
            text,
            region: self.statement_region,
            status,
        })
    }

    fn parse_commit_status(&mut self) -> ParseResult<Regioned<CommitStatus>> {
        let token = match self.next() {
            Some(token) => token,
            None => return Err(self.missing("commit status")),
        };
        let status = if self.is_keyword(token, "accepted") {
            CommitStatus::Accepted
        } else if self.is_keyword(token, "available") {
            CommitStatus::Available
        } else if self.is_keyword(token, "stored") {
            CommitStatus::Stored
        } else if self.is_keyword(token, "propagated") {
            CommitStatus::Propagated
        } else {
            return Err(self.unexpected(token));
        };
        Ok(Regioned::new(status, token.region()))
    }

    // ROLLBACK takes no further fields.

    fn parse_rollback(&mut self, text: String) -> ParseResult<Statement> {
        self.next(); // ROLLBACK
        self.expect_end()?;
        Ok(Statement::Rollback {
            text,
            region: self.statement_region,
        })
    }
}

/// Strip surrounding quotes and resolve backslash escapes.
fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return raw.to_string(),
    };
    let mut out = String::with_capacity(raw.len());
    let mut escaped = false;
    for ch in chars {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            break;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use crate::sql::segment::SegmentScanner;

    fn analyze_one(input: &str) -> ParseResult<Statement> {
        let mut scanner = SegmentScanner::new(input, ScannerConfig::default());
        let segment = scanner.next().expect("one segment");
        SegmentAnalyzer::analyze(&segment)
    }

    fn analyze_ok(input: &str) -> Statement {
        analyze_one(input).expect("classification succeeds")
    }

    #[test]
    fn test_empty_variants() {
        assert!(analyze_ok(";").is_empty());
        assert!(analyze_ok("   ;").is_empty());
        assert!(analyze_ok("/* note */ -- more\n;").is_empty());
        assert!(analyze_ok("").is_empty());
    }

    #[test]
    fn test_generic_preserves_text() {
        let stmt = analyze_ok("select a, b from t1 where x = 1;");
        match &stmt {
            Statement::Generic { text, .. } => {
                assert_eq!(text, "select a, b from t1 where x = 1");
            }
            other => panic!("expected generic, got {:?}", other),
        }
        // Reparsing the extracted text yields the same classification.
        let again = analyze_ok(&format!("{};", stmt.text()));
        assert!(matches!(again, Statement::Generic { .. }));
        assert_eq!(again.text(), stmt.text());
    }

    #[test]
    fn test_generic_with_unhandled_text() {
        let stmt = analyze_ok("select #pragma from t;");
        assert!(matches!(stmt, Statement::Generic { .. }));
    }

    #[test]
    fn test_start_transaction_plain() {
        let stmt = analyze_ok("start transaction;");
        match stmt {
            Statement::StartTransaction { fields, .. } => {
                assert!(fields.transaction_mode.is_none());
                assert!(fields.read_write_mode.is_none());
            }
            other => panic!("expected start transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_start_long_transaction_options() {
        let stmt = analyze_ok(
            "START LONG TRANSACTION WRITE PRESERVE t1, t2 INCLUDE DDL \
             READ AREA INCLUDE a EXCLUDE b, c AS batch1 WITH key1=v1, key2='v 2';",
        );
        match stmt {
            Statement::StartTransaction { fields, .. } => {
                assert_eq!(
                    fields.transaction_mode.as_ref().map(|m| m.value),
                    Some(TransactionMode::Long)
                );
                let preserve: Vec<&str> =
                    fields.write_preserve.iter().map(|t| t.value.as_str()).collect();
                assert_eq!(preserve, vec!["t1", "t2"]);
                assert!(fields.include_ddl);
                assert_eq!(fields.read_area_include.len(), 1);
                assert_eq!(fields.read_area_exclude.len(), 2);
                assert_eq!(fields.label.as_ref().map(|l| l.value.as_str()), Some("batch1"));
                assert_eq!(fields.properties.len(), 2);
                assert_eq!(fields.properties[1].1.value, "v 2");
            }
            other => panic!("expected start transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_begin_forms() {
        assert!(matches!(
            analyze_ok("begin;"),
            Statement::StartTransaction { .. }
        ));
        assert!(matches!(
            analyze_ok("begin transaction read only;"),
            Statement::StartTransaction { .. }
        ));
        match analyze_ok("begin long transaction;") {
            Statement::StartTransaction { fields, .. } => {
                assert_eq!(
                    fields.transaction_mode.map(|m| m.value),
                    Some(TransactionMode::Long)
                );
            }
            other => panic!("expected start transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_read_only_deferrable() {
        match analyze_ok("start transaction read only deferrable;") {
            Statement::StartTransaction { fields, .. } => {
                assert_eq!(
                    fields.read_write_mode.map(|m| m.value),
                    Some(ReadWriteMode::ReadOnlyDeferrable)
                );
            }
            other => panic!("expected start transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_priority_mapping() {
        let cases = [
            ("execute prior deferrable", ExclusiveMode::PriorDeferrable),
            ("execute prior immediate", ExclusiveMode::PriorImmediate),
            ("execute excluding deferrable", ExclusiveMode::ExcludingDeferrable),
            ("execute excluding immediate", ExclusiveMode::ExcludingImmediate),
            ("execute prior", ExclusiveMode::PriorDeferrable),
        ];
        for (clause, expected) in cases {
            match analyze_ok(&format!("start transaction {};", clause)) {
                Statement::StartTransaction { fields, .. } => {
                    assert_eq!(fields.exclusive_mode.map(|m| m.value), Some(expected));
                }
                other => panic!("expected start transaction, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_start_transaction_trailing_junk_fails() {
        let failure = analyze_one("start transaction bogus;").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedToken);
        assert!(failure.message.contains("bogus"));
    }

    #[test]
    fn test_start_without_transaction_keyword_fails() {
        let failure = analyze_one("start;").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::MissingToken);
        // The reported position is just past the last consumed token.
        assert_eq!(failure.region.offset, 5);
        assert_eq!(failure.region.length, 0);
        assert_eq!((failure.region.line, failure.region.column), (1, 6));
    }

    #[test]
    fn test_missing_token_position_after_options() {
        let failure = analyze_one("start transaction write;").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::MissingToken);
        assert_eq!(failure.region.offset, 23);
        assert_eq!((failure.region.line, failure.region.column), (1, 24));
    }

    #[test]
    fn test_commit_forms() {
        assert!(matches!(
            analyze_ok("commit;"),
            Statement::Commit { status: None, .. }
        ));
        match analyze_ok("COMMIT WAIT FOR STORED;") {
            Statement::Commit { status, .. } => {
                assert_eq!(status.map(|s| s.value), Some(CommitStatus::Stored));
            }
            other => panic!("expected commit, got {:?}", other),
        }
        match analyze_ok("commit wait accepted;") {
            Statement::Commit { status, .. } => {
                assert_eq!(status.map(|s| s.value), Some(CommitStatus::Accepted));
            }
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_bad_status_fails() {
        let failure = analyze_one("commit wait for never;").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_rollback() {
        assert!(matches!(analyze_ok("rollback;"), Statement::Rollback { .. }));
        let failure = analyze_one("rollback work;").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_call_verbatim() {
        match analyze_ok("call my_proc(1, 'x');") {
            Statement::Call { text, .. } => assert_eq!(text, "call my_proc(1, 'x')"),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_special_command() {
        match analyze_ok("\\connect db1 user\n") {
            Statement::Special { command, options, .. } => {
                assert_eq!(command.value, "connect");
                let opts: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                assert_eq!(opts, vec!["db1", "user"]);
            }
            other => panic!("expected special, got {:?}", other),
        }
    }

    #[test]
    fn test_special_command_eof_equals_semicolon() {
        // `\help;` and `\help` at end of input carry the same content.
        let with_semicolon = analyze_ok("\\help;");
        let at_eof = analyze_ok("\\help");
        match (with_semicolon, at_eof) {
            (
                Statement::Special { command: a, options: oa, .. },
                Statement::Special { command: b, options: ob, .. },
            ) => {
                assert_eq!(a.value, b.value);
                assert!(oa.is_empty() && ob.is_empty());
            }
            other => panic!("expected two specials, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_capture_limitation() {
        // An identifier named like a control keyword in initial position is
        // classified as a control statement; inherited behavior.
        let failure = analyze_one("commit_log;");
        assert!(matches!(failure, Ok(Statement::Generic { .. })));
        let captured = analyze_one("commit extra tokens;");
        assert!(captured.is_err());
    }

    #[test]
    fn test_region_within_segment() {
        let mut scanner = SegmentScanner::new("  select 1;", ScannerConfig::default());
        let segment = scanner.next().unwrap();
        let stmt = SegmentAnalyzer::analyze(&segment).unwrap();
        let region = stmt.region();
        assert!(region.offset >= segment.offset);
        assert!(region.end() <= segment.offset + segment.text.len());
        assert_eq!(region.offset, 2);
        assert_eq!(stmt.text(), "select 1");
    }
}
