//! Token scanner - converts raw console input into tokens
//!
//! The scanner never fails: malformed input becomes `UnhandledText` tokens
//! (or literals running to end of input) and is surfaced later, during
//! statement classification.

use super::token::{Token, TokenKind};
use crate::config::ScannerConfig;

/// Lexical mode. A bare backslash at the start of a statement switches the
/// scanner into special-command mode until the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Statement,
    SpecialCommand,
}

pub struct TokenScanner<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    config: ScannerConfig,
    mode: ScanMode,
    at_statement_start: bool,
}

impl<'a> TokenScanner<'a> {
    pub fn new(input: &'a str, config: ScannerConfig) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            config,
            mode: ScanMode::Statement,
            at_statement_start: true,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Produce the next token. Returns an `Eof` token at end of input and
    /// keeps returning it on subsequent calls.
    pub fn next_token(&mut self) -> Token {
        loop {
            let token = match self.mode {
                ScanMode::Statement => self.next_statement_token(),
                ScanMode::SpecialCommand => self.next_special_token(),
            };
            if self.is_suppressed_comment(token.kind) {
                continue;
            }
            return token;
        }
    }

    fn is_suppressed_comment(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::BlockComment | TokenKind::SlashComment | TokenKind::HyphenComment => {
                self.config.skip_regular_comments
            }
            TokenKind::DocComment => self.config.skip_documentation_comments,
            _ => false,
        }
    }

    fn next_statement_token(&mut self) -> Token {
        self.skip_whitespace();

        let offset = self.position;
        let line = self.line;
        let column = self.column;

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Token::new(TokenKind::Eof, offset, 0, line, column),
        };

        let kind = match ch {
            '\\' if self.at_statement_start => {
                self.mode = ScanMode::SpecialCommand;
                self.read_special_word();
                TokenKind::SpecialCommand
            }
            '\'' => self.read_string('\''),
            'x' | 'X' if self.peek_char() == Some('\'') => {
                self.advance();
                self.read_string('\'');
                TokenKind::BinaryStringLiteral
            }
            '"' => {
                self.read_string('"');
                TokenKind::DelimitedIdentifier
            }
            '0'..='9' => self.read_number(),
            '.' if matches!(self.peek_char(), Some('0'..='9')) => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(),
            '-' if self.peek_char() == Some('-') => self.read_line_comment(TokenKind::HyphenComment),
            '/' if self.peek_char() == Some('/') => self.read_line_comment(TokenKind::SlashComment),
            '/' if self.peek_char() == Some('*') => self.read_block_comment(),
            '.' => self.punctuation(TokenKind::Dot),
            ',' => self.punctuation(TokenKind::Comma),
            '(' => self.punctuation(TokenKind::LeftParen),
            ')' => self.punctuation(TokenKind::RightParen),
            '+' => self.punctuation(TokenKind::Plus),
            '-' => self.punctuation(TokenKind::Minus),
            '*' => self.punctuation(TokenKind::Star),
            '=' => self.punctuation(TokenKind::Equal),
            '\\' => self.punctuation(TokenKind::Backslash),
            ';' => self.punctuation(TokenKind::Semicolon),
            _ => self.read_unhandled(),
        };

        match kind.category() {
            super::token::TokenCategory::Comment => {}
            _ => {
                self.at_statement_start = matches!(kind, TokenKind::Semicolon);
            }
        }

        Token::new(kind, offset, self.position - offset, line, column)
    }

    fn next_special_token(&mut self) -> Token {
        // Inside a special-command line only spaces separate arguments; the
        // line break is itself a statement delimiter.
        while matches!(self.current_char(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }

        let offset = self.position;
        let line = self.line;
        let column = self.column;

        let kind = match self.current_char() {
            None => {
                self.mode = ScanMode::Statement;
                self.at_statement_start = true;
                TokenKind::Eof
            }
            Some('\n') => {
                self.advance();
                self.mode = ScanMode::Statement;
                self.at_statement_start = true;
                TokenKind::LineBreak
            }
            Some(';') => {
                self.advance();
                self.mode = ScanMode::Statement;
                self.at_statement_start = true;
                TokenKind::Semicolon
            }
            Some(_) => {
                self.read_special_word();
                TokenKind::SpecialCommandArgument
            }
        };

        Token::new(kind, offset, self.position - offset, line, column)
    }

    /// Consume a special-command word: everything up to whitespace, `;`, or
    /// end of input. Used for both the command itself (including its leading
    /// backslash) and its arguments.
    fn read_special_word(&mut self) {
        if self.current_char() == Some('\\') {
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == ';' {
                break;
            }
            self.advance();
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn punctuation(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Read a quoted run. The closing quote may be escaped with a backslash;
    /// an unterminated literal extends to end of input rather than failing.
    fn read_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // opening quote
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                if self.current_char().is_some() {
                    self.advance();
                }
                continue;
            }
            if ch == quote {
                self.advance();
                break;
            }
            self.advance();
        }
        TokenKind::CharacterStringLiteral
    }

    fn read_number(&mut self) -> TokenKind {
        while matches!(self.current_char(), Some('0'..='9')) {
            self.advance();
        }
        if self.current_char() == Some('.') {
            self.advance();
            while matches!(self.current_char(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.current_char(), Some('e') | Some('E')) {
            // Exponent only when followed by digits (with optional sign);
            // otherwise the `e` belongs to the next identifier.
            let mut probe = self.input[self.position..].chars();
            probe.next();
            let mut next = probe.next();
            if matches!(next, Some('+') | Some('-')) {
                next = probe.next();
            }
            if matches!(next, Some('0'..='9')) {
                self.advance();
                if matches!(self.current_char(), Some('+') | Some('-')) {
                    self.advance();
                }
                while matches!(self.current_char(), Some('0'..='9')) {
                    self.advance();
                }
            }
        }
        TokenKind::NumberLiteral
    }

    fn read_identifier(&mut self) -> TokenKind {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.position];
        if text.eq_ignore_ascii_case("true") {
            TokenKind::TrueLiteral
        } else if text.eq_ignore_ascii_case("false") {
            TokenKind::FalseLiteral
        } else if text.eq_ignore_ascii_case("null") {
            TokenKind::NullLiteral
        } else {
            TokenKind::Identifier
        }
    }

    /// `--` or `//` comment running to the end of the line (newline excluded).
    fn read_line_comment(&mut self, kind: TokenKind) -> TokenKind {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
        kind
    }

    /// `/* */` comment; `/**` opens a documentation comment. Unterminated
    /// comments extend to end of input.
    fn read_block_comment(&mut self) -> TokenKind {
        self.advance(); // '/'
        self.advance(); // '*'
        let doc = self.current_char() == Some('*') && self.peek_char() != Some('/');
        while let Some(ch) = self.current_char() {
            if ch == '*' && self.peek_char() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        if doc {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        }
    }

    /// Maximal run of characters no other rule claims.
    fn read_unhandled(&mut self) -> TokenKind {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || is_known_start(ch) {
                break;
            }
            self.advance();
        }
        TokenKind::UnhandledText
    }
}

fn is_known_start(ch: char) -> bool {
    ch.is_alphanumeric()
        || matches!(
            ch,
            '_' | '\'' | '"' | '.' | ',' | ';' | '(' | ')' | '+' | '-' | '*' | '=' | '\\' | '/'
        )
}
