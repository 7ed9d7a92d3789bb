//! Segment scanner - groups tokens into delimiter-terminated runs
//!
//! A segment is the maximal token run up to and including a statement
//! delimiter (`;`, a special-command line break) or end of input.

use super::scanner::TokenScanner;
use super::token::{Token, TokenCategory, TokenKind};
use crate::config::ScannerConfig;

/// Raw text and tokens between two statement delimiters, trailing delimiter
/// included. Comment tokens are carried separately so classification can
/// ignore them without losing them.
#[derive(Debug, Clone)]
pub struct Segment {
    pub offset: usize,
    pub text: String,
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
}

impl Segment {
    /// Source text of a token belonging to this segment.
    pub fn token_text(&self, token: &Token) -> &str {
        let start = token.offset - self.offset;
        &self.text[start..start + token.length]
    }

    /// Tokens that carry statement content: everything except delimiters and
    /// the synthetic EOF token.
    pub fn content_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| {
            !matches!(
                t.kind.category(),
                TokenCategory::Delimiter | TokenCategory::Pseudo
            )
        })
    }
}

pub struct SegmentScanner<'a> {
    scanner: TokenScanner<'a>,
    saw_eof: bool,
    finished: bool,
    returned_any: bool,
}

impl<'a> SegmentScanner<'a> {
    pub fn new(input: &'a str, config: ScannerConfig) -> Self {
        Self {
            scanner: TokenScanner::new(input, config),
            saw_eof: false,
            finished: false,
            returned_any: false,
        }
    }

    /// Whether the most recent `next()` hit end of input without seeing a
    /// delimiter. Interactive callers use this to prompt for a continuation
    /// line instead of treating the statement as complete.
    pub fn saw_eof(&self) -> bool {
        self.saw_eof
    }

    /// The next segment, or `None` once the input was fully consumed with a
    /// terminating delimiter already returned. True end of stream yields one
    /// degenerate EOF-only segment.
    pub fn next(&mut self) -> Option<Segment> {
        if self.finished {
            return None;
        }

        let mut tokens = Vec::new();
        let mut comments = Vec::new();

        loop {
            let token = self.scanner.next_token();
            match token.kind {
                TokenKind::Eof => {
                    self.finished = true;
                    if tokens.is_empty() && comments.is_empty() && self.returned_any {
                        // Previous segment ended at a delimiter; nothing left.
                        return None;
                    }
                    self.saw_eof = true;
                    tokens.push(token);
                    break;
                }
                kind if kind.category() == TokenCategory::Comment => comments.push(token),
                kind if kind.category() == TokenCategory::Delimiter => {
                    self.saw_eof = false;
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }

        self.returned_any = true;
        Some(self.build_segment(tokens, comments))
    }

    fn build_segment(&self, tokens: Vec<Token>, comments: Vec<Token>) -> Segment {
        let start = tokens
            .iter()
            .chain(comments.iter())
            .map(|t| t.offset)
            .min()
            .unwrap_or(0);
        let end = tokens
            .iter()
            .chain(comments.iter())
            .map(|t| t.offset + t.length)
            .max()
            .unwrap_or(start);
        Segment {
            offset: start,
            text: self.scanner.input()[start..end].to_string(),
            tokens,
            comments,
        }
    }
}
