//! Token types for the statement scanner

use phf::phf_map;

use super::region::Region;

/// Statement-initial control keywords, matched case-insensitively on regular
/// identifier text (O(1) perfect hash lookup). This is deliberately not a
/// reserved-word table: an identifier named `commit` in statement-initial
/// position classifies as a control statement. Inherited behavior, kept as is.
static CONTROL_KEYWORDS: phf::Map<&'static str, ControlKeyword> = phf_map! {
    "start" => ControlKeyword::Start,
    "begin" => ControlKeyword::Begin,
    "commit" => ControlKeyword::Commit,
    "rollback" => ControlKeyword::Rollback,
    "call" => ControlKeyword::Call,
};

/// Keywords that may begin a statement and decide its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKeyword {
    Start,
    Begin,
    Commit,
    Rollback,
    Call,
}

impl ControlKeyword {
    pub fn from_identifier(s: &str) -> Option<Self> {
        let lowercase = s.to_lowercase();
        CONTROL_KEYWORDS.get(lowercase.as_str()).copied()
    }
}

/// Broad token classes used by the analyzer to skip or merge tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// Identifiers, literals, special-command words.
    Regular,
    /// Single punctuation characters.
    Punctuation,
    /// Statement delimiters.
    Delimiter,
    /// Comments of any form.
    Comment,
    /// Synthetic tokens (end of input).
    Pseudo,
    /// Character runs the scanner did not recognize.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Regular
    Identifier,
    DelimitedIdentifier,
    NumberLiteral,
    CharacterStringLiteral,
    BinaryStringLiteral,
    TrueLiteral,
    FalseLiteral,
    NullLiteral,
    SpecialCommand,
    SpecialCommandArgument,

    // Punctuation
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Equal,
    Backslash,

    // Delimiters
    Semicolon,
    /// End of a special-command line; only emitted in special-command mode.
    LineBreak,

    // Comments
    BlockComment,
    /// `/** ... */`
    DocComment,
    /// `// ...`
    SlashComment,
    /// `-- ...`
    HyphenComment,

    // Pseudo
    Eof,

    // Unknown
    UnhandledText,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Identifier | DelimitedIdentifier | NumberLiteral | CharacterStringLiteral
            | BinaryStringLiteral | TrueLiteral | FalseLiteral | NullLiteral | SpecialCommand
            | SpecialCommandArgument => TokenCategory::Regular,
            Dot | Comma | LeftParen | RightParen | Plus | Minus | Star | Equal | Backslash => {
                TokenCategory::Punctuation
            }
            Semicolon | LineBreak => TokenCategory::Delimiter,
            BlockComment | DocComment | SlashComment | HyphenComment => TokenCategory::Comment,
            Eof => TokenCategory::Pseudo,
            UnhandledText => TokenCategory::Unknown,
        }
    }
}

/// A lexical token with its source position. Produced once by the scanner,
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            line,
            column,
        }
    }

    pub fn region(&self) -> Region {
        Region::new(self.offset, self.length, self.line, self.column)
    }
}
