//! Statement scanning and classification
//!
//! Pipeline: raw characters -> TokenScanner -> tokens -> SegmentScanner ->
//! segments -> SegmentAnalyzer -> typed Statement. The scanner never fails;
//! the analyzer fails with structured errors that the parser converts into
//! erroneous statement values.

pub mod analyzer;
pub mod parser;
pub mod region;
pub mod scanner;
pub mod segment;
pub mod statement;
pub mod token;

pub use analyzer::{ParseFailure, ParseResult, SegmentAnalyzer};
pub use parser::SqlParser;
pub use region::{Region, Regioned};
pub use scanner::TokenScanner;
pub use segment::{Segment, SegmentScanner};
pub use statement::{
    CommitStatus, ErrorKind, ExclusiveMode, ReadWriteMode, StartTransactionFields, Statement,
    TransactionMode,
};
pub use token::{Token, TokenCategory, TokenKind};
