//! Source position metadata for diagnostics

use serde::{Deserialize, Serialize};

/// A span of the source text: byte offset/length plus the 1-based
/// line/column of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

impl Region {
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            length,
            line,
            column,
        }
    }

    /// Byte offset one past the end of the span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Smallest region covering both `self` and `other`.
    ///
    /// Line/column come from whichever region starts first.
    pub fn union(&self, other: &Region) -> Region {
        let (first, _) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let offset = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        Region {
            offset,
            length: end - offset,
            line: first.line,
            column: first.column,
        }
    }
}

/// A value paired with the region it originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regioned<T> {
    pub value: T,
    pub region: Region,
}

impl<T> Regioned<T> {
    pub fn new(value: T, region: Region) -> Self {
        Self { value, region }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Regioned<U> {
        Regioned {
            value: f(self.value),
            region: self.region,
        }
    }
}
