//! This module abstracts out the source text from which the compiler derives
//! it's input data.  Every character read by the parser is addressed by an
//! [`Offset`] in a global space shared by the main sequencer file and all of
//! the files it includes; the [`SourceMap`] converts an offset back into a
//! file, line and column for error reporting.

use std::{fmt::Display, ops::AddAssign};

mod sourcemap;

pub use sourcemap::{Location, SourceMap, SourceMapEntry, SourceMapError};

/// A unique offset into the global space of all source code.  The
/// [`SourceMap`] manages the offset ranges and will convert a given offset to
/// the source file it belongs to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(u32);

impl Offset {
    pub fn new(o: u32) -> Offset {
        Offset(o)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the offset `delta` characters past this one.
    pub fn add(&self, delta: usize) -> Offset {
        Offset(self.0 + delta as u32)
    }
}

impl AddAssign<u32> for Offset {
    fn add_assign(&mut self, rhs: u32) {
        self.0 += rhs
    }
}

impl Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Any value derived from the source text which can report the span of text
/// it was read from.
pub trait SourceIr {
    fn span(&self) -> Span;
}

/// A range of the global offset space: `low` is inclusive and `high` is
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    low: Offset,
    high: Offset,
}

impl Span {
    pub fn new(low: Offset, high: Offset) -> Span {
        debug_assert!(low <= high, "Span low must not be greater than high");
        Span { low, high }
    }

    /// A span of zero width, used when only a position is known.
    pub fn at(o: Offset) -> Span {
        Span { low: o, high: o }
    }

    pub fn low(&self) -> Offset {
        self.low
    }

    pub fn high(&self) -> Offset {
        self.high
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn cover(&self, other: Span) -> Span {
        Span {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
