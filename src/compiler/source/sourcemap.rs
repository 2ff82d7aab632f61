use std::path::{Path, PathBuf};

use super::{Offset, Span};

/// The SourceMap keeps a table of the sequencer files read during one
/// compilation and the range of the global offset space assigned to each.
///
/// When initially created, the SourceMap has no source units and the global
/// offset watermark is 0.  When a file is added, it is assigned a low offset
/// equal to the current watermark and the watermark is increased by the size
/// of the file in bytes.  The file then owns the range from its low offset up
/// to, but not including, its high offset.
#[derive(Debug, Default)]
pub struct SourceMap {
    map: Vec<SourceMapEntry>,

    /// The next added file will have this offset as its low offset.
    offset_high: Offset,
}

impl SourceMap {
    pub fn new() -> SourceMap {
        SourceMap {
            offset_high: Offset::new(0),
            map: Vec::new(),
        }
    }

    /// Adds a source unit to the [`SourceMap`] and returns the low offset that
    /// was assigned to its first character.
    pub fn add_source(&mut self, path: PathBuf, text: String) -> Result<Offset, SourceMapError> {
        let len = text.len() as u64;
        if (self.offset_high.as_u32() as u64) + len >= u32::MAX as u64 {
            return Err(SourceMapError::FileTooBig(path));
        }

        let low = self.offset_high;
        self.offset_high += len as u32;
        let high = self.offset_high;

        self.map.push(SourceMapEntry {
            low,
            high,
            path,
            text,
        });

        Ok(low)
    }

    /// Returns the number of entries in the [`SourceMap`]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// If `idx` is less than the number of entries, then this will return
    /// a reference to the entry at position `idx`.  Otherwise, this will
    /// return [`None`].
    pub fn get(&self, idx: usize) -> Option<&SourceMapEntry> {
        self.map.get(idx)
    }

    /// Finds the entry whose range contains `offset`.  The end of a file is
    /// considered part of that file so that errors raised at EOF can be
    /// located.
    pub fn entry_of(&self, offset: Offset) -> Option<&SourceMapEntry> {
        self.map
            .iter()
            .find(|e| e.low <= offset && offset < e.high)
            .or_else(|| self.map.iter().find(|e| offset == e.high))
    }

    /// Converts a global offset into a file, line and column.
    pub fn locate(&self, offset: Offset) -> Option<Location> {
        let entry = self.entry_of(offset)?;
        let local = (offset.as_u32() - entry.low.as_u32()) as usize;
        let before = &entry.text.as_bytes()[..local.min(entry.text.len())];

        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match before.iter().rposition(|&b| b == b'\n') {
            Some(nl) => local - nl,
            None => local + 1,
        };

        Some(Location {
            path: entry.path.clone(),
            line,
            column,
        })
    }

    /// Returns the source text covered by the given span, if the span lies
    /// within a single file.
    pub fn text_in_span(&self, span: Span) -> Option<&str> {
        let entry = self.entry_of(span.low())?;
        if span.high() > entry.high {
            return None;
        }
        let low = (span.low().as_u32() - entry.low.as_u32()) as usize;
        let high = (span.high().as_u32() - entry.low.as_u32()) as usize;
        entry.text.get(low..high)
    }
}

/// Tracks the assignment of a range within the global offset space
#[derive(Debug)]
pub struct SourceMapEntry {
    low: Offset,
    high: Offset,
    path: PathBuf,
    text: String,
}

impl SourceMapEntry {
    /// Get the file path for the source code that this entry represents
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        Span::new(self.low, self.high)
    }
}

/// A human readable position in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

#[derive(Debug)]
pub enum SourceMapError {
    FileTooBig(PathBuf),
}

impl std::fmt::Display for SourceMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMapError::FileTooBig(path) => {
                write!(f, "{} does not fit in the source map", path.display())
            }
        }
    }
}
