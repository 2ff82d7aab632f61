//! Reads the text of one sequencer file into a [`SequencerDocument`].
//!
//! A sequencer file is line oriented: seven sections, each introduced by a
//! `[name]` marker at the start of a line, appear in a fixed order.  The
//! `[constants]`, `[clocks]`, `[functions]` and `[mains]` sections are
//! required, the others may be left out.  Blank and comment-only lines may appear anywhere.
//! The whole text must be consumed for the parse to succeed.

use std::path::Path;

use stdext::function_name;

use crate::compiler::ast::SequencerDocument;
use crate::compiler::error::{CompilerDisplay, CompilerDisplayError, CompilerError};
use crate::compiler::source::{Offset, SourceMap};
use crate::diagnostics::{Tracing, TracingConfig};

macro_rules! trace {
    ($scanner:expr, $pos:expr) => {
        $scanner.trace(function_name!(), $pos)
    };
}

mod routines;
mod scanner;
mod sections;

use scanner::Scanner;

pub type ParserResult<T> = Result<T, CompilerError<ParserError>>;

/// The sections of a sequencer file, in the order they must appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Includes,
    Constants,
    Clocks,
    Pointers,
    Functions,
    Subroutines,
    Mains,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Includes,
        Section::Constants,
        Section::Clocks,
        Section::Pointers,
        Section::Functions,
        Section::Subroutines,
        Section::Mains,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Section::Includes => "includes",
            Section::Constants => "constants",
            Section::Clocks => "clocks",
            Section::Pointers => "pointers",
            Section::Functions => "functions",
            Section::Subroutines => "subroutines",
            Section::Mains => "mains",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Section::Constants | Section::Clocks | Section::Functions | Section::Mains
        )
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.iter().find(|s| s.name() == name).copied()
    }
}

/// Errors raised while reading a sequencer file.  The span of the
/// [`CompilerError`] wrapping these always covers the offending line.
#[derive(Clone, Debug, PartialEq)]
pub enum ParserError {
    /// The text ended before a required section was found.
    MissingSection(&'static str),
    /// A known section marker appears where a different section was expected
    /// or after the section it should precede.
    UnexpectedSection {
        found: String,
        expected: Option<&'static str>,
    },
    UnknownSection(String),
    /// A line inside the named section does not match any of its line forms.
    MalformedLine(&'static str),
    /// Text was found before the first section marker.
    ExpectedSectionMarker(&'static str),
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::MissingSection(s) => write!(f, "Missing required section [{}]", s),
            ParserError::UnexpectedSection {
                found,
                expected: Some(expected),
            } => write!(
                f,
                "Found section [{}] where [{}] was expected",
                found, expected
            ),
            ParserError::UnexpectedSection {
                found,
                expected: None,
            } => write!(f, "Section [{}] is out of order", found),
            ParserError::UnknownSection(s) => write!(f, "Unknown section [{}]", s),
            ParserError::MalformedLine(s) => write!(f, "Malformed line in section [{}]", s),
            ParserError::ExpectedSectionMarker(s) => {
                write!(f, "Expected section marker, such as [{}]", s)
            }
        }
    }
}

impl CompilerDisplay for ParserError {
    fn fmt(&self, _sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        Ok(format!("{}", self))
    }
}

/// Converts sequencer source text into a [`SequencerDocument`].  Includes are
/// recorded but not followed; see [`crate::compiler::import`].
#[derive(Debug, Default)]
pub struct Parser {
    tracing: TracingConfig,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            tracing: TracingConfig::Off,
        }
    }

    /// Parses `text`, which was read from `path`.  `base` is the offset the
    /// [`SourceMap`] assigned to the first character of the text, so that
    /// spans in the result point into the global offset space.
    pub fn parse(
        &self,
        path: &Path,
        text: &str,
        base: Offset,
    ) -> ParserResult<SequencerDocument> {
        let scanner = Scanner::new(text, base, self.tracing);
        document(&scanner, path)
    }
}

impl Tracing for Parser {
    fn set_tracing(&mut self, config: TracingConfig) {
        self.tracing = config;
    }
}

fn document(s: &Scanner, path: &Path) -> ParserResult<SequencerDocument> {
    trace!(s, 0);
    let mut doc = SequencerDocument::new(path.into());
    let mut pos = 0;
    let mut current = None;

    for section in Section::ALL.iter() {
        pos = s.empty_lines(pos);
        let next = match section {
            Section::Includes => {
                sections::section(s, pos, *section, sections::include_line).map(|p| {
                    doc.includes = p.value;
                    p.pos
                })
            }
            Section::Constants => {
                sections::section(s, pos, *section, sections::constant_line).map(|p| {
                    doc.constants = p.value;
                    p.pos
                })
            }
            Section::Clocks => sections::section(s, pos, *section, sections::clock_line).map(|p| {
                doc.clocks = p.value;
                p.pos
            }),
            Section::Pointers => {
                sections::section(s, pos, *section, sections::pointer_line).map(|p| {
                    doc.pointers = p.value;
                    p.pos
                })
            }
            Section::Functions => {
                sections::section(s, pos, *section, sections::function_block).map(|p| {
                    doc.functions = p.value;
                    p.pos
                })
            }
            Section::Subroutines => {
                sections::section(s, pos, *section, routines::subroutine_block).map(|p| {
                    doc.subroutines = p.value;
                    p.pos
                })
            }
            Section::Mains => sections::section(s, pos, *section, routines::main_block).map(|p| {
                doc.mains = p.value;
                p.pos
            }),
        };

        match next {
            Some(next) => {
                pos = next;
                current = Some(*section);
            }
            None if section.is_required() => {
                return Err(unexpected(s, pos, Some(*section), current))
            }
            None => (),
        }
    }

    pos = s.empty_lines(pos);
    if !s.at_end(pos) {
        return Err(unexpected(s, pos, None, current));
    }

    Ok(doc)
}

/// Builds the error for text at `pos` which could not be read.  `expected` is
/// the section that had to come next, `current` the last section opened.
fn unexpected(
    s: &Scanner,
    pos: usize,
    expected: Option<Section>,
    current: Option<Section>,
) -> CompilerError<ParserError> {
    if s.at_end(pos) {
        let name = expected.map(|e| e.name()).unwrap_or("mains");
        return CompilerError::new(s.span(pos, pos), ParserError::MissingSection(name));
    }

    if let Some(marker) = section_marker(s, pos) {
        let (low, high) = s.line_bounds(pos);
        let inner = match Section::from_name(marker) {
            Some(found) if Some(found) == expected => ParserError::MalformedLine(found.name()),
            Some(_) => ParserError::UnexpectedSection {
                found: marker.into(),
                expected: expected.map(|e| e.name()),
            },
            None => ParserError::UnknownSection(marker.into()),
        };
        return CompilerError::new(s.span(low, high), inner);
    }

    let (low, high) = s.line_bounds(pos.max(s.furthest()));
    let inner = match current {
        Some(current) => ParserError::MalformedLine(current.name()),
        None => {
            ParserError::ExpectedSectionMarker(expected.unwrap_or(Section::Constants).name())
        }
    };
    CompilerError::new(s.span(low, high), inner)
}

/// If the line starting at `pos` begins with `[name]`, returns `name`.
fn section_marker<'a>(s: &Scanner<'a>, pos: usize) -> Option<&'a str> {
    let (_, end) = s.line_bounds(pos);
    let line = s.slice(pos, end);
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    Some(&rest[..close])
}
