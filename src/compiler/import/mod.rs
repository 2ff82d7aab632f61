//! Loads a sequencer file together with every file reachable through its
//! `[includes]` section and merges them into one [`SequencerDocument`].
//!
//! Definitions found directly in a file always win over the definitions of
//! the files it includes.  Among the includes of one file, the last listed
//! wins.  Include paths are relative to the directory of the including file.

use std::{
    collections::HashMap,
    io,
    path::{Component, Path, PathBuf},
};

use log::{debug, info};

use super::{
    ast::SequencerDocument,
    error::{CompilerDisplay, CompilerDisplayError, CompilerError},
    parser::{Parser, ParserError},
    source::{SourceMap, SourceMapError, Span},
};

mod tests;

/// Provides the text of source files to the importer.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads sources from the file system.
pub struct FileLoader;

impl SourceLoader for FileLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves sources from memory, keyed by their normalized path.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> MemoryLoader {
        MemoryLoader {
            files: HashMap::new(),
        }
    }

    pub fn add<P: AsRef<Path>>(&mut self, path: P, text: &str) -> &mut Self {
        self.files.insert(normalize(path.as_ref()), text.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

#[derive(Debug)]
pub enum ImportError {
    /// A file could not be read.  `span` is the include line which named it,
    /// absent for the root file.
    Read {
        path: PathBuf,
        cause: io::Error,
        span: Option<Span>,
    },
    /// A file includes itself, directly or through other files.  `chain`
    /// lists the files from the first occurrence back to the repeated one.
    Cycle { chain: Vec<PathBuf>, span: Span },
    SourceMap(SourceMapError),
    Parser(CompilerError<ParserError>),
}

impl CompilerDisplay for ImportError {
    fn fmt(&self, sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        match self {
            ImportError::Read {
                path,
                cause,
                span: Some(span),
            } => at(
                sm,
                *span,
                format!("Could not read included file {}: {}", path.display(), cause),
            ),
            ImportError::Read {
                path,
                cause,
                span: None,
            } => Ok(format!("Could not read {}: {}", path.display(), cause)),
            ImportError::Cycle { chain, span } => {
                let chain: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
                at(sm, *span, format!("Include cycle: {}", chain.join(" -> ")))
            }
            ImportError::SourceMap(e) => Ok(format!("{}", e)),
            ImportError::Parser(e) => e.fmt(sm),
        }
    }
}

fn at(sm: &SourceMap, span: Span, msg: String) -> Result<String, CompilerDisplayError> {
    let location = sm
        .locate(span.low())
        .ok_or(CompilerDisplayError::OffsetNotFound(span))?;
    Ok(format!("{}: {}", location, msg))
}

/// Reads and parses `path` and all of its includes.  Every file read is added
/// to `sm` so that errors from later passes can be located in it.
pub fn load_document<L: SourceLoader>(
    path: &Path,
    loader: &L,
    parser: &Parser,
    sm: &mut SourceMap,
) -> Result<SequencerDocument, ImportError> {
    let mut stack = vec![];
    load(&normalize(path), None, loader, parser, sm, &mut stack)
}

fn load<L: SourceLoader>(
    path: &Path,
    span: Option<Span>,
    loader: &L,
    parser: &Parser,
    sm: &mut SourceMap,
    stack: &mut Vec<PathBuf>,
) -> Result<SequencerDocument, ImportError> {
    if let Some(first) = stack.iter().position(|p| p == path) {
        let mut chain = stack[first..].to_vec();
        chain.push(path.into());
        return Err(ImportError::Cycle {
            chain,
            span: span.unwrap_or_else(|| Span::at(Default::default())),
        });
    }

    let text = loader.load(path).map_err(|cause| ImportError::Read {
        path: path.into(),
        cause,
        span,
    })?;

    let idx = sm.len();
    let base = sm
        .add_source(path.into(), text)
        .map_err(ImportError::SourceMap)?;
    let text = sm.get(idx).map(|e| e.text()).unwrap_or_default();
    let mut doc = parser
        .parse(path, text, base)
        .map_err(ImportError::Parser)?;
    debug!("Parsed {}", path.display());

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let includes = doc.includes.clone();
    stack.push(path.into());
    // Merged last to first, so a later include shadows an earlier one.
    for include in includes.iter().rev() {
        let include_path = normalize(&dir.join(&include.file));
        info!("Including sequencer file: {}", include_path.display());
        let included = load(&include_path, Some(include.span), loader, parser, sm, stack)?;
        doc.merge_weaker(included);
    }
    stack.pop();

    Ok(doc)
}

/// Removes `.` components and folds `..` into the preceding component
/// without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => (),
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                _ => out.push(".."),
            },
            c => out.push(c.as_os_str()),
        }
    }
    out
}
