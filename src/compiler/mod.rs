/**
 * The Compiler takes a sequencer source file and turns it into a
 * [`Sequencer`]: the function tables, pointer tables and assembled program
 * which are written into the memory of the REB sequencer.
 *
 * Compilation runs through a fixed series of passes, each of which consumes
 * the output of the one before:
 * 1. `import` reads the source file and every file it includes, parsing each
 * one with the `parser` and merging the results into one document.
 * 2. `semantics` binds the constants, clocks, functions and pointers of the
 * document into lookup tables.
 * 3. `program` builds the instructions of every routine and assembles them at
 * their final addresses.
 *
 * A pass stops at the first error it finds and nothing after it runs, so a
 * document either compiles completely or not at all.  Every error carries
 * the span of source text it was raised at, which is turned into a file,
 * line and column with the [`SourceMap`].
 *
 * The compiled [`Sequencer`] is then used by `timing` to work out how long
 * routines run, by `superscan` to derive variants of a function, and by
 * `output` to write the compiled listing.
 */
pub mod ast;
pub mod error;
pub mod import;
pub mod output;
pub mod parser;
pub mod program;
pub mod semantics;
pub mod sequencer;
pub mod source;
pub mod superscan;
pub mod timing;

mod tests;

pub use error::{CompilerDisplay, CompilerDisplayError, CompilerError};
pub use sequencer::{QueryError, Sequencer};
pub use source::{SourceMap, Span};

use std::path::Path;

use log::info;

use crate::config::CompilerConfig;
use crate::diagnostics::Tracing;

use import::{load_document, ImportError, SourceLoader};
use parser::{Parser, ParserError};
use program::{assemble, build_routines, ProgramError};
use semantics::{bind, SemanticError};

/// The first error which stopped a compilation.
#[derive(Debug)]
pub enum CompileError {
    /// A source file could not be read.
    Io(ImportError),
    /// The includes could not be followed.
    Include(ImportError),
    Parser(CompilerError<ParserError>),
    Semantic(CompilerError<SemanticError>),
    Program(CompilerError<ProgramError>),
}

impl From<ImportError> for CompileError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Parser(e) => CompileError::Parser(e),
            e @ ImportError::Read { .. } => CompileError::Io(e),
            e => CompileError::Include(e),
        }
    }
}

impl From<CompilerError<SemanticError>> for CompileError {
    fn from(e: CompilerError<SemanticError>) -> Self {
        CompileError::Semantic(e)
    }
}

impl From<CompilerError<ProgramError>> for CompileError {
    fn from(e: CompilerError<ProgramError>) -> Self {
        CompileError::Program(e)
    }
}

impl CompilerDisplay for CompileError {
    fn fmt(&self, sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        match self {
            CompileError::Io(e) | CompileError::Include(e) => e.fmt(sm),
            CompileError::Parser(e) => e.fmt(sm),
            CompileError::Semantic(e) => e.fmt(sm),
            CompileError::Program(e) => e.fmt(sm),
        }
    }
}

/// Compiles the sequencer file at `path`, reading it and its includes
/// through `loader`.  Every file read is added to `sm`.
pub fn compile<L: SourceLoader>(
    path: &Path,
    loader: &L,
    config: &CompilerConfig,
    sm: &mut SourceMap,
) -> Result<Sequencer, CompileError> {
    let mut parser = Parser::new();
    parser.set_tracing(config.tracing);

    let doc = load_document(path, loader, &parser, sm)?;
    info!("Binding {}", path.display());
    let mut bound = bind(&doc, config.default_clock_period)?;
    let routines = build_routines(&doc, &mut bound)?;
    let program = assemble(routines, &mut bound.pointers)?;
    info!(
        "Compiled {}: {} functions, {} instructions",
        path.display(),
        bound.functions.len(),
        program.len()
    );

    Ok(Sequencer::new(doc.path.clone(), bound, program))
}
