pub mod result;

pub mod cli;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod io;
pub mod project;

pub use cli::*;
pub use compiler::{compile, CompileError, CompilerDisplay, Sequencer, SourceMap};
pub use config::{CompilerConfig, MemoryLayout};
pub use io::{get_files, SEQ_FILE_EXT, TXT_FILE_EXT};
pub use project::{get_project_name, Manifest};
