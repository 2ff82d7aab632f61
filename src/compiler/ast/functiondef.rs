use crate::compiler::source::{SourceIr, Span};

use super::Duration;

/// How long a time slice lasts: a literal duration or the name of a constant.
#[derive(Clone, Debug, PartialEq)]
pub enum SliceDuration {
    Literal(Duration),
    Constant(String),
}

/// One `DURATION = b, b, ...` line of a function's `slices:` block.  The
/// values are positional: the n-th value drives the n-th clock of the
/// function's `clocks:` line.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceDef {
    pub duration: SliceDuration,
    pub values: Vec<bool>,
    pub span: Span,
}

impl SourceIr for SliceDef {
    fn span(&self) -> Span {
        self.span
    }
}

/// A waveform definition from the `[functions]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub comment: String,
    /// The clocks driven by the slice values, in positional order.
    pub clocks: Vec<String>,
    pub slices: Vec<SliceDef>,
    /// Clocks forced to a fixed level during the whole function.  These win
    /// over the positional slice values.
    pub constants: Vec<(String, bool)>,
    pub span: Span,
}

impl SourceIr for FunctionDef {
    fn span(&self) -> Span {
        self.span
    }
}
