use super::source::{SourceMap, Span};

/// Represents all errors that are generated from within the Compiler
/// module and its submodules which can be traced back to a location in
/// the sequencer source.
///
/// This type captures common metadata which is necessarily present for
/// all errors which are caused by input source code.  E.g. the span of
/// source text at which the error occurs. This also handles formatting all
/// error messages with the universal metadata along with the inner metadata.
///
/// The inner error allows metadata which is specific to a submodule within
/// the compiler. E.g., the errors themselves are submodule specific and
/// are stored in the `inner` field.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerError<IE: CompilerDisplay> {
    span: Span,
    inner: IE,
}

impl<IE> CompilerError<IE>
where
    IE: CompilerDisplay,
{
    pub fn new(span: Span, inner: IE) -> Self {
        CompilerError { span, inner }
    }

    pub fn inner(&self) -> &IE {
        &self.inner
    }

    pub fn into_inner(self) -> IE {
        self.inner
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl<IE> CompilerDisplay for CompilerError<IE>
where
    IE: CompilerDisplay,
{
    fn fmt(&self, sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        let inner = self.inner.fmt(sm)?;
        let location = sm
            .locate(self.span.low())
            .ok_or(CompilerDisplayError::OffsetNotFound(self.span))?;
        Ok(format!("{}: {}", location, inner))
    }
}

/// Formats a compiler error using the [`SourceMap`] so that any offsets
/// carried by the error can be reported as file, line and column.
pub trait CompilerDisplay {
    fn fmt(&self, sm: &SourceMap) -> Result<String, CompilerDisplayError>;
}

/// Raised when an error cannot be rendered because it refers to source
/// which the [`SourceMap`] does not know about.
#[derive(Clone, Debug, PartialEq)]
pub enum CompilerDisplayError {
    OffsetNotFound(Span),
}

impl std::fmt::Display for CompilerDisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerDisplayError::OffsetNotFound(span) => {
                write!(f, "Could not find source for span {}", span)
            }
        }
    }
}
