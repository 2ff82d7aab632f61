use crate::compiler::source::{SourceIr, Span};

/// The function operand of a `CALL` line.
#[derive(Clone, Debug, PartialEq)]
pub enum CallOperand {
    ByName(String),
    ById(u64),
    /// `@name` of a `PTR_FUNC` pointer.
    ByPointer(String),
    /// `@slot` of a `PTR_FUNC` pointer, written in hexadecimal.
    ByPointerSlot(u64),
}

/// The target operand of a `JSR` line.
#[derive(Clone, Debug, PartialEq)]
pub enum JsrOperand {
    ByName(String),
    ByAddress(u64),
    /// `@name` of a `PTR_SUBR` pointer.
    ByPointer(String),
    /// `@slot` of a `PTR_SUBR` pointer, written in hexadecimal.
    ByPointerSlot(u64),
}

/// The optional `repeat(...)` modifier of a `CALL` or `JSR` line.
#[derive(Clone, Debug, PartialEq)]
pub enum RepeatSpec {
    /// No modifier was given.
    Once,
    Count(u64),
    Constant(String),
    /// `@name` of a `REP_FUNC` or `REP_SUBR` pointer.
    Pointer(String),
    /// `@slot` of a `REP_FUNC` or `REP_SUBR` pointer, in hexadecimal.
    PointerSlot(u64),
    Infinity,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InstructionDef {
    Call {
        function: CallOperand,
        repeat: RepeatSpec,
        span: Span,
    },
    Jsr {
        target: JsrOperand,
        repeat: RepeatSpec,
        span: Span,
    },
    Rts(Span),
    End(Span),
}

impl SourceIr for InstructionDef {
    fn span(&self) -> Span {
        match self {
            InstructionDef::Call { span, .. } | InstructionDef::Jsr { span, .. } => *span,
            InstructionDef::Rts(span) | InstructionDef::End(span) => *span,
        }
    }
}

/// A subroutine or main: a name line followed by instructions, the last of
/// which is `RTS` for a subroutine and `END` for a main.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutineDef {
    pub name: String,
    pub comment: String,
    pub instructions: Vec<InstructionDef>,
    pub span: Span,
}

impl SourceIr for RoutineDef {
    fn span(&self) -> Span {
        self.span
    }
}
