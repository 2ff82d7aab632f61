//! The program memory of the sequencer: instructions, the builder which
//! turns routine definitions into instructions, and the assembler which lays
//! the routines out in memory and resolves the references between them.

mod assembler;
mod builder;
mod instruction;

pub use assembler::{assemble, Program, RoutineInfo, ROUTINE_ALIGNMENT};
pub use builder::{build_routines, Routine, RoutineKind, MAIN_POINTER};
pub use instruction::{FunctionRef, Instruction, Opcode, Repeat, SubroutineRef};

use crate::compiler::{
    ast::PointerKind,
    error::{CompilerDisplay, CompilerDisplayError, CompilerError},
    semantics::SemanticError,
    source::SourceMap,
};

pub type ProgramResult<T> = Result<T, CompilerError<ProgramError>>;

/// Errors raised while building, assembling or encoding a program.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgramError {
    UndefinedFunction(String),
    UnknownFunctionId(u64),
    UndefinedPointer(String),
    /// No pointer of the kind is declared in the slot.
    UndeclaredPointerSlot { kind: PointerKind, slot: u64 },
    PointerKindMismatch {
        pointer: String,
        expected: PointerKind,
        found: PointerKind,
    },
    RepeatOutOfRange { value: u64, max: u64 },
    AddressOutOfRange(u64),
    FunctionIdOutOfRange(u8),
    /// `repeat(infinity)` on a jump.
    InfiniteJump,
    DuplicateRoutine(String),
    NoMain,
    UndefinedSubroutine(String),
    /// A pointer names a routine which does not exist.
    UndefinedPointerTarget { pointer: String, target: String },
    /// The routine does not fit below the last program address.
    ProgramTooLarge { routine: String, address: u32 },
    /// A jump was encoded before its target name was resolved.
    Unresolved(String),
    Constant(SemanticError),
    Pointer(SemanticError),
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::UndefinedFunction(name) => write!(f, "Undefined function {}", name),
            ProgramError::UnknownFunctionId(id) => write!(f, "No function has id {}", id),
            ProgramError::UndefinedPointer(name) => write!(f, "Undefined pointer {}", name),
            ProgramError::UndeclaredPointerSlot { kind, slot } => {
                write!(f, "No {} pointer is declared in slot 0x{:x}", kind, slot)
            }
            ProgramError::PointerKindMismatch {
                pointer,
                expected,
                found,
            } => write!(
                f,
                "Pointer {} is a {} pointer where a {} pointer was expected",
                pointer, found, expected
            ),
            ProgramError::RepeatOutOfRange { value, max } => {
                write!(f, "Repeat count {} is larger than {}", value, max)
            }
            ProgramError::AddressOutOfRange(a) => {
                write!(f, "Address 0x{:x} is outside the program memory", a)
            }
            ProgramError::FunctionIdOutOfRange(id) => {
                write!(f, "Function id {} does not fit in 4 bits", id)
            }
            ProgramError::InfiniteJump => {
                write!(f, "A subroutine jump cannot repeat infinitely")
            }
            ProgramError::DuplicateRoutine(name) => {
                write!(f, "Routine {} is defined more than once", name)
            }
            ProgramError::NoMain => write!(f, "The program has no main routine"),
            ProgramError::UndefinedSubroutine(name) => {
                write!(f, "Undefined subroutine {}", name)
            }
            ProgramError::UndefinedPointerTarget { pointer, target } => write!(
                f,
                "Pointer {} refers to undefined subroutine {}",
                pointer, target
            ),
            ProgramError::ProgramTooLarge { routine, address } => write!(
                f,
                "Routine {} extends to address 0x{:x}, past the end of the program memory",
                routine, address
            ),
            ProgramError::Unresolved(name) => {
                write!(f, "Jump to {} has not been assembled", name)
            }
            ProgramError::Constant(e) | ProgramError::Pointer(e) => write!(f, "{}", e),
        }
    }
}

impl CompilerDisplay for ProgramError {
    fn fmt(&self, _sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        Ok(format!("{}", self))
    }
}

/// Raised when a program word does not hold a valid instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    UnknownOpcode { word: u32, opcode: u8 },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnknownOpcode { word, opcode } => {
                write!(f, "Unknown opcode 0x{:x} in word 0x{:08x}", opcode, word)
            }
        }
    }
}
