use crate::compiler::{
    ast::PointerKind,
    error::{CompilerDisplay, CompilerDisplayError},
    source::SourceMap,
};

/// Errors generated while binding a sequencer document or while editing a
/// function.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    DuplicateDefinition { what: &'static str, name: String },
    UndefinedConstant(String),
    /// A repeat count refers to a duration constant.
    ConstantNotInteger(String),
    InvalidClockPeriod(String),
    ClockBitOutOfRange { clock: String, bit: u64 },
    DuplicateClockBit { bit: u32, first: String, second: String },
    UndeclaredClock { function: String, clock: String },
    SliceWidthMismatch {
        function: String,
        slice: usize,
        expected: usize,
        found: usize,
    },
    SliceTooShort {
        function: String,
        slice: usize,
        cycles: u128,
    },
    SliceTooLong {
        function: String,
        slice: usize,
        cycles: u128,
    },
    TooManyFunctions(usize),
    TooManyPointers(PointerKind),
    DuplicatePointer(String),
    PointerValueOutOfRange { pointer: String, value: u64 },
    UndefinedFunction(String),
    UnknownFunctionId(u64),

    // Function editing
    NoSuchSlice(usize),
    SliceLimitReached,
    SplitOutOfRange { slice: usize, duration: u32 },
    ZeroFirstSlice,
    ZeroLastSlice,
    TimeAfterEnd { time: u64, end: u64 },
    ChannelOutOfRange(u32),
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticError::DuplicateDefinition { what, name } => {
                write!(f, "{} {} is defined more than once", what, name)
            }
            SemanticError::UndefinedConstant(name) => write!(f, "Undefined constant {}", name),
            SemanticError::ConstantNotInteger(name) => {
                write!(f, "Constant {} is a duration where a count was expected", name)
            }
            SemanticError::InvalidClockPeriod(msg) => write!(f, "Invalid clock period: {}", msg),
            SemanticError::ClockBitOutOfRange { clock, bit } => {
                write!(f, "Clock {} is assigned to bit {}, which is not in 0..=31", clock, bit)
            }
            SemanticError::DuplicateClockBit { bit, first, second } => write!(
                f,
                "Clocks {} and {} are both assigned to bit {}",
                first, second, bit
            ),
            SemanticError::UndeclaredClock { function, clock } => {
                write!(f, "Function {} uses undeclared clock {}", function, clock)
            }
            SemanticError::SliceWidthMismatch {
                function,
                slice,
                expected,
                found,
            } => write!(
                f,
                "Slice {} of function {} has {} values but the function drives {} clocks",
                slice, function, found, expected
            ),
            SemanticError::SliceTooShort {
                function,
                slice,
                cycles,
            } => write!(
                f,
                "Slice {} of function {} lasts {} cycles, which is too short to program",
                slice, function, cycles
            ),
            SemanticError::SliceTooLong {
                function,
                slice,
                cycles,
            } => write!(
                f,
                "Slice {} of function {} lasts {} cycles, which does not fit in 32 bits",
                slice, function, cycles
            ),
            SemanticError::TooManyFunctions(n) => write!(
                f,
                "{} functions are defined but at most 15 can be used besides Default",
                n
            ),
            SemanticError::TooManyPointers(kind) => {
                write!(f, "The pointer table for {} is full", kind)
            }
            SemanticError::DuplicatePointer(name) => {
                write!(f, "Pointer {} is defined more than once", name)
            }
            SemanticError::PointerValueOutOfRange { pointer, value } => {
                write!(f, "Value {} of pointer {} is out of range", value, pointer)
            }
            SemanticError::UndefinedFunction(name) => {
                write!(f, "Pointer to undefined function {}", name)
            }
            SemanticError::UnknownFunctionId(id) => write!(f, "No function has id {}", id),
            SemanticError::NoSuchSlice(slice) => write!(f, "Function has no slice {}", slice),
            SemanticError::SliceLimitReached => {
                write!(f, "Function already uses all 16 slices")
            }
            SemanticError::SplitOutOfRange { slice, duration } => write!(
                f,
                "Error splitting function timeslice {}: inappropriate duration {}",
                slice, duration
            ),
            SemanticError::ZeroFirstSlice => {
                write!(f, "Error trying to program 0 duration to first timeslice")
            }
            SemanticError::ZeroLastSlice => {
                write!(f, "Error trying to program 0 duration to last timeslice")
            }
            SemanticError::TimeAfterEnd { time, end } => write!(
                f,
                "Clock time {} is after the end of the function ({})",
                time, end
            ),
            SemanticError::ChannelOutOfRange(c) => write!(f, "Channel {} is not in 0..=31", c),
        }
    }
}

impl CompilerDisplay for SemanticError {
    fn fmt(&self, _sm: &SourceMap) -> Result<String, CompilerDisplayError> {
        Ok(format!("{}", self))
    }
}
