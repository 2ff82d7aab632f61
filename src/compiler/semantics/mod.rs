/*
 * Resolves the symbols of a merged sequencer document:
 * 1. Constants, with durations converted to FPGA clock cycles.
 * 2. The binding between clock names and output bits.
 * 3. The waveform table of every function.
 * 4. The pointer tables.
 *
 * The routines are left to the program builder, which needs the tables
 * produced here.
 */
mod binder;
mod clocks;
mod constants;
mod error;
mod function;
mod pointers;

pub use binder::{bind, BoundDocument, MAX_ADDRESS, MAX_CALL_REPEAT, MAX_JUMP_REPEAT};
pub use clocks::{ClockMap, CLOCK_BITS, SHUTTER_BIT};
pub use constants::ConstantTable;
pub use error::SemanticError;
pub use function::{Function, FunctionDraft, FunctionTable, TimeSlice, MAX_FUNCTIONS, MAX_SLICES};
pub use pointers::{Pointer, PointerAllocator, PointerTable, POINTER_SLOTS};

use super::CompilerError;

/// Captures the Failure state of any Semantic Analysis operation.
/// Which will, if it fails, result in a [`SemanticError`] wrapped
/// in a [`CompilerError`]
pub type SemanticResult<T> = Result<T, CompilerError<SemanticError>>;
