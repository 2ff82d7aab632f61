//! The parse tree of a sequencer source file.  Every definition keeps the
//! [`Span`](crate::compiler::source::Span) of source text it was read from so
//! that later passes can report errors against it.

mod constdef;
mod document;
mod functiondef;
mod pointerdef;
mod routinedef;


pub use self::constdef::{ClockDef, ConstantDef, ConstantValue, Duration, IncludeDef, TimeUnit};
pub use self::document::SequencerDocument;
pub use self::functiondef::{FunctionDef, SliceDef, SliceDuration};
pub use self::pointerdef::{PointerDef, PointerKind, PointerValue};
pub use self::routinedef::{CallOperand, InstructionDef, JsrOperand, RepeatSpec, RoutineDef};

/// Name of the constant which sets the FPGA clock period.
pub const CLOCK_PERIOD: &str = "clockperiod";

/// Name of the function which always receives id 0.
pub const DEFAULT_FUNCTION: &str = "Default";
