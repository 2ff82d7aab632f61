//! The compiled form of a sequencer file and the queries the analysis tools
//! run against it.

use std::path::{Path, PathBuf};

use crate::compiler::{
    ast::{Duration, PointerKind},
    program::{FunctionRef, Instruction, Program, Repeat, SubroutineRef},
    semantics::{
        BoundDocument, ClockMap, ConstantTable, Function, FunctionTable, Pointer, PointerTable,
        SemanticError,
    },
};


/// Errors returned by the queries on a [`Sequencer`].  None of them leave
/// the sequencer in a different state, so callers may report them and carry
/// on.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryError {
    UnknownRoutine(String),
    UnknownFunction(String),
    UnknownFunctionId(u8),
    UnknownClock(String),
    UnknownChannel(u32),
    UnknownPointer { kind: PointerKind, slot: u8 },
    UnresolvedPointer(String),
    NoInstruction(u16),
    /// A routine jumps, directly or not, to itself.
    Recursion(String),
    Edit(SemanticError),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::UnknownRoutine(name) => write!(f, "Unknown subroutine name: {}", name),
            QueryError::UnknownFunction(name) => write!(f, "Unknown function name: {}", name),
            QueryError::UnknownFunctionId(id) => write!(f, "No function has id {}", id),
            QueryError::UnknownClock(name) => write!(f, "Unknown clock: {}", name),
            QueryError::UnknownChannel(bit) => write!(f, "No clock on channel {}", bit),
            QueryError::UnknownPointer { kind, slot } => {
                write!(f, "No {} pointer in slot {}", kind, slot)
            }
            QueryError::UnresolvedPointer(name) => write!(f, "Pointer {} has no value", name),
            QueryError::NoInstruction(address) => {
                write!(f, "No instruction at address 0x{:03x}", address)
            }
            QueryError::Recursion(name) => write!(f, "Routine {} calls itself", name),
            QueryError::Edit(e) => write!(f, "{}", e),
        }
    }
}

impl From<SemanticError> for QueryError {
    fn from(e: SemanticError) -> Self {
        QueryError::Edit(e)
    }
}

/**
 A compiled sequencer: the bound tables of the source document together
 with its assembled program.

 Every query takes a name as written in the source and returns a
 [`QueryError`] when nothing by that name exists.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Sequencer {
    source: PathBuf,
    constants: ConstantTable,
    clocks: ClockMap,
    functions: FunctionTable,
    pointers: PointerTable,
    program: Program,
    warnings: Vec<String>,
}

impl Sequencer {
    pub fn new(source: PathBuf, bound: BoundDocument, program: Program) -> Sequencer {
        Sequencer {
            source,
            constants: bound.constants,
            clocks: bound.clocks,
            functions: bound.functions,
            pointers: bound.pointers,
            program,
            warnings: bound.warnings,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn clocks(&self) -> &ClockMap {
        &self.clocks
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn pointers(&self) -> &PointerTable {
        &self.pointers
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Problems found during compilation which did not stop it.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clock_period(&self) -> Duration {
        self.constants.clock_period()
    }

    pub fn clock_period_ps(&self) -> u128 {
        self.constants.clock_period_ps()
    }

    pub fn function(&self, name: &str) -> Result<&Function, QueryError> {
        self.functions
            .get(name)
            .ok_or_else(|| QueryError::UnknownFunction(name.into()))
    }

    pub fn function_by_id(&self, id: u8) -> Result<&Function, QueryError> {
        self.functions
            .by_id(id)
            .ok_or(QueryError::UnknownFunctionId(id))
    }

    pub fn clock_bit(&self, name: &str) -> Result<u32, QueryError> {
        self.clocks
            .bit(name)
            .ok_or_else(|| QueryError::UnknownClock(name.into()))
    }

    pub fn clock_name(&self, bit: u32) -> Result<&str, QueryError> {
        self.clocks.name(bit).ok_or(QueryError::UnknownChannel(bit))
    }

    pub fn pointer(&self, kind: PointerKind, slot: u8) -> Result<&Pointer, QueryError> {
        self.pointers
            .get(kind, slot)
            .ok_or(QueryError::UnknownPointer { kind, slot })
    }

    pub fn pointer_value(&self, kind: PointerKind, slot: u8) -> Result<u32, QueryError> {
        let pointer = self.pointer(kind, slot)?;
        pointer
            .value()
            .ok_or_else(|| QueryError::UnresolvedPointer(pointer.name().into()))
    }

    pub fn pointer_name(&self, kind: PointerKind, slot: u8) -> Result<&str, QueryError> {
        self.pointer(kind, slot).map(|p| p.name())
    }

    pub fn routine_address(&self, name: &str) -> Result<u16, QueryError> {
        self.program
            .address_of(name)
            .ok_or_else(|| QueryError::UnknownRoutine(name.into()))
    }

    /// Name of the routine which starts at `address`.
    pub fn routine_at(&self, address: u16) -> Option<&str> {
        self.program
            .routines()
            .iter()
            .find(|r| r.address == address)
            .map(|r| r.name.as_str())
    }

    /// The function a call instruction runs, looking through `PTR_FUNC`
    /// pointers.
    pub fn called_function(&self, function: &FunctionRef) -> Result<&Function, QueryError> {
        match function {
            FunctionRef::Id(id) => self.function_by_id(*id),
            FunctionRef::Pointer(slot) => {
                let id = self.pointer_value(PointerKind::PtrFunc, *slot)?;
                self.function_by_id(id as u8)
            }
        }
    }

    /// The number of times an instruction runs, looking through repeat
    /// pointers of the given `kind`.  `None` for an infinite loop.
    pub fn repeat_count(&self, repeat: &Repeat, kind: PointerKind) -> Result<Option<u64>, QueryError> {
        match repeat {
            Repeat::Count(n) => Ok(Some(*n as u64)),
            Repeat::Pointer(slot) => self.pointer_value(kind, *slot).map(|v| Some(v as u64)),
            Repeat::Infinite => Ok(None),
        }
    }

    /// The address a jump instruction enters, looking through `PTR_SUBR`
    /// pointers.
    pub fn jump_target(&self, target: &SubroutineRef) -> Result<u16, QueryError> {
        match target {
            SubroutineRef::Address(address) => Ok(*address),
            SubroutineRef::Pointer(slot) => self
                .pointer_value(PointerKind::PtrSubr, *slot)
                .map(|v| v as u16),
            SubroutineRef::Name(name) => self.routine_address(name),
        }
    }

    fn pointer_repr(&self, kind: PointerKind, slot: u8) -> Result<String, QueryError> {
        self.pointer(kind, slot).map(|p| p.repr())
    }

    /**
     One line describing the instruction at `address`, with the names of
     the functions, routines and pointers it refers to:

     ```text
     0x008: CALLREP   func(2 = ReadPixel)  repeat(0: Columns -> 576)
     0x009: JSR       0x010 -> Flush  repeat(3)
     ```
    */
    pub fn repr_instruction(&self, address: u16) -> Result<String, QueryError> {
        let instruction = self
            .program
            .instruction(address)
            .ok_or(QueryError::NoInstruction(address))?;
        let mut s = format!("0x{:03x}: {:<8}", address, instruction.opcode().mnemonic());

        match instruction {
            Instruction::Call { function, repeat } => {
                match function {
                    FunctionRef::Id(id) => s.push_str(&format!(
                        "  func({} = {})",
                        id,
                        self.function_by_id(*id)?.name()
                    )),
                    FunctionRef::Pointer(slot) => s.push_str(&format!(
                        "  func({})",
                        self.pointer_repr(PointerKind::PtrFunc, *slot)?
                    )),
                }
                s.push_str(&self.repeat_repr(repeat, PointerKind::RepFunc)?);
            }
            Instruction::Jump { target, repeat } => {
                match target {
                    SubroutineRef::Address(a) => {
                        s.push_str(&format!("  0x{:03x}", a));
                        if let Some(name) = self.routine_at(*a) {
                            s.push_str(&format!(" -> {}", name));
                        }
                    }
                    SubroutineRef::Pointer(slot) => s.push_str(&format!(
                        "  {}",
                        self.pointer_repr(PointerKind::PtrSubr, *slot)?
                    )),
                    SubroutineRef::Name(name) => s.push_str(&format!("  {}", name)),
                }
                s.push_str(&self.repeat_repr(repeat, PointerKind::RepSubr)?);
            }
            Instruction::Return | Instruction::End => (),
        }

        Ok(s)
    }

    fn repeat_repr(&self, repeat: &Repeat, kind: PointerKind) -> Result<String, QueryError> {
        Ok(match repeat {
            Repeat::Infinite => "  repeat(infinity)".into(),
            Repeat::Count(n) => format!("  repeat({})", n),
            Repeat::Pointer(slot) => format!("  repeat({})", self.pointer_repr(kind, *slot)?),
        })
    }

    /**
     Follows the execution of `routine`, entering every jump once, and
     returns the first function called which drives `clock`.  This is how
     the plotting tools find the pixel readout function of an acquisition.
    */
    pub fn find_function_with_clock(
        &self,
        routine: &str,
        clock: &str,
    ) -> Result<Option<&Function>, QueryError> {
        self.clock_bit(clock)?;
        let mut address = self.routine_address(routine)?;
        // (entry, return address) of every routine jumped into
        let mut frames: Vec<(u16, u16)> = vec![];

        loop {
            let instruction = self
                .program
                .instruction(address)
                .ok_or(QueryError::NoInstruction(address))?;
            match instruction {
                Instruction::Call { function, .. } => {
                    let function = self.called_function(function)?;
                    if function.uses_clock(clock) {
                        return Ok(Some(function));
                    }
                    address += 1;
                }
                Instruction::Jump { target, .. } => {
                    let target = self.jump_target(target)?;
                    if target == self.routine_address(routine)?
                        || frames.iter().any(|(entry, _)| *entry == target)
                    {
                        return Err(self.recursion(target));
                    }
                    frames.push((target, address + 1));
                    address = target;
                }
                Instruction::Return => match frames.pop() {
                    Some((_, ret)) => address = ret,
                    None => return Ok(None),
                },
                Instruction::End => return Ok(None),
            }
        }
    }

    pub(crate) fn recursion(&self, address: u16) -> QueryError {
        QueryError::Recursion(
            self.routine_at(address)
                .map(String::from)
                .unwrap_or_else(|| format!("0x{:03x}", address)),
        )
    }

    /// The state of `clock` for every cycle of `function`.
    pub fn scope(&self, function: &str, clock: &str) -> Result<Vec<u8>, QueryError> {
        let bit = self.clock_bit(clock)?;
        Ok(self.function(function)?.scope(bit))
    }

    /// The table of `function` with the clock names above their columns.
    pub fn function_table(&self, function: &str) -> Result<String, QueryError> {
        Ok(self.function(function)?.table(&self.clocks))
    }

    /// A copy of this sequencer in which `function` replaces the function
    /// with the same id and name.
    pub fn with_function(&self, function: Function) -> Result<Sequencer, QueryError> {
        let mut seq = self.clone();
        seq.functions.replace(function)?;
        Ok(seq)
    }
}
