use std::fmt::Display;

use crate::compiler::semantics::{MAX_ADDRESS, MAX_CALL_REPEAT, MAX_JUMP_REPEAT};

use super::{DecodeError, ProgramError};

const OPCODE_SHIFT: u32 = 28;
const FUNCTION_SHIFT: u32 = 24;
const INFINITE_BIT: u32 = 1 << 23;
const ADDRESS_SHIFT: u32 = 16;

/// The instruction set of the sequencer.  The discriminant is the value of
/// the top four bits of an instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Call = 0x1,
    CallPointer = 0x2,
    CallRepeatPointer = 0x3,
    CallPointerRepeatPointer = 0x4,
    Jsr = 0x5,
    JsrPointer = 0x6,
    JsrRepeatPointer = 0x7,
    JsrPointerRepeatPointer = 0x8,
    Rts = 0xE,
    End = 0xF,
}

impl Opcode {
    pub fn from_code(code: u8) -> Option<Opcode> {
        Some(match code {
            0x1 => Opcode::Call,
            0x2 => Opcode::CallPointer,
            0x3 => Opcode::CallRepeatPointer,
            0x4 => Opcode::CallPointerRepeatPointer,
            0x5 => Opcode::Jsr,
            0x6 => Opcode::JsrPointer,
            0x7 => Opcode::JsrRepeatPointer,
            0x8 => Opcode::JsrPointerRepeatPointer,
            0xE => Opcode::Rts,
            0xF => Opcode::End,
            _ => return None,
        })
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Call => "CALL",
            Opcode::CallPointer => "CALLP",
            Opcode::CallRepeatPointer => "CALLREP",
            Opcode::CallPointerRepeatPointer => "CALLPREP",
            Opcode::Jsr => "JSR",
            Opcode::JsrPointer => "JSP",
            Opcode::JsrRepeatPointer => "JSREP",
            Opcode::JsrPointerRepeatPointer => "JSPREP",
            Opcode::Rts => "RTS",
            Opcode::End => "END",
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The function called by a call instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionRef {
    Id(u8),
    /// Slot of a `PTR_FUNC` pointer.
    Pointer(u8),
}

/// How many times a call or jump is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Count(u32),
    /// Slot of a `REP_FUNC` or `REP_SUBR` pointer.
    Pointer(u8),
    /// Until the sequencer is stopped.  Only calls can repeat infinitely.
    Infinite,
}

/// The routine a jump instruction enters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubroutineRef {
    /// A routine name, replaced by its address when the program is assembled.
    Name(String),
    Address(u16),
    /// Slot of a `PTR_SUBR` pointer.
    Pointer(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Call {
        function: FunctionRef,
        repeat: Repeat,
    },
    Jump {
        target: SubroutineRef,
        repeat: Repeat,
    },
    Return,
    End,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Call { function, repeat } => match (function, repeat) {
                (FunctionRef::Id(_), Repeat::Pointer(_)) => Opcode::CallRepeatPointer,
                (FunctionRef::Id(_), _) => Opcode::Call,
                (FunctionRef::Pointer(_), Repeat::Pointer(_)) => Opcode::CallPointerRepeatPointer,
                (FunctionRef::Pointer(_), _) => Opcode::CallPointer,
            },
            Instruction::Jump { target, repeat } => match (target, repeat) {
                (SubroutineRef::Pointer(_), Repeat::Pointer(_)) => {
                    Opcode::JsrPointerRepeatPointer
                }
                (SubroutineRef::Pointer(_), _) => Opcode::JsrPointer,
                (_, Repeat::Pointer(_)) => Opcode::JsrRepeatPointer,
                (_, _) => Opcode::Jsr,
            },
            Instruction::Return => Opcode::Rts,
            Instruction::End => Opcode::End,
        }
    }

    /// True for `RTS` and `END`, which close a routine.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Return | Instruction::End)
    }

    /**
     Packs the instruction into a 32 bit program word.

     Calls hold the function id or pointer slot in bits 27..24 and either the
     infinite loop flag in bit 23 or the repeat count in bits 21..0.  Jumps
     hold the address or pointer slot in bits 25..16 and the repeat count in
     bits 15..0.  `RTS` and `END` hold only the opcode.
    */
    pub fn encode(&self) -> Result<u32, ProgramError> {
        let op = (self.opcode().code() as u32) << OPCODE_SHIFT;
        match self {
            Instruction::Call { function, repeat } => {
                let id = match function {
                    FunctionRef::Id(id) | FunctionRef::Pointer(id) => *id,
                };
                if id > 0xF {
                    return Err(ProgramError::FunctionIdOutOfRange(id));
                }
                let repeat = match repeat {
                    Repeat::Infinite => INFINITE_BIT,
                    Repeat::Count(n) => check_repeat(*n as u64, MAX_CALL_REPEAT)?,
                    Repeat::Pointer(slot) => *slot as u32,
                };
                Ok(op | (id as u32) << FUNCTION_SHIFT | repeat)
            }
            Instruction::Jump { target, repeat } => {
                let address = match target {
                    SubroutineRef::Name(name) => {
                        return Err(ProgramError::Unresolved(name.clone()))
                    }
                    SubroutineRef::Address(a) if *a as u64 > MAX_ADDRESS => {
                        return Err(ProgramError::AddressOutOfRange(*a as u64))
                    }
                    SubroutineRef::Address(a) => *a as u32,
                    SubroutineRef::Pointer(slot) => *slot as u32,
                };
                let repeat = match repeat {
                    Repeat::Infinite => return Err(ProgramError::InfiniteJump),
                    Repeat::Count(n) => check_repeat(*n as u64, MAX_JUMP_REPEAT)?,
                    Repeat::Pointer(slot) => *slot as u32,
                };
                Ok(op | address << ADDRESS_SHIFT | repeat)
            }
            Instruction::Return | Instruction::End => Ok(op),
        }
    }

    /// Reads an instruction back from a program word.  Bits which the
    /// opcode does not use are ignored.
    pub fn decode(word: u32) -> Result<Instruction, DecodeError> {
        let code = (word >> OPCODE_SHIFT) as u8;
        let opcode = Opcode::from_code(code).ok_or(DecodeError::UnknownOpcode {
            word,
            opcode: code,
        })?;

        let function = ((word >> FUNCTION_SHIFT) & 0xF) as u8;
        let call_repeat = || {
            if word & INFINITE_BIT != 0 {
                Repeat::Infinite
            } else {
                Repeat::Count(word & MAX_CALL_REPEAT as u32)
            }
        };
        let address = ((word >> ADDRESS_SHIFT) & MAX_ADDRESS as u32) as u16;
        let jump_repeat = Repeat::Count(word & MAX_JUMP_REPEAT as u32);

        Ok(match opcode {
            Opcode::Call => Instruction::Call {
                function: FunctionRef::Id(function),
                repeat: call_repeat(),
            },
            Opcode::CallPointer => Instruction::Call {
                function: FunctionRef::Pointer(function),
                repeat: call_repeat(),
            },
            Opcode::CallRepeatPointer => Instruction::Call {
                function: FunctionRef::Id(function),
                repeat: Repeat::Pointer((word & 0xF) as u8),
            },
            Opcode::CallPointerRepeatPointer => Instruction::Call {
                function: FunctionRef::Pointer(function),
                repeat: Repeat::Pointer((word & 0xF) as u8),
            },
            Opcode::Jsr => Instruction::Jump {
                target: SubroutineRef::Address(address),
                repeat: jump_repeat,
            },
            Opcode::JsrPointer => Instruction::Jump {
                target: SubroutineRef::Pointer((address & 0xF) as u8),
                repeat: jump_repeat,
            },
            Opcode::JsrRepeatPointer => Instruction::Jump {
                target: SubroutineRef::Address(address),
                repeat: Repeat::Pointer((word & 0xF) as u8),
            },
            Opcode::JsrPointerRepeatPointer => Instruction::Jump {
                target: SubroutineRef::Pointer((address & 0xF) as u8),
                repeat: Repeat::Pointer((word & 0xF) as u8),
            },
            Opcode::Rts => Instruction::Return,
            Opcode::End => Instruction::End,
        })
    }
}

fn check_repeat(n: u64, max: u64) -> Result<u32, ProgramError> {
    if n > max {
        Err(ProgramError::RepeatOutOfRange { value: n, max })
    } else {
        Ok(n as u32)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode())?;
        let repeat = match self {
            Instruction::Call { function, repeat } => {
                match function {
                    FunctionRef::Id(id) => write!(f, " {}", id)?,
                    FunctionRef::Pointer(slot) => write!(f, " @{}", slot)?,
                }
                repeat
            }
            Instruction::Jump { target, repeat } => {
                match target {
                    SubroutineRef::Name(name) => write!(f, " {}", name)?,
                    SubroutineRef::Address(a) => write!(f, " 0x{:03x}", a)?,
                    SubroutineRef::Pointer(slot) => write!(f, " @{}", slot)?,
                }
                repeat
            }
            Instruction::Return | Instruction::End => return Ok(()),
        };
        match repeat {
            Repeat::Count(1) => Ok(()),
            Repeat::Count(n) => write!(f, " repeat({})", n),
            Repeat::Pointer(slot) => write!(f, " repeat(@{})", slot),
            Repeat::Infinite => write!(f, " repeat(infinity)"),
        }
    }
}
