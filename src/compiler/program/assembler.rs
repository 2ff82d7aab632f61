use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::compiler::{
    ast::PointerKind,
    error::CompilerError,
    semantics::{PointerTable, MAX_ADDRESS},
};

use super::{Instruction, ProgramError, ProgramResult, Routine, RoutineKind, SubroutineRef};

/// Every routine after the first starts on a multiple of this many words.
pub const ROUTINE_ALIGNMENT: u32 = 8;

/// Where a routine was placed in the program memory.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutineInfo {
    pub name: String,
    pub description: String,
    pub kind: RoutineKind,
    pub address: u16,
    pub len: usize,
}

/// An assembled program: every instruction at its address, with no
/// unresolved references left.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    instructions: BTreeMap<u16, Instruction>,
    routines: Vec<RoutineInfo>,
    index: HashMap<String, usize>,
}

impl Program {
    pub fn instruction(&self, address: u16) -> Option<&Instruction> {
        self.instructions.get(&address)
    }

    /// Every instruction, lowest address first.
    pub fn instructions(&self) -> impl Iterator<Item = (u16, &Instruction)> {
        self.instructions.iter().map(|(a, i)| (*a, i))
    }

    /// The routines in the order they were laid out.
    pub fn routines(&self) -> &[RoutineInfo] {
        &self.routines
    }

    pub fn routine(&self, name: &str) -> Option<&RoutineInfo> {
        self.index.get(name).map(|i| &self.routines[*i])
    }

    pub fn address_of(&self, name: &str) -> Option<u16> {
        self.routine(name).map(|r| r.address)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The program words, each paired with its address in the memory image.
    pub fn bytecode(&self, base: u32) -> Result<Vec<(u32, u32)>, ProgramError> {
        self.instructions
            .iter()
            .map(|(a, i)| i.encode().map(|w| (base + *a as u32, w)))
            .collect()
    }
}

/**
 Lays out `routines` in order: the first at address 0, every following one
 at the next multiple of [`ROUTINE_ALIGNMENT`] strictly after the end of the
 previous one.  Then replaces every jump to a routine name with the
 routine's address, and resolves `MAIN` and `PTR_SUBR` pointers which name a
 routine.
*/
pub fn assemble(routines: Vec<Routine>, pointers: &mut PointerTable) -> ProgramResult<Program> {
    let mut next = 0u32;
    let mut layout = vec![];
    for routine in routines {
        let start = if next == 0 {
            0
        } else {
            (next / ROUTINE_ALIGNMENT + 1) * ROUTINE_ALIGNMENT
        };
        let end = start + routine.instructions.len() as u32;
        if end > MAX_ADDRESS as u32 + 1 {
            return Err(CompilerError::new(
                routine.span,
                ProgramError::ProgramTooLarge {
                    routine: routine.name.clone(),
                    address: end - 1,
                },
            ));
        }
        debug!("Routine {} at 0x{:03x}", routine.name, start);
        layout.push((start as u16, routine));
        next = end;
    }

    let index: HashMap<String, usize> = layout
        .iter()
        .enumerate()
        .map(|(i, (_, r))| (r.name.clone(), i))
        .collect();
    let address_of = |name: &str| index.get(name).map(|i| layout[*i].0);

    let mut instructions = BTreeMap::new();
    for (start, routine) in &layout {
        for (offset, (instruction, span)) in routine.instructions.iter().enumerate() {
            let instruction = match instruction {
                Instruction::Jump {
                    target: SubroutineRef::Name(name),
                    repeat,
                } => Instruction::Jump {
                    target: SubroutineRef::Address(address_of(name).ok_or_else(|| {
                        CompilerError::new(*span, ProgramError::UndefinedSubroutine(name.clone()))
                    })?),
                    repeat: *repeat,
                },
                i => i.clone(),
            };
            instructions.insert(start + offset as u16, instruction);
        }
    }

    for pointer in pointers.iter_mut() {
        if !matches!(pointer.kind(), PointerKind::Main | PointerKind::PtrSubr) {
            continue;
        }
        if let Some(target) = pointer.target() {
            let address = address_of(target).ok_or_else(|| {
                CompilerError::new(
                    pointer.span(),
                    ProgramError::UndefinedPointerTarget {
                        pointer: pointer.name().into(),
                        target: target.into(),
                    },
                )
            })?;
            pointer.resolve(address as u32);
        }
    }

    let routines = layout
        .into_iter()
        .map(|(address, r)| RoutineInfo {
            len: r.instructions.len(),
            name: r.name,
            description: r.description,
            kind: r.kind,
            address,
        })
        .collect();

    Ok(Program {
        instructions,
        routines,
        index,
    })
}
