use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::compiler::{
    ast::{
        CallOperand, InstructionDef, JsrOperand, PointerKind, RepeatSpec, RoutineDef,
        SequencerDocument,
    },
    error::CompilerError,
    semantics::{
        BoundDocument, Pointer, MAX_ADDRESS, MAX_CALL_REPEAT, MAX_FUNCTIONS, MAX_JUMP_REPEAT,
    },
    source::{SourceIr, Span},
};

use super::{FunctionRef, Instruction, ProgramError, ProgramResult, Repeat, SubroutineRef};

/// Name given to the `MAIN` pointer created when a document declares none.
pub const MAIN_POINTER: &str = "Main";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Main,
    Subroutine,
}

/// A routine whose instructions are built but not yet placed in memory.
/// Jumps may still refer to routines by name.
#[derive(Clone, Debug, PartialEq)]
pub struct Routine {
    pub name: String,
    pub description: String,
    pub kind: RoutineKind,
    /// Each instruction with the span of the line it was built from.
    pub instructions: Vec<(Instruction, Span)>,
    pub span: Span,
}

/**
 Builds the instructions of every main and subroutine of `doc`, mains first.

 Function names, constants and pointers are resolved here against the tables
 in `bound`.  Jumps to routines by name are left for the assembler.  If no
 `MAIN` pointer is declared, one named [`MAIN_POINTER`] is added to
 `bound.pointers` for the first main routine, since the sequencer needs an
 entry point.
*/
pub fn build_routines(
    doc: &SequencerDocument,
    bound: &mut BoundDocument,
) -> ProgramResult<Vec<Routine>> {
    let first_main = doc
        .mains
        .first()
        .ok_or_else(|| CompilerError::new(main_span(doc), ProgramError::NoMain))?;

    if !bound.pointers.has_kind(PointerKind::Main) {
        debug!("Adding pointer {} to {}", MAIN_POINTER, first_main.name);
        bound
            .pointers
            .declare(
                PointerKind::Main,
                MAIN_POINTER,
                None,
                Some(first_main.name.as_str()),
                "",
                first_main.span,
            )
            .map_err(|e| CompilerError::new(first_main.span, ProgramError::Pointer(e)))?;
    }

    let mut names = HashSet::new();
    let mut routines = vec![];
    let all = doc
        .mains
        .iter()
        .map(|r| (r, RoutineKind::Main))
        .chain(doc.subroutines.iter().map(|r| (r, RoutineKind::Subroutine)));
    for (def, kind) in all {
        if !names.insert(def.name.as_str()) {
            return Err(CompilerError::new(
                def.span,
                ProgramError::DuplicateRoutine(def.name.clone()),
            ));
        }
        routines.push(build_routine(def, kind, bound)?);
    }

    Ok(routines)
}

fn main_span(doc: &SequencerDocument) -> Span {
    doc.subroutines
        .first()
        .map(|r| r.span)
        .or_else(|| doc.functions.first().map(|f| f.span))
        .or_else(|| doc.constants.first().map(|c| c.span))
        .unwrap_or_else(|| Span::at(Default::default()))
}

fn build_routine(
    def: &RoutineDef,
    kind: RoutineKind,
    bound: &BoundDocument,
) -> ProgramResult<Routine> {
    debug!("Building routine {}", def.name);
    let instructions = def
        .instructions
        .iter()
        .map(|i| build_instruction(i, bound).map(|instr| (instr, i.span())))
        .collect::<ProgramResult<Vec<_>>>()?;

    Ok(Routine {
        name: def.name.clone(),
        description: def.comment.clone(),
        kind,
        instructions,
        span: def.span,
    })
}

fn build_instruction(
    def: &InstructionDef,
    bound: &BoundDocument,
) -> ProgramResult<Instruction> {
    let span = def.span();
    let err = |inner: ProgramError| CompilerError::new(span, inner);

    match def {
        InstructionDef::Call {
            function, repeat, ..
        } => {
            let function = match function {
                CallOperand::ByName(name) => bound
                    .functions
                    .id_of(name)
                    .map(FunctionRef::Id)
                    .ok_or_else(|| err(ProgramError::UndefinedFunction(name.clone())))?,
                CallOperand::ById(id) => {
                    if *id >= MAX_FUNCTIONS as u64 || bound.functions.by_id(*id as u8).is_none() {
                        return Err(err(ProgramError::UnknownFunctionId(*id)));
                    }
                    FunctionRef::Id(*id as u8)
                }
                CallOperand::ByPointer(name) => {
                    FunctionRef::Pointer(pointer(bound, name, PointerKind::PtrFunc, span)?.slot())
                }
                CallOperand::ByPointerSlot(slot) => {
                    FunctionRef::Pointer(pointer_at(bound, *slot, PointerKind::PtrFunc, span)?)
                }
            };
            let repeat = build_repeat(repeat, PointerKind::RepFunc, MAX_CALL_REPEAT, bound, span)?;
            Ok(Instruction::Call { function, repeat })
        }
        InstructionDef::Jsr { target, repeat, .. } => {
            let target = match target {
                JsrOperand::ByName(name) => SubroutineRef::Name(name.clone()),
                JsrOperand::ByAddress(a) if *a > MAX_ADDRESS => {
                    return Err(err(ProgramError::AddressOutOfRange(*a)))
                }
                JsrOperand::ByAddress(a) => SubroutineRef::Address(*a as u16),
                JsrOperand::ByPointer(name) => {
                    SubroutineRef::Pointer(pointer(bound, name, PointerKind::PtrSubr, span)?.slot())
                }
                JsrOperand::ByPointerSlot(slot) => {
                    SubroutineRef::Pointer(pointer_at(bound, *slot, PointerKind::PtrSubr, span)?)
                }
            };
            let repeat = build_repeat(repeat, PointerKind::RepSubr, MAX_JUMP_REPEAT, bound, span)?;
            if repeat == Repeat::Infinite {
                return Err(err(ProgramError::InfiniteJump));
            }
            Ok(Instruction::Jump { target, repeat })
        }
        InstructionDef::Rts(_) => Ok(Instruction::Return),
        InstructionDef::End(_) => Ok(Instruction::End),
    }
}

fn build_repeat(
    spec: &RepeatSpec,
    kind: PointerKind,
    max: u64,
    bound: &BoundDocument,
    span: Span,
) -> ProgramResult<Repeat> {
    let count = match spec {
        RepeatSpec::Once => 1,
        RepeatSpec::Count(n) => *n,
        RepeatSpec::Constant(name) => bound.constants.count(name, span).map_err(|e| {
            let span = e.span();
            CompilerError::new(span, ProgramError::Constant(e.into_inner()))
        })?,
        RepeatSpec::Pointer(name) => {
            return Ok(Repeat::Pointer(pointer(bound, name, kind, span)?.slot()))
        }
        RepeatSpec::PointerSlot(slot) => {
            return Ok(Repeat::Pointer(pointer_at(bound, *slot, kind, span)?))
        }
        RepeatSpec::Infinity => return Ok(Repeat::Infinite),
    };
    if count > max {
        return Err(CompilerError::new(
            span,
            ProgramError::RepeatOutOfRange { value: count, max },
        ));
    }
    Ok(Repeat::Count(count as u32))
}

/// Looks up the pointer `name` and checks that it is of the `expected` kind.
fn pointer<'b>(
    bound: &'b BoundDocument,
    name: &str,
    expected: PointerKind,
    span: Span,
) -> ProgramResult<&'b Pointer> {
    let p = bound
        .pointers
        .by_name(name)
        .ok_or_else(|| CompilerError::new(span, ProgramError::UndefinedPointer(name.into())))?;
    if p.kind() != expected {
        return Err(CompilerError::new(
            span,
            ProgramError::PointerKindMismatch {
                pointer: name.into(),
                expected,
                found: p.kind(),
            },
        ));
    }
    Ok(p)
}

/// Checks that a pointer of `kind` is declared in `slot` and returns the slot.
fn pointer_at(
    bound: &BoundDocument,
    slot: u64,
    kind: PointerKind,
    span: Span,
) -> ProgramResult<u8> {
    if slot <= u8::MAX as u64 && bound.pointers.get(kind, slot as u8).is_some() {
        Ok(slot as u8)
    } else {
        Err(CompilerError::new(
            span,
            ProgramError::UndeclaredPointerSlot { kind, slot },
        ))
    }
}
