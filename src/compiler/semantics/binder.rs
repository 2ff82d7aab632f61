use log::{debug, warn};

use crate::compiler::{
    ast::{
        Duration, FunctionDef, PointerDef, PointerKind, PointerValue, SequencerDocument,
        SliceDuration, DEFAULT_FUNCTION,
    },
    error::CompilerError,
};

use super::{
    function::{TimeSlice, MAX_FUNCTIONS, MAX_SLICES},
    ClockMap, ConstantTable, Function, FunctionTable, PointerTable, SemanticError,
    SemanticResult,
};

/// Largest repeat count a call instruction or `REP_FUNC` pointer can hold.
pub const MAX_CALL_REPEAT: u64 = 0x3F_FFFF;

/// Largest repeat count a jump instruction or `REP_SUBR` pointer can hold.
pub const MAX_JUMP_REPEAT: u64 = 0xFFFF;

/// Largest program address.
pub const MAX_ADDRESS: u64 = 0x3FF;

/// The symbol tables of a document: everything except the routines, which
/// are turned into a program by [`crate::compiler::program`].
#[derive(Clone, Debug, PartialEq)]
pub struct BoundDocument {
    pub constants: ConstantTable,
    pub clocks: ClockMap,
    pub functions: FunctionTable,
    pub pointers: PointerTable,
    /// Problems which did not stop the compilation.
    pub warnings: Vec<String>,
}

/**
 Resolves the constants, clocks, functions and pointers of a merged document.

 Durations are converted to clock cycles with the document's `clockperiod`,
 or `default_period` when the document does not declare one.  Function
 `Default` receives id 0 and every other function the next id in
 declaration order.  `PTR_FUNC` pointers are resolved to function ids here;
 `MAIN` and `PTR_SUBR` pointers which name a routine are resolved by the
 assembler.
*/
pub fn bind(doc: &SequencerDocument, default_period: Duration) -> SemanticResult<BoundDocument> {
    debug!("Binding {}", doc.path.display());
    let constants = ConstantTable::from_defs(&doc.constants, default_period)?;
    let clocks = ClockMap::from_defs(&doc.clocks)?;

    let mut warnings = vec![];
    let mut functions = FunctionTable::new();
    let mut next_id = 1;
    for def in &doc.functions {
        let id = if def.name == DEFAULT_FUNCTION {
            0
        } else {
            if next_id >= MAX_FUNCTIONS {
                return Err(CompilerError::new(
                    def.span,
                    SemanticError::TooManyFunctions(doc.functions.len()),
                ));
            }
            next_id += 1;
            (next_id - 1) as u8
        };

        let function = bind_function(def, id, &constants, &clocks, &mut warnings)?;
        debug!("Function {} has id {}", function.name(), id);
        functions
            .insert(function)
            .map_err(|e| CompilerError::new(def.span, e))?;
    }

    let mut pointers = PointerTable::new();
    for def in &doc.pointers {
        bind_pointer(def, &constants, &functions, &mut pointers)?;
    }

    Ok(BoundDocument {
        constants,
        clocks,
        functions,
        pointers,
        warnings,
    })
}

fn bind_function(
    def: &FunctionDef,
    id: u8,
    constants: &ConstantTable,
    clocks: &ClockMap,
    warnings: &mut Vec<String>,
) -> SemanticResult<Function> {
    let undeclared = |clock: &str| {
        CompilerError::new(
            def.span,
            SemanticError::UndeclaredClock {
                function: def.name.clone(),
                clock: clock.into(),
            },
        )
    };

    let positions = def
        .clocks
        .iter()
        .map(|c| clocks.bit(c).ok_or_else(|| undeclared(c)))
        .collect::<SemanticResult<Vec<u32>>>()?;
    let forced = def
        .constants
        .iter()
        .map(|(c, v)| clocks.bit(c).map(|b| (b, *v)).ok_or_else(|| undeclared(c)))
        .collect::<SemanticResult<Vec<(u32, bool)>>>()?;

    let mut slice_defs = &def.slices[..];
    if slice_defs.len() > MAX_SLICES {
        let msg = format!("Too many slices in function {}", def.name);
        warn!("{}", msg);
        warnings.push(msg);
        slice_defs = &slice_defs[..MAX_SLICES];
    }

    let mut slices = vec![];
    let last = slice_defs.len().saturating_sub(1);
    for (idx, slice) in slice_defs.iter().enumerate() {
        if slice.values.len() != positions.len() {
            return Err(CompilerError::new(
                slice.span,
                SemanticError::SliceWidthMismatch {
                    function: def.name.clone(),
                    slice: idx,
                    expected: positions.len(),
                    found: slice.values.len(),
                },
            ));
        }

        let cycles = match &slice.duration {
            SliceDuration::Literal(d) => constants.to_cycles(d),
            SliceDuration::Constant(name) => constants.cycles(name, slice.span)?,
        };

        // The control logic adds one cycle to the first slice and two to the
        // last one.
        let added = match idx {
            0 => 1,
            i if i == last => 2,
            _ => 0,
        };
        if cycles < added + 1 {
            return Err(CompilerError::new(
                slice.span,
                SemanticError::SliceTooShort {
                    function: def.name.clone(),
                    slice: idx,
                    cycles,
                },
            ));
        }
        let length = cycles - added;
        if length > u32::MAX as u128 {
            return Err(CompilerError::new(
                slice.span,
                SemanticError::SliceTooLong {
                    function: def.name.clone(),
                    slice: idx,
                    cycles,
                },
            ));
        }

        let mut output = 0u32;
        for (bit, on) in positions.iter().zip(slice.values.iter()) {
            if *on {
                output |= 1 << bit;
            }
        }
        for (bit, on) in &forced {
            if *on {
                output |= 1 << bit;
            } else {
                output &= !(1 << bit);
            }
        }

        slices.push(TimeSlice::new(length as u32, output));
    }

    Function::new(id, &def.name, &def.comment, def.clocks.clone(), slices)
        .map_err(|e| CompilerError::new(def.span, e))
}

fn bind_pointer(
    def: &PointerDef,
    constants: &ConstantTable,
    functions: &FunctionTable,
    pointers: &mut PointerTable,
) -> SemanticResult<()> {
    let err = |inner: SemanticError| CompilerError::new(def.span, inner);
    let out_of_range = |value: u64| {
        err(SemanticError::PointerValueOutOfRange {
            pointer: def.name.clone(),
            value,
        })
    };

    let (value, target) = match (def.kind, &def.value) {
        (PointerKind::RepFunc, PointerValue::Number(n)) if *n > MAX_CALL_REPEAT => {
            return Err(out_of_range(*n))
        }
        (PointerKind::RepSubr, PointerValue::Number(n)) if *n > MAX_JUMP_REPEAT => {
            return Err(out_of_range(*n))
        }
        (PointerKind::RepFunc, PointerValue::Number(n))
        | (PointerKind::RepSubr, PointerValue::Number(n)) => (Some(*n as u32), None),
        (PointerKind::PtrFunc, PointerValue::Name(name)) => {
            let id = functions
                .id_of(name)
                .ok_or_else(|| err(SemanticError::UndefinedFunction(name.clone())))?;
            (Some(id as u32), Some(name.as_str()))
        }
        (PointerKind::PtrFunc, PointerValue::Number(id)) => {
            match functions.by_id((*id).min(u8::MAX as u64) as u8) {
                Some(f) if *id < MAX_FUNCTIONS as u64 => (Some(*id as u32), Some(f.name())),
                _ => return Err(err(SemanticError::UnknownFunctionId(*id))),
            }
        }
        (PointerKind::Main, PointerValue::Number(a))
        | (PointerKind::PtrSubr, PointerValue::Number(a)) => {
            if *a > MAX_ADDRESS {
                return Err(out_of_range(*a));
            }
            (Some(*a as u32), None)
        }
        (PointerKind::Main, PointerValue::Name(name))
        | (PointerKind::PtrSubr, PointerValue::Name(name)) => (None, Some(name.as_str())),
        (PointerKind::RepFunc, PointerValue::Name(name))
        | (PointerKind::RepSubr, PointerValue::Name(name)) => {
            let limit = match def.kind {
                PointerKind::RepFunc => MAX_CALL_REPEAT,
                _ => MAX_JUMP_REPEAT,
            };
            let n = constants.count(name, def.span)?;
            if n > limit {
                return Err(out_of_range(n));
            }
            (Some(n as u32), None)
        }
    };

    pointers
        .declare(def.kind, &def.name, value, target, &def.comment, def.span)
        .map_err(&err)?;
    Ok(())
}
