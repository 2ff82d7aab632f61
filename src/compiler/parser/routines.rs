use stdext::function_name;

use crate::compiler::ast::{CallOperand, InstructionDef, JsrOperand, RepeatSpec, RoutineDef};

use super::scanner::{Branch, Parsed, Scanner};

/*
    Grammar of the routine sections

    ROUTINE ::= NAME ':' LINE_END (EMPTY_LINE | CALL | JSR)* TERMINATOR
    TERMINATOR ::= SPACE* ('RTS' | 'END') LINE_END

    CALL ::= SPACE* 'CALL' SPACE+ (POINTER | INTEGER | NAME) (SPACE+ REPEAT)? LINE_END
    JSR ::= SPACE* 'JSR' SPACE+ (POINTER | NAME | ADDRESS) (SPACE+ REPEAT)? LINE_END
    REPEAT ::= 'repeat(' SPACE* (POINTER | 'infinity' | INTEGER | NAME) SPACE* ')'
    POINTER ::= '@' (NAME | ADDRESS)

    Subroutines end with RTS, mains end with END.  A pointer is named, or
    given by its slot number in hexadecimal.
*/

pub(super) fn subroutine_block(s: &Scanner, pos: usize) -> Option<Parsed<RoutineDef>> {
    trace!(s, pos);
    routine_block(s, pos, "RTS")
}

pub(super) fn main_block(s: &Scanner, pos: usize) -> Option<Parsed<RoutineDef>> {
    trace!(s, pos);
    routine_block(s, pos, "END")
}

fn routine_block(s: &Scanner, pos: usize, terminator: &str) -> Option<Parsed<RoutineDef>> {
    let mut branch = s.branch(pos);
    let name = branch.label()?;
    let comment = branch.line_end()?;

    let mut instructions = vec![];
    loop {
        if branch.empty_line() {
            continue;
        }
        if let Some(call) = branch.rule(call_line) {
            instructions.push(call);
            continue;
        }
        match branch.rule(jsr_line) {
            Some(jsr) => instructions.push(jsr),
            None => break,
        }
    }

    let last = branch.attempt(|b| {
        b.zmsp();
        let start = b.pos();
        if !b.next_if_word(terminator) {
            return None;
        }
        let span = b.span_from(start);
        b.line_end()?;
        Some(span)
    })?;
    instructions.push(match terminator {
        "RTS" => InstructionDef::Rts(last),
        _ => InstructionDef::End(last),
    });

    let span = branch.span();
    branch.merge(RoutineDef {
        name,
        comment,
        instructions,
        span,
    })
}

fn call_line(s: &Scanner, pos: usize) -> Option<Parsed<InstructionDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    branch.zmsp();
    if !branch.next_if_word("CALL") || !branch.omsp() {
        return None;
    }
    let function = if branch.next_if(b'@') {
        match branch.name() {
            Some(name) => CallOperand::ByPointer(name),
            None => CallOperand::ByPointerSlot(branch.address()?),
        }
    } else if let Some(id) = branch.integer() {
        CallOperand::ById(id)
    } else {
        CallOperand::ByName(branch.name()?)
    };
    let repeat = optional_repeat(&mut branch);
    branch.line_end()?;
    let span = branch.span();
    branch.merge(InstructionDef::Call {
        function,
        repeat,
        span,
    })
}

fn jsr_line(s: &Scanner, pos: usize) -> Option<Parsed<InstructionDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    branch.zmsp();
    if !branch.next_if_word("JSR") || !branch.omsp() {
        return None;
    }
    let target = if branch.next_if(b'@') {
        match branch.name() {
            Some(name) => JsrOperand::ByPointer(name),
            None => JsrOperand::ByPointerSlot(branch.address()?),
        }
    } else if let Some(name) = branch.name() {
        JsrOperand::ByName(name)
    } else {
        JsrOperand::ByAddress(branch.address()?)
    };
    let repeat = optional_repeat(&mut branch);
    branch.line_end()?;
    let span = branch.span();
    branch.merge(InstructionDef::Jsr {
        target,
        repeat,
        span,
    })
}

/// A malformed modifier is left for `line_end` to reject.
fn optional_repeat(branch: &mut Branch) -> RepeatSpec {
    branch
        .attempt(|b| if b.omsp() { repeat(b) } else { None })
        .unwrap_or(RepeatSpec::Once)
}

fn repeat(branch: &mut Branch) -> Option<RepeatSpec> {
    if !branch.next_if_word("repeat(") {
        return None;
    }
    branch.zmsp();
    let spec = if branch.next_if(b'@') {
        match branch.name() {
            Some(name) => RepeatSpec::Pointer(name),
            None => RepeatSpec::PointerSlot(branch.address()?),
        }
    } else if let Some(count) = branch.integer() {
        RepeatSpec::Count(count)
    } else {
        match branch.name()? {
            name if name == "infinity" => RepeatSpec::Infinity,
            name => RepeatSpec::Constant(name),
        }
    };
    branch.zmsp();
    if branch.next_if(b')') {
        Some(spec)
    } else {
        None
    }
}
