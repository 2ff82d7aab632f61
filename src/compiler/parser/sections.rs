use stdext::function_name;

use crate::compiler::ast::{
    ClockDef, ConstantDef, ConstantValue, FunctionDef, IncludeDef, PointerDef, PointerKind,
    PointerValue, SliceDef, SliceDuration,
};

use super::scanner::{Parsed, Scanner};
use super::Section;

/*
    Grammar of the definition sections

    SECTION ::= '[' NAME ']' LINE_END (EMPTY_LINE | ITEM)*
    LINE_END ::= SPACE* COMMENT? (NEWLINE | EOF)

    INCLUDE ::= SPACE* FILE LINE_END
    CONSTANT ::= SPACE* NAME SPACE* ':' SPACE* (DURATION | INTEGER) LINE_END
    CLOCK ::= SPACE* NAME SPACE* ':' SPACE* INTEGER LINE_END
    POINTER ::= SPACE* KIND SPACE+ NAME SPACE+ VALUE LINE_END

    FUNCTION ::= NAME ':' LINE_END EMPTY_LINE*
                 'clocks' ':' NAME (',' NAME)* LINE_END EMPTY_LINE*
                 'slices' ':' LINE_END (EMPTY_LINE | SLICE)* EMPTY_LINE*
                 ('constants' ':' NAME '=' BIT (',' NAME '=' BIT)* LINE_END)? EMPTY_LINE*
    SLICE ::= SPACE* (DURATION | NAME) SPACE* '=' SPACE* BIT (SPACE* ',' SPACE* BIT)* LINE_END
*/

/// Reads a section marker followed by any number of items matched by
/// `item`.  Returns `None` if the marker is not at `pos`.
pub(super) fn section<'a, T, R>(
    s: &Scanner<'a>,
    pos: usize,
    section: Section,
    item: R,
) -> Option<Parsed<Vec<T>>>
where
    R: Fn(&Scanner<'a>, usize) -> Option<Parsed<T>>,
{
    trace!(s, pos);
    let mut branch = s.branch(pos);
    let marker = format!("[{}]", section.name());
    if !branch.next_if_word(&marker) {
        return None;
    }
    branch.line_end()?;

    let mut items = vec![];
    loop {
        if branch.empty_line() {
            continue;
        }
        match branch.rule(&item) {
            Some(i) => items.push(i),
            None => break,
        }
    }
    branch.merge(items)
}

pub(super) fn include_line(s: &Scanner, pos: usize) -> Option<Parsed<IncludeDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    branch.zmsp();
    let file = branch.file_name()?;
    let comment = branch.line_end()?;
    let span = branch.span();
    branch.merge(IncludeDef {
        file,
        comment,
        span,
    })
}

pub(super) fn constant_line(s: &Scanner, pos: usize) -> Option<Parsed<ConstantDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    let name = branch.label()?;
    branch.zmsp();
    let value = match branch.duration() {
        Some(d) => ConstantValue::Duration(d),
        None => ConstantValue::Integer(branch.integer()?),
    };
    let comment = branch.line_end()?;
    let span = branch.span();
    branch.merge(ConstantDef {
        name,
        value,
        comment,
        span,
    })
}

pub(super) fn clock_line(s: &Scanner, pos: usize) -> Option<Parsed<ClockDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    let name = branch.label()?;
    branch.zmsp();
    let bit = branch.integer()?;
    let comment = branch.line_end()?;
    let span = branch.span();
    branch.merge(ClockDef {
        name,
        bit,
        comment,
        span,
    })
}

pub(super) fn pointer_line(s: &Scanner, pos: usize) -> Option<Parsed<PointerDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    branch.zmsp();
    let kind = PointerKind::ALL
        .iter()
        .find(|k| branch.next_if_word(k.keyword()))
        .copied()?;
    if !branch.omsp() {
        return None;
    }
    let name = branch.name()?;
    if !branch.omsp() {
        return None;
    }
    let value = match kind {
        PointerKind::RepFunc | PointerKind::RepSubr | PointerKind::PtrFunc => {
            match branch.name() {
                Some(name) => PointerValue::Name(name),
                None => PointerValue::Number(branch.integer()?),
            }
        }
        PointerKind::Main | PointerKind::PtrSubr => match branch.name() {
            Some(name) => PointerValue::Name(name),
            None => PointerValue::Number(branch.address()?),
        },
    };
    let comment = branch.line_end()?;
    let span = branch.span();
    branch.merge(PointerDef {
        kind,
        name,
        value,
        comment,
        span,
    })
}

pub(super) fn function_block(s: &Scanner, pos: usize) -> Option<Parsed<FunctionDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    let name = branch.label()?;
    let comment = branch.line_end()?;
    branch.empty_lines();

    let clocks = branch.rule(clocks_line)?;
    branch.empty_lines();

    if !branch.keyword_label("slices") {
        return None;
    }
    branch.line_end()?;
    let mut slices = vec![];
    loop {
        if branch.empty_line() {
            continue;
        }
        match branch.rule(slice_line) {
            Some(slice) => slices.push(slice),
            None => break,
        }
    }
    branch.empty_lines();

    let constants = branch.rule(constants_line).unwrap_or_default();
    branch.empty_lines();

    let span = branch.span();
    branch.merge(FunctionDef {
        name,
        comment,
        clocks,
        slices,
        constants,
        span,
    })
}

fn clocks_line(s: &Scanner, pos: usize) -> Option<Parsed<Vec<String>>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    if !branch.keyword_label("clocks") {
        return None;
    }
    let mut clocks = vec![];
    loop {
        branch.zmsp();
        clocks.push(branch.name()?);
        branch.zmsp();
        if !branch.next_if(b',') {
            break;
        }
    }
    branch.line_end()?;
    branch.merge(clocks)
}

fn slice_line(s: &Scanner, pos: usize) -> Option<Parsed<SliceDef>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    branch.zmsp();
    let duration = match branch.duration() {
        Some(d) => SliceDuration::Literal(d),
        None => SliceDuration::Constant(branch.name()?),
    };
    branch.zmsp();
    if !branch.next_if(b'=') {
        return None;
    }
    let mut values = vec![];
    loop {
        branch.zmsp();
        values.push(branch.bit()?);
        branch.zmsp();
        if !branch.next_if(b',') {
            break;
        }
    }
    branch.line_end()?;
    let span = branch.span();
    branch.merge(SliceDef {
        duration,
        values,
        span,
    })
}

fn constants_line(s: &Scanner, pos: usize) -> Option<Parsed<Vec<(String, bool)>>> {
    trace!(s, pos);
    let mut branch = s.branch(pos);
    if !branch.keyword_label("constants") {
        return None;
    }
    let mut constants = vec![];
    loop {
        branch.zmsp();
        let name = branch.name()?;
        branch.zmsp();
        if !branch.next_if(b'=') {
            return None;
        }
        branch.zmsp();
        constants.push((name, branch.bit()?));
        branch.zmsp();
        if !branch.next_if(b',') {
            break;
        }
    }
    branch.line_end()?;
    branch.merge(constants)
}
