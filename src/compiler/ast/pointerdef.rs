use serde::{Deserialize, Serialize};

use crate::compiler::source::{SourceIr, Span};

/// The five kinds of pointer tables in the sequencer memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerKind {
    /// The execute slot: which main routine the sequencer starts from.
    Main,
    PtrFunc,
    RepFunc,
    PtrSubr,
    RepSubr,
}

impl PointerKind {
    pub const ALL: [PointerKind; 5] = [
        PointerKind::Main,
        PointerKind::PtrFunc,
        PointerKind::RepFunc,
        PointerKind::PtrSubr,
        PointerKind::RepSubr,
    ];

    /// The keyword which introduces this kind of pointer in the `[pointers]` section.
    pub fn keyword(&self) -> &'static str {
        match self {
            PointerKind::Main => "MAIN",
            PointerKind::PtrFunc => "PTR_FUNC",
            PointerKind::RepFunc => "REP_FUNC",
            PointerKind::PtrSubr => "PTR_SUBR",
            PointerKind::RepSubr => "REP_SUBR",
        }
    }

    /// Repeat pointers hold a count, every other kind refers to a function or routine.
    pub fn is_repeat(&self) -> bool {
        matches!(self, PointerKind::RepFunc | PointerKind::RepSubr)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            PointerKind::Main => 0,
            PointerKind::PtrFunc => 1,
            PointerKind::RepFunc => 2,
            PointerKind::PtrSubr => 3,
            PointerKind::RepSubr => 4,
        }
    }
}

impl std::fmt::Display for PointerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The right hand side of a pointer declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerValue {
    /// A function or routine name, resolved during binding or assembly.
    Name(String),
    /// A repeat count, a function id or a program address depending on the kind.
    Number(u64),
}

/// `KIND NAME VALUE [# comment]` from the `[pointers]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerDef {
    pub kind: PointerKind,
    pub name: String,
    pub value: PointerValue,
    pub comment: String,
    pub span: Span,
}

impl SourceIr for PointerDef {
    fn span(&self) -> Span {
        self.span
    }
}
