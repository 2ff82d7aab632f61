use std::collections::HashMap;

use log::debug;

use crate::compiler::{ast::PointerKind, source::Span};
use crate::config::MemoryLayout;

use super::SemanticError;

/// Number of slots in each pointer table other than `MAIN`.
pub const POINTER_SLOTS: u8 = 16;

/// A named slot in one of the pointer tables.  The sequencer reads the slot
/// when it executes an instruction which refers to the pointer, so the
/// value can be changed without recompiling the program.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    kind: PointerKind,
    name: String,
    slot: u8,
    /// A repeat count, a function id or a program address depending on the
    /// kind.  Routine targets are unresolved until assembly.
    value: Option<u32>,
    /// The function or routine named in the declaration, if any.
    target: Option<String>,
    description: String,
    span: Span,
}

impl Pointer {
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declaration, or the routine a synthesized pointer refers to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Memory address of the slot in the emitted image.
    pub fn address(&self, layout: &MemoryLayout) -> u32 {
        layout.pointer_base(self.kind) + self.slot as u32
    }

    pub(crate) fn resolve(&mut self, value: u32) {
        self.value = Some(value);
    }

    /// `slot: name -> value` for repeat pointers and `slot: name -> target`
    /// for every other kind.
    pub fn repr(&self) -> String {
        match (&self.target, self.value) {
            (Some(target), _) if !self.kind.is_repeat() => {
                format!("{}: {} -> {}", self.slot, self.name, target)
            }
            (_, Some(value)) => format!("{}: {} -> {}", self.slot, self.name, value),
            _ => format!("{}: {} -> ?", self.slot, self.name),
        }
    }
}

/// Hands out the slots of each pointer table in declaration order.  One
/// allocator serves one compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerAllocator {
    next: [u8; 5],
}

impl PointerAllocator {
    pub fn new() -> PointerAllocator {
        PointerAllocator { next: [0; 5] }
    }

    /// `MAIN` is a single execute slot; every other table has sixteen slots.
    pub fn capacity(kind: PointerKind) -> u8 {
        match kind {
            PointerKind::Main => 1,
            _ => POINTER_SLOTS,
        }
    }

    pub fn allocate(&mut self, kind: PointerKind) -> Result<u8, SemanticError> {
        let next = &mut self.next[kind.index()];
        if *next >= PointerAllocator::capacity(kind) {
            return Err(SemanticError::TooManyPointers(kind));
        }
        let slot = *next;
        *next += 1;
        Ok(slot)
    }
}

/// Every pointer of a document.  Pointer names are unique across kinds so
/// that `@name` operands can be looked up without knowing the kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerTable {
    pointers: Vec<Pointer>,
    index: HashMap<String, usize>,
    allocator: PointerAllocator,
}

impl PointerTable {
    pub fn new() -> PointerTable {
        PointerTable {
            pointers: vec![],
            index: HashMap::new(),
            allocator: PointerAllocator::new(),
        }
    }

    /// Adds a pointer in the next free slot of its table.
    pub fn declare(
        &mut self,
        kind: PointerKind,
        name: &str,
        value: Option<u32>,
        target: Option<&str>,
        description: &str,
        span: Span,
    ) -> Result<&Pointer, SemanticError> {
        if self.index.contains_key(name) {
            return Err(SemanticError::DuplicatePointer(name.into()));
        }
        let slot = self.allocator.allocate(kind)?;
        debug!("Pointer {} {} in slot {}", kind, name, slot);

        self.index.insert(name.into(), self.pointers.len());
        self.pointers.push(Pointer {
            kind,
            name: name.into(),
            slot,
            value,
            target: target.map(|t| t.into()),
            description: description.into(),
            span,
        });
        Ok(&self.pointers[self.pointers.len() - 1])
    }

    pub fn get(&self, kind: PointerKind, slot: u8) -> Option<&Pointer> {
        self.pointers
            .iter()
            .find(|p| p.kind == kind && p.slot == slot)
    }

    pub fn by_name(&self, name: &str) -> Option<&Pointer> {
        self.index.get(name).map(|i| &self.pointers[*i])
    }

    pub fn has_kind(&self, kind: PointerKind) -> bool {
        self.pointers.iter().any(|p| p.kind == kind)
    }

    /// Every pointer in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pointer> {
        self.pointers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}
