use std::path::PathBuf;

use log::debug;

use super::{ClockDef, ConstantDef, FunctionDef, IncludeDef, PointerDef, RoutineDef};

/// The parse tree of one sequencer file: every section in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequencerDocument {
    pub path: PathBuf,
    pub includes: Vec<IncludeDef>,
    pub constants: Vec<ConstantDef>,
    pub clocks: Vec<ClockDef>,
    pub pointers: Vec<PointerDef>,
    pub functions: Vec<FunctionDef>,
    pub subroutines: Vec<RoutineDef>,
    pub mains: Vec<RoutineDef>,
}

impl SequencerDocument {
    pub fn new(path: PathBuf) -> SequencerDocument {
        SequencerDocument {
            path,
            ..Default::default()
        }
    }

    /// Appends every definition of `weaker` whose key is not already defined in
    /// this document.  Definitions already present are never replaced, so the
    /// document being merged into always has precedence.  The includes of
    /// `weaker` are not carried over: include resolution happens before the
    /// merge.
    ///
    /// Definitions are keyed by name.  Pointer names share one namespace
    /// across kinds, so an included pointer is dropped whenever the name is
    /// taken by a pointer of any kind.
    pub fn merge_weaker(&mut self, weaker: SequencerDocument) {
        debug!(
            "Merging {} into {}",
            weaker.path.display(),
            self.path.display()
        );

        merge_by(&mut self.constants, weaker.constants, |c| c.name.clone());
        merge_by(&mut self.clocks, weaker.clocks, |c| c.name.clone());
        merge_by(&mut self.pointers, weaker.pointers, |p| p.name.clone());
        merge_by(&mut self.functions, weaker.functions, |f| f.name.clone());
        merge_by(&mut self.subroutines, weaker.subroutines, |r| r.name.clone());
        merge_by(&mut self.mains, weaker.mains, |r| r.name.clone());
    }
}

fn merge_by<T, K: PartialEq, F: Fn(&T) -> K>(stronger: &mut Vec<T>, weaker: Vec<T>, key: F) {
    let existing: Vec<K> = stronger.iter().map(|d| key(d)).collect();
    for def in weaker {
        if !existing.contains(&key(&def)) {
            stronger.push(def);
        }
    }
}
