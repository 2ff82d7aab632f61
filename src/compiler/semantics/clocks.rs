use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::compiler::{ast::ClockDef, error::CompilerError};

use super::{SemanticError, SemanticResult};

/// Number of output channels driven by a function.
pub const CLOCK_BITS: u32 = 32;

/// The output bit wired to the shutter rather than to a CCD clock.
pub const SHUTTER_BIT: u32 = 16;

/// Two way binding between clock names and output bits.  Each name and each
/// bit appears at most once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockMap {
    by_name: HashMap<String, u32>,
    by_bit: BTreeMap<u32, String>,
}

impl ClockMap {
    pub fn new() -> ClockMap {
        ClockMap {
            by_name: HashMap::new(),
            by_bit: BTreeMap::new(),
        }
    }

    pub fn from_defs(defs: &[ClockDef]) -> SemanticResult<ClockMap> {
        let mut map = ClockMap::new();
        for def in defs {
            if def.bit >= CLOCK_BITS as u64 {
                return Err(CompilerError::new(
                    def.span,
                    SemanticError::ClockBitOutOfRange {
                        clock: def.name.clone(),
                        bit: def.bit,
                    },
                ));
            }
            map.insert(&def.name, def.bit as u32)
                .map_err(|e| CompilerError::new(def.span, e))?;
        }
        Ok(map)
    }

    /// Binds `name` to `bit`, failing if either is already bound.
    pub fn insert(&mut self, name: &str, bit: u32) -> Result<(), SemanticError> {
        if bit >= CLOCK_BITS {
            return Err(SemanticError::ClockBitOutOfRange {
                clock: name.into(),
                bit: bit as u64,
            });
        }
        if self.by_name.contains_key(name) {
            return Err(SemanticError::DuplicateDefinition {
                what: "Clock",
                name: name.into(),
            });
        }
        if let Some(first) = self.by_bit.get(&bit) {
            return Err(SemanticError::DuplicateClockBit {
                bit,
                first: first.clone(),
                second: name.into(),
            });
        }

        if bit == SHUTTER_BIT {
            debug!("Clock {} drives the shutter bit", name);
        }
        self.by_name.insert(name.into(), bit);
        self.by_bit.insert(bit, name.into());
        Ok(())
    }

    pub fn bit(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, bit: u32) -> Option<&str> {
        self.by_bit.get(&bit).map(|n| n.as_str())
    }

    /// Every binding, lowest bit first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.by_bit.iter().map(|(b, n)| (*b, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_bit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bit.is_empty()
    }
}
