use std::collections::HashMap;

use log::debug;

use crate::compiler::{
    ast::{ConstantDef, ConstantValue, Duration, CLOCK_PERIOD},
    error::CompilerError,
    source::{Offset, Span},
};

use super::{SemanticError, SemanticResult};

/**
 The named constants of a sequencer document together with the FPGA clock
 period used to convert durations into clock cycles.

 The clock period is the value of the `clockperiod` constant when one is
 declared, otherwise the default given when the table is built.  Conversion
 truncates: `505 ns` at a `10 ns` clock period is 50 cycles.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantTable {
    clock_period: Duration,
    constants: Vec<ConstantDef>,
    index: HashMap<String, usize>,
}

impl ConstantTable {
    pub fn from_defs(
        defs: &[ConstantDef],
        default_period: Duration,
    ) -> SemanticResult<ConstantTable> {
        let mut index = HashMap::new();
        for (i, def) in defs.iter().enumerate() {
            if index.insert(def.name.clone(), i).is_some() {
                return Err(CompilerError::new(
                    def.span,
                    SemanticError::DuplicateDefinition {
                        what: "Constant",
                        name: def.name.clone(),
                    },
                ));
            }
        }

        let clock_period = match index.get(CLOCK_PERIOD).map(|i| &defs[*i]) {
            Some(def) => match def.value {
                ConstantValue::Duration(d) if d.picos() > 0 => d,
                ConstantValue::Duration(_) => {
                    return Err(CompilerError::new(
                        def.span,
                        SemanticError::InvalidClockPeriod("the period must not be zero".into()),
                    ))
                }
                ConstantValue::Integer(_) => {
                    return Err(CompilerError::new(
                        def.span,
                        SemanticError::InvalidClockPeriod(
                            "the period must be a duration with a unit".into(),
                        ),
                    ))
                }
            },
            None if default_period.picos() > 0 => default_period,
            None => {
                return Err(CompilerError::new(
                    defs.first()
                        .map(|d| d.span)
                        .unwrap_or_else(|| Span::at(Offset::default())),
                    SemanticError::InvalidClockPeriod(
                        "the default period must not be zero".into(),
                    ),
                ))
            }
        };
        debug!("Clock period is {}", clock_period);

        Ok(ConstantTable {
            clock_period,
            constants: defs.to_vec(),
            index,
        })
    }

    pub fn clock_period(&self) -> Duration {
        self.clock_period
    }

    /// The clock period in picoseconds, never zero.
    pub fn clock_period_ps(&self) -> u128 {
        self.clock_period.picos()
    }

    pub fn get(&self, name: &str) -> Option<&ConstantValue> {
        self.index.get(name).map(|i| &self.constants[*i].value)
    }

    /// Number of whole clock cycles in `duration`.
    pub fn to_cycles(&self, duration: &Duration) -> u128 {
        duration.picos() / self.clock_period_ps()
    }

    /// Resolves `name` to a number of clock cycles.  Integer constants are
    /// already a cycle count.
    pub fn cycles(&self, name: &str, span: Span) -> SemanticResult<u128> {
        match self.get(name) {
            Some(ConstantValue::Integer(i)) => Ok(*i as u128),
            Some(ConstantValue::Duration(d)) => Ok(self.to_cycles(d)),
            None => Err(CompilerError::new(
                span,
                SemanticError::UndefinedConstant(name.into()),
            )),
        }
    }

    /// Resolves `name` to a plain count, as used by `repeat(NAME)`.
    pub fn count(&self, name: &str, span: Span) -> SemanticResult<u64> {
        match self.get(name) {
            Some(ConstantValue::Integer(i)) => Ok(*i),
            Some(ConstantValue::Duration(_)) => Err(CompilerError::new(
                span,
                SemanticError::ConstantNotInteger(name.into()),
            )),
            None => Err(CompilerError::new(
                span,
                SemanticError::UndefinedConstant(name.into()),
            )),
        }
    }

    /// The constant definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ConstantDef> {
        self.constants.iter()
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}
