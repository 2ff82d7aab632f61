/*
 * Execution time of the routines of a compiled sequencer.
 *
 * A routine is walked in address order.  Every call takes the total time of
 * its function times its repeat count.  Every jump takes the time of the
 * routine it enters times its repeat count; that routine is walked
 * recursively and its lines are listed, one level deeper, right after the
 * jump.  The walk of a routine stops at its RTS or END.
 *
 * A call which repeats until the sequencer is stopped is counted once and
 * the result is flagged as a lower bound.
 */
use std::ops::Add;

use serde::Serialize;

use crate::compiler::{
    ast::PointerKind,
    program::Instruction,
    sequencer::{QueryError, Sequencer},
};

mod tests;

const PICOS_PER_NS: f64 = 1e3;
const PICOS_PER_US: f64 = 1e6;

/// A run time, exact to the picosecond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionTime {
    picos: u128,
    /// Set when an infinite loop was counted as a single run.
    lower_bound: bool,
}

impl ExecutionTime {
    pub fn from_cycles(cycles: u64, clock_period_ps: u128) -> ExecutionTime {
        ExecutionTime {
            picos: cycles as u128 * clock_period_ps,
            lower_bound: false,
        }
    }

    pub fn picos(&self) -> u128 {
        self.picos
    }

    pub fn as_ns(&self) -> f64 {
        self.picos as f64 / PICOS_PER_NS
    }

    pub fn as_us(&self) -> f64 {
        self.picos as f64 / PICOS_PER_US
    }

    pub fn is_lower_bound(&self) -> bool {
        self.lower_bound
    }

    /// This time repeated `count` times, or counted once and flagged as a
    /// lower bound if `count` is `None`.
    fn repeated(self, count: Option<u64>) -> ExecutionTime {
        match count {
            Some(n) => ExecutionTime {
                picos: self.picos * n as u128,
                lower_bound: self.lower_bound,
            },
            None => ExecutionTime {
                picos: self.picos,
                lower_bound: true,
            },
        }
    }
}

impl Add for ExecutionTime {
    type Output = ExecutionTime;

    fn add(self, rhs: Self) -> Self::Output {
        ExecutionTime {
            picos: self.picos + rhs.picos,
            lower_bound: self.lower_bound || rhs.lower_bound,
        }
    }
}

impl std::fmt::Display for ExecutionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.lower_bound {
            f.write_str(">= ")?;
        }
        write!(f, "{:.2} us", self.as_us())
    }
}

/// What the time on a trace line measures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTime {
    /// The time taken by a call or jump, repeats included.
    Run(ExecutionTime),
    /// The time of the routine up to its RTS or END.
    Subtotal(ExecutionTime),
}

/// One executed instruction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceLine {
    /// Number of jumps between the traced routine and this instruction.
    pub depth: usize,
    pub address: u16,
    pub instruction: String,
    pub time: LineTime,
}

impl std::fmt::Display for TraceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", "__".repeat(self.depth), self.instruction)?;
        match self.time {
            LineTime::Run(t) => write!(f, " = run time: {:.2} us  ", t.as_us()),
            LineTime::Subtotal(t) => write!(f, " = subtotal: {:.2} us", t.as_us()),
        }
    }
}

/// The trace of a routine with the time taken by each line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Breakdown {
    pub routine: String,
    pub lines: Vec<TraceLine>,
    pub total: ExecutionTime,
}

impl std::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Every instruction executed by `routine`, one line each, indented by the
/// depth of the jumps leading to it.
pub fn sequence(seq: &Sequencer, routine: &str) -> Result<Vec<String>, QueryError> {
    Ok(breakdown(seq, routine)?
        .lines
        .iter()
        .map(|l| format!("{}{}", "__".repeat(l.depth), l.instruction))
        .collect())
}

/// The total run time of `routine`.
pub fn timing(seq: &Sequencer, routine: &str) -> Result<ExecutionTime, QueryError> {
    breakdown(seq, routine).map(|b| b.total)
}

pub fn breakdown(seq: &Sequencer, routine: &str) -> Result<Breakdown, QueryError> {
    let start = seq.routine_address(routine)?;
    let mut walker = Walker {
        seq,
        active: vec![],
        lines: vec![],
    };
    let total = walker.walk(start, 0)?;
    Ok(Breakdown {
        routine: routine.into(),
        lines: walker.lines,
        total,
    })
}

struct Walker<'s> {
    seq: &'s Sequencer,
    /// Start addresses of the routines being walked.
    active: Vec<u16>,
    lines: Vec<TraceLine>,
}

impl<'s> Walker<'s> {
    fn walk(&mut self, start: u16, depth: usize) -> Result<ExecutionTime, QueryError> {
        let seq = self.seq;
        if self.active.contains(&start) {
            return Err(seq.recursion(start));
        }
        self.active.push(start);

        let period = seq.clock_period_ps();
        let mut total = ExecutionTime::default();
        let mut address = start;
        while let Some(instruction) = seq.program().instruction(address) {
            let text = seq.repr_instruction(address)?;
            match instruction {
                Instruction::Return | Instruction::End => {
                    self.lines.push(TraceLine {
                        depth,
                        address,
                        instruction: text,
                        time: LineTime::Subtotal(total),
                    });
                    break;
                }
                Instruction::Call { function, repeat } => {
                    let function = seq.called_function(function)?;
                    let count = seq.repeat_count(repeat, PointerKind::RepFunc)?;
                    let time =
                        ExecutionTime::from_cycles(function.total_time(), period).repeated(count);
                    self.lines.push(TraceLine {
                        depth,
                        address,
                        instruction: text,
                        time: LineTime::Run(time),
                    });
                    total = total + time;
                }
                Instruction::Jump { target, repeat } => {
                    let target = seq.jump_target(target)?;
                    let count = seq.repeat_count(repeat, PointerKind::RepSubr)?;
                    let line = self.lines.len();
                    self.lines.push(TraceLine {
                        depth,
                        address,
                        instruction: text,
                        time: LineTime::Run(ExecutionTime::default()),
                    });
                    let time = self.walk(target, depth + 1)?.repeated(count);
                    self.lines[line].time = LineTime::Run(time);
                    total = total + time;
                }
            }
            address += 1;
        }

        self.active.pop();
        Ok(total)
    }
}
