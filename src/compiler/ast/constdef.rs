use crate::compiler::source::{SourceIr, Span};

/// The unit attached to a duration literal in the sequencer source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    /// Every unit, longest keyword first so that `ms` is tried before `s`.
    pub const ALL: [TimeUnit; 4] = [TimeUnit::Ns, TimeUnit::Us, TimeUnit::Ms, TimeUnit::S];

    pub fn keyword(&self) -> &'static str {
        match self {
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }

    /// Number of picoseconds in one of this unit.
    pub fn picos(&self) -> u128 {
        match self {
            TimeUnit::Ns => 1_000,
            TimeUnit::Us => 1_000_000,
            TimeUnit::Ms => 1_000_000_000,
            TimeUnit::S => 1_000_000_000_000,
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An integer magnitude paired with a time unit, e.g. `500 ns`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Duration {
    pub magnitude: u64,
    pub unit: TimeUnit,
}

impl Duration {
    pub fn new(magnitude: u64, unit: TimeUnit) -> Duration {
        Duration { magnitude, unit }
    }

    /// Exact length of this duration in picoseconds.
    pub fn picos(&self) -> u128 {
        self.magnitude as u128 * self.unit.picos()
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstantValue {
    Integer(u64),
    Duration(Duration),
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Integer(i) => write!(f, "{}", i),
            ConstantValue::Duration(d) => write!(f, "{}", d),
        }
    }
}

/// `NAME : VALUE [# comment]` from the `[constants]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDef {
    pub name: String,
    pub value: ConstantValue,
    pub comment: String,
    pub span: Span,
}

impl SourceIr for ConstantDef {
    fn span(&self) -> Span {
        self.span
    }
}

/// `NAME : BIT [# comment]` from the `[clocks]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct ClockDef {
    pub name: String,
    pub bit: u64,
    pub comment: String,
    pub span: Span,
}

impl SourceIr for ClockDef {
    fn span(&self) -> Span {
        self.span
    }
}

/// A file listed in the `[includes]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct IncludeDef {
    pub file: String,
    pub comment: String,
    pub span: Span,
}

impl SourceIr for IncludeDef {
    fn span(&self) -> Span {
        self.span
    }
}
