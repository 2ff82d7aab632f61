use serde::{Deserialize, Serialize};

use crate::compiler::ast::{Duration, PointerKind, TimeUnit};
use crate::diagnostics::TracingConfig;

/// Clock period used when a document does not declare `clockperiod`.
pub const DEFAULT_CLOCK_PERIOD: Duration = Duration {
    magnitude: 10,
    unit: TimeUnit::Ns,
};

/// Base addresses of the memory regions written in a compiled listing.
/// Fields left out of a layout file keep their default value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLayout {
    pub outputs: u32,
    pub slices: u32,
    pub program: u32,
    pub main: u32,
    pub ptr_func: u32,
    pub rep_func: u32,
    pub ptr_subr: u32,
    pub rep_subr: u32,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        MemoryLayout {
            outputs: 0x10_0000,
            slices: 0x20_0000,
            program: 0x30_0000,
            main: 0x34_0000,
            ptr_func: 0x35_0000,
            rep_func: 0x36_0000,
            ptr_subr: 0x37_0000,
            rep_subr: 0x38_0000,
        }
    }
}

impl MemoryLayout {
    pub fn pointer_base(&self, kind: PointerKind) -> u32 {
        match kind {
            PointerKind::Main => self.main,
            PointerKind::PtrFunc => self.ptr_func,
            PointerKind::RepFunc => self.rep_func,
            PointerKind::PtrSubr => self.ptr_subr,
            PointerKind::RepSubr => self.rep_subr,
        }
    }

    /// Address of the stored duration of `slice` in function `id`.
    pub fn slice_address(&self, id: u8, slice: usize) -> u32 {
        self.slices + ((id as u32) << 4) + slice as u32
    }

    /// Address of the output word of `slice` in function `id`.
    pub fn output_address(&self, id: u8, slice: usize) -> u32 {
        self.outputs + ((id as u32) << 4) + slice as u32
    }

    /// Loads a layout from YAML.
    pub fn read<R: std::io::Read>(reader: R) -> Result<MemoryLayout, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// Writes the layout as YAML.
    pub fn write<W: std::io::Write>(&self, writer: W) -> Result<(), serde_yaml::Error> {
        serde_yaml::to_writer(writer, self)
    }
}

/// Settings for one compilation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerConfig {
    pub default_clock_period: Duration,
    pub layout: MemoryLayout,
    /// Trace of the parser rules, by source line.
    pub tracing: TracingConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            default_clock_period: DEFAULT_CLOCK_PERIOD,
            layout: MemoryLayout::default(),
            tracing: TracingConfig::Off,
        }
    }
}
