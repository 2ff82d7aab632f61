//! Super-scan frames move the ADC trigger through the pixel readout
//! function by a fixed time increment from one frame to the next.  This
//! module derives the variant of the readout function for every frame.

use std::path::Path;

use log::debug;

use crate::compiler::{
    semantics::{Function, SemanticError},
    sequencer::{QueryError, Sequencer},
};

mod tests;

/// Clock which carries the ADC trigger in the usual sequencer files.
pub const TRIGGER_CLOCK: &str = "TRG";

/// Trigger offsets, in clock cycles, used when none are given: every
/// second cycle over the first two hundred.
pub fn default_offsets() -> impl Iterator<Item = u64> {
    (0..200).step_by(2)
}

/**
 Derives one variant of `function` for every offset in `offsets`: a copy in
 which `channel` is on only in the slice starting at that offset.  Offsets
 past the end of the function wrap around to its start.

 `function` itself is left untouched.  An offset at which the trigger
 cannot be placed, for example because the function already has sixteen
 slices, is skipped.
*/
pub fn trigger_scan<I>(
    function: &Function,
    channel: u32,
    offsets: I,
) -> Result<Vec<(u64, Function)>, SemanticError>
where
    I: IntoIterator<Item = u64>,
{
    let mut base = function.to_draft();
    base.set_output_channel(false, channel, None)?;
    let base = base.build();

    let mut scan = vec![];
    for offset in offsets {
        let mut draft = base.to_draft();
        match draft.set_output_at_time(true, channel, offset, true) {
            Ok(()) => scan.push((offset, draft.build())),
            Err(e) => debug!("Skipping trigger offset {}: {}", offset, e),
        }
    }
    Ok(scan)
}

/// A copy of `seq` for every frame of a super-scan of `function` on
/// `clock`, keyed by trigger offset.
pub fn scan_sequencers<I>(
    seq: &Sequencer,
    function: &str,
    clock: &str,
    offsets: I,
) -> Result<Vec<(u64, Sequencer)>, QueryError>
where
    I: IntoIterator<Item = u64>,
{
    let channel = seq.clock_bit(clock)?;
    let function = seq.function(function)?;
    trigger_scan(function, channel, offsets)?
        .into_iter()
        .map(|(offset, variant)| seq.with_function(variant).map(|s| (offset, s)))
        .collect()
}

/// `scantime_<offset>_<file name>`, the name of the source of one frame.
pub fn scan_file_name(offset: u64, source: &Path) -> String {
    let file = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("scantime_{}_{}", offset, file)
}
