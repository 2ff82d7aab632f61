use std::{
    collections::{BTreeMap, HashMap},
    convert::TryFrom,
};

use super::{clocks::CLOCK_BITS, ClockMap, SemanticError};

/// Maximum number of time slices in one function.
pub const MAX_SLICES: usize = 16;

/// Function ids are four bits wide.
pub const MAX_FUNCTIONS: usize = 16;

/// One time slice of a function as it is stored in the sequencer memory.
///
/// `length` is the stored duration in clock cycles.  The control logic adds
/// one cycle to the first slice and two cycles to the last slice, so the
/// effective duration of those slices is longer than `length`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSlice {
    pub length: u32,
    pub output: u32,
}

impl TimeSlice {
    pub fn new(length: u32, output: u32) -> TimeSlice {
        TimeSlice { length, output }
    }
}

/**
 A bound waveform: up to sixteen time slices, each holding a stored
 duration and a 32 bit output word with one bit per clock channel.

 A `Function` is never modified once it is built.  To derive a variant of a
 function use [`Function::to_draft`], edit the draft, and build it into a new
 `Function`.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    id: u8,
    name: String,
    description: String,
    clocks: Vec<String>,
    slices: Vec<TimeSlice>,
}

impl Function {
    pub fn new(
        id: u8,
        name: &str,
        description: &str,
        clocks: Vec<String>,
        slices: Vec<TimeSlice>,
    ) -> Result<Function, SemanticError> {
        if slices.len() > MAX_SLICES {
            return Err(SemanticError::SliceLimitReached);
        }
        Ok(Function {
            id,
            name: name.into(),
            description: description.into(),
            clocks,
            slices,
        })
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The clocks named on the function's `clocks:` line.
    pub fn clocks(&self) -> &[String] {
        &self.clocks
    }

    pub fn slices(&self) -> &[TimeSlice] {
        &self.slices
    }

    pub fn uses_clock(&self, clock: &str) -> bool {
        self.clocks.iter().any(|c| c == clock)
    }

    /// Number of cycles slice `slice` actually lasts, including the cycles
    /// added by the control logic to the first and last slices.
    fn effective_length(&self, slice: usize) -> u64 {
        let mut length = self.slices[slice].length as u64;
        if slice == 0 {
            length += 1;
        }
        if slice + 1 == self.slices.len() {
            length += 2;
        }
        length
    }

    /// Duration of the function in clock cycles.
    pub fn total_time(&self) -> u64 {
        self.slices.iter().map(|s| s.length as u64).sum::<u64>() + 3
    }

    /// The cycle count at the end of each slice.
    pub fn cumulated_time(&self) -> Vec<u64> {
        let mut total = 0;
        (0..self.slices.len())
            .map(|s| {
                total += self.effective_length(s);
                total
            })
            .collect()
    }

    /// State of `channel` during `slice`, or `None` if the function has no
    /// such slice or channel.
    pub fn is_on(&self, channel: u32, slice: usize) -> Option<bool> {
        if channel >= CLOCK_BITS {
            return None;
        }
        self.slices
            .get(slice)
            .map(|s| s.output & (1 << channel) != 0)
    }

    /// The state of `channel` for every cycle of the function, as 0 or 1.
    pub fn scope(&self, channel: u32) -> Vec<u8> {
        let mut scope = vec![0; self.total_time() as usize];
        let mut i = 0;
        for slice in 0..self.slices.len() {
            let length = self.effective_length(slice) as usize;
            if self.is_on(channel, slice) == Some(true) {
                for v in &mut scope[i..i + length] {
                    *v = 1;
                }
            }
            i += length;
        }
        scope
    }

    /// Copies this function into a draft which can be edited.
    pub fn to_draft(&self) -> FunctionDraft {
        FunctionDraft {
            function: self.clone(),
        }
    }

    /// A printable table of the function: clock names written vertically
    /// above their bit column, then one row per slice with the stored
    /// duration and the output word.
    pub fn table(&self, clocks: &ClockMap) -> String {
        let mut s = format!("Function: {}\n    {}\n", self.name, self.description);

        let mut header = [
            format!("{:32}\t ", ""),
            "slice\t duration (x10ns)\t\t ".to_string(),
            format!("{:24}\t\t ", ""),
        ];
        for bit in (0..CLOCK_BITS).rev() {
            match clocks.name(bit) {
                Some(name) => {
                    for (row, line) in header.iter_mut().enumerate() {
                        line.push(name.chars().nth(row).unwrap_or('|'));
                    }
                }
                None => {
                    for line in header.iter_mut() {
                        line.push(' ');
                    }
                }
            }
        }
        for line in &header {
            s.push_str(line);
            s.push('\n');
        }

        s.push_str(&"-".repeat(73));
        s.push('\n');
        for slice in 0..MAX_SLICES {
            let TimeSlice { length, output } = self
                .slices
                .get(slice)
                .copied()
                .unwrap_or_else(|| TimeSlice::new(0, 0));
            s.push_str(&format!(
                "{:02}\t {:8}\t\t\t {:032b}\n",
                slice, length, output
            ));
        }
        s
    }
}

/// A mutable copy of a [`Function`].  Every edit either succeeds completely
/// or leaves the draft unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDraft {
    function: Function,
}

impl FunctionDraft {
    pub fn slices(&self) -> &[TimeSlice] {
        &self.function.slices
    }

    /// Sets `channel` to `value` in `slice`, or in every slice if `slice` is
    /// `None`.
    pub fn set_output_channel(
        &mut self,
        value: bool,
        channel: u32,
        slice: Option<usize>,
    ) -> Result<(), SemanticError> {
        if channel >= CLOCK_BITS {
            return Err(SemanticError::ChannelOutOfRange(channel));
        }
        let set = |s: &mut TimeSlice| {
            if value {
                s.output |= 1 << channel;
            } else {
                s.output &= !(1 << channel);
            }
        };

        match slice {
            None => self.function.slices.iter_mut().for_each(set),
            Some(slice) => {
                let s = self
                    .function
                    .slices
                    .get_mut(slice)
                    .ok_or(SemanticError::NoSuchSlice(slice))?;
                set(s)
            }
        }
        Ok(())
    }

    /// Splits `slice` into two consecutive slices with the same output.  The
    /// first keeps `first` cycles of the stored duration and the second
    /// receives the rest, so the function's total time is unchanged.
    pub fn split_timeslice(&mut self, slice: usize, first: u32) -> Result<(), SemanticError> {
        let mut slices = self.function.slices.clone();
        let length = slices
            .get(slice)
            .map(|s| s.length)
            .ok_or(SemanticError::NoSuchSlice(slice))?;
        if slices.len() >= MAX_SLICES {
            return Err(SemanticError::SliceLimitReached);
        }
        if first == 0 || first > length {
            return Err(SemanticError::SplitOutOfRange {
                slice,
                duration: first,
            });
        }

        let output = slices[slice].output;
        slices[slice].length = first;
        slices.insert(slice + 1, TimeSlice::new(length - first, output));

        // The cycle the control logic adds to the first slice now falls in
        // the first half only.
        if slice == 0 {
            slices[1].length += 1;
            slices[0].length -= 1;
            if slices[0].length == 0 {
                return Err(SemanticError::ZeroFirstSlice);
            }
        }
        if slice + 2 == slices.len() && slices[slice + 1].length == 0 {
            return Err(SemanticError::ZeroLastSlice);
        }

        self.function.slices = slices;
        Ok(())
    }

    /// Sets `channel` to `value` in the slice starting at cycle `clock_time`.
    /// If no slice starts there, the slice containing `clock_time` is split
    /// first.  With `wrap`, times past the end of the function wrap around to
    /// its start.
    pub fn set_output_at_time(
        &mut self,
        value: bool,
        channel: u32,
        clock_time: u64,
        wrap: bool,
    ) -> Result<(), SemanticError> {
        if channel >= CLOCK_BITS {
            return Err(SemanticError::ChannelOutOfRange(channel));
        }
        if self.function.slices.is_empty() {
            return Err(SemanticError::NoSuchSlice(0));
        }

        let mut boundaries = vec![0];
        boundaries.extend(self.function.cumulated_time());
        let end = boundaries[boundaries.len() - 1];

        let mut time = clock_time;
        if time >= end {
            if wrap {
                time %= end;
            } else {
                return Err(SemanticError::TimeAfterEnd { time, end });
            }
        }

        for (slice, boundary) in boundaries.iter().enumerate() {
            if time == *boundary {
                return self.set_output_channel(value, channel, Some(slice));
            } else if time < *boundary {
                // slice > 0 because the first boundary is 0
                let first = u32::try_from(time - boundaries[slice - 1]).unwrap_or(u32::MAX);
                self.split_timeslice(slice - 1, first)?;
                return self.set_output_channel(value, channel, Some(slice));
            }
        }
        Ok(())
    }

    pub fn build(self) -> Function {
        self.function
    }
}

/// The functions of a document, addressable by id or by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionTable {
    functions: BTreeMap<u8, Function>,
    ids: HashMap<String, u8>,
}

impl FunctionTable {
    pub fn new() -> FunctionTable {
        FunctionTable {
            functions: BTreeMap::new(),
            ids: HashMap::new(),
        }
    }

    pub fn insert(&mut self, function: Function) -> Result<(), SemanticError> {
        if self.ids.contains_key(function.name()) || self.functions.contains_key(&function.id())
        {
            return Err(SemanticError::DuplicateDefinition {
                what: "Function",
                name: function.name().into(),
            });
        }
        self.ids.insert(function.name().into(), function.id());
        self.functions.insert(function.id(), function);
        Ok(())
    }

    /// Swaps in a variant of a function already in the table, matched by id
    /// and name, and returns the function it replaces.
    pub fn replace(&mut self, function: Function) -> Result<Function, SemanticError> {
        if self.id_of(function.name()) != Some(function.id()) {
            return Err(SemanticError::UndefinedFunction(function.name().into()));
        }
        let id = function.id();
        self.functions
            .insert(id, function)
            .ok_or(SemanticError::UnknownFunctionId(id as u64))
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.ids.get(name).and_then(|id| self.functions.get(id))
    }

    pub fn by_id(&self, id: u8) -> Option<&Function> {
        self.functions.get(&id)
    }

    pub fn id_of(&self, name: &str) -> Option<u8> {
        self.ids.get(name).copied()
    }

    /// Every function, lowest id first.
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
