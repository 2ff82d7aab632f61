/*
 * The compiled listing: the text file loaded into the REB sequencer memory.
 *
 * Every memory word is written on its own line as `0xADDRESS: 0xVALUE`.
 * Lines starting with `#` are comments; the loader ignores them, but the
 * section headers and the routine address table are read by people
 * debugging a sequencer.  The words are grouped in three sections:
 * functions, program and pointers.
 */
use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::compiler::{
    program::ProgramError,
    semantics::{TimeSlice, MAX_SLICES},
    sequencer::Sequencer,
};
use crate::config::MemoryLayout;

mod tests;

/// Name of the compiler written in the listing header.
pub const COMPILER_NAME: &str = "seqc";
pub const COMPILED_EXTENSION: &str = "compiled";

const REB_VERSION: &str = "REB5";
const SEPARATOR_WIDTH: usize = 54;

/// Renders the listing of `seq`.  `date` is written in the header as the
/// compilation date.
pub fn render_listing(
    seq: &Sequencer,
    layout: &MemoryLayout,
    date: &str,
) -> Result<String, ProgramError> {
    let mut out = vec![
        "## LSST REB compiled sequencer file".to_string(),
        format!("## REB: {}", REB_VERSION),
        format!("## Source: {}", seq.source().display()),
        format!("## Compilation date: {}", date),
        format!(
            "## Compiler: {} {}",
            COMPILER_NAME,
            env!("CARGO_PKG_VERSION")
        ),
        format!("## Compiler authors: {}", env!("CARGO_PKG_AUTHORS")),
    ];

    section(&mut out, "functions");
    for function in seq.functions().iter() {
        out.push(rule('-'));
        out.push(format!("## function: #{}", function.id()));
        out.push(format!("##   name:  {}", function.name()));
        out.push(format!("##   description:  {}", function.description()));
        out.push(format!("##   execution time:  {}", function.total_time()));
        out.push("##".into());

        let slice = |i: usize| {
            function
                .slices()
                .get(i)
                .copied()
                .unwrap_or_else(|| TimeSlice::new(0, 0))
        };
        let mut words: Vec<(u32, u32)> = (0..MAX_SLICES)
            .flat_map(|i| {
                vec![
                    (layout.output_address(function.id(), i), slice(i).output),
                    (layout.slice_address(function.id(), i), slice(i).length),
                ]
            })
            .collect();
        words.sort_by_key(|(address, _)| *address);
        out.extend(words.into_iter().map(|(a, v)| word(a, v)));
    }

    section(&mut out, "subroutines/mains");
    out.push(rule('-'));
    out.push("## Main/Subroutine relative addresses".into());
    out.push(format!("## (program base addr 0x{:06x})", layout.program));
    out.push("## ".into());
    for routine in seq.program().routines() {
        out.push(format!("# {}: 0x{:06x}", routine.name, routine.address));
    }
    out.push(rule('-'));
    for (address, value) in seq.program().bytecode(layout.program)? {
        out.push(word(address, value));
    }

    section(&mut out, "pointers");
    for pointer in seq.pointers().iter() {
        let value = pointer
            .value()
            .ok_or_else(|| ProgramError::Unresolved(pointer.name().into()))?;
        out.push(format!(
            "0x{:06x}: 0x{:06x}   # {}:  {}",
            pointer.address(layout),
            value,
            pointer.kind(),
            pointer.name()
        ));
    }
    out.push(rule('='));

    let mut listing = out.join("\n");
    listing.push('\n');
    Ok(listing)
}

fn rule(c: char) -> String {
    format!("## {}", c.to_string().repeat(SEPARATOR_WIDTH))
}

fn section(out: &mut Vec<String>, name: &str) {
    out.push(rule('='));
    out.push(format!("# [{}]", name));
    out.push("##".into());
}

fn word(address: u32, value: u32) -> String {
    format!("0x{:06x}: 0x{:08x}", address, value)
}

/// The name of the listing for `source`: its file name with a `.seq` or
/// `.txt` extension replaced by `.compiled`, or with `.compiled` appended.
pub fn compiled_file_name(source: &Path) -> PathBuf {
    let file = PathBuf::from(source.file_name().unwrap_or_default());
    match file.extension().and_then(|e| e.to_str()) {
        Some("seq") | Some("txt") => file.with_extension(COMPILED_EXTENSION),
        _ => {
            let mut name = file.into_os_string();
            name.push(".");
            name.push(COMPILED_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// `time` in UTC as `YYYY-MM-DD HH:MM:SS`.
pub fn utc_timestamp(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (days, rem) = ((secs / 86_400) as i64, secs % 86_400);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date of the day `days` after 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
