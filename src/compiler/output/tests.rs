#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        time::{Duration, UNIX_EPOCH},
    };

    use crate::compiler::{
        compile, import::MemoryLoader, output::*, source::SourceMap, Sequencer,
    };
    use crate::config::{CompilerConfig, MemoryLayout};

    const FLUSH: &str = "\
[constants]
clockperiod: 10 ns
[clocks]
RG: 0
S1: 1
[pointers]
REP_FUNC  Cols  4
PTR_SUBR  Sp    Flush
[functions]
Clear:   # wipe
  clocks: RG, S1
  slices:
    100 ns = 1, 0
    50 ns = 0, 1
[subroutines]
Flush:
  CALL Clear repeat(3)
  RTS
[mains]
Acq:
  JSR Flush
  END
";

    fn compile_text(text: &str) -> Sequencer {
        let mut loader = MemoryLoader::new();
        loader.add("listing.seq", text);
        compile(
            Path::new("listing.seq"),
            &loader,
            &CompilerConfig::default(),
            &mut SourceMap::new(),
        )
        .unwrap()
    }

    fn listing() -> String {
        let seq = compile_text(FLUSH);
        render_listing(&seq, &MemoryLayout::default(), "2024-01-01 00:00:00").unwrap()
    }

    #[test]
    fn header() {
        let listing = listing();
        let lines: Vec<&str> = listing.lines().take(6).collect();
        assert_eq!(
            lines,
            vec![
                "## LSST REB compiled sequencer file".to_string(),
                "## REB: REB5".to_string(),
                "## Source: listing.seq".to_string(),
                "## Compilation date: 2024-01-01 00:00:00".to_string(),
                format!("## Compiler: seqc {}", env!("CARGO_PKG_VERSION")),
                format!("## Compiler authors: {}", env!("CARGO_PKG_AUTHORS")),
            ]
        );
    }

    #[test]
    fn function_block() {
        let listing = listing();
        let lines: Vec<&str> = listing.lines().collect();
        let start = lines
            .iter()
            .position(|l| *l == "## function: #1")
            .unwrap();
        assert_eq!(
            &lines[start..start + 7],
            &[
                "## function: #1",
                "##   name:  Clear",
                "##   description:  wipe",
                "##   execution time:  15",
                "##",
                "0x100010: 0x00000001",
                "0x100011: 0x00000002",
            ]
        );
        assert_eq!(lines[start + 7], "0x100012: 0x00000000");
        assert_eq!(lines[start + 20], "0x10001f: 0x00000000");
        assert_eq!(lines[start + 21], "0x200010: 0x00000009");
        assert_eq!(lines[start + 22], "0x200011: 0x00000003");
        assert_eq!(lines[start + 36], "0x20001f: 0x00000000");
    }

    #[test]
    fn program_section() {
        let listing = listing();
        let lines: Vec<&str> = listing.lines().collect();
        let start = lines
            .iter()
            .position(|l| *l == "# [subroutines/mains]")
            .unwrap();
        assert_eq!(
            &lines[start + 2..start + 11],
            &[
                "## ------------------------------------------------------",
                "## Main/Subroutine relative addresses",
                "## (program base addr 0x300000)",
                "## ",
                "# Acq: 0x000000",
                "# Flush: 0x000008",
                "## ------------------------------------------------------",
                "0x300000: 0x50080001",
                "0x300001: 0xf0000000",
            ]
        );
        assert_eq!(lines[start + 11], "0x300008: 0x11000003");
        assert_eq!(lines[start + 12], "0x300009: 0xe0000000");
    }

    #[test]
    fn pointer_section() {
        let listing = listing();
        let lines: Vec<&str> = listing.lines().collect();
        let start = lines.iter().position(|l| *l == "# [pointers]").unwrap();
        assert_eq!(
            &lines[start + 1..],
            &[
                "##",
                "0x360000: 0x000004   # REP_FUNC:  Cols",
                "0x370000: 0x000008   # PTR_SUBR:  Sp",
                "0x340000: 0x000000   # MAIN:  Main",
                "## ======================================================",
            ]
        );
        assert!(listing.ends_with("=\n"));
    }

    #[test]
    fn sections_in_order() {
        let listing = listing();
        let sections: Vec<&str> = listing
            .lines()
            .filter(|l| l.starts_with("# ["))
            .collect();
        assert_eq!(
            sections,
            vec!["# [functions]", "# [subroutines/mains]", "# [pointers]"]
        );
        assert_eq!(listing.lines().filter(|l| l.starts_with("0x")).count(), 32 + 4 + 3);
    }

    #[test]
    fn layout_moves_regions() {
        let seq = compile_text(FLUSH);
        let layout = MemoryLayout {
            program: 0x40_0000,
            ..MemoryLayout::default()
        };
        let listing = render_listing(&seq, &layout, "").unwrap();
        assert!(listing.contains("## (program base addr 0x400000)\n"));
        assert!(listing.contains("0x400008: 0x11000003\n"));
        assert!(!listing.contains("0x300000:"));
    }

    #[test]
    fn compiled_file_names() {
        assert_eq!(
            compiled_file_name(Path::new("seq/readout.seq")),
            PathBuf::from("readout.compiled")
        );
        assert_eq!(
            compiled_file_name(Path::new("readout.txt")),
            PathBuf::from("readout.compiled")
        );
        assert_eq!(
            compiled_file_name(Path::new("readout.v2")),
            PathBuf::from("readout.v2.compiled")
        );
        assert_eq!(
            compiled_file_name(Path::new("readout")),
            PathBuf::from("readout.compiled")
        );
    }

    #[test]
    fn timestamps() {
        assert_eq!(utc_timestamp(UNIX_EPOCH), "1970-01-01 00:00:00");
        assert_eq!(
            utc_timestamp(UNIX_EPOCH + Duration::from_secs(951_782_400)),
            "2000-02-29 00:00:00"
        );
        assert_eq!(
            utc_timestamp(UNIX_EPOCH + Duration::from_secs(1_704_067_199)),
            "2023-12-31 23:59:59"
        );
    }
}
