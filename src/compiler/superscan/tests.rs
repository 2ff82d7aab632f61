#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::compiler::{
        compile,
        import::MemoryLoader,
        semantics::{Function, TimeSlice},
        source::SourceMap,
        superscan::*,
        QueryError, Sequencer,
    };
    use crate::config::CompilerConfig;

    const TRG: u32 = 5;

    // Stored lengths 9, 10 and 8: slices start at cycles 0, 10 and 20 and
    // the function ends at cycle 30.
    fn read_pixel() -> Function {
        Function::new(
            2,
            "ReadPixel",
            "",
            vec!["S1".into(), "TRG".into()],
            vec![
                TimeSlice::new(9, 0b000010),
                TimeSlice::new(10, 0b100000),
                TimeSlice::new(8, 0b000010),
            ],
        )
        .unwrap()
    }

    fn triggered_slices(f: &Function) -> Vec<usize> {
        (0..f.slices().len())
            .filter(|s| f.is_on(TRG, *s) == Some(true))
            .collect()
    }

    #[test]
    fn trigger_moves_with_offset() {
        let base = read_pixel();
        let scan = trigger_scan(&base, TRG, vec![0, 10, 15]).unwrap();
        assert_eq!(scan.len(), 3);

        let (offset, f) = &scan[0];
        assert_eq!(*offset, 0);
        assert_eq!(triggered_slices(f), vec![0]);
        assert_eq!(f.slices().len(), 3);

        let (_, f) = &scan[1];
        assert_eq!(triggered_slices(f), vec![1]);

        let (_, f) = &scan[2];
        let lengths: Vec<u32> = f.slices().iter().map(|s| s.length).collect();
        assert_eq!(lengths, vec![9, 5, 5, 8]);
        assert_eq!(triggered_slices(f), vec![2]);
        assert_eq!(f.total_time(), base.total_time());

        assert_eq!(base, read_pixel());
    }

    #[test]
    fn offsets_wrap_past_the_end() {
        let scan = trigger_scan(&read_pixel(), TRG, vec![35]).unwrap();
        let (_, f) = &scan[0];
        let lengths: Vec<u32> = f.slices().iter().map(|s| s.length).collect();
        assert_eq!(lengths, vec![4, 5, 10, 8]);
        assert_eq!(triggered_slices(f), vec![1]);
    }

    #[test]
    fn unplaceable_offsets_are_skipped() {
        let slices = (0..16).map(|_| TimeSlice::new(4, 0)).collect();
        let full = Function::new(1, "Full", "", vec![], slices).unwrap();

        // 5 is on a slice boundary, 6 would need a seventeenth slice
        let scan = trigger_scan(&full, TRG, vec![5, 6]).unwrap();
        let offsets: Vec<u64> = scan.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![5]);
    }

    #[test]
    fn default_scan_points() {
        let offsets: Vec<u64> = default_offsets().collect();
        assert_eq!(offsets.len(), 100);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[99], 198);
    }

    #[test]
    fn scan_file_names() {
        assert_eq!(
            scan_file_name(12, Path::new("seq/readout.seq")),
            "scantime_12_readout.seq"
        );
    }

    fn compile_text(text: &str) -> Sequencer {
        let mut loader = MemoryLoader::new();
        loader.add("scan.seq", text);
        compile(
            Path::new("scan.seq"),
            &loader,
            &CompilerConfig::default(),
            &mut SourceMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn one_sequencer_per_frame() {
        let text = "\
[constants]
[clocks]
S1: 1
TRG: 5
[functions]
ReadPixel:
  clocks: S1, TRG
  slices:
    100 ns = 1, 1
    100 ns = 0, 1
    100 ns = 1, 1
[mains]
Acq:
  CALL ReadPixel
  END
";
        let seq = compile_text(text);
        let frames = scan_sequencers(&seq, "ReadPixel", TRIGGER_CLOCK, vec![0, 20]).unwrap();
        assert_eq!(frames.len(), 2);

        let scope = frames[1].1.scope("ReadPixel", "TRG").unwrap();
        let mut expected = vec![0; 20];
        expected.extend(vec![1; 10]);
        assert_eq!(scope, expected);
        assert_eq!(seq.scope("ReadPixel", "TRG").unwrap(), vec![1; 30]);

        assert_eq!(
            scan_sequencers(&seq, "ReadPixel", "ADC", vec![0]).map(|f| f.len()),
            Err(QueryError::UnknownClock("ADC".into()))
        );
    }
}
