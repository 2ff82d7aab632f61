#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::compiler::{
        compile, import::MemoryLoader, sequencer::QueryError, source::SourceMap, timing::*,
        Sequencer,
    };
    use crate::config::CompilerConfig;

    const ACQUISITION: &str = "\
[constants]
clockperiod: 10 ns
[clocks]
RG: 0
S1: 1
TRG: 5
[pointers]
PTR_FUNC  Fp    ReadPixel
REP_FUNC  Cols  4
PTR_SUBR  Sp    Flush
REP_SUBR  Rs    2
[functions]
Default:
  clocks: RG
  slices:
    100 ns = 0
Clear:
  clocks: RG, S1
  slices:
    100 ns = 1, 0
    50 ns = 0, 1
    80 ns = 1, 1
ReadPixel:
  clocks: S1, TRG
  slices:
    200 ns = 1, 0
    100 ns = 0, 1
[subroutines]
Flush:
  CALL Clear repeat(3)
  RTS
ReadLine:
  CALL Default
  CALL @Fp repeat(@Cols)
  RTS
Spin:
  JSR Spin
  RTS
[mains]
Acq:
  JSR @Sp repeat(@Rs)
  JSR ReadLine repeat(2)
  END
Idle:
  CALL Default repeat(infinity)
  END
Looping:
  JSR Flush
  JSR Spin
  END
";

    fn compile_text(text: &str) -> Sequencer {
        let mut loader = MemoryLoader::new();
        loader.add("test.seq", text);
        compile(
            Path::new("test.seq"),
            &loader,
            &CompilerConfig::default(),
            &mut SourceMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn breakdown_of_acquisition() {
        let seq = compile_text(ACQUISITION);
        let breakdown = breakdown(&seq, "Acq").unwrap();

        let lines: Vec<String> = breakdown.lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "0x000: JSPREP    0: Sp -> Flush  repeat(0: Rs -> 2) = run time: 1.38 us  ",
                "__0x018: CALL      func(1 = Clear)  repeat(3) = run time: 0.69 us  ",
                "__0x019: RTS      = subtotal: 0.69 us",
                "0x001: JSR       0x020 -> ReadLine  repeat(2) = run time: 2.64 us  ",
                "__0x020: CALL      func(0 = Default)  repeat(1) = run time: 0.12 us  ",
                "__0x021: CALLPREP  func(0: Fp -> ReadPixel)  repeat(0: Cols -> 4) = run time: 1.20 us  ",
                "__0x022: RTS      = subtotal: 1.32 us",
                "0x002: END      = subtotal: 4.02 us",
            ]
        );
        assert_eq!(breakdown.routine, "Acq");
        assert_eq!(breakdown.total.picos(), 4_020_000);
        assert!(!breakdown.total.is_lower_bound());
        assert_eq!(breakdown.to_string().lines().count(), 8);
    }

    #[test]
    fn lines_carry_depth_and_address() {
        let seq = compile_text(ACQUISITION);
        let breakdown = breakdown(&seq, "Acq").unwrap();

        let positions: Vec<(usize, u16)> = breakdown
            .lines
            .iter()
            .map(|l| (l.depth, l.address))
            .collect();
        assert_eq!(
            positions,
            vec![
                (0, 0),
                (1, 0x18),
                (1, 0x19),
                (0, 1),
                (1, 0x20),
                (1, 0x21),
                (1, 0x22),
                (0, 2)
            ]
        );
    }

    #[test]
    fn total_time() {
        let seq = compile_text(ACQUISITION);

        let total = timing(&seq, "Acq").unwrap();
        assert_eq!(total.as_ns(), 4020.0);
        assert_eq!(total.to_string(), "4.02 us");

        let flush = timing(&seq, "Flush").unwrap();
        assert_eq!(flush, ExecutionTime::from_cycles(69, 10_000));
    }

    #[test]
    fn sequence_has_no_times() {
        let seq = compile_text(ACQUISITION);
        let lines = sequence(&seq, "Flush").unwrap();
        assert_eq!(
            lines,
            vec!["0x018: CALL      func(1 = Clear)  repeat(3)", "0x019: RTS     "]
        );
    }

    #[test]
    fn infinite_loop_is_a_lower_bound() {
        let seq = compile_text(ACQUISITION);
        let total = timing(&seq, "Idle").unwrap();

        assert!(total.is_lower_bound());
        assert_eq!(total.picos(), 120_000);
        assert_eq!(total.to_string(), ">= 0.12 us");
    }

    #[test]
    fn unknown_routine() {
        let seq = compile_text(ACQUISITION);
        assert_eq!(
            timing(&seq, "Readout"),
            Err(QueryError::UnknownRoutine("Readout".into()))
        );
    }

    #[test]
    fn recursion_is_reported() {
        let seq = compile_text(ACQUISITION);
        assert_eq!(
            breakdown(&seq, "Looping"),
            Err(QueryError::Recursion("Spin".into()))
        );
    }

    #[test]
    fn clock_period_scales_time() {
        let seq = compile_text(&ACQUISITION.replace("clockperiod: 10 ns", "clockperiod: 20 ns"));
        // 50 ns truncates to 2 cycles
        assert_eq!(seq.function("Clear").unwrap().total_time(), 11);
        assert_eq!(timing(&seq, "Flush").unwrap().picos(), 11 * 3 * 20_000);
    }

    #[test]
    fn breakdown_as_json() {
        let seq = compile_text(ACQUISITION);
        let json = serde_json::to_value(&breakdown(&seq, "Flush").unwrap()).unwrap();

        assert_eq!(json["routine"], "Flush");
        assert_eq!(json["lines"][0]["address"], 0x18);
        assert_eq!(json["lines"][0]["time"]["run"]["picos"], 690_000);
        assert_eq!(json["lines"][1]["time"]["subtotal"]["lower_bound"], false);
        assert_eq!(json["total"]["picos"], 690_000);
    }
}
