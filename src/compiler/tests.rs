#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::compiler::{
        ast::PointerKind,
        compile,
        import::{ImportError, MemoryLoader},
        parser::ParserError,
        program::ProgramError,
        semantics::SemanticError,
        CompileError, CompilerDisplay, Sequencer, SourceMap,
    };
    use crate::config::CompilerConfig;

    const MINIMAL: &str = "\
[constants]
[clocks]
A: 0
[functions]
F:
  clocks: A
  slices:
    100 ns = 1
[mains]
M:
  CALL F
  END
";

    const COMMON: &str = "\
[constants]
clockperiod: 10 ns
Lines: 2
[clocks]
RG: 0
S1: 1
[functions]
Clear:
  clocks: RG, S1
  slices:
    100 ns = 1, 1
    100 ns = 0, 0
[subroutines]
Flush:
  CALL Clear repeat(Lines)
  RTS
[mains]
";

    fn compile_files(files: &[(&str, &str)]) -> (Result<Sequencer, CompileError>, SourceMap) {
        let mut loader = MemoryLoader::new();
        for (path, text) in files {
            loader.add(path, text);
        }
        let mut sm = SourceMap::new();
        let result = compile(
            Path::new(files[0].0),
            &loader,
            &CompilerConfig::default(),
            &mut sm,
        );
        (result, sm)
    }

    #[test]
    fn minimal_document() {
        let (result, _) = compile_files(&[("main.seq", MINIMAL)]);
        let seq = result.unwrap();

        assert_eq!(seq.source(), Path::new("main.seq"));
        assert_eq!(seq.functions().len(), 1);
        assert_eq!(seq.program().len(), 2);
        assert_eq!(seq.clock_period_ps(), 10_000);
        assert_eq!(seq.pointer_value(PointerKind::Main, 0), Ok(0));
        assert_eq!(
            seq.repr_instruction(0).unwrap(),
            "0x000: CALL      func(1 = F)  repeat(1)"
        );
    }

    #[test]
    fn includes_are_merged() {
        let main = "\
[includes]
common.seq
[constants]
clockperiod: 20 ns
[clocks]
[functions]
[mains]
Acq:
  JSR Flush
  END
";
        let (result, _) = compile_files(&[("main.seq", main), ("common.seq", COMMON)]);
        let seq = result.unwrap();

        assert_eq!(seq.clock_period_ps(), 20_000);
        assert_eq!(seq.clock_bit("S1"), Ok(1));
        assert_eq!(seq.routine_address("Acq"), Ok(0));
        assert_eq!(seq.routine_address("Flush"), Ok(8));
        // 100 ns at 20 ns is 5 cycles
        assert_eq!(seq.function("Clear").unwrap().total_time(), 10);
        assert_eq!(
            seq.repr_instruction(8).unwrap(),
            "0x008: CALL      func(1 = Clear)  repeat(2)"
        );
    }

    #[test]
    fn included_pointer_with_taken_name_is_dropped() {
        let main = "\
[includes]
common.seq
[constants]
[clocks]
A: 0
[pointers]
REP_FUNC  N  2
[functions]
F:
  clocks: A
  slices:
    100 ns = 1
[mains]
M:
  CALL F repeat(@N)
  END
";
        let common = "\
[constants]
[clocks]
[pointers]
REP_SUBR  N  5
[functions]
[mains]
";
        let (result, _) = compile_files(&[("main.seq", main), ("common.seq", common)]);
        let seq = result.unwrap();

        let n = seq.pointers().by_name("N").unwrap();
        assert_eq!(n.kind(), PointerKind::RepFunc);
        assert_eq!(n.value(), Some(2));
        assert!(!seq.pointers().has_kind(PointerKind::RepSubr));
    }

    #[test]
    fn undefined_jump_is_located() {
        let text = MINIMAL.replace("  CALL F\n", "  CALL F\n  JSR Nowhere\n");
        let (result, sm) = compile_files(&[("main.seq", &text)]);

        match result {
            Err(CompileError::Program(e)) => {
                assert_eq!(
                    *e.inner(),
                    ProgramError::UndefinedSubroutine("Nowhere".into())
                );
                let msg = CompilerDisplay::fmt(&e, &sm).unwrap();
                assert!(msg.starts_with("main.seq:12:"), "{}", msg);
                assert!(msg.ends_with("Undefined subroutine Nowhere"), "{}", msg);
            }
            other => panic!("Expected a program error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn undeclared_clock() {
        let text = MINIMAL.replace("clocks: A", "clocks: B");
        let (result, _) = compile_files(&[("main.seq", &text)]);

        match result {
            Err(CompileError::Semantic(e)) => assert_eq!(
                *e.inner(),
                SemanticError::UndeclaredClock {
                    function: "F".into(),
                    clock: "B".into()
                }
            ),
            other => panic!("Expected a semantic error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn parser_errors_stop_compilation() {
        let text = MINIMAL.replace("[mains]", "[routines]");
        let (result, _) = compile_files(&[("main.seq", &text)]);

        match result {
            Err(CompileError::Parser(e)) => {
                assert_eq!(*e.inner(), ParserError::UnknownSection("routines".into()))
            }
            other => panic!("Expected a parser error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_file() {
        let loader = MemoryLoader::new();
        let mut sm = SourceMap::new();
        let result = compile(
            Path::new("absent.seq"),
            &loader,
            &CompilerConfig::default(),
            &mut sm,
        );

        match result {
            Err(CompileError::Io(ImportError::Read { span, .. })) => assert!(span.is_none()),
            other => panic!("Expected a read error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn include_cycle() {
        let a = "[includes]\nb.seq\n[constants]\n[clocks]\n[functions]\n[mains]\n";
        let b = "[includes]\na.seq\n[constants]\n[clocks]\n[functions]\n[mains]\n";
        let (result, sm) = compile_files(&[("a.seq", a), ("b.seq", b)]);

        match result {
            Err(e @ CompileError::Include(_)) => {
                let msg = e.fmt(&sm).unwrap();
                assert!(msg.contains("Include cycle"), "{}", msg);
            }
            other => panic!("Expected an include error, got {:?}", other.map(|_| ())),
        }
    }
}
