use std::fs;
use std::path::PathBuf;
use std::process::Command;

use reb_sequencer::{ERR_COMPILATION, ERR_NO_INPUT, ERR_QUERY};

const READOUT: &str = "\
[constants]
clockperiod: 10 ns
[clocks]
RG: 0
[functions]
ReadPixel:
  clocks: RG
  slices:
    100 ns = 1
    200 ns = 0
[mains]
Acq:
  CALL ReadPixel repeat(10)
  END
";

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reb-exit-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn seqc_status() {
    let dir = temp_dir("seqc");
    let good = dir.join("good.txt");
    let bad = dir.join("bad.seq");
    fs::write(&good, READOUT).unwrap();
    fs::write(&bad, READOUT.replace("  END\n", "  JSR Nowhere\n  END\n")).unwrap();

    let run = |input: &PathBuf| {
        Command::new(env!("CARGO_BIN_EXE_seqc"))
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(&dir)
            .output()
            .unwrap()
    };

    let ok = run(&good);
    let failed = run(&bad);
    let missing = run(&dir.join("notes.yaml"));
    let bad_listing = dir.join("bad.compiled").exists();
    let good_listing = dir.join("good.compiled").exists();
    fs::remove_dir_all(&dir).unwrap();

    assert_eq!(ok.status.code(), Some(0));
    assert!(good_listing);

    assert_eq!(failed.status.code(), Some(ERR_COMPILATION));
    let stderr = String::from_utf8_lossy(&failed.stderr);
    assert!(stderr.contains("Undefined subroutine Nowhere"), "{}", stderr);
    assert!(!stderr.contains(&format!("Error: {}", ERR_COMPILATION)), "{}", stderr);
    assert!(!bad_listing);

    assert_eq!(missing.status.code(), Some(ERR_NO_INPUT));
}

#[test]
fn seqtiming_status() {
    let dir = temp_dir("seqtiming");
    let src = dir.join("readout.seq");
    fs::write(&src, READOUT).unwrap();

    let run = |name: &str| {
        Command::new(env!("CARGO_BIN_EXE_seqtiming"))
            .arg("-i")
            .arg(&src)
            .arg("-n")
            .arg(name)
            .output()
            .unwrap()
    };

    let routine = run("Acq");
    let unknown = run("Nothing");
    fs::remove_dir_all(&dir).unwrap();

    assert_eq!(routine.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&routine.stdout).contains("Total time: "));
    assert_eq!(unknown.status.code(), Some(ERR_QUERY));
}
