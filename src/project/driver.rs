use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::cli::{print_errs, ERR_COMPILATION, ERR_QUERY, ERR_WRITE};
use crate::compiler::{
    compile, import::FileLoader, output::render_listing, superscan::scan_sequencers,
    CompilerDisplay, Sequencer, SourceMap,
};
use crate::config::{CompilerConfig, MemoryLayout};

use super::{
    get_project_name, listing_path, manifest_path, scan_listing_path, write_output, Manifest,
};

/// Frames written by a super-scan of one function.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOptions {
    pub dir: PathBuf,
    pub function: String,
    pub trigger: String,
    pub offsets: Vec<u64>,
}

/// What `compile_file` writes besides the listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputOptions {
    /// Listing file, or directory to write the listing in.
    pub output: Option<PathBuf>,
    pub manifest: bool,
    pub superscan: Option<ScanOptions>,
}

/**
 Compiles `src` and writes its listing, and the manifest and super-scan
 frames asked for in `options`.  Returns the path of the listing.

 Nothing is written unless the compilation succeeds.  Errors are printed
 and reported by the exit code the binary should end with.
*/
pub fn compile_file(
    src: &Path,
    options: &OutputOptions,
    config: &CompilerConfig,
    date: &str,
) -> Result<PathBuf, i32> {
    let mut sm = SourceMap::new();
    let compile_time = Instant::now();
    let seq = match compile(src, &FileLoader, config, &mut sm) {
        Ok(seq) => seq,
        Err(e) => {
            let msg = e.fmt(&sm).unwrap_or_else(|de| format!("{:?} ({})", e, de));
            print_errs(&[
                msg,
                format!("Compilation of {} failed: no output.", src.display()),
            ]);
            return Err(ERR_COMPILATION);
        }
    };
    info!(
        "Compiled {} in {:.3}s",
        src.display(),
        compile_time.elapsed().as_secs_f32()
    );
    for warning in seq.warnings() {
        eprintln!("{}: warning: {}", src.display(), warning);
    }

    let listing = listing_path(src, options.output.as_deref());
    write_listing(&seq, &listing, &config.layout, date)?;

    if options.manifest {
        write_manifest(&seq, src, &listing, &config.layout)?;
    }

    if let Some(scan) = &options.superscan {
        superscan(&seq, src, scan, &config.layout, date)?;
    }

    Ok(listing)
}

fn write_listing(
    seq: &Sequencer,
    path: &Path,
    layout: &MemoryLayout,
    date: &str,
) -> Result<(), i32> {
    let text = render_listing(seq, layout, date).map_err(|e| {
        print_errs(&[format!("Could not encode {}: {}", seq.source().display(), e)]);
        ERR_COMPILATION
    })?;
    write_output(path, &text).map_err(|e| {
        print_errs(&[e]);
        ERR_WRITE
    })
}

fn write_manifest(
    seq: &Sequencer,
    src: &Path,
    listing: &Path,
    layout: &MemoryLayout,
) -> Result<(), i32> {
    let name = get_project_name(src).map_err(|e| {
        print_errs(&[e]);
        ERR_WRITE
    })?;
    let path = manifest_path(listing, name);

    let mut text = vec![];
    Manifest::extract(seq, layout)
        .write(&mut text)
        .map_err(|e| format!("Failed to write manifest file: {}", e))
        .and_then(|()| String::from_utf8(text).map_err(|e| format!("{}", e)))
        .and_then(|text| write_output(&path, &text))
        .map_err(|e| {
            print_errs(&[e]);
            ERR_WRITE
        })
}

fn superscan(
    seq: &Sequencer,
    src: &Path,
    scan: &ScanOptions,
    layout: &MemoryLayout,
    date: &str,
) -> Result<(), i32> {
    let frames = scan_sequencers(
        seq,
        &scan.function,
        &scan.trigger,
        scan.offsets.iter().copied(),
    )
    .map_err(|e| {
        print_errs(&[format!("Super-scan of {} failed: {}", src.display(), e)]);
        ERR_QUERY
    })?;

    std::fs::create_dir_all(&scan.dir).map_err(|e| {
        print_errs(&[format!("Could not create {}: {}", scan.dir.display(), e)]);
        ERR_WRITE
    })?;
    for (offset, frame) in &frames {
        write_listing(frame, &scan_listing_path(&scan.dir, *offset, src), layout, date)?;
    }
    info!(
        "Wrote {} super-scan frames of {} to {}",
        frames.len(),
        src.display(),
        scan.dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const READOUT: &str = "\
[constants]
clockperiod: 10 ns
[clocks]
RG: 0
TRG: 5
[functions]
ReadPixel:
  clocks: RG, TRG
  slices:
    100 ns = 1, 0
    200 ns = 0, 1
[mains]
Acq:
  CALL ReadPixel repeat(10)
  END
";

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reb-driver-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn failed_compilation_writes_nothing() {
        let dir = temp_dir("failed");
        let src = dir.join("bad.seq");
        fs::write(&src, READOUT.replace("  END\n", "  JSR Nowhere\n  END\n")).unwrap();
        let options = OutputOptions {
            output: Some(dir.clone()),
            manifest: true,
            ..OutputOptions::default()
        };

        let result = compile_file(&src, &options, &CompilerConfig::default(), "");
        let names = file_names(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(result, Err(ERR_COMPILATION));
        assert_eq!(names, vec!["bad.seq".to_string()]);
    }

    #[test]
    fn text_source_is_compiled_with_manifest() {
        let dir = temp_dir("text");
        let src = dir.join("good.txt");
        fs::write(&src, READOUT).unwrap();
        let options = OutputOptions {
            output: Some(dir.clone()),
            manifest: true,
            ..OutputOptions::default()
        };

        let date = "2024-01-01 00:00:00";
        let result = compile_file(&src, &options, &CompilerConfig::default(), date);
        let names = file_names(&dir);
        let listing = fs::read_to_string(dir.join("good.compiled")).unwrap_or_default();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(result, Ok(dir.join("good.compiled")));
        assert_eq!(
            names,
            vec![
                "good.compiled".to_string(),
                "good.manifest".to_string(),
                "good.txt".to_string()
            ]
        );
        assert!(listing.starts_with("## LSST REB compiled sequencer file\n"));
        assert!(listing.contains("## Compilation date: 2024-01-01 00:00:00\n"));
    }

    #[test]
    fn superscan_frames() {
        let dir = temp_dir("scan");
        let src = dir.join("readout.seq");
        fs::write(&src, READOUT).unwrap();
        let listing = dir.join("out.compiled");
        let options = OutputOptions {
            output: Some(listing.clone()),
            manifest: false,
            superscan: Some(ScanOptions {
                dir: dir.join("frames"),
                function: "ReadPixel".into(),
                trigger: "TRG".into(),
                offsets: vec![0, 10],
            }),
        };

        let result = compile_file(&src, &options, &CompilerConfig::default(), "");
        let frames = file_names(&dir.join("frames"));
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(result, Ok(listing));
        assert_eq!(
            frames,
            vec![
                "scantime_0_readout.compiled".to_string(),
                "scantime_10_readout.compiled".to_string()
            ]
        );
    }

    #[test]
    fn unknown_scan_function_is_a_query_error() {
        let dir = temp_dir("noscan");
        let src = dir.join("readout.seq");
        fs::write(&src, READOUT).unwrap();
        let options = OutputOptions {
            output: Some(dir.clone()),
            manifest: false,
            superscan: Some(ScanOptions {
                dir: dir.join("frames"),
                function: "ReadLine".into(),
                trigger: "TRG".into(),
                offsets: vec![0],
            }),
        };

        let result = compile_file(&src, &options, &CompilerConfig::default(), "");
        let frames_written = dir.join("frames").exists();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(result, Err(ERR_QUERY));
        assert!(!frames_written);
    }
}
