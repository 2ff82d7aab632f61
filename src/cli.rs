use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use std::path::PathBuf;

use crate::compiler::superscan::{default_offsets, TRIGGER_CLOCK};
use crate::config::{CompilerConfig, MemoryLayout};
use crate::diagnostics::TracingConfig;
use crate::project::driver::{OutputOptions, ScanOptions};

// Exit Codes for different types of errors
pub const ERR_NO_INPUT: i32 = 1;
pub const ERR_COMPILATION: i32 = 2;
pub const ERR_WRITE: i32 = 3;
pub const ERR_QUERY: i32 = 4;

/// Function whose trigger is moved by a super-scan when none is named.
pub const DEFAULT_SCAN_FUNCTION: &str = "ReadPixel";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn print_errs(errs: &[String]) {
    for e in errs {
        eprintln!("{}", e);
    }
}

fn log_level_arg() -> Arg<'static, 'static> {
    Arg::with_name("log-level")
        .long("log-level")
        .possible_values(&LOG_LEVELS)
        .takes_value(true)
        .help("Prints the log messages of the compiler passes at this level and above")
}

pub fn configure_cli() -> clap::App<'static, 'static> {
    App::new("REB Sequencer Compiler")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Compiles REB sequencer files into the listing loaded in the sequencer memory")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Sequencer file to compile, or a directory of sequencer files"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Listing file to write, or the directory to write listings in.  Defaults to the source file name with the .compiled extension in the current directory"),
        )
        .arg(
            Arg::with_name("layout")
                .long("layout")
                .takes_value(true)
                .help("YAML file with the base addresses of the memory regions")
        )
        .arg(
            Arg::with_name("manifest")
                .long("manifest")
                .takes_value(false)
                .help("Write a YAML manifest of the clocks, functions, routines and pointers next to each listing")
        )
        .arg(log_level_arg())
        .arg(
            Arg::with_name("trace-parser")
                .long("trace-parser")
                .takes_value(true)
                .help("Prints the parser rules attempted at the given source lines: all, N, N..M, ..M or N..")
        )
        .arg(
            Arg::with_name("superscan")
                .long("superscan")
                .takes_value(true)
                .help("Writes one listing per super-scan frame into this directory, with the trigger moved through the readout function")
        )
        .arg(
            Arg::with_name("scan-function")
                .long("scan-function")
                .takes_value(true)
                .requires("superscan")
                .help("Function scanned by --superscan (default ReadPixel)")
        )
        .arg(
            Arg::with_name("trigger")
                .long("trigger")
                .takes_value(true)
                .requires("superscan")
                .help("Clock moved by --superscan (default TRG)")
        )
        .arg(
            Arg::with_name("offsets")
                .long("offsets")
                .takes_value(true)
                .requires("superscan")
                .help("Comma separated trigger offsets, in clock cycles, for --superscan (default every second cycle up to 200)")
        )
}

pub fn configure_timing_cli() -> clap::App<'static, 'static> {
    App::new("REB Sequencer Timing")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Prints the execution time of a routine of a sequencer file, or the table of one of its functions")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Sequencer file to compile"),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .required(true)
                .help("Main, subroutine or function to report on"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .takes_value(false)
                .help("Prints the breakdown of a routine as JSON"),
        )
        .arg(log_level_arg())
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    args.value_of("log-level").map(|level| match level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Off,
    })
}

pub fn configure_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}

pub fn get_parser_tracing(args: &ArgMatches) -> Result<TracingConfig, String> {
    TracingConfig::parse(args.value_of("trace-parser"))
}

pub fn get_scan_function<'a>(args: &'a ArgMatches) -> &'a str {
    args.value_of("scan-function").unwrap_or(DEFAULT_SCAN_FUNCTION)
}

pub fn get_trigger_clock<'a>(args: &'a ArgMatches) -> &'a str {
    args.value_of("trigger").unwrap_or(TRIGGER_CLOCK)
}

pub fn get_scan_offsets(args: &ArgMatches) -> Result<Vec<u64>, String> {
    match args.value_of("offsets") {
        None => Ok(default_offsets().collect()),
        Some(offsets) => parse_offsets(offsets),
    }
}

pub fn get_compiler_config(args: &ArgMatches) -> Result<CompilerConfig, String> {
    let tracing = get_parser_tracing(args)?;
    let layout = match args.value_of("layout") {
        None => MemoryLayout::default(),
        Some(path) => std::fs::File::open(path)
            .map_err(|e| format!("Could not open {}: {}", path, e))
            .and_then(|f| {
                MemoryLayout::read(f).map_err(|e| format!("Invalid layout {}: {}", path, e))
            })?,
    };

    Ok(CompilerConfig {
        layout,
        tracing,
        ..CompilerConfig::default()
    })
}

pub fn get_output_options(args: &ArgMatches) -> Result<OutputOptions, String> {
    let superscan = match args.value_of("superscan") {
        None => None,
        Some(dir) => Some(ScanOptions {
            dir: PathBuf::from(dir),
            function: get_scan_function(args).into(),
            trigger: get_trigger_clock(args).into(),
            offsets: get_scan_offsets(args)?,
        }),
    };

    Ok(OutputOptions {
        output: args.value_of("output").map(PathBuf::from),
        manifest: args.is_present("manifest"),
        superscan,
    })
}

fn parse_offsets(offsets: &str) -> Result<Vec<u64>, String> {
    offsets
        .split(',')
        .map(|o| {
            o.trim()
                .parse::<u64>()
                .map_err(|_| format!("Invalid trigger offset: {}", o))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_arguments() {
        let args = configure_cli()
            .get_matches_from_safe(vec![
                "seqc",
                "-i",
                "readout.seq",
                "--log-level",
                "debug",
                "--trace-parser",
                "3..5",
                "--superscan",
                "scan",
                "--offsets",
                "0, 4,8",
            ])
            .unwrap();

        assert_eq!(args.value_of("input"), Some("readout.seq"));
        assert_eq!(get_log_level(&args), Some(LevelFilter::Debug));
        assert_eq!(get_parser_tracing(&args), Ok(TracingConfig::Between(3, 5)));
        assert_eq!(get_scan_function(&args), "ReadPixel");
        assert_eq!(get_trigger_clock(&args), "TRG");
        assert_eq!(get_scan_offsets(&args), Ok(vec![0, 4, 8]));
        assert!(!args.is_present("manifest"));
    }

    #[test]
    fn defaults() {
        let args = configure_cli()
            .get_matches_from_safe(vec!["seqc", "--input", "readout.seq"])
            .unwrap();

        assert_eq!(get_log_level(&args), None);
        assert_eq!(get_parser_tracing(&args), Ok(TracingConfig::Off));
        assert_eq!(get_scan_offsets(&args).map(|o| o.len()), Ok(100));
    }

    #[test]
    fn scan_options_need_superscan() {
        assert!(configure_cli()
            .get_matches_from_safe(vec!["seqc", "-i", "a.seq", "--trigger", "RG"])
            .is_err());
        assert!(configure_cli()
            .get_matches_from_safe(vec!["seqc", "-i", "a.seq", "--log-level", "loud"])
            .is_err());
    }

    #[test]
    fn output_options() {
        let args = configure_cli()
            .get_matches_from_safe(vec![
                "seqc",
                "-i",
                "readout.txt",
                "-o",
                "out",
                "--manifest",
                "--superscan",
                "scan",
                "--scan-function",
                "Clear",
                "--offsets",
                "2,4",
            ])
            .unwrap();

        assert_eq!(
            get_output_options(&args),
            Ok(OutputOptions {
                output: Some(PathBuf::from("out")),
                manifest: true,
                superscan: Some(ScanOptions {
                    dir: PathBuf::from("scan"),
                    function: "Clear".into(),
                    trigger: "TRG".into(),
                    offsets: vec![2, 4],
                }),
            })
        );

        let args = configure_cli()
            .get_matches_from_safe(vec!["seqc", "-i", "readout.seq"])
            .unwrap();
        assert_eq!(get_output_options(&args), Ok(OutputOptions::default()));
        assert_eq!(get_compiler_config(&args), Ok(CompilerConfig::default()));
    }

    #[test]
    fn missing_layout_file() {
        let args = configure_cli()
            .get_matches_from_safe(vec!["seqc", "-i", "a.seq", "--layout", "no/such/layout.yaml"])
            .unwrap();
        let err = get_compiler_config(&args).unwrap_err();
        assert!(err.starts_with("Could not open no/such/layout.yaml"), "{}", err);
    }

    #[test]
    fn bad_offsets() {
        assert!(parse_offsets("1,x").is_err());
    }

    #[test]
    fn timing_arguments() {
        let args = configure_timing_cli()
            .get_matches_from_safe(vec!["seqtiming", "-i", "a.seq", "-n", "Acq", "--json"])
            .unwrap();
        assert_eq!(args.value_of("name"), Some("Acq"));
        assert!(args.is_present("json"));
    }
}
