extern crate log;
extern crate simplelog;

use std::path::Path;
use std::process::exit;

use reb_sequencer::compiler::{
    import::FileLoader,
    timing::{breakdown, ExecutionTime},
};
use reb_sequencer::*;

fn main() {
    let args = configure_timing_cli().get_matches();

    if let Some(level) = get_log_level(&args) {
        if let Err(e) = configure_logging(level) {
            eprintln!("Failed to configure logger: {}", e);
        }
    }

    if let Err(code) = report(&args) {
        exit(code)
    }
}

fn report(args: &clap::ArgMatches) -> Result<(), i32> {
    let input = Path::new(args.value_of("input").ok_or(ERR_NO_INPUT)?);
    let name = args.value_of("name").ok_or(ERR_NO_INPUT)?;

    let mut sm = SourceMap::new();
    let seq = match compile(input, &FileLoader, &CompilerConfig::default(), &mut sm) {
        Ok(seq) => seq,
        Err(e) => {
            print_errs(&[e.fmt(&sm).unwrap_or_else(|de| format!("{:?} ({})", e, de))]);
            return Err(ERR_COMPILATION);
        }
    };

    if seq.routine_address(name).is_ok() {
        let breakdown = breakdown(&seq, name).map_err(|e| {
            print_errs(&[format!("{}", e)]);
            ERR_QUERY
        })?;
        if args.is_present("json") {
            let json = serde_json::to_string_pretty(&breakdown).map_err(|e| {
                print_errs(&[format!("{}", e)]);
                ERR_WRITE
            })?;
            println!("{}", json);
        } else {
            print!("{}", breakdown);
            println!("Total time: {}", breakdown.total);
        }
    } else if let Ok(function) = seq.function(name) {
        let table = seq.function_table(name).map_err(|e| {
            print_errs(&[format!("{}", e)]);
            ERR_QUERY
        })?;
        let total = ExecutionTime::from_cycles(function.total_time(), seq.clock_period_ps());
        print!("{}", table);
        println!("Total time: {} ns", total.as_ns());
    } else {
        print_errs(&[format!(
            "{} has no routine or function named {}",
            input.display(),
            name
        )]);
        return Err(ERR_QUERY);
    }

    Ok(())
}
