extern crate log;
extern crate simplelog;

use std::path::Path;
use std::process::exit;
use std::time::SystemTime;

use reb_sequencer::compiler::output::utc_timestamp;
use reb_sequencer::project::driver::compile_file;
use reb_sequencer::*;

fn main() {
    let args = configure_cli().get_matches();

    if let Some(level) = get_log_level(&args) {
        if let Err(e) = configure_logging(level) {
            eprintln!("Failed to configure logger: {}", e);
        }
    }

    let input = match args.value_of("input") {
        Some(input) => Path::new(input),
        None => exit(ERR_NO_INPUT),
    };
    let files = match get_files(input, SEQ_FILE_EXT) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            print_errs(&[format!("No sequencer files found in {}", input.display())]);
            exit(ERR_NO_INPUT)
        }
        Err(e) => {
            print_errs(&[format!("Could not open {}: {}", input.display(), e)]);
            exit(ERR_NO_INPUT)
        }
    };

    let (config, options) = match get_compiler_config(&args)
        .and_then(|config| get_output_options(&args).map(|options| (config, options)))
    {
        Ok(settings) => settings,
        Err(msg) => {
            print_errs(&[msg]);
            exit(ERR_NO_INPUT)
        }
    };

    if files.len() > 1 && !options.output.as_ref().map_or(true, |o| o.is_dir()) {
        print_errs(&["The output of a directory of sequencer files must be a directory".into()]);
        exit(ERR_NO_INPUT)
    }

    let date = utc_timestamp(SystemTime::now());
    let mut status = 0;
    for file in &files {
        match compile_file(file, &options, &config, &date) {
            Ok(listing) => println!("{} -> {}", file.display(), listing.display()),
            Err(code) => status = code,
        }
    }
    exit(status)
}
