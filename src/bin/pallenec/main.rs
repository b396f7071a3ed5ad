//! # pallenec
//!
//! The Pallene compiler binary. Dispatches between the emit modes,
//! renders diagnostics to standard error in
//! `<file>:<line>:<col>: <kind>: <message>` form and exits non-zero on
//! any failure.

mod cli;

use std::process::ExitCode;

use colored::Colorize;
use log::debug;

use pallenec::driver::{self, Config, Mode, StopAfter};

use cli::Cli;

fn main() -> ExitCode {
    let args = Cli::init();

    simple_logger::init_with_level(log::Level::from(args.verbosity)).unwrap();

    if let Some((first, second)) = args.conflicting_flags() {
        eprintln!("Error: option '{second}' can not be used together with option '{first}'");
        return ExitCode::FAILURE;
    }

    let config = Config::default();
    let mode = args.mode();

    if (args.dump_ast || args.dump_ir) && mode != Mode::EmitAsm && mode != Mode::CompileC {
        if let Err(error) = dump(&args, &config) {
            report(&error);
            return ExitCode::FAILURE;
        }
    }

    match driver::compile_file(&args.input, mode, &config) {
        Ok(output) => {
            debug!("wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

fn dump(args: &Cli, config: &Config) -> Result<(), driver::CompileError> {
    let source = std::fs::read_to_string(&args.input)
        .map_err(|e| driver::CompileError::Io(format!("{}: {e}", args.input.display())))?;
    let file_name = args.input.to_string_lossy();

    let stop_after = if args.dump_ir {
        StopAfter::Optimize
    } else {
        StopAfter::Check
    };
    let config = Config {
        stop_after,
        passes: config.passes.clone(),
    };
    let artifacts = driver::compile_source(&file_name, &source, &config)?;

    if args.dump_ast {
        let checked = artifacts.checked.as_ref().unwrap();
        println!("{}", serde_json::to_string_pretty(&checked.program).unwrap());
    }
    if args.dump_ir {
        let module = artifacts.ir.as_ref().unwrap();
        println!("{}", serde_json::to_string_pretty(module).unwrap());
    }
    Ok(())
}

fn report(error: &driver::CompileError) {
    for line in error.render() {
        eprintln!("{}", line.red());
    }
}
