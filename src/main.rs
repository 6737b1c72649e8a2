//! dupereview command-line entry point.

use clap::Parser;
use dupereview::{
    cli::{Cli, OutputFormat},
    error::{ExitCode, StructuredError},
    logging::init_logging,
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    // The review screen owns the terminal; without a log file only errors reach stderr
    let interactive = cli.output == OutputFormat::Tui && cli.log_file.is_none();
    let quiet = cli.quiet || (interactive && cli.verbose == 0);
    if let Err(e) = init_logging(cli.verbose, quiet, cli.log_file.as_deref()) {
        eprintln!(
            "[{}] Error: cannot open log file: {}",
            ExitCode::GeneralError.code_prefix(),
            e
        );
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    match dupereview::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
