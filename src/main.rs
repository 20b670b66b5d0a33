use clap::Parser;
use std::process;

use clo::cli;
use clo::cli::commands::Cli;

fn main() {
    let cli_args = Cli::parse();
    cli::logging::init(cli_args.verbose);

    let exit_code = match cli::run::run(&cli_args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    process::exit(exit_code);
}
