use std::io;
use std::process::ExitCode;

use best_route::routing::config::{CommandLineArgs, Config};
use best_route::routing::logging::{init_console_logging_thread_local, init_logging};
use best_route::routing::run::{exit_code, run};
use clap::Parser;
use tracing::info;

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();

    let config = {
        let _guard = init_console_logging_thread_local();
        info!("Started with args: {:?}", args);
        match Config::from_args(&args) {
            Ok(config) => config,
            Err(e) => return exit_code(Err(e)),
        }
    };
    let _guards = init_logging(&config);

    exit_code(run(&config, &args.input, &mut io::stdout().lock()))
}
