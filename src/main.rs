use std::process::ExitCode;

use clap::Parser;
use langsweep::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match langsweep::cli::run_cli(args).await {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "langsweep=debug"
    } else {
        "langsweep=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
