//! Cryptic - encrypted secret storage.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cryptic::cli::{commands, Cli};

fn main() {
    // Usage errors (missing flags, unknown commands) exit 1; --help and
    // --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let default_filter = if cli.verbose {
        "cryptic=debug"
    } else {
        "cryptic=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
