// src/main.rs
use clap::Parser;
use colorful::Colorful;
use env_logger::Env;

use metawave::cli::{self, Cli};

fn main() {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = cli::execute(args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(cli::exit_code(&e));
    }
}
