// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod commands;
mod output;

pub use args::{Cli, Command, FailurePolicyArg};
pub use commands::{execute, exit_code};
