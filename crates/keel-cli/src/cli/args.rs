//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program description to compile (positional).
pub fn program_path_arg() -> Arg {
    Arg::new("program_path")
        .value_name("PROGRAM")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Resolved program (JSON)")
}

/// Compiled image to inspect (positional).
pub fn image_path_arg() -> Arg {
    Arg::new("image_path")
        .value_name("IMAGE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Compiled image")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the image here (default: PROGRAM with .kbc extension)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Log verbosity (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level (-v info, -vv debug, -vvv trace)")
}
