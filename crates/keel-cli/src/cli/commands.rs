//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("keel")
        .about("Compile resolved keel programs to bytecode images")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(dump_command())
}

/// Compile a program to an image.
pub fn build_command() -> Command {
    Command::new("build")
        .about("Compile a program to a bytecode image")
        .override_usage(
            "\
  keel build <PROGRAM>
  keel build <PROGRAM> -o <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  keel build app.json              # writes app.kbc
  keel build app.json -o out.kbc   # explicit output
  keel build app.json -vv          # log pipeline phases"#,
        )
        .arg(program_path_arg())
        .arg(output_arg())
        .arg(color_arg())
        .arg(verbose_arg())
}

/// Show a compiled image.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Verify and show a bytecode image")
        .override_usage("  keel dump <IMAGE>")
        .after_help(
            r#"EXAMPLES:
  keel dump app.kbc
  keel dump app.kbc --color never"#,
        )
        .arg(image_path_arg())
        .arg(color_arg())
        .arg(verbose_arg())
}
