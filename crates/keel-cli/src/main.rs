mod cli;
mod commands;

use cli::{BuildParams, DumpParams, build_cli};
use tracing::level_filters::LevelFilter;

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            init_logging(params.verbose);
            commands::build::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            init_logging(params.verbose);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Logs go to stderr so they never mix with dump output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}
