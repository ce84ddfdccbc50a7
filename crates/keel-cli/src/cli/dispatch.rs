//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::dump::DumpArgs;

pub struct BuildParams {
    pub program_path: PathBuf,
    pub output: Option<PathBuf>,
    pub color: ColorChoice,
    pub verbose: u8,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: m
                .get_one::<PathBuf>("program_path")
                .cloned()
                .unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned(),
            color: parse_color(m),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            program_path: p.program_path,
            output: p.output,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub image_path: PathBuf,
    pub color: ColorChoice,
    pub verbose: u8,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: m
                .get_one::<PathBuf>("image_path")
                .cloned()
                .unwrap_or_default(),
            color: parse_color(m),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            image_path: p.image_path,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
