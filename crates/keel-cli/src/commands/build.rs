use std::path::{Path, PathBuf};

use keel_compiler::{Diagnostics, codegen, load_path};
use tracing::info;

use super::{CommandError, fail};

pub const IMAGE_EXTENSION: &str = "kbc";

pub struct BuildArgs {
    pub program_path: PathBuf,
    pub output: Option<PathBuf>,
    pub color: bool,
}

#[derive(Debug)]
pub enum BuildOutcome {
    Written { path: PathBuf, bytes: usize },
    /// Entry point rejected; holds the rendered diagnostics.
    Rejected(String),
}

pub fn run(args: BuildArgs) {
    match execute(&args) {
        Ok(BuildOutcome::Written { path, bytes }) => {
            info!(path = %path.display(), bytes, "image written");
        }
        Ok(BuildOutcome::Rejected(rendered)) => {
            eprint!("{rendered}");
            std::process::exit(1);
        }
        Err(err) => fail(err),
    }
}

pub fn execute(args: &BuildArgs) -> Result<BuildOutcome, CommandError> {
    let (program, analysis) = load_path(&args.program_path)?;
    info!(
        entities = program.entity_count(),
        methods = program.method_count(),
        "program loaded"
    );

    let mut diagnostics = Diagnostics::new();
    let image = codegen(&program, &analysis, &mut diagnostics)?;

    if diagnostics.has_errors() {
        let path = args.program_path.display().to_string();
        let mut printer = diagnostics.printer().path(&path).colored(args.color);
        if let Some(source) = program.source() {
            printer = printer.source(source);
        }
        return Ok(BuildOutcome::Rejected(printer.render()));
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.program_path));
    std::fs::write(&path, &image).map_err(|source| CommandError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(BuildOutcome::Written {
        path,
        bytes: image.len(),
    })
}

/// `app.json` becomes `app.kbc` next to it.
pub fn default_output(program: &Path) -> PathBuf {
    program.with_extension(IMAGE_EXTENSION)
}
