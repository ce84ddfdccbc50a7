pub mod build;
pub mod dump;


use std::path::PathBuf;

use keel_bytecode::{ImageError, VerifyError};
use keel_compiler::{EmitError, LoadError};

/// Exit code for internal compiler errors, as opposed to user errors.
pub const INTERNAL_ERROR_EXIT: i32 = 101;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("internal compiler error: {0}")]
    Emit(#[from] EmitError),

    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("image failed verification: {0}")]
    Verify(#[from] VerifyError),

    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Emit(_) => INTERNAL_ERROR_EXIT,
            _ => 1,
        }
    }
}

/// Print `err` and exit with its code.
pub fn fail(err: CommandError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(err.exit_code());
}
