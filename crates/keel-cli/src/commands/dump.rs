use std::path::PathBuf;

use keel_bytecode::{Image, dump, verify};
use keel_core::Colors;

use super::{CommandError, fail};

pub struct DumpArgs {
    pub image_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    match render(&args) {
        Ok(text) => print!("{text}"),
        Err(err) => fail(err),
    }
}

pub fn render(args: &DumpArgs) -> Result<String, CommandError> {
    let image = Image::from_path(&args.image_path)?;
    verify(&image)?;
    Ok(dump(&image, Colors::new(args.color)))
}
