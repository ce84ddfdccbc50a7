//! Human-readable image dump for debugging.

use std::fmt::Write as _;

use keel_core::Colors;

use crate::ids::SelectorIdx;
use crate::image::Image;
use crate::instructions::Instruction;

/// Generate a sectioned text listing of the image.
pub fn dump(image: &Image, colors: Colors) -> String {
    let mut out = String::new();
    let width = width_for_count(image.len());

    dump_header(&mut out, image, colors);
    dump_descriptors(&mut out, image, colors);
    dump_code(&mut out, image, colors, width);

    out
}

/// Minimum width needed to display offsets up to `count - 1`.
fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

fn dump_header(out: &mut String, image: &Image, c: Colors) {
    let header = image.header();
    writeln!(out, "{}", c.heading("[header]")).unwrap();
    writeln!(out, "entry       = {}", header.entry).unwrap();
    writeln!(out, "descriptors = {}", header.descriptor_count).unwrap();
    writeln!(out, "selectors   = {}", image.selector_count()).unwrap();
    out.push('\n');
}

fn dump_descriptors(out: &mut String, image: &Image, c: Colors) {
    writeln!(out, "{}", c.heading("[descriptors]")).unwrap();

    for (i, desc) in image.descriptors().iter().enumerate() {
        writeln!(
            out,
            "{} {} {}",
            c.muted(format_args!("D{i}")),
            desc.tag,
            c.heading(&desc.name)
        )
        .unwrap();

        let fields: Vec<String> = desc.fields.iter().map(|f| f.to_string()).collect();
        writeln!(out, "  fields   [{}]", fields.join(", ")).unwrap();

        let slots: Vec<String> = (0..desc.selector_count())
            .map(|sel| match desc.slot(SelectorIdx(sel as u16)) {
                Some(target) => format!("#{sel} {}", c.target(format_args!("@{target}"))),
                None => format!("#{sel} {}", c.muted("-")),
            })
            .collect();
        writeln!(out, "  dispatch [{}]", slots.join(", ")).unwrap();
    }
    out.push('\n');
}

fn dump_code(out: &mut String, image: &Image, c: Colors, width: usize) {
    writeln!(out, "{}", c.heading("[code]")).unwrap();

    let entry = image.header().entry;
    let mut first = true;
    for item in image.instructions() {
        let (at, instr) = match item {
            Ok(pair) => pair,
            Err(e) => {
                writeln!(out, "  {}", c.muted(format_args!("<{e}>"))).unwrap();
                break;
            }
        };

        if matches!(instr, Instruction::Enter { .. }) {
            if !first {
                out.push('\n');
            }
            let tag = if at == entry { " (entry)" } else { "" };
            writeln!(out, "{}{tag}", c.target(format_args!("@{at}"))).unwrap();
        }
        first = false;

        writeln!(out, "  {}  {instr}", c.muted(format_args!("{at:>width$}"))).unwrap();
    }
}
