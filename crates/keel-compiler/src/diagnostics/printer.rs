//! Rendering of collected diagnostics for the terminal.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Configures how [`Diagnostics`] turn into text.
///
/// With source text attached, anchored diagnostics render as annotated
/// snippets. Programs loaded without source still carry spans, so the
/// plain form keeps the byte range and any related notes, prefixed by the
/// path when one is set.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match (self.source, diag.range) {
                (Some(source), Some(range)) => {
                    let report = [self.group(diag, source, range)];
                    write!(w, "{}", renderer.render(&report))?;
                }
                _ => self.format_plain(w, diag)?,
            }
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write, diag: &DiagnosticMessage) -> std::fmt::Result {
        if let Some(path) = self.path {
            write!(w, "{path}: ")?;
        }
        writeln!(w, "{diag}")
    }

    fn group<'a>(
        &'a self,
        diag: &'a DiagnosticMessage,
        source: &'a str,
        range: TextRange,
    ) -> Group<'a> {
        // The title already carries the message; the caret stays bare.
        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(byte_span(range, source.len())));
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(byte_span(related.range, source.len()))
                    .label(related.message.as_str()),
            );
        }

        level(diag.severity())
            .primary_title(diag.message.as_str())
            .element(snippet)
    }
}

fn level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Empty ranges widen to one byte so the caret is visible.
fn byte_span(range: TextRange, limit: usize) -> Range<usize> {
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    if start == end {
        start..(start + 1).min(limit)
    } else {
        start..end
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
