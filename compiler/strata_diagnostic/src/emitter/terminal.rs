//! Plain text rendering for terminals, optionally with ANSI colors.

use std::fmt::Write as _;
use std::io::{self, Write};

use strata_ir::Span;

use super::DiagnosticEmitter;
use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const CYAN: &str = "\x1b[1;36m";
const BLUE: &str = "\x1b[1;34m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// When to emit ANSI escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Only when writing to a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Renders one diagnostic per block:
///
/// ```text
/// error[E1002]: extraneous input '34' expecting EOF
///   --> input:1:4: extraneous input
///   = note: ...
/// ```
///
/// Label positions are `name:line:col` once a source is attached, raw byte
/// ranges otherwise.
pub struct TerminalEmitter<'src, W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceInfo<'src>>,
}

struct SourceInfo<'src> {
    name: &'src str,
    text: &'src str,
    lines: LineOffsetTable,
}

impl<'src, W: Write> TerminalEmitter<'src, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Resolve label spans against `text`, reported under `name`.
    #[must_use]
    pub fn with_source(mut self, name: &'src str, text: &'src str) -> Self {
        self.source = Some(SourceInfo {
            name,
            text,
            lines: LineOffsetTable::build(text),
        });
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, out: &mut String, text: &str, color: &str) {
        if self.colors {
            let _ = write!(out, "{color}{text}{RESET}");
        } else {
            out.push_str(text);
        }
    }

    fn location(&self, span: Span) -> String {
        match &self.source {
            Some(source) => {
                let (line, col) = source.lines.span_start(source.text, span);
                format!("{}:{line}:{col}", source.name)
            }
            None => format!("{span:?}"),
        }
    }

    fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        let severity_color = match diagnostic.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        self.paint(&mut out, diagnostic.severity.as_str(), severity_color);
        self.paint(&mut out, &format!("[{}]", diagnostic.code), BOLD);
        let _ = writeln!(out, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let (marker, color) = if label.is_primary {
                ("-->", severity_color)
            } else {
                ("   ", BLUE)
            };
            let _ = write!(out, "  {marker} {}: ", self.location(label.span));
            self.paint(&mut out, &label.message, color);
            out.push('\n');
        }
        for note in &diagnostic.notes {
            out.push_str("  = ");
            self.paint(&mut out, "note", CYAN);
            let _ = writeln!(out, ": {note}");
        }
        out
    }
}

impl TerminalEmitter<'_, io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        Self::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let block = self.render(diagnostic);
        let _ = self.writer.write_all(block.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let counted = |count: usize, noun: &str| match count {
            0 => None,
            1 => Some(format!("1 {noun}")),
            n => Some(format!("{n} {noun}s")),
        };
        let parts: Vec<String> = [counted(error_count, "error"), counted(warning_count, "warning")]
            .into_iter()
            .flatten()
            .collect();
        if !parts.is_empty() {
            let _ = writeln!(self.writer, "{} emitted", parts.join(", "));
        }
    }
}
