// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Diagnostics for PO files and commands.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use colored::Colorize;
use serde::{
    Serialize,
    ser::{SerializeStruct, Serializer},
};

const HIGHLIGHT_COLOR: &str = "bright yellow";
const HIGHLIGHT_ON_COLOR: &str = "red";

/// Number of errors after which a parse is aborted.
pub const DEFAULT_ERROR_CEILING: usize = 20;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize)]
pub enum Severity {
    #[default]
    Warning,
    Error,
    Fatal,
}

#[derive(Debug, Default)]
pub struct DiagnosticLine {
    pub line_number: usize,
    pub message: String,
    pub highlights: Vec<(usize, usize)>,
}

#[derive(Debug, Default, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// Line of the diagnostic, 0 when not attached to a line.
    pub line: usize,
    /// Column of the diagnostic, 0 when not attached to a column.
    pub column: usize,
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    pub lines: Vec<DiagnosticLine>,
}

impl std::fmt::Display for Severity {
    /// Format the `Severity` as a colored string for display.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".bright_red().bold(),
            Severity::Fatal => "fatal error".bright_red().bold(),
        };
        write!(f, "{s}")
    }
}

impl Serialize for DiagnosticLine {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("DiagnosticLine", 3)?;
        state.serialize_field("line_number", &self.line_number)?;
        state.serialize_field("message", &self.message)?;
        // Convert highlights from byte positions to character positions for serialization.
        let hl: Vec<_> = self
            .highlights
            .iter()
            .map(|(s, e)| {
                (
                    self.message[..*s].chars().count(),
                    self.message[..*e].chars().count(),
                )
            })
            .collect();
        state.serialize_field("highlights", &hl)?;
        state.end()
    }
}

impl DiagnosticLine {
    /// Highlight multiple substrings from `start` to `end` with the given text and background colors.
    fn highlight_list_pos(s: &str, list_pos: &[(usize, usize)]) -> String {
        let mut result = String::new();
        let mut pos = 0;
        for (start, end) in list_pos {
            if *start < pos {
                continue;
            }
            result.push_str(&s[pos..*start]);
            result.push_str(
                &s[*start..*end]
                    .color(HIGHLIGHT_COLOR)
                    .bold()
                    .on_color(HIGHLIGHT_ON_COLOR)
                    .to_string(),
            );
            pos = *end;
        }
        result.push_str(&s[pos..]);
        result
    }

    /// Get the message with highlights applied.
    fn message_hl_color(&self) -> Cow<'_, str> {
        if self.highlights.is_empty() {
            Cow::Borrowed(&self.message)
        } else {
            Cow::Owned(DiagnosticLine::highlight_list_pos(
                &self.message,
                &self.highlights,
            ))
        }
    }
}

impl Diagnostic {
    /// Create a new `Diagnostic` with the given path, rule, severity, and message.
    #[must_use]
    pub fn new(path: &Path, rule: &'static str, severity: Severity, message: String) -> Self {
        Self {
            path: PathBuf::from(path),
            rule,
            severity,
            message,
            ..Default::default()
        }
    }

    /// Attach the diagnostic to a line (and optionally a column) of the file.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn add_message(&mut self, line: usize, message: &str, highlights: &[(usize, usize)]) {
        self.lines.push(DiagnosticLine {
            line_number: line,
            message: message.to_string(),
            highlights: highlights.to_vec(),
        });
    }

    /// Format the diagnostic line (number + message) with colors for display.
    fn format_line(line: &DiagnosticLine) -> String {
        let prefix_lf_empty = "        | ".cyan().to_string();
        let prefix_line = if line.line_number > 0 {
            format!("{:7} | ", line.line_number).cyan().to_string()
        } else {
            prefix_lf_empty.clone()
        };
        if line.message.is_empty() {
            return prefix_line;
        }
        let mut out = String::new();
        for (idx, line) in line.message_hl_color().lines().enumerate() {
            if idx == 0 {
                out.push_str(&prefix_line);
            } else {
                out.push('\n');
                out.push_str(&prefix_lf_empty);
            }
            out.push_str(line);
        }
        out
    }

    fn format_lines(&self) -> String {
        if self.lines.is_empty() {
            "\n".to_string()
        } else {
            let mut list_lines = Vec::with_capacity(self.lines.len() + 2);
            list_lines.push(String::new());
            list_lines.push("        |".cyan().to_string());
            for line in &self.lines {
                list_lines.push(Diagnostic::format_line(line));
            }
            list_lines.push("        |".cyan().to_string());
            list_lines.push(String::new());
            list_lines.join("\n")
        }
    }
}

impl std::fmt::Display for Diagnostic {
    /// Format the `Diagnostic` for display: `file[:line[:column]]: severity: message`,
    /// with quoted source lines aligned under a gutter.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut location = String::new();
        if self.line > 0 {
            location.push_str(&format!(":{}", self.line));
            if self.column > 0 {
                location.push_str(&format!(":{}", self.column));
            }
        }
        write!(
            f,
            "{}{location}: {}: {}{}",
            self.path.display().to_string().white().bold(),
            self.severity,
            self.message,
            self.format_lines(),
        )
    }
}

/// Sink for diagnostics produced while reading one file.
///
/// Errors are counted against a ceiling; once the ceiling is reached the
/// reader must stop and report a fatal error. Warnings are counted apart
/// so that `error_count` reflects errors only.
#[derive(Debug)]
pub struct Reporter {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    pub ceiling: usize,
}

impl Reporter {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: PathBuf::from(path),
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            ceiling: DEFAULT_ERROR_CEILING,
        }
    }

    /// Set the error ceiling (0 means effectively unlimited).
    #[must_use]
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.set_ceiling(ceiling);
        self
    }

    /// Set the error ceiling in place (0 means effectively unlimited).
    pub fn set_ceiling(&mut self, ceiling: usize) {
        self.ceiling = if ceiling == 0 { usize::MAX } else { ceiling };
    }

    /// Report a fatal error; the caller must stop processing the file.
    pub fn fatal(&mut self, line: usize, column: usize, rule: &'static str, message: String) {
        self.error_count += 1;
        self.diagnostics
            .push(Diagnostic::new(&self.path, rule, Severity::Fatal, message).at(line, column));
    }

    /// Report an error at the given line and column (0 when unknown).
    ///
    /// Returns `false` when the error ceiling has been reached: the caller
    /// must abort.
    pub fn error(
        &mut self,
        line: usize,
        column: usize,
        rule: &'static str,
        message: String,
    ) -> bool {
        self.error_count += 1;
        self.diagnostics
            .push(Diagnostic::new(&self.path, rule, Severity::Error, message).at(line, column));
        if self.error_count >= self.ceiling {
            self.diagnostics.push(
                Diagnostic::new(
                    &self.path,
                    rule,
                    Severity::Fatal,
                    "too many errors, aborting".to_string(),
                )
                .at(line, column),
            );
            return false;
        }
        true
    }

    /// Report a warning at the given line and column (0 when unknown).
    pub fn warning(&mut self, line: usize, column: usize, rule: &'static str, message: String) {
        self.warning_count += 1;
        self.diagnostics
            .push(Diagnostic::new(&self.path, rule, Severity::Warning, message).at(line, column));
    }

    /// Return `true` if the error ceiling has been reached.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.error_count >= self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_counts() {
        let mut reporter = Reporter::new(Path::new("test.po"));
        reporter.warning(1, 0, "charset", "missing charset".to_string());
        assert_eq!(reporter.warning_count, 1);
        assert_eq!(reporter.error_count, 0);
        assert!(reporter.error(2, 5, "po-syntax", "parse error".to_string()));
        assert_eq!(reporter.error_count, 1);
        assert!(!reporter.exhausted());
    }

    #[test]
    fn test_reporter_ceiling() {
        let mut reporter = Reporter::new(Path::new("test.po")).with_ceiling(2);
        assert!(reporter.error(1, 0, "po-syntax", "first".to_string()));
        assert!(!reporter.error(2, 0, "po-syntax", "second".to_string()));
        assert!(reporter.exhausted());
        // The fatal "too many errors" diagnostic is appended after the second error.
        assert_eq!(reporter.diagnostics.len(), 3);
        assert_eq!(reporter.diagnostics[2].severity, Severity::Fatal);
    }

    #[test]
    fn test_diagnostic_location_display() {
        colored::control::set_override(false);
        let diag = Diagnostic::new(
            Path::new("fr.po"),
            "po-syntax",
            Severity::Error,
            "end-of-line within string".to_string(),
        )
        .at(12, 7);
        let s = format!("{diag}");
        assert!(s.starts_with("fr.po:12:7: error: end-of-line within string"));
        colored::control::unset_override();
    }
}
