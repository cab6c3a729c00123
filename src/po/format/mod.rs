// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Format-string dialects.
//!
//! Each dialect parses a string to a vector of argument descriptors sorted
//! by position; the cross-string compatibility verdict compares two such
//! vectors.

pub mod c;
pub mod gcc_internal;
pub mod python;

use serde::Serialize;

/// A known format dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Dialect {
    C,
    GccInternal,
    Python,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::C, Dialect::GccInternal, Dialect::Python];

    /// The dialect name as it appears in `#, <name>-format` flags.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::GccInternal => "gcc-internal",
            Dialect::Python => "python",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "c" => Some(Dialect::C),
            "gcc-internal" => Some(Dialect::GccInternal),
            "python" => Some(Dialect::Python),
            _ => None,
        }
    }

    /// Parse a format string of this dialect into its argument vector.
    pub fn parse(self, s: &str) -> Result<ParsedFormat, FormatError> {
        match self {
            Dialect::C => c::parse(s),
            Dialect::GccInternal => gcc_internal::parse(s),
            Dialect::Python => python::parse(s),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Size of an integer argument, from the length modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntSize {
    Char,
    Short,
    #[default]
    Default,
    Long,
    LongLong,
    IntMax,
    Size,
    Ptrdiff,
    Wide,
}

/// Type of one consumed argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArgKind {
    Char,
    WideChar,
    String,
    WideString,
    Integer(IntSize),
    Unsigned(IntSize),
    Float,
    LongDouble,
    Pointer,
    Count(IntSize),
    /// First part of a two-position int-array argument.
    IntArray,
    Tree,
    TreeDecl,
    Gimple,
    Location,
    Object,
}

impl ArgKind {
    fn describe(self) -> &'static str {
        match self {
            ArgKind::Char | ArgKind::WideChar => "a character",
            ArgKind::String | ArgKind::WideString => "a string",
            ArgKind::Integer(_) | ArgKind::IntArray => "an integer",
            ArgKind::Unsigned(_) => "an unsigned integer",
            ArgKind::Float | ArgKind::LongDouble => "a floating-point number",
            ArgKind::Pointer => "a pointer",
            ArgKind::Count(_) => "an output count",
            ArgKind::Tree => "a tree",
            ArgKind::TreeDecl => "a tree declaration",
            ArgKind::Gimple => "a gimple statement",
            ArgKind::Location => "a location",
            ArgKind::Object => "an object",
        }
    }
}

/// One argument of a format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatArg {
    /// 1-based argument position.
    pub pos: usize,
    pub kind: ArgKind,
    /// Set for directives consuming this position and the next one.
    pub double: bool,
}

/// The parse result of one format string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedFormat {
    /// Argument vector, sorted by position, duplicate positions merged.
    pub args: Vec<FormatArg>,
    /// Named arguments (Python `%(name)s`), sorted by name.
    pub named: Vec<(String, ArgKind)>,
    /// Total number of directives, `%%` included.
    pub directives: usize,
    pub uses_errno: bool,
    pub uses_current_locus: bool,
}

/// A format-string parse error, with the byte position of the offending
/// directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatError {
    pub pos: usize,
    pub message: String,
}

impl FormatError {
    pub(crate) fn new(pos: usize, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FormatError {}

/// Sort an argument vector by position and merge duplicate positions.
/// Incompatible types at the same position are an error.
pub(crate) fn finalize_args(mut args: Vec<FormatArg>) -> Result<Vec<FormatArg>, FormatError> {
    args.sort_by_key(|a| a.pos);
    let mut merged: Vec<FormatArg> = Vec::with_capacity(args.len());
    for arg in args {
        match merged.last() {
            Some(last) if last.pos == arg.pos => {
                if last.kind != arg.kind || last.double != arg.double {
                    return Err(FormatError::new(
                        0,
                        format!("incompatible format types for argument {}", arg.pos),
                    ));
                }
            }
            _ => merged.push(arg),
        }
    }
    Ok(merged)
}

/// Expand the argument vector into `(position, kind)` pairs, giving
/// double-consumer directives their second position.
fn expanded(fmt: &ParsedFormat) -> Vec<(usize, ArgKind)> {
    let mut out = Vec::with_capacity(fmt.args.len());
    for arg in &fmt.args {
        out.push((arg.pos, arg.kind));
        if arg.double {
            out.push((arg.pos + 1, arg.kind));
        }
    }
    out
}

/// Compare the argument vectors of a msgid format string and a msgstr
/// format string.
///
/// With `equality` the comparison is symmetric; without it the msgstr may
/// legitimately omit arguments. Returned strings are error messages; an
/// empty vector means the strings are compatible.
#[must_use]
pub fn check(msgid_fmt: &ParsedFormat, msgstr_fmt: &ParsedFormat, equality: bool) -> Vec<String> {
    let mut errors = Vec::new();
    let id_args = expanded(msgid_fmt);
    let str_args = expanded(msgstr_fmt);
    let mut i = 0;
    let mut j = 0;
    while i < id_args.len() || j < str_args.len() {
        let id = id_args.get(i);
        let st = str_args.get(j);
        match (id, st) {
            (Some(&(ip, ik)), Some(&(sp, sk))) if ip == sp => {
                if ik != sk {
                    errors.push(format!(
                        "format specifications in 'msgid' and 'msgstr' for argument {ip} are not the same: {} versus {}",
                        ik.describe(),
                        sk.describe(),
                    ));
                }
                i += 1;
                j += 1;
            }
            (Some(&(ip, _)), st) if st.is_none_or(|&(sp, _)| ip < sp) => {
                if equality {
                    errors.push(format!(
                        "a format specification for argument {ip} exists in 'msgid' but not in 'msgstr'"
                    ));
                }
                i += 1;
            }
            (_, Some(&(sp, _))) => {
                errors.push(format!(
                    "a format specification for argument {sp} exists in 'msgstr' but not in 'msgid'"
                ));
                j += 1;
            }
            _ => unreachable!(),
        }
    }
    check_named(msgid_fmt, msgstr_fmt, equality, &mut errors);
    if msgid_fmt.uses_errno != msgstr_fmt.uses_errno {
        let (with, without) = if msgid_fmt.uses_errno {
            ("msgid", "msgstr")
        } else {
            ("msgstr", "msgid")
        };
        errors.push(format!("'{with}' uses %m but '{without}' does not"));
    }
    if msgid_fmt.uses_current_locus != msgstr_fmt.uses_current_locus {
        let (with, without) = if msgid_fmt.uses_current_locus {
            ("msgid", "msgstr")
        } else {
            ("msgstr", "msgid")
        };
        errors.push(format!("'{with}' uses %C but '{without}' does not"));
    }
    errors
}

fn check_named(
    msgid_fmt: &ParsedFormat,
    msgstr_fmt: &ParsedFormat,
    equality: bool,
    errors: &mut Vec<String>,
) {
    let mut i = 0;
    let mut j = 0;
    let ids = &msgid_fmt.named;
    let strs = &msgstr_fmt.named;
    while i < ids.len() || j < strs.len() {
        match (ids.get(i), strs.get(j)) {
            (Some((in_, ik)), Some((sn, sk))) if in_ == sn => {
                if ik != sk {
                    errors.push(format!(
                        "format specifications in 'msgid' and 'msgstr' for argument '{in_}' are not the same: {} versus {}",
                        ik.describe(),
                        sk.describe(),
                    ));
                }
                i += 1;
                j += 1;
            }
            (Some((in_, _)), st) if st.is_none_or(|(sn, _)| in_ < sn) => {
                if equality {
                    errors.push(format!(
                        "a format specification for argument '{in_}' exists in 'msgid' but not in 'msgstr'"
                    ));
                }
                i += 1;
            }
            (_, Some((sn, _))) => {
                errors.push(format!(
                    "a format specification for argument '{sn}' exists in 'msgstr' but not in 'msgid'"
                ));
                j += 1;
            }
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_names() {
        assert_eq!(Dialect::from_name("c"), Some(Dialect::C));
        assert_eq!(Dialect::from_name("gcc-internal"), Some(Dialect::GccInternal));
        assert_eq!(Dialect::from_name("python"), Some(Dialect::Python));
        assert_eq!(Dialect::from_name("tcl"), None);
        assert_eq!(Dialect::GccInternal.name(), "gcc-internal");
    }

    #[test]
    fn test_finalize_merges_duplicates() {
        let args = vec![
            FormatArg {
                pos: 2,
                kind: ArgKind::String,
                double: false,
            },
            FormatArg {
                pos: 1,
                kind: ArgKind::Integer(IntSize::Default),
                double: false,
            },
            FormatArg {
                pos: 2,
                kind: ArgKind::String,
                double: false,
            },
        ];
        let merged = finalize_args(args).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].pos, 1);
        assert_eq!(merged[1].pos, 2);
    }

    #[test]
    fn test_finalize_rejects_conflicts() {
        let args = vec![
            FormatArg {
                pos: 1,
                kind: ArgKind::String,
                double: false,
            },
            FormatArg {
                pos: 1,
                kind: ArgKind::Float,
                double: false,
            },
        ];
        let err = finalize_args(args).unwrap_err();
        assert!(err.message.contains("argument 1"));
    }

    #[test]
    fn test_check_reordered_ok() {
        // "%1$s %2$d" against "%2$d %1$s": same sorted vectors.
        let a = c::parse("%1$s %2$d").unwrap();
        let b = c::parse("%2$d %1$s").unwrap();
        assert!(check(&a, &b, false).is_empty());
        assert!(check(&a, &b, true).is_empty());
    }

    #[test]
    fn test_check_type_mismatch() {
        let a = c::parse("%1$s %2$d").unwrap();
        let b = c::parse("%1$d %2$s").unwrap();
        let errors = check(&a, &b, false);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("argument 1"));
        assert!(errors[1].contains("argument 2"));
    }

    #[test]
    fn test_check_msgstr_may_omit() {
        let a = c::parse("%s %d").unwrap();
        let b = c::parse("%s").unwrap();
        assert!(check(&a, &b, false).is_empty());
        let errors = check(&a, &b, true);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exists in 'msgid' but not in 'msgstr'"));
    }

    #[test]
    fn test_check_extra_in_msgstr() {
        let a = c::parse("%s").unwrap();
        let b = c::parse("%s %d").unwrap();
        let errors = check(&a, &b, false);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exists in 'msgstr' but not in 'msgid'"));
    }
}
