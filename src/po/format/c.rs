// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Format strings: C language.

use crate::po::format::{
    ArgKind, FormatArg, FormatError, IntSize, ParsedFormat, finalize_args,
};

/// Number of bytes of the UTF-8 character starting with this byte.
pub(crate) fn utf8_len(b: u8) -> usize {
    match b {
        0xf0..=0xf7 => 4,
        0xe0..=0xef => 3,
        0xc0..=0xdf => 2,
        _ => 1,
    }
}

/// Scan `M$` at `pos`: one or more digits followed by `$`.
pub(crate) fn scan_dollar_number(bytes: &[u8], pos: usize) -> Option<(usize, usize)> {
    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end > pos && end < bytes.len() && bytes[end] == b'$' {
        let value = std::str::from_utf8(&bytes[pos..end])
            .ok()?
            .parse::<usize>()
            .ok()?;
        Some((value, end + 1))
    } else {
        None
    }
}

pub(crate) struct Numbering {
    numbered: bool,
    unnumbered: bool,
    pub(crate) next_arg: usize,
}

impl Numbering {
    pub(crate) fn new() -> Self {
        Self {
            numbered: false,
            unnumbered: false,
            next_arg: 1,
        }
    }

    /// Resolve the position of one consumed argument and record which
    /// numbering style it used.
    pub(crate) fn resolve(
        &mut self,
        explicit: Option<usize>,
        at: usize,
    ) -> Result<usize, FormatError> {
        match explicit {
            Some(0) => Err(FormatError::new(at, "invalid argument number 0")),
            Some(n) => {
                self.numbered = true;
                Ok(n)
            }
            None => {
                self.unnumbered = true;
                let n = self.next_arg;
                self.next_arg += 1;
                Ok(n)
            }
        }
    }

    pub(crate) fn check_mixing(&self) -> Result<(), FormatError> {
        if self.numbered && self.unnumbered {
            Err(FormatError::new(
                0,
                "format string mixes numbered and unnumbered argument specifications",
            ))
        } else {
            Ok(())
        }
    }
}

/// Parse a C format string into its argument vector.
pub fn parse(s: &str) -> Result<ParsedFormat, FormatError> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut args: Vec<FormatArg> = Vec::new();
    let mut directives = 0;
    let mut numbering = Numbering::new();

    while pos < len {
        if bytes[pos] != b'%' {
            pos += utf8_len(bytes[pos]);
            continue;
        }
        let dir_start = pos;
        pos += 1;
        directives += 1;
        if pos < len && bytes[pos] == b'%' {
            pos += 1;
            continue;
        }

        let mut number = None;
        if let Some((value, after)) = scan_dollar_number(bytes, pos) {
            number = Some(value);
            pos = after;
        }

        // Flags.
        while pos < len && matches!(bytes[pos], b'-' | b'+' | b' ' | b'#' | b'0' | b'\'' | b'I') {
            pos += 1;
        }

        // Width: digits, or `*` consuming an int argument.
        if pos < len && bytes[pos] == b'*' {
            pos += 1;
            let mut width_number = None;
            if let Some((value, after)) = scan_dollar_number(bytes, pos) {
                width_number = Some(value);
                pos = after;
            }
            let p = numbering.resolve(width_number, dir_start)?;
            args.push(FormatArg {
                pos: p,
                kind: ArgKind::Integer(IntSize::Default),
                double: false,
            });
        } else {
            while pos < len && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }

        // Precision.
        if pos < len && bytes[pos] == b'.' {
            pos += 1;
            if pos < len && bytes[pos] == b'*' {
                pos += 1;
                let mut prec_number = None;
                if let Some((value, after)) = scan_dollar_number(bytes, pos) {
                    prec_number = Some(value);
                    pos = after;
                }
                let p = numbering.resolve(prec_number, dir_start)?;
                args.push(FormatArg {
                    pos: p,
                    kind: ArgKind::Integer(IntSize::Default),
                    double: false,
                });
            } else {
                while pos < len && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
        }

        // Length modifiers (h, hh, l, ll, q, L, j, z, Z, t).
        let mut size = IntSize::Default;
        let mut long_double = false;
        if pos < len {
            match bytes[pos] {
                b'h' => {
                    pos += 1;
                    size = IntSize::Short;
                    if pos < len && bytes[pos] == b'h' {
                        pos += 1;
                        size = IntSize::Char;
                    }
                }
                b'l' => {
                    pos += 1;
                    size = IntSize::Long;
                    if pos < len && bytes[pos] == b'l' {
                        pos += 1;
                        size = IntSize::LongLong;
                    }
                }
                b'q' => {
                    pos += 1;
                    size = IntSize::LongLong;
                }
                b'L' => {
                    pos += 1;
                    long_double = true;
                }
                b'j' => {
                    pos += 1;
                    size = IntSize::IntMax;
                }
                b'z' | b'Z' => {
                    pos += 1;
                    size = IntSize::Size;
                }
                b't' => {
                    pos += 1;
                    size = IntSize::Ptrdiff;
                }
                _ => {}
            }
        }

        // Conversion specifier.
        if pos >= len {
            return Err(FormatError::new(dir_start, "unterminated format directive"));
        }
        let kind = match bytes[pos] {
            b'd' | b'i' => Some(ArgKind::Integer(size)),
            b'o' | b'u' | b'x' | b'X' => Some(ArgKind::Unsigned(size)),
            b'e' | b'E' | b'f' | b'F' | b'g' | b'G' | b'a' | b'A' => Some(if long_double {
                ArgKind::LongDouble
            } else {
                ArgKind::Float
            }),
            b'c' => Some(if size == IntSize::Long {
                ArgKind::WideChar
            } else {
                ArgKind::Char
            }),
            b'C' => Some(ArgKind::WideChar),
            b's' => Some(if size == IntSize::Long {
                ArgKind::WideString
            } else {
                ArgKind::String
            }),
            b'S' => Some(ArgKind::WideString),
            b'p' => Some(ArgKind::Pointer),
            b'n' => Some(ArgKind::Count(size)),
            _ => None,
        };
        let Some(kind) = kind else {
            return Err(FormatError::new(
                dir_start,
                format!(
                    "invalid conversion specifier in directive at byte {dir_start}"
                ),
            ));
        };
        pos += 1;
        let p = numbering.resolve(number, dir_start)?;
        args.push(FormatArg {
            pos: p,
            kind,
            double: false,
        });
    }

    numbering.check_mixing()?;
    Ok(ParsedFormat {
        args: finalize_args(args)?,
        directives,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_directive() {
        let fmt = parse("Hello, world!").unwrap();
        assert!(fmt.args.is_empty());
        assert_eq!(fmt.directives, 0);
    }

    #[test]
    fn test_simple_directives() {
        let fmt = parse("name: %s, age: %d").unwrap();
        assert_eq!(
            fmt.args,
            vec![
                FormatArg {
                    pos: 1,
                    kind: ArgKind::String,
                    double: false
                },
                FormatArg {
                    pos: 2,
                    kind: ArgKind::Integer(IntSize::Default),
                    double: false
                },
            ]
        );
        assert_eq!(fmt.directives, 2);
    }

    #[test]
    fn test_escaped_percent() {
        let fmt = parse("100%% of %d files").unwrap();
        assert_eq!(fmt.args.len(), 1);
        assert_eq!(fmt.directives, 2);
    }

    #[test]
    fn test_reordering_sorts_by_position() {
        let fmt = parse("%3$d %1$s %2$f").unwrap();
        let kinds: Vec<_> = fmt.args.iter().map(|a| (a.pos, a.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, ArgKind::String),
                (2, ArgKind::Float),
                (3, ArgKind::Integer(IntSize::Default)),
            ]
        );
    }

    #[test]
    fn test_length_modifiers() {
        let fmt = parse("%ld %9llu %hhd %zu %Lf").unwrap();
        let kinds: Vec<_> = fmt.args.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArgKind::Integer(IntSize::Long),
                ArgKind::Unsigned(IntSize::LongLong),
                ArgKind::Integer(IntSize::Char),
                ArgKind::Unsigned(IntSize::Size),
                ArgKind::LongDouble,
            ]
        );
    }

    #[test]
    fn test_star_width_consumes_argument() {
        let fmt = parse("%*d").unwrap();
        assert_eq!(
            fmt.args,
            vec![
                FormatArg {
                    pos: 1,
                    kind: ArgKind::Integer(IntSize::Default),
                    double: false
                },
                FormatArg {
                    pos: 2,
                    kind: ArgKind::Integer(IntSize::Default),
                    double: false
                },
            ]
        );
    }

    #[test]
    fn test_star_width_numbered() {
        let fmt = parse("%1$*2$d").unwrap();
        assert_eq!(fmt.args.len(), 2);
        assert_eq!(fmt.args[0].pos, 1);
        assert_eq!(fmt.args[0].kind, ArgKind::Integer(IntSize::Default));
        assert_eq!(fmt.args[1].pos, 2);
    }

    #[test]
    fn test_wide_conversions() {
        let fmt = parse("%lc %ls").unwrap();
        let kinds: Vec<_> = fmt.args.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArgKind::WideChar, ArgKind::WideString]);
    }

    #[test]
    fn test_duplicate_position_merged() {
        let fmt = parse("%1$s and %1$s").unwrap();
        assert_eq!(fmt.args.len(), 1);
    }

    #[test]
    fn test_duplicate_position_conflict() {
        assert!(parse("%1$s and %1$d").is_err());
    }

    #[test]
    fn test_mixing_rejected() {
        assert!(parse("%1$s %d").is_err());
    }

    #[test]
    fn test_unterminated() {
        assert!(parse("50%").is_err());
    }

    #[test]
    fn test_invalid_specifier() {
        assert!(parse("%y").is_err());
    }

    #[test]
    fn test_argument_number_zero() {
        assert!(parse("%0$d").is_err());
    }

    #[test]
    fn test_unicode_text_between_directives() {
        let fmt = parse("héllo %s 你好 %d").unwrap();
        assert_eq!(fmt.args.len(), 2);
    }
}
