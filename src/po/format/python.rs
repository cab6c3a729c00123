// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Format strings: Python `%` operator.

use crate::po::format::c::{Numbering, utf8_len};
use crate::po::format::{
    ArgKind, FormatArg, FormatError, IntSize, ParsedFormat, finalize_args,
};

/// Parse a Python format string into its argument vector.
///
/// Named directives (`%(name)s`) and unnamed directives cannot be mixed.
pub fn parse(s: &str) -> Result<ParsedFormat, FormatError> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut args: Vec<FormatArg> = Vec::new();
    let mut named: Vec<(String, ArgKind)> = Vec::new();
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

        // Mapping key.
        let mut name = None;
        if pos < len && bytes[pos] == b'(' {
            let Some(close) = bytes[pos + 1..].iter().position(|&b| b == b')') else {
                return Err(FormatError::new(dir_start, "unterminated mapping key"));
            };
            name = Some(
                String::from_utf8_lossy(&bytes[pos + 1..pos + 1 + close]).to_string(),
            );
            pos += close + 2;
        }

        // Flags.
        while pos < len && matches!(bytes[pos], b'-' | b'+' | b' ' | b'#' | b'0') {
            pos += 1;
        }

        // Width and precision; `*` consumes an int argument and is invalid
        // with a mapping key.
        for allow_dot in [false, true] {
            if allow_dot {
                if pos < len && bytes[pos] == b'.' {
                    pos += 1;
                } else {
                    continue;
                }
            }
            if pos < len && bytes[pos] == b'*' {
                pos += 1;
                if name.is_some() {
                    return Err(FormatError::new(
                        dir_start,
                        "'*' width cannot be used with a mapping key",
                    ));
                }
                let p = numbering.resolve(None, dir_start)?;
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

        // Length modifiers are accepted and ignored.
        if pos < len && matches!(bytes[pos], b'h' | b'l' | b'L') {
            pos += 1;
        }

        if pos >= len {
            return Err(FormatError::new(dir_start, "unterminated format directive"));
        }
        let kind = match bytes[pos] {
            b'd' | b'i' | b'u' | b'o' | b'x' | b'X' => Some(ArgKind::Integer(IntSize::Default)),
            b'e' | b'E' | b'f' | b'F' | b'g' | b'G' => Some(ArgKind::Float),
            b'c' => Some(ArgKind::Char),
            b's' | b'r' | b'a' => Some(ArgKind::Object),
            _ => None,
        };
        let Some(kind) = kind else {
            return Err(FormatError::new(
                dir_start,
                format!("invalid conversion specifier in directive at byte {dir_start}"),
            ));
        };
        pos += 1;
        match name {
            Some(name) => named.push((name, kind)),
            None => {
                let p = numbering.resolve(None, dir_start)?;
                args.push(FormatArg {
                    pos: p,
                    kind,
                    double: false,
                });
            }
        }
    }

    if !named.is_empty() && !args.is_empty() {
        return Err(FormatError::new(
            0,
            "format string mixes named and unnamed argument specifications",
        ));
    }
    named.sort();
    let mut dedup: Vec<(String, ArgKind)> = Vec::with_capacity(named.len());
    for (name, kind) in named {
        match dedup.last() {
            Some((last, last_kind)) if *last == name => {
                if *last_kind != kind {
                    return Err(FormatError::new(
                        0,
                        format!("incompatible format types for argument '{name}'"),
                    ));
                }
            }
            _ => dedup.push((name, kind)),
        }
    }
    Ok(ParsedFormat {
        args: finalize_args(args)?,
        named: dedup,
        directives,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::po::format::check;

    #[test]
    fn test_unnamed() {
        let fmt = parse("%s has %d users").unwrap();
        assert_eq!(fmt.args.len(), 2);
        assert_eq!(fmt.args[0].kind, ArgKind::Object);
        assert_eq!(fmt.args[1].kind, ArgKind::Integer(IntSize::Default));
        assert!(fmt.named.is_empty());
    }

    #[test]
    fn test_named() {
        let fmt = parse("%(name)s is %(age)d years old").unwrap();
        assert!(fmt.args.is_empty());
        assert_eq!(
            fmt.named,
            vec![
                ("age".to_string(), ArgKind::Integer(IntSize::Default)),
                ("name".to_string(), ArgKind::Object),
            ]
        );
    }

    #[test]
    fn test_named_reordering_compatible() {
        let a = parse("%(name)s: %(count)d").unwrap();
        let b = parse("%(count)d (%(name)s)").unwrap();
        assert!(check(&a, &b, true).is_empty());
    }

    #[test]
    fn test_named_missing_reported() {
        let a = parse("%(name)s: %(count)d").unwrap();
        let b = parse("%(name)s").unwrap();
        assert!(check(&a, &b, false).is_empty());
        let errors = check(&a, &b, true);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'count'"));
    }

    #[test]
    fn test_mixing_named_and_unnamed() {
        assert!(parse("%(name)s %d").is_err());
    }

    #[test]
    fn test_duplicate_name_conflict() {
        assert!(parse("%(n)s %(n)d").is_err());
        assert!(parse("%(n)s %(n)s").is_ok());
    }

    #[test]
    fn test_unterminated_mapping_key() {
        assert!(parse("%(name").is_err());
    }

    #[test]
    fn test_double_percent() {
        let fmt = parse("100%%").unwrap();
        assert!(fmt.args.is_empty());
        assert_eq!(fmt.directives, 1);
    }
}
