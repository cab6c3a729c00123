// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Format strings: GCC internal diagnostic language.
//!
//! The dialect of `pretty-print.cc`: `%q`/`%<…%>` quoting, `%r…%R` color
//! groups, `%{…%}` URL groups, `%m` for errno, `%C` for the current locus,
//! tree and gimple conversions, and `%Z` which consumes two consecutive
//! argument positions.

use crate::po::format::c::{Numbering, scan_dollar_number, utf8_len};
use crate::po::format::{ArgKind, FormatArg, FormatError, IntSize, ParsedFormat, finalize_args};

/// Parse a GCC-internal format string into its argument vector.
pub fn parse(s: &str) -> Result<ParsedFormat, FormatError> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut args: Vec<FormatArg> = Vec::new();
    let mut directives = 0;
    let mut numbering = Numbering::new();
    let mut uses_errno = false;
    let mut uses_current_locus = false;
    let mut quote_open = false;
    let mut color_open = false;
    let mut url_open = false;

    while pos < len {
        if bytes[pos] != b'%' {
            pos += utf8_len(bytes[pos]);
            continue;
        }
        let dir_start = pos;
        pos += 1;
        directives += 1;

        let mut number = None;
        if let Some((value, after)) = scan_dollar_number(bytes, pos) {
            number = Some(value);
            pos = after;
        }

        // Flags: q, +, #, and one of l/w/z/t (l may be doubled).
        let mut size = IntSize::Default;
        loop {
            if pos >= len {
                return Err(FormatError::new(dir_start, "unterminated format directive"));
            }
            match bytes[pos] {
                b'q' | b'+' | b'#' => pos += 1,
                b'l' | b'w' | b'z' | b't' if size == IntSize::Default => {
                    size = match bytes[pos] {
                        b'l' => IntSize::Long,
                        b'w' => IntSize::Wide,
                        b'z' => IntSize::Size,
                        _ => IntSize::Ptrdiff,
                    };
                    pos += 1;
                }
                b'l' if size == IntSize::Long => {
                    size = IntSize::LongLong;
                    pos += 1;
                }
                b'l' | b'w' | b'z' | b't' => {
                    return Err(FormatError::new(
                        dir_start,
                        "conflicting length modifiers in format directive",
                    ));
                }
                _ => break,
            }
        }

        let conv = bytes[pos];
        pos += 1;
        // Singletons needing no argument, and the group delimiters.
        match conv {
            b'%' | b'\'' => continue,
            b'm' => {
                uses_errno = true;
                continue;
            }
            b'C' => {
                uses_current_locus = true;
                continue;
            }
            b'<' => {
                if quote_open {
                    return Err(FormatError::new(dir_start, "nested quote group"));
                }
                quote_open = true;
                continue;
            }
            b'>' => {
                if !quote_open {
                    return Err(FormatError::new(dir_start, "unmatched quote group end"));
                }
                quote_open = false;
                continue;
            }
            b'r' => {
                if color_open {
                    return Err(FormatError::new(dir_start, "nested color group"));
                }
                color_open = true;
                continue;
            }
            b'R' => {
                if !color_open {
                    return Err(FormatError::new(dir_start, "unmatched color group end"));
                }
                color_open = false;
                continue;
            }
            b'{' => {
                if url_open {
                    return Err(FormatError::new(dir_start, "nested URL group"));
                }
                url_open = true;
                continue;
            }
            b'}' => {
                if !url_open {
                    return Err(FormatError::new(dir_start, "unmatched URL group end"));
                }
                url_open = false;
                continue;
            }
            _ => {}
        }

        let kind = match conv {
            b'c' => Some(ArgKind::Char),
            b's' => Some(ArgKind::String),
            b'i' | b'd' => Some(ArgKind::Integer(size)),
            b'o' | b'u' | b'x' => Some(ArgKind::Unsigned(size)),
            b'e' | b'f' | b'g' => Some(ArgKind::Float),
            b'p' => Some(ArgKind::Pointer),
            b'D' | b'E' | b'F' | b'K' | b'T' | b'V' => Some(ArgKind::Tree),
            b'J' => Some(ArgKind::TreeDecl),
            b'G' => Some(ArgKind::Gimple),
            b'H' => Some(ArgKind::Location),
            b'Z' => Some(ArgKind::IntArray),
            _ => None,
        };
        let Some(kind) = kind else {
            return Err(FormatError::new(
                dir_start,
                format!("invalid conversion specifier in directive at byte {dir_start}"),
            ));
        };
        let double = kind == ArgKind::IntArray;
        let p = numbering.resolve(number, dir_start)?;
        if double && number.is_none() {
            // The second half of the int-array pair occupies the next
            // unnumbered slot.
            numbering.next_arg += 1;
        }
        args.push(FormatArg { pos: p, kind, double });
    }

    if quote_open {
        return Err(FormatError::new(0, "unterminated quote group"));
    }
    if color_open {
        return Err(FormatError::new(0, "unterminated color group"));
    }
    if url_open {
        return Err(FormatError::new(0, "unterminated URL group"));
    }
    numbering.check_mixing()?;
    Ok(ParsedFormat {
        args: finalize_args(args)?,
        directives,
        uses_errno,
        uses_current_locus,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::po::format::check;

    #[test]
    fn test_plain_conversions() {
        let fmt = parse("%s has %d users").unwrap();
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
    }

    #[test]
    fn test_quote_group() {
        let fmt = parse("invalid use of %<%s%>").unwrap();
        assert_eq!(fmt.args.len(), 1);
        assert!(parse("missing %<close").is_err());
        assert!(parse("stray %> here").is_err());
        assert!(parse("%<a %<b%> c%>").is_err());
    }

    #[test]
    fn test_color_and_url_groups() {
        assert!(parse("%rnote:%R %{docs%}").is_ok());
        assert!(parse("%runterminated").is_err());
        assert!(parse("%}stray").is_err());
    }

    #[test]
    fn test_errno_and_locus() {
        let fmt = parse("cannot open %s: %m").unwrap();
        assert!(fmt.uses_errno);
        assert!(!fmt.uses_current_locus);
        let fmt = parse("%C: bad karma").unwrap();
        assert!(fmt.uses_current_locus);
    }

    #[test]
    fn test_tree_conversions() {
        let fmt = parse("%qD conflicts with %qT").unwrap();
        let kinds: Vec<_> = fmt.args.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArgKind::Tree, ArgKind::Tree]);
    }

    #[test]
    fn test_wide_int_size() {
        let fmt = parse("value %wd out of range").unwrap();
        assert_eq!(fmt.args[0].kind, ArgKind::Integer(IntSize::Wide));
        assert!(parse("%wzd").is_err());
    }

    #[test]
    fn test_int_array_consumes_two_positions() {
        let fmt = parse("%Z %s").unwrap();
        assert_eq!(fmt.args.len(), 2);
        assert_eq!(fmt.args[0].pos, 1);
        assert!(fmt.args[0].double);
        // %s lands on position 3: %Z took positions 1 and 2.
        assert_eq!(fmt.args[1].pos, 3);
        assert_eq!(fmt.args[1].kind, ArgKind::String);
    }

    #[test]
    fn test_int_array_compatibility() {
        let a = parse("%Z").unwrap();
        let b = parse("%1$Z").unwrap();
        assert!(check(&a, &b, true).is_empty());
        let c = parse("%d %d").unwrap();
        // Expanded positions match but the types differ.
        let errors = check(&a, &c, true);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_errno_discrepancy_reported() {
        let a = parse("cannot open %s: %m").unwrap();
        let b = parse("cannot open %s").unwrap();
        let errors = check(&a, &b, false);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("%m"));
    }

    #[test]
    fn test_mixing_rejected() {
        assert!(parse("%1$s %d").is_err());
    }

    #[test]
    fn test_double_percent_and_apostrophe() {
        let fmt = parse("100%% and %'").unwrap();
        assert!(fmt.args.is_empty());
        assert_eq!(fmt.directives, 2);
    }
}
