// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the `quote-unicode` rule: ASCII quotation marks used
//! where Unicode quotes were expected.

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::message::{Message, SyntaxCheck};
use crate::rules::rule::RuleChecker;

/// Partition a string into ASCII-quoted regions (byte ranges including the
/// quotes). Apostrophes inside words do not open a region.
#[must_use]
pub fn quoted_regions(s: &str) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    let mut chars = s.char_indices().peekable();
    let mut prev: Option<char> = None;
    while let Some((pos, c)) = chars.next() {
        match c {
            '"' => {
                let mut end = None;
                for (close_pos, close) in chars.by_ref() {
                    if close == '"' {
                        end = Some(close_pos + 1);
                        break;
                    }
                }
                if let Some(end) = end {
                    regions.push((pos, end));
                }
                prev = Some('"');
                continue;
            }
            '\'' if prev.is_none_or(|p| !p.is_alphanumeric()) => {
                // Candidate opening apostrophe; the closing one must not
                // be followed by an alphanumeric.
                let rest = &s[pos + 1..];
                let mut close = None;
                for (off, candidate) in rest.char_indices() {
                    if candidate == '\'' {
                        let after = rest[off + 1..].chars().next();
                        if after.is_none_or(|a| !a.is_alphanumeric()) {
                            close = Some(pos + 1 + off + 1);
                        }
                        break;
                    }
                }
                if let Some(end) = close {
                    regions.push((pos, end));
                    while let Some(&(next_pos, _)) = chars.peek() {
                        if next_pos < end {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    prev = Some('\'');
                    continue;
                }
            }
            _ => {}
        }
        prev = Some(c);
    }
    regions
}

pub struct QuoteUnicodeRule;

impl RuleChecker for QuoteUnicodeRule {
    fn name(&self) -> &'static str {
        "quote-unicode"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn syntax_check(&self) -> Option<SyntaxCheck> {
        Some(SyntaxCheck::QuoteUnicode)
    }

    /// Check for ASCII `"` or `'` quotation where Unicode quotation marks
    /// were expected.
    ///
    /// Wrong msgid:
    /// ```text
    /// msgid "file "%s" not found"
    /// ```
    ///
    /// Correct msgid:
    /// ```text
    /// msgid "file “%s” not found"
    /// ```
    fn check_msgid(&self, checker: &mut Checker, msg: &Message, msgid: &str) {
        let regions = quoted_regions(msgid);
        if !regions.is_empty() {
            checker.report_msgid(
                msg,
                "ASCII quotation mark instead of Unicode quotation marks".to_string(),
                msgid,
                &regions,
            );
        }
    }
}
