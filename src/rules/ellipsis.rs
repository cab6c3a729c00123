// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the ellipsis rules: ASCII `...` where U+2026 is
//! expected, and whitespace before an ellipsis.

use memchr::memmem;

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::message::{Message, SyntaxCheck};
use crate::rules::rule::RuleChecker;

pub struct EllipsisUnicodeRule;

impl RuleChecker for EllipsisUnicodeRule {
    fn name(&self) -> &'static str {
        "ellipsis-unicode"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn syntax_check(&self) -> Option<SyntaxCheck> {
        Some(SyntaxCheck::EllipsisUnicode)
    }

    /// Check for the ASCII ellipsis `...` where the Unicode horizontal
    /// ellipsis U+2026 was expected.
    ///
    /// Wrong msgid:
    /// ```text
    /// msgid "Wait..."
    /// ```
    ///
    /// Correct msgid:
    /// ```text
    /// msgid "Wait…"
    /// ```
    fn check_msgid(&self, checker: &mut Checker, msg: &Message, msgid: &str) {
        let highlights: Vec<(usize, usize)> = memmem::find_iter(msgid.as_bytes(), "...")
            .map(|start| (start, start + 3))
            .collect();
        if !highlights.is_empty() {
            checker.report_msgid(
                msg,
                "ASCII ellipsis ('...') instead of Unicode ellipsis (U+2026)".to_string(),
                msgid,
                &highlights,
            );
        }
    }
}

pub struct SpaceEllipsisRule;

impl RuleChecker for SpaceEllipsisRule {
    fn name(&self) -> &'static str {
        "space-ellipsis"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn syntax_check(&self) -> Option<SyntaxCheck> {
        Some(SyntaxCheck::SpaceEllipsis)
    }

    /// Check for a whitespace character preceding an ellipsis (ASCII or
    /// Unicode).
    fn check_msgid(&self, checker: &mut Checker, msg: &Message, msgid: &str) {
        let mut highlights: Vec<(usize, usize)> = Vec::new();
        let mut prev: Option<(usize, char)> = None;
        let mut skip_until = 0;
        for (pos, c) in msgid.char_indices() {
            if pos < skip_until {
                continue;
            }
            let ellipsis_len = if c == '\u{2026}' {
                Some(c.len_utf8())
            } else if msgid[pos..].starts_with("...") {
                Some(3)
            } else {
                None
            };
            if let Some(len) = ellipsis_len {
                if let Some((prev_pos, prev_char)) = prev
                    && prev_char.is_whitespace()
                {
                    highlights.push((prev_pos, pos + len));
                }
                skip_until = pos + len;
            }
            prev = Some((pos, c));
        }
        if !highlights.is_empty() {
            checker.report_msgid(
                msg,
                "space before ellipsis found in user visible strings".to_string(),
                msgid,
                &highlights,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tests::check_with_rules;

    #[test]
    fn test_ascii_ellipsis_reported() {
        let diags = check_with_rules(
            "msgid \"Wait...\"\nmsgstr \"x\"\n",
            vec![Box::new(EllipsisUnicodeRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert!(diags[0].message.contains("ASCII ellipsis"));
    }

    #[test]
    fn test_unicode_ellipsis_ok() {
        let diags = check_with_rules(
            "msgid \"Wait…\"\nmsgstr \"x\"\n",
            vec![Box::new(EllipsisUnicodeRule {})],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_space_before_ellipsis_reported() {
        let diags = check_with_rules(
            "msgid \"Wait ...\"\nmsgstr \"x\"\n",
            vec![Box::new(SpaceEllipsisRule {})],
        );
        assert_eq!(diags.len(), 1);
        let diags = check_with_rules(
            "msgid \"Wait …\"\nmsgstr \"x\"\n",
            vec![Box::new(SpaceEllipsisRule {})],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_no_space_before_ellipsis_ok() {
        let diags = check_with_rules(
            "msgid \"Wait...\"\nmsgstr \"x\"\n",
            vec![Box::new(SpaceEllipsisRule {})],
        );
        assert!(diags.is_empty());
    }
}
