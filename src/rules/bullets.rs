// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the `bullet-unicode` rule: ASCII bullet lists.

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::message::{Message, SyntaxCheck};
use crate::rules::rule::RuleChecker;

/// The indentation and marker of a bullet line (`- item` or `* item`).
fn bullet_of(line: &str) -> Option<(usize, char)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(marker @ ('-' | '*')), Some(' ')) => Some((indent, marker)),
        _ => None,
    }
}

pub struct BulletUnicodeRule;

impl RuleChecker for BulletUnicodeRule {
    fn name(&self) -> &'static str {
        "bullet-unicode"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn syntax_check(&self) -> Option<SyntaxCheck> {
        Some(SyntaxCheck::BulletUnicode)
    }

    /// Check for ASCII bullet lists: two bullet lines with the same marker
    /// (`-` or `*`) at the same indentation level.
    ///
    /// An indentation stack tracks nested levels, so a deeper bullet in
    /// between does not hide the list:
    /// ```text
    /// msgid ""
    /// "- first\n"
    /// "  - nested\n"
    /// "- second\n"
    /// ```
    ///
    /// Lines at different indentation alone do not form a list:
    /// ```text
    /// msgid ""
    /// "- first\n"
    /// "  * nested\n"
    /// ```
    fn check_msgid(&self, checker: &mut Checker, msg: &Message, msgid: &str) {
        let mut stack: Vec<(usize, char)> = Vec::new();
        for line in msgid.lines() {
            match bullet_of(line) {
                Some((indent, marker)) => {
                    // Dedenting leaves the deeper levels.
                    while stack.last().is_some_and(|&(level, _)| level > indent) {
                        stack.pop();
                    }
                    match stack.last().copied() {
                        Some((level, last_marker)) if level == indent => {
                            if last_marker == marker {
                                checker.report_msgid(
                                    msg,
                                    "ASCII bullet list instead of Unicode bullets".to_string(),
                                    msgid,
                                    &[],
                                );
                                return;
                            }
                            if let Some(top) = stack.last_mut() {
                                *top = (indent, marker);
                            }
                        }
                        _ => stack.push((indent, marker)),
                    }
                }
                None => stack.clear(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tests::check_with_rules;

    #[test]
    fn test_bullet_of() {
        assert_eq!(bullet_of("- item"), Some((0, '-')));
        assert_eq!(bullet_of("  * item"), Some((2, '*')));
        assert_eq!(bullet_of("-item"), None);
        assert_eq!(bullet_of("plain text"), None);
    }

    #[test]
    fn test_same_indent_same_marker_reported() {
        let diags = check_with_rules(
            "msgid \"- a\\n- b\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("bullet"));
    }

    #[test]
    fn test_nested_bullet_does_not_hide_list() {
        let diags = check_with_rules(
            "msgid \"- a\\n  - nested\\n- b\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_nested_list_reported_at_its_own_level() {
        let diags = check_with_rules(
            "msgid \"- a\\n  * b\\n  * c\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_different_indent_ok() {
        let diags = check_with_rules(
            "msgid \"- a\\n  * b\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_different_marker_ok() {
        let diags = check_with_rules(
            "msgid \"- a\\n* b\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_interrupted_list_ok() {
        let diags = check_with_rules(
            "msgid \"- a\\ntext\\n- b\\n\"\nmsgstr \"x\"\n",
            vec![Box::new(BulletUnicodeRule {})],
        );
        assert!(diags.is_empty());
    }
}
