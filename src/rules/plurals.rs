// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the `plurals` rule: incorrect number of plural forms.

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::message::Message;
use crate::rules::rule::RuleChecker;

pub struct PluralsRule;

impl RuleChecker for PluralsRule {
    fn name(&self) -> &'static str {
        "plurals"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Check that every plural message carries as many msgstr forms as the
    /// header's `Plural-Forms: nplurals=N;` declares.
    ///
    /// Without a parsable `Plural-Forms` header this rule reports nothing.
    ///
    /// Wrong entry (with nplurals=2):
    /// ```text
    /// msgid "%d file"
    /// msgid_plural "%d files"
    /// msgstr[0] "%d fichier"
    /// ```
    fn check_entry(&self, checker: &mut Checker, msg: &Message) {
        let Some(expected) = checker.nplurals() else {
            return;
        };
        if !msg.has_plural() {
            return;
        }
        let found = msg.msgstr.len();
        let expected = expected as usize;
        if found < expected {
            checker.report_msgid(
                msg,
                format!("missing translated plural form (found: {found}, expected: {expected})"),
                &msg.msgid,
                &[],
            );
        } else if found > expected {
            checker.report_msgid(
                msg,
                format!("extra translated plural form (found: {found}, expected: {expected})"),
                &msg.msgid,
                &[],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tests::check_with_rules;

    const HEADER: &str = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\"Plural-Forms: nplurals=2; plural=(n > 1);\\n\"\n";

    #[test]
    fn test_no_header_no_check() {
        let diags = check_with_rules(
            "msgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"%d fichier\"\n",
            vec![Box::new(PluralsRule {})],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_correct_count_ok() {
        let diags = check_with_rules(
            &format!(
                "{HEADER}\nmsgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"%d fichier\"\nmsgstr[1] \"%d fichiers\"\n"
            ),
            vec![Box::new(PluralsRule {})],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_missing_form_reported() {
        let diags = check_with_rules(
            &format!(
                "{HEADER}\nmsgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"%d fichier\"\n"
            ),
            vec![Box::new(PluralsRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "missing translated plural form (found: 1, expected: 2)"
        );
    }

    #[test]
    fn test_extra_form_reported() {
        let diags = check_with_rules(
            &format!(
                "{HEADER}\nmsgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"a\"\nmsgstr[1] \"b\"\nmsgstr[2] \"c\"\n"
            ),
            vec![Box::new(PluralsRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "extra translated plural form (found: 3, expected: 2)"
        );
    }
}
