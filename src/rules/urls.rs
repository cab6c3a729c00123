// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the `url` rule: URLs and email addresses embedded in
//! translatable strings.

use memchr::memmem;

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::message::Message;
use crate::rules::rule::RuleChecker;

const URL_SCHEMES: [&str; 7] = [
    "http://", "https://", "ftp://", "irc://", "ircs://", "mailto:", "news:",
];

/// Return `true` for a syntactically valid email address: LOCAL@DOMAIN
/// with a dotted domain whose top-level label has at least 2 characters.
fn is_email(token: &str) -> bool {
    let Some((local, domain)) = token.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'))
    {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let valid_label =
        |label: &&str| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !labels.iter().all(valid_label) {
        return false;
    }
    labels.last().is_some_and(|tld| tld.len() >= 2)
}

pub struct UrlRule;

impl RuleChecker for UrlRule {
    fn name(&self) -> &'static str {
        "url"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Warn when a msgid embeds an http(s)/ftp/irc(s)/mailto URL or an
    /// email address: those should live outside translatable strings, or
    /// translators may alter them. The two scans are independent; a msgid
    /// carrying both gets both highlighted.
    fn check_msgid(&self, checker: &mut Checker, msg: &Message, msgid: &str) {
        let mut highlights: Vec<(usize, usize)> = Vec::new();
        for scheme in URL_SCHEMES {
            for start in memmem::find_iter(msgid.as_bytes(), scheme) {
                let end = msgid[start..]
                    .find(|c: char| c.is_whitespace() || matches!(c, '"' | '>' | ')'))
                    .map_or(msgid.len(), |off| start + off);
                highlights.push((start, end));
            }
        }
        let mut offset = 0;
        for token in msgid.split_whitespace() {
            let start = msgid[offset..]
                .find(token)
                .map_or(offset, |off| offset + off);
            offset = start + token.len();
            let trimmed = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
            if is_email(trimmed) {
                let inner = token.find(trimmed).unwrap_or(0);
                highlights.push((start + inner, start + inner + trimmed.len()));
            }
        }
        if !highlights.is_empty() {
            highlights.sort_unstable();
            checker.report_msgid(
                msg,
                "URL or email address embedded in a translatable string".to_string(),
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
    fn test_is_email() {
        assert!(is_email("someone@example.com"));
        assert!(is_email("a.b-c+d@mail.example.org"));
        assert!(!is_email("no-at-sign"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@nodot"));
        assert!(!is_email("user@example.c"));
        assert!(!is_email("user@exa mple.com"));
    }

    #[test]
    fn test_url_reported() {
        let diags = check_with_rules(
            "msgid \"see https://example.org/doc for details\"\nmsgstr \"x\"\n",
            vec![Box::new(UrlRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_email_reported() {
        let diags = check_with_rules(
            "msgid \"report bugs to bugs@example.org, please\"\nmsgstr \"x\"\n",
            vec![Box::new(UrlRule {})],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_url_and_email_both_highlighted() {
        let diags = check_with_rules(
            "msgid \"See https://example.com or mail bob@example.com\"\nmsgstr \"x\"\n",
            vec![Box::new(UrlRule {})],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].lines[0].highlights.len(), 2);
    }

    #[test]
    fn test_plain_text_ok() {
        let diags = check_with_rules(
            "msgid \"no links in here\"\nmsgstr \"x\"\n",
            vec![Box::new(UrlRule {})],
        );
        assert!(diags.is_empty());
    }
}
