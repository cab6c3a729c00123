// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;

use crate::{
    checker::Checker,
    diagnostic::Severity,
    po::message::{Message, SyntaxCheck},
    rules::{bullets, ellipsis, formats, plurals, quotes, urls},
};

pub type Rule = Box<dyn RuleChecker + Sync>;

const SPECIAL_RULES: [&str; 1] = ["all"];

#[derive(Default)]
pub struct Rules {
    pub enabled: Vec<Rule>,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name(), self.severity())
    }
}

impl Rules {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { enabled: rules }
    }
}

pub trait RuleChecker {
    fn name(&self) -> &'static str;
    fn is_default(&self) -> bool;
    fn severity(&self) -> Severity;
    /// The per-message override slot this rule honors, if any.
    fn syntax_check(&self) -> Option<SyntaxCheck> {
        None
    }
    /// Check the whole entry.
    fn check_entry(&self, _checker: &mut Checker, _msg: &Message) {}
    /// Check one extracted id (called for msgid and msgid_plural).
    fn check_msgid(&self, _checker: &mut Checker, _msg: &Message, _msgid: &str) {}
}

#[must_use]
pub fn get_all_rules() -> Vec<Rule> {
    vec![
        Box::new(bullets::BulletUnicodeRule {}),
        Box::new(ellipsis::EllipsisUnicodeRule {}),
        Box::new(ellipsis::SpaceEllipsisRule {}),
        Box::new(formats::FormatsRule {}),
        Box::new(plurals::PluralsRule {}),
        Box::new(quotes::QuoteUnicodeRule {}),
        Box::new(urls::UrlRule {}),
    ]
}

/// Get unknown rule names from a list of names compared to all available rules.
#[must_use]
pub fn get_unknown_rules<'a>(
    names: &'a [&str],
    all_rules_names: &HashSet<&'static str>,
) -> Vec<&'a str> {
    let selected_rules_names = names.iter().copied().collect::<HashSet<_>>();
    let mut unknown_rules_names: HashSet<&str> = selected_rules_names
        .difference(all_rules_names)
        .copied()
        .collect();
    for name in SPECIAL_RULES {
        unknown_rules_names.remove(name);
    }
    if unknown_rules_names.is_empty() {
        return vec![];
    }
    let mut unknown = unknown_rules_names.iter().copied().collect::<Vec<_>>();
    unknown.sort_unstable();
    unknown
}

/// Get the selected rules based on the `--select` and `--ignore` lists.
///
/// With no selection, the default rules apply; ignored rules are then
/// removed from the selection.
pub fn get_selected_rules(
    select: Option<&str>,
    ignore: Option<&str>,
) -> Result<Rules, Box<dyn std::error::Error>> {
    let all_rules = get_all_rules();
    let all_rules_names: HashSet<&'static str> = all_rules.iter().map(|r| r.name()).collect();
    let mut selected_rules: Vec<Rule> = Vec::new();

    if let Some(select_str) = select {
        let names: Vec<&str> = select_str.split(',').map(str::trim).collect();
        let unknown_rules_names = get_unknown_rules(&names, &all_rules_names);
        if !unknown_rules_names.is_empty() {
            return Err(
                format!("unknown selected rules: {}", unknown_rules_names.join(", ")).into(),
            );
        }
        if names.contains(&"all") {
            selected_rules = all_rules;
        } else {
            for rule in all_rules {
                if names.contains(&rule.name()) {
                    selected_rules.push(rule);
                }
            }
        }
    } else {
        for rule in all_rules {
            if rule.is_default() {
                selected_rules.push(rule);
            }
        }
    }

    if let Some(ignore_str) = ignore {
        let names: Vec<&str> = ignore_str.split(',').map(str::trim).collect();
        let unknown_rules_names = get_unknown_rules(&names, &all_rules_names);
        if !unknown_rules_names.is_empty() {
            return Err(format!(
                "unknown rules to ignore: {}",
                unknown_rules_names.join(", ")
            )
            .into());
        }
        selected_rules.retain(|rule| !names.contains(&rule.name()));
    }

    Ok(Rules::new(selected_rules))
}

/// Display the rules used to check PO files.
pub fn run_rules() -> i32 {
    let rules = get_all_rules();
    let default_rules: Vec<&Rule> = rules.iter().filter(|r| r.is_default()).collect();
    let other_rules: Vec<&Rule> = rules.iter().filter(|r| !r.is_default()).collect();
    println!("{} default rules:", default_rules.len());
    for rule in &default_rules {
        println!("  {rule}");
    }
    if !other_rules.is_empty() {
        println!("{} other rules:", other_rules.len());
        for rule in &other_rules {
            println!("  {rule}");
        }
    }
    println!("Total: {} rules", rules.len());
    println!("Special rules:");
    println!("  all: select all rules");
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_have_distinct_names() {
        let rules = get_all_rules();
        let names: HashSet<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_default_selection() {
        let rules = get_selected_rules(None, None).unwrap();
        assert!(!rules.enabled.is_empty());
    }

    #[test]
    fn test_select_and_ignore() {
        let rules = get_selected_rules(Some("ellipsis-unicode,url"), None).unwrap();
        assert_eq!(rules.enabled.len(), 2);
        let rules = get_selected_rules(Some("all"), Some("url")).unwrap();
        assert!(rules.enabled.iter().all(|r| r.name() != "url"));
        assert!(get_selected_rules(Some("no-such-rule"), None).is_err());
        assert!(get_selected_rules(None, Some("no-such-rule")).is_err());
    }
}
