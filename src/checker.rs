// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Checker for PO files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use rayon::prelude::*;

use crate::{
    args,
    diagnostic::{Diagnostic, Severity},
    po::catalog::Catalog,
    po::message::Message,
    po::parser::{ParseOptions, parse_po},
    rules::rule::{Rules, get_selected_rules},
};

pub type CheckResult = (PathBuf, Vec<Diagnostic>);

pub struct Checker<'r> {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    rules: &'r Rules,
    check_fuzzy: bool,
    check_obsolete: bool,
    nplurals: Option<u32>,
    current_rule: &'static str,
    current_severity: Severity,
}

impl<'r> Checker<'r> {
    #[must_use]
    pub fn new(rules: &'r Rules) -> Self {
        Checker {
            path: PathBuf::new(),
            diagnostics: Vec::new(),
            rules,
            check_fuzzy: false,
            check_obsolete: false,
            nplurals: None,
            current_rule: "",
            current_severity: Severity::Error,
        }
    }

    /// The `nplurals` declared by the header of the domain being checked.
    #[must_use]
    pub fn nplurals(&self) -> Option<u32> {
        self.nplurals
    }

    /// Set the path of the file being checked.
    #[must_use]
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = PathBuf::from(path);
        self
    }

    /// Set the flag indicating the fuzzy entries are checked.
    #[must_use]
    pub fn with_check_fuzzy(mut self, check_fuzzy: bool) -> Self {
        self.check_fuzzy = check_fuzzy;
        self
    }

    /// Set the flag indicating the obsolete entries are checked.
    #[must_use]
    pub fn with_check_obsolete(mut self, check_obsolete: bool) -> Self {
        self.check_obsolete = check_obsolete;
        self
    }

    /// Report a diagnostic quoting one extracted id.
    pub fn report_msgid(
        &mut self,
        msg: &Message,
        message: String,
        msgid: &str,
        highlights: &[(usize, usize)],
    ) {
        let mut diagnostic = Diagnostic::new(
            self.path.as_path(),
            self.current_rule,
            self.current_severity,
            message,
        )
        .at(msg.pos.line, 0);
        diagnostic.add_message(msg.pos.line, msgid, highlights);
        self.diagnostics.push(diagnostic);
    }

    /// Report a diagnostic quoting a msgid / msgstr couple.
    pub fn report_msg(&mut self, msg: &Message, message: String, msgid: &str, msgstr: &str) {
        let mut diagnostic = Diagnostic::new(
            self.path.as_path(),
            self.current_rule,
            self.current_severity,
            message,
        )
        .at(msg.pos.line, 0);
        diagnostic.add_message(msg.pos.line, msgid, &[]);
        diagnostic.add_message(0, "", &[]);
        diagnostic.add_message(msg.pos.line, msgstr, &[]);
        self.diagnostics.push(diagnostic);
    }

    /// Run every selected rule on one message.
    pub fn check_message(&mut self, msg: &Message) {
        let rules = self.rules;
        for rule in &rules.enabled {
            // Per-message overrides switch individual syntax checks off.
            if let Some(check) = rule.syntax_check()
                && msg.syntax_checks.get(&check) == Some(&false)
            {
                continue;
            }
            self.current_rule = rule.name();
            self.current_severity = rule.severity();
            rule.check_entry(self, msg);
            rule.check_msgid(self, msg, &msg.msgid);
            if let Some(plural) = &msg.msgid_plural {
                rule.check_msgid(self, msg, plural);
            }
        }
    }

    /// Run the selected rules on every checkable message of a catalog.
    pub fn check_catalog(&mut self, catalog: &Catalog) {
        for domain in &catalog.domains {
            self.nplurals = domain
                .header()
                .and_then(|header| header.msgstr.first())
                .map(|msgstr| crate::po::header::Header::parse(msgstr))
                .and_then(|fields| {
                    fields
                        .get("Plural-Forms")
                        .and_then(|value| crate::po::plural::parse_plural_forms(value).ok())
                })
                .map(|(_, nplurals)| nplurals);
            for msg in &domain.messages {
                if msg.is_header()
                    || (msg.fuzzy && !self.check_fuzzy)
                    || (msg.obsolete && !self.check_obsolete)
                {
                    continue;
                }
                self.check_message(msg);
            }
        }
    }
}

/// Check a single PO file and return the list of diagnostics found.
#[must_use]
pub fn check_file(path: &PathBuf, args: &args::CheckArgs, rules: &Rules) -> CheckResult {
    let Ok(data) = fs::read(path) else {
        return (
            PathBuf::from(path.as_path()),
            vec![Diagnostic::new(
                path.as_path(),
                "read-error",
                Severity::Error,
                "could not read file".to_string(),
            )],
        );
    };
    let result = parse_po(&data, path, ParseOptions::for_path(path));
    let mut checker = Checker::new(rules)
        .with_path(path)
        .with_check_fuzzy(args.fuzzy)
        .with_check_obsolete(args.obsolete);
    checker.diagnostics = result.diagnostics;
    checker.check_catalog(&result.catalog);
    (PathBuf::from(path.as_path()), checker.diagnostics)
}

fn display_diagnostics_human(result: &[CheckResult]) {
    let mut diags: Vec<&Diagnostic> = result.iter().flat_map(|x| &x.1).collect();
    diags.sort_by_key(|diag| (diag.path.clone(), diag.line, diag.rule));
    for diag in diags {
        println!("{diag}");
    }
}

fn display_diagnostics_json(result: &[CheckResult]) {
    let diags: Vec<&Diagnostic> = result.iter().flat_map(|x| &x.1).collect();
    println!("{}", serde_json::to_string(&diags).unwrap_or_default());
}

/// Check and display result for all PO files.
pub fn run_check(args: &args::CheckArgs) -> i32 {
    let rules = match get_selected_rules(args.select.as_deref(), args.ignore.as_deref()) {
        Ok(selected_rules) => selected_rules,
        Err(err) => {
            eprintln!("{}: {err}", "Error".bright_red().bold());
            return 1;
        }
    };
    let result: Vec<CheckResult> = args
        .files
        .par_iter()
        .map(|f| check_file(f, args, &rules))
        .collect();
    let mut count_warnings = 0;
    let mut count_errors = 0;
    let mut files_with_errors = 0;
    for (_, diags) in &result {
        let errors = diags
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count();
        count_errors += errors;
        count_warnings += diags.len() - errors;
        if !diags.is_empty() {
            files_with_errors += 1;
        }
    }
    if !args.quiet {
        match args.output {
            args::CheckOutputFormat::Human => {
                display_diagnostics_human(&result);
                if count_errors + count_warnings == 0 {
                    println!("{} files checked: all OK!", result.len());
                } else {
                    println!(
                        "{} files checked: {} problems in {files_with_errors} files \
                         ({count_errors} errors, {count_warnings} warnings)",
                        result.len(),
                        count_errors + count_warnings,
                    );
                }
            }
            args::CheckOutputFormat::Json => display_diagnostics_json(&result),
        }
    }
    i32::from(count_errors > 0)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::rules::rule::Rule;

    /// Parse PO content and run the given rules over it.
    pub fn check_with_rules(content: &str, rules: Vec<Rule>) -> Vec<Diagnostic> {
        let result = parse_po(
            content.as_bytes(),
            Path::new("test.po"),
            ParseOptions::default(),
        );
        assert!(result.is_ok(), "{:?}", result.diagnostics);
        let rules = Rules::new(rules);
        let mut checker = Checker::new(&rules).with_path(Path::new("test.po"));
        checker.check_catalog(&result.catalog);
        checker.diagnostics
    }

    #[test]
    fn test_fuzzy_entries_skipped_by_default() {
        let content = "#, fuzzy\nmsgid \"Wait...\"\nmsgstr \"x\"\n";
        let rules = Rules::new(vec![Box::new(
            crate::rules::ellipsis::EllipsisUnicodeRule {},
        )]);
        let result = parse_po(
            content.as_bytes(),
            Path::new("test.po"),
            ParseOptions::default(),
        );
        let mut checker = Checker::new(&rules);
        checker.check_catalog(&result.catalog);
        assert!(checker.diagnostics.is_empty());
        let mut checker = Checker::new(&rules).with_check_fuzzy(true);
        checker.check_catalog(&result.catalog);
        assert_eq!(checker.diagnostics.len(), 1);
    }

    #[test]
    fn test_syntax_check_override_disables_rule() {
        use crate::po::message::SyntaxCheck;
        let content = "msgid \"Wait...\"\nmsgstr \"x\"\n";
        let result = parse_po(
            content.as_bytes(),
            Path::new("test.po"),
            ParseOptions::default(),
        );
        let mut catalog = result.catalog;
        catalog.domains[0].messages[0]
            .syntax_checks
            .insert(SyntaxCheck::EllipsisUnicode, false);
        let rules = Rules::new(vec![Box::new(
            crate::rules::ellipsis::EllipsisUnicodeRule {},
        )]);
        let mut checker = Checker::new(&rules);
        checker.check_catalog(&catalog);
        assert!(checker.diagnostics.is_empty());
    }
}
