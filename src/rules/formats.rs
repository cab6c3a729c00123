// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Implementation of the `formats` rule: cross-check format strings of
//! msgid and msgstr for every dialect the entry is flagged with.

use crate::checker::Checker;
use crate::diagnostic::Severity;
use crate::po::format::{self, Dialect};
use crate::po::message::{FormatFlag, Message};
use crate::rules::rule::RuleChecker;

pub struct FormatsRule;

impl RuleChecker for FormatsRule {
    fn name(&self) -> &'static str {
        "formats"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Compare the argument vectors of msgid and each translated form.
    ///
    /// Only entries explicitly flagged `<dialect>-format` are checked.
    /// `msgstr[0]` is compared against `msgid`, the other forms against
    /// `msgid_plural`. A reordering of positional directives is fine:
    /// `%2$s test (%1$d)` is compatible with `%d test (%s)`.
    fn check_entry(&self, checker: &mut Checker, msg: &Message) {
        for dialect in Dialect::ALL {
            if msg.format_flag(dialect) != FormatFlag::Yes {
                continue;
            }
            let msgid_fmt = match dialect.parse(&msg.msgid) {
                Ok(fmt) => fmt,
                Err(error) => {
                    checker.report_msgid(
                        msg,
                        format!("invalid {dialect} format string: {error}"),
                        &msg.msgid,
                        &[],
                    );
                    continue;
                }
            };
            let plural_fmt = msg
                .msgid_plural
                .as_deref()
                .and_then(|plural| dialect.parse(plural).ok());
            for (i, form) in msg.msgstr.iter().enumerate() {
                if form.is_empty() {
                    continue;
                }
                let against = if i > 0 {
                    match &plural_fmt {
                        Some(fmt) => fmt,
                        None => continue,
                    }
                } else {
                    &msgid_fmt
                };
                let id_text = if i > 0 {
                    msg.msgid_plural.as_deref().unwrap_or(&msg.msgid)
                } else {
                    &msg.msgid
                };
                match dialect.parse(form) {
                    Ok(form_fmt) => {
                        for error in format::check(against, &form_fmt, false) {
                            checker.report_msg(
                                msg,
                                format!("inconsistent {dialect} format strings: {error}"),
                                id_text,
                                form,
                            );
                        }
                    }
                    Err(error) => {
                        checker.report_msg(
                            msg,
                            format!("invalid {dialect} format string: {error}"),
                            id_text,
                            form,
                        );
                    }
                }
            }
        }
    }
}
