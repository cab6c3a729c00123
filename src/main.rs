// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pomerge merges gettext PO catalogs and keeps them sane.
//!
//! The following sub-commands are available:
//!
//! - [`merge`](#merge): merge a translated catalog with a fresh template
//! - [`printf`](#printf): format arguments like printf(1)
//! - [`check`](#check-files): check files
//! - [`rules`](#rules): display rules used to check files
//!
//! # Merge
//!
//! The `merge` command reconciles an existing translated catalog against a
//! freshly extracted template: exact matches keep their translation, close
//! matches are reused and marked fuzzy, dropped messages are kept as
//! obsolete entries. Compendium files provide extra translation memory.
//!
//! # Printf
//!
//! The `printf` command applies a POSIX-style format string to the
//! remaining arguments, reusing the format as long as arguments remain.
//!
//! # Check files
//!
//! The `check` command checks the gettext files (*.po) given on the
//! command line: msgid sanity (ellipses, quotes, bullets, embedded URLs)
//! and format-string consistency.
//!
//! # Rules
//!
//! The `rules` command displays the rules used to check files.

mod args;
mod backup;
mod checker;
mod diagnostic;
mod merge;
mod po;
mod printf;
mod rules;

use clap::Parser;

use crate::args::{Cli, Command};
use crate::checker::run_check;
use crate::merge::run_merge;
use crate::printf::run_printf;
use crate::rules::rule::run_rules;

fn main() {
    let args = Cli::parse();
    let rc = match &args.command {
        Command::Merge(args) => run_merge(args),
        Command::Printf(args) => run_printf(args),
        Command::Check(args) => run_check(args),
        Command::Rules(_) => run_rules(),
    };
    std::process::exit(rc);
}
