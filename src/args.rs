// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    name = "pomerge",
    about = "Fast gettext PO catalog merger, printf and syntax checker.",
    after_help = "For help with a specific command, see: `pomerge help <command>`."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge a translated catalog with a fresh template
    Merge(MergeArgs),

    /// Format arguments like printf(1), translation-aware
    Printf(PrintfArgs),

    /// Check msgids and format strings of PO files
    Check(CheckArgs),

    /// Display rules used to check files
    Rules(RulesArgs),
}

/// Arguments for the `merge` command.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct MergeArgs {
    /// Translated catalog (definitions)
    pub def: PathBuf,

    /// Freshly extracted template (references)
    #[clap(value_name = "REF")]
    pub reference: PathBuf,

    /// Additional library of translations, may be given more than once
    #[arg(short = 'C', long = "compendium", value_name = "FILE")]
    pub compendium: Vec<PathBuf>,

    /// Write output to the given file instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Update DEF in place; do nothing if DEF is already up to date
    #[arg(short = 'U', long)]
    pub update: bool,

    /// Backup method for --update (none, simple, numbered, existing);
    /// overrides $VERSION_CONTROL
    #[arg(long, value_name = "CONTROL")]
    pub backup: Option<String>,

    /// Suffix of simple backups; overrides $SIMPLE_BACKUP_SUFFIX
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Do not use fuzzy matching when an exact match is not found
    #[arg(short = 'N', long)]
    pub no_fuzzy_matching: bool,

    /// Keep the previous msgids of translated messages (as #| comments)
    #[arg(long)]
    pub previous: bool,

    /// Omit the output useless to msgfmt (untranslated, fuzzy, obsolete)
    #[arg(long)]
    pub for_msgfmt: bool,

    /// Apply the template to each domain of the definitions
    #[arg(long)]
    pub multi_domain: bool,

    /// Set the Language header field in the output
    #[arg(long, value_name = "CATALOGNAME")]
    pub lang: Option<String>,

    /// Sort output by msgid
    #[arg(short = 's', long)]
    pub sort_output: bool,

    /// Sort output by file location
    #[arg(short = 'F', long)]
    pub sort_by_file: bool,

    /// Suppress progress indicators and the statistics line
    #[arg(short, long, alias = "silent")]
    pub quiet: bool,
}

/// Arguments for the `printf` command.
#[derive(Debug, Args)]
pub struct PrintfArgs {
    /// printf-style format string
    pub format: String,

    /// Arguments consumed by the format, reused round by round
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `check` command.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// List of PO files to check
    pub files: Vec<PathBuf>,

    /// Check fuzzy entries (not checked by default)
    #[arg(long)]
    pub fuzzy: bool,

    /// Check obsolete entries (not checked by default)
    #[arg(long)]
    pub obsolete: bool,

    /// Select rules to apply (comma-separated list), see `pomerge rules`
    #[arg(short, long)]
    pub select: Option<String>,

    /// Ignore rules (comma-separated list)
    #[arg(short, long)]
    pub ignore: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub output: CheckOutputFormat,

    /// Quiet mode: do not report anything, only set the exit code
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `rules` command.
#[derive(Debug, Args)]
pub struct RulesArgs;

/// Output format for the `check` command.
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CheckOutputFormat {
    #[default]
    /// Human readable text format
    Human,

    /// JSON
    Json,
}

impl std::fmt::Display for CheckOutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CheckOutputFormat::Human => write!(f, "human"),
            CheckOutputFormat::Json => write!(f, "json"),
        }
    }
}
