// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog merging.

pub mod engine;
pub mod fuzzy;

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::args::MergeArgs;
use crate::backup::{self, BackupMethod};
use crate::merge::engine::{MergeOptions, merge};
use crate::po::catalog::Catalog;
use crate::po::parser::{ParseOptions, parse_po};
use crate::po::writer::catalog_to_bytes;

/// Read and parse one input catalog; diagnostics go to the secondary
/// stream, errors make the whole command fail.
fn load_catalog(path: &Path, options: ParseOptions) -> Result<Catalog, ()> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!(
                "{}: {}: {err}",
                "error".bright_red().bold(),
                path.display()
            );
            return Err(());
        }
    };
    let result = parse_po(&data, path, options);
    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }
    if result.is_ok() {
        Ok(result.catalog)
    } else {
        Err(())
    }
}

/// Run the `merge` command.
pub fn run_merge(args: &MergeArgs) -> i32 {
    let Ok(definitions) = load_catalog(&args.def, ParseOptions::for_path(&args.def)) else {
        return 1;
    };
    let Ok(references) = load_catalog(&args.reference, ParseOptions::for_path(&args.reference))
    else {
        return 1;
    };
    let mut compendiums = Vec::with_capacity(args.compendium.len());
    for path in &args.compendium {
        let options = ParseOptions {
            allow_duplicates: true,
            ..ParseOptions::for_path(path)
        };
        let Ok(compendium) = load_catalog(path, options) else {
            return 1;
        };
        compendiums.push(compendium);
    }

    let options = MergeOptions {
        use_fuzzy_matching: !args.no_fuzzy_matching,
        keep_previous: args.previous,
        for_msgfmt: args.for_msgfmt,
        multi_domain: args.multi_domain,
        catalogname: args.lang.clone(),
        quiet: args.quiet,
    };
    let (mut merged, stats) = merge(&definitions, &references, &compendiums, &options);
    if args.sort_output {
        merged.sort_by_msgid();
    } else if args.sort_by_file {
        merged.sort_by_filepos();
    }

    let rc = if args.update {
        if merged.equal(&definitions, true) {
            // Nothing changed: leave the file untouched.
            0
        } else {
            let method = args
                .backup
                .as_deref()
                .and_then(BackupMethod::from_name)
                .unwrap_or_else(BackupMethod::from_env);
            let suffix = args
                .suffix
                .clone()
                .unwrap_or_else(backup::backup_suffix);
            match backup::make_backup(&args.def, method, &suffix) {
                Ok(_) => write_output(&merged, Some(&args.def)),
                Err(err) => {
                    eprintln!(
                        "{}: cannot back up {}: {err}",
                        "error".bright_red().bold(),
                        args.def.display()
                    );
                    1
                }
            }
        }
    } else {
        write_output(&merged, args.output.as_deref())
    };
    if rc == 0 && !args.quiet {
        eprintln!("{stats}");
    }
    rc
}

fn write_output(catalog: &Catalog, path: Option<&Path>) -> i32 {
    let bytes = catalog_to_bytes(catalog);
    match path {
        Some(path) => match fs::write(path, bytes) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!(
                    "{}: cannot write {}: {err}",
                    "error".bright_red().bold(),
                    path.display()
                );
                1
            }
        },
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            if stdout.write_all(&bytes).is_err() {
                return 1;
            }
            0
        }
    }
}
