// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! PO serialization.

use memchr::memchr;

use crate::po::catalog::{Catalog, DEFAULT_DOMAIN};
use crate::po::charset;
use crate::po::escape::EscapePoExt;
use crate::po::message::{FilePos, FormatFlag, Message};

/// Render a whole catalog to PO text.
#[must_use]
pub fn catalog_to_string(catalog: &Catalog) -> String {
    let mut out = String::new();
    let single_default =
        catalog.domains.len() == 1 && catalog.domains[0].name == DEFAULT_DOMAIN;
    // File names with spaces are isolated in `#:` lines when the output
    // charset can express the isolate markers.
    let isolate = catalog
        .encoding
        .is_none_or(|e| charset::isolate_markers(e).is_some());
    for domain in &catalog.domains {
        if !single_default {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("domain \"{}\"\n", domain.name.escape_po()));
        }
        for message in &domain.messages {
            if !out.is_empty() {
                out.push('\n');
            }
            write_message(&mut out, message, isolate);
        }
    }
    out
}

/// Render a catalog and encode it in its declared charset (UTF-8 when none
/// is declared).
#[must_use]
pub fn catalog_to_bytes(catalog: &Catalog) -> Vec<u8> {
    let text = catalog_to_string(catalog);
    match catalog.encoding {
        Some(encoding) if encoding != encoding_rs::UTF_8 => {
            encoding.encode(&text).0.into_owned()
        }
        _ => text.into_bytes(),
    }
}

/// The `#,` flags line of a message, or `None` when it carries no flag.
fn flags_line(msg: &Message) -> Option<String> {
    let mut flags: Vec<String> = Vec::new();
    if msg.fuzzy {
        flags.push("fuzzy".to_string());
    }
    for (dialect, value) in &msg.formats {
        match value {
            FormatFlag::Yes => flags.push(format!("{dialect}-format")),
            FormatFlag::Possible => flags.push(format!("possible-{dialect}-format")),
            FormatFlag::No => flags.push(format!("no-{dialect}-format")),
        }
    }
    if let Some((min, max)) = msg.range {
        flags.push(format!("range: {min}..{max}"));
    }
    match msg.wrap {
        Some(true) => flags.push("wrap".to_string()),
        Some(false) => flags.push("no-wrap".to_string()),
        None => {}
    }
    if flags.is_empty() {
        None
    } else {
        Some(flags.join(", "))
    }
}

fn write_comment(out: &mut String, marker: &str, text: &str) {
    if text.is_empty() {
        out.push_str(marker);
    } else {
        out.push_str(marker);
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');
}

/// Write `keyword "value"`, splitting multi-line values after each newline
/// with an empty first segment, every line prefixed (for obsolete and
/// previous-msg entries).
fn write_string_field(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let multiline =
        memchr(b'\n', value.as_bytes()).is_some_and(|pos| pos + 1 < value.len());
    out.push_str(prefix);
    out.push_str(keyword);
    if multiline {
        out.push_str(" \"\"\n");
        for segment in value.split_inclusive('\n') {
            out.push_str(prefix);
            out.push('"');
            out.push_str(&segment.escape_po());
            out.push_str("\"\n");
        }
    } else {
        out.push_str(" \"");
        out.push_str(&value.escape_po());
        out.push_str("\"\n");
    }
}

/// One `#:` reference token, isolating file names that contain spaces.
fn filepos_token(filepos: &FilePos, isolate: bool) -> String {
    let file = if isolate && filepos.file.contains(char::is_whitespace) {
        format!("\u{2068}{}\u{2069}", filepos.file)
    } else {
        filepos.file.clone()
    };
    if filepos.line > 0 {
        format!("{file}:{}", filepos.line)
    } else {
        file
    }
}

fn write_message(out: &mut String, msg: &Message, isolate: bool) {
    for comment in &msg.comments {
        write_comment(out, "#", comment);
    }
    for comment in &msg.extracted {
        write_comment(out, "#.", comment);
    }
    if !msg.filepos.is_empty() {
        let refs: Vec<String> = msg
            .filepos
            .iter()
            .map(|fp| filepos_token(fp, isolate))
            .collect();
        write_comment(out, "#:", &refs.join(" "));
    }
    if let Some(flags) = flags_line(msg) {
        write_comment(out, "#,", &flags);
    }
    let prefix = if msg.obsolete { "#~ " } else { "" };
    // Only a fuzzy message may carry previous-msg fields on the wire.
    if msg.fuzzy {
        let prev_prefix = if msg.obsolete { "#~| " } else { "#| " };
        if let Some(prev) = &msg.prev_msgctxt {
            write_string_field(out, prev_prefix, "msgctxt", prev);
        }
        if let Some(prev) = &msg.prev_msgid {
            write_string_field(out, prev_prefix, "msgid", prev);
        }
        if let Some(prev) = &msg.prev_msgid_plural {
            write_string_field(out, prev_prefix, "msgid_plural", prev);
        }
    }
    if let Some(msgctxt) = &msg.msgctxt {
        write_string_field(out, prefix, "msgctxt", msgctxt);
    }
    write_string_field(out, prefix, "msgid", &msg.msgid);
    if let Some(plural) = &msg.msgid_plural {
        write_string_field(out, prefix, "msgid_plural", plural);
        for (idx, form) in msg.msgstr.iter().enumerate() {
            write_string_field(out, prefix, &format!("msgstr[{idx}]"), form);
        }
    } else {
        let empty = String::new();
        let form = msg.msgstr.first().unwrap_or(&empty);
        write_string_field(out, prefix, "msgstr", form);
    }
}
