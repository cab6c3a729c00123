// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! A message of a PO catalog.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::po::format::Dialect;

/// Separator between msgctxt and msgid in lookup keys. Strings containing
/// this byte are rejected by the lexer, so keys cannot collide.
pub const MSGCTXT_SEPARATOR: char = '\u{4}';

/// Tri-state recorded for each known format dialect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FormatFlag {
    #[default]
    No,
    /// The string looks like a format string but was not marked explicitly.
    Possible,
    Yes,
}

/// One of the syntax checks a message can opt in or out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SyntaxCheck {
    EllipsisUnicode,
    SpaceEllipsis,
    QuoteUnicode,
    BulletUnicode,
}

/// A file-name / line-number reference (`#: file:line`).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FilePos {
    pub file: String,
    pub line: usize,
}

impl FilePos {
    #[must_use]
    pub fn new<S: AsRef<str>>(file: S, line: usize) -> Self {
        Self {
            file: file.as_ref().to_string(),
            line,
        }
    }
}

impl std::fmt::Display for FilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            write!(f, "{}", self.file)
        }
    }
}

/// The primary datum of a catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Message {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// One string for a non-plural message, nplurals strings otherwise.
    pub msgstr: Vec<String>,
    /// Previous fields carried for fuzzy-match review (`#| …`). Only a
    /// fuzzy message may keep them; the writer strips them otherwise.
    pub prev_msgctxt: Option<String>,
    pub prev_msgid: Option<String>,
    pub prev_msgid_plural: Option<String>,
    pub fuzzy: bool,
    pub obsolete: bool,
    /// Tri-state per known format dialect; absent means `No`.
    pub formats: BTreeMap<Dialect, FormatFlag>,
    /// Plural-range constraint (`#, range: MIN..MAX`).
    pub range: Option<(u32, u32)>,
    /// Line-wrap preference: `Some(false)` for `no-wrap`, `Some(true)` for
    /// `wrap`, `None` when unstated.
    pub wrap: Option<bool>,
    /// Per-message overrides for the syntax checks.
    pub syntax_checks: BTreeMap<SyntaxCheck, bool>,
    /// Translator comments (`# …`).
    pub comments: Vec<String>,
    /// Extracted comments (`#. …`).
    pub extracted: Vec<String>,
    /// Source references (`#: …`).
    pub filepos: Vec<FilePos>,
    /// Position of the definition in the catalog file.
    pub pos: FilePos,
}

impl Message {
    /// Create a message with the given msgid and a single empty msgstr.
    #[must_use]
    pub fn new<S: AsRef<str>>(msgid: S) -> Self {
        Self {
            msgid: msgid.as_ref().to_string(),
            msgstr: vec![String::new()],
            ..Default::default()
        }
    }

    /// The lookup key of a `(msgctxt, msgid)` pair: the two strings joined
    /// by the separator byte, or the msgid alone without context.
    #[must_use]
    pub fn key_of(msgctxt: Option<&str>, msgid: &str) -> String {
        match msgctxt {
            Some(ctxt) => {
                let mut key = String::with_capacity(ctxt.len() + msgid.len() + 1);
                key.push_str(ctxt);
                key.push(MSGCTXT_SEPARATOR);
                key.push_str(msgid);
                key
            }
            None => msgid.to_string(),
        }
    }

    /// The lookup key of this message.
    #[must_use]
    pub fn key(&self) -> String {
        Message::key_of(self.msgctxt.as_deref(), &self.msgid)
    }

    /// Return `true` if this is the header entry (empty msgid, no msgctxt).
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }

    /// Return `true` if this message has a plural form.
    #[must_use]
    pub fn has_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Return `true` if this message has at least one non-empty translation
    /// string (even if the message is marked as fuzzy).
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.msgstr.iter().any(|s| !s.is_empty())
    }

    /// The tri-state flag of a format dialect.
    #[must_use]
    pub fn format_flag(&self, dialect: Dialect) -> FormatFlag {
        self.formats.get(&dialect).copied().unwrap_or_default()
    }

    /// Clear the previous-msg fields.
    pub fn clear_previous(&mut self) {
        self.prev_msgctxt = None;
        self.prev_msgid = None;
        self.prev_msgid_plural = None;
    }

    /// Return `true` if the other message is a textually identical
    /// redefinition of this one (used to tolerate idempotent merges).
    #[must_use]
    pub fn same_text(&self, other: &Message) -> bool {
        self.msgctxt == other.msgctxt
            && self.msgid == other.msgid
            && self.msgid_plural == other.msgid_plural
            && self.msgstr == other.msgstr
            && self.fuzzy == other.fuzzy
            && self.obsolete == other.obsolete
    }
}
