// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Header entry fields.
//!
//! The header is the message with empty msgid; its msgstr is a sequence of
//! `Field: value` lines. A fixed set of fields is recognized; everything
//! else (notably `Plural-Forms:`) lives in an unknown bucket that keeps the
//! line order.

/// The recognized header fields, in canonical output order.
pub const KNOWN_FIELDS: [&str; 10] = [
    "Project-Id-Version",
    "Report-Msgid-Bugs-To",
    "POT-Creation-Date",
    "PO-Revision-Date",
    "Last-Translator",
    "Language-Team",
    "Language",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
];

/// English language-team names with a country variant.
const LANGUAGE_VARIANTS: [(&str, &str); 8] = [
    ("Brazilian Portuguese", "pt_BR"),
    ("Portuguese (Brazil)", "pt_BR"),
    ("Chinese (simplified)", "zh_CN"),
    ("Chinese (traditional)", "zh_TW"),
    ("Simplified Chinese", "zh_CN"),
    ("Traditional Chinese", "zh_TW"),
    ("English (British)", "en_GB"),
    ("Norwegian Bokmaal", "nb"),
];

/// English language names and their codes.
const LANGUAGE_NAMES: [(&str, &str); 48] = [
    ("Arabic", "ar"),
    ("Basque", "eu"),
    ("Belarusian", "be"),
    ("Bulgarian", "bg"),
    ("Catalan", "ca"),
    ("Chinese", "zh"),
    ("Croatian", "hr"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Esperanto", "eo"),
    ("Estonian", "et"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("Galician", "gl"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hebrew", "he"),
    ("Hindi", "hi"),
    ("Hungarian", "hu"),
    ("Icelandic", "is"),
    ("Indonesian", "id"),
    ("Irish", "ga"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Kazakh", "kk"),
    ("Korean", "ko"),
    ("Latvian", "lv"),
    ("Lithuanian", "lt"),
    ("Macedonian", "mk"),
    ("Norwegian", "no"),
    ("Persian", "fa"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Russian", "ru"),
    ("Serbian", "sr"),
    ("Slovak", "sk"),
    ("Slovenian", "sl"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Thai", "th"),
    ("Turkish", "tr"),
    ("Ukrainian", "uk"),
    ("Vietnamese", "vi"),
    ("Walloon", "wa"),
    ("Welsh", "cy"),
];

/// The parsed fields of a header msgstr.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    known: [Option<String>; 10],
    /// Unrecognized lines, kept verbatim in order.
    pub unknown: Vec<String>,
}

fn field_index(name: &str) -> Option<usize> {
    KNOWN_FIELDS.iter().position(|f| f.eq_ignore_ascii_case(name))
}

impl Header {
    /// Parse the msgstr of a header entry.
    #[must_use]
    pub fn parse(msgstr: &str) -> Self {
        let mut header = Header::default();
        for line in msgstr.split('\n') {
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((name, value)) => match field_index(name.trim()) {
                    Some(idx) => {
                        // The first occurrence of a field wins.
                        if header.known[idx].is_none() {
                            header.known[idx] = Some(value.trim().to_string());
                        }
                    }
                    None => header.unknown.push(line.to_string()),
                },
                None => header.unknown.push(line.to_string()),
            }
        }
        header
    }

    /// Look up a field by name, searching the known fields and then the
    /// unknown bucket.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(idx) = field_index(name) {
            return self.known[idx].as_deref();
        }
        self.unknown.iter().find_map(|line| {
            let (field, value) = line.split_once(':')?;
            field.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    /// Set a known field; unrecognized names are appended to the unknown
    /// bucket.
    pub fn set(&mut self, name: &str, value: &str) {
        match field_index(name) {
            Some(idx) => self.known[idx] = Some(value.to_string()),
            None => self.unknown.push(format!("{name}: {value}")),
        }
    }

    /// The charset declared in `Content-Type`, verbatim.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        let content_type = self.get("Content-Type")?;
        let pos = content_type.find("charset=")?;
        let value = &content_type[pos + 8..];
        let end = value
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(value.len());
        Some(&value[..end])
    }

    /// Render the header back to a msgstr, known fields in canonical order
    /// followed by the unknown lines.
    #[must_use]
    pub fn to_msgstr(&self) -> String {
        let mut out = String::new();
        for (idx, name) in KNOWN_FIELDS.iter().enumerate() {
            if let Some(value) = &self.known[idx] {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        for line in &self.unknown {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// The header msgstr of a freshly extracted template.
    #[must_use]
    pub fn template() -> Self {
        let mut header = Header::default();
        header.set("Project-Id-Version", "PACKAGE VERSION");
        header.set("Report-Msgid-Bugs-To", "");
        header.set("POT-Creation-Date", "");
        header.set("PO-Revision-Date", "YEAR-MO-DA HO:MI+ZONE");
        header.set("Last-Translator", "FULL NAME <EMAIL@ADDRESS>");
        header.set("Language-Team", "LANGUAGE <LL@li.org>");
        header.set("Language", "");
        header.set("MIME-Version", "1.0");
        header.set("Content-Type", "text/plain; charset=CHARSET");
        header.set("Content-Transfer-Encoding", "8bit");
        header
    }
}

/// Merge the header fields of the definitions and the references.
///
/// `Report-Msgid-Bugs-To` and `POT-Creation-Date` come from the reference;
/// everything else, the unknown bucket included, comes from the
/// definitions. A missing `Language:` is synthesized from `Language-Team:`
/// unless overridden by `catalogname`.
#[must_use]
pub fn merge_headers(def: &Header, reference: &Header, catalogname: Option<&str>) -> Header {
    let mut out = def.clone();
    for field in ["Report-Msgid-Bugs-To", "POT-Creation-Date"] {
        if let Some(value) = reference.get(field) {
            out.set(field, value);
        }
    }
    if out.get("MIME-Version").is_none() {
        out.set("MIME-Version", "1.0");
    }
    if out.get("Content-Transfer-Encoding").is_none() {
        out.set("Content-Transfer-Encoding", "8bit");
    }
    if let Some(lang) = catalogname {
        out.set("Language", lang);
    } else if out.get("Language").is_none_or(|l| l.is_empty())
        && let Some(team) = out.get("Language-Team")
        && let Some(code) = language_code_for_team(team)
    {
        out.set("Language", code);
    }
    out
}

/// Infer a language code from a `Language-Team:` value, stripping a
/// trailing URL or email token first.
#[must_use]
pub fn language_code_for_team(team: &str) -> Option<&'static str> {
    let mut name = team.trim();
    if let Some(pos) = name.rfind(char::is_whitespace) {
        let tail = &name[pos + 1..];
        if tail.contains('@') || tail.contains("://") || tail.starts_with('<') {
            name = name[..pos].trim_end();
        }
    }
    for (variant, code) in LANGUAGE_VARIANTS {
        if variant.eq_ignore_ascii_case(name) {
            return Some(code);
        }
    }
    for (language, code) in LANGUAGE_NAMES {
        if language.eq_ignore_ascii_case(name) {
            return Some(code);
        }
    }
    None
}

/// Remove the `POT-Creation-Date:` line from a header msgstr, for catalog
/// comparisons that must not register a regenerated template as a change.
#[must_use]
pub fn strip_pot_creation_date(msgstr: &str) -> String {
    msgstr
        .split_inclusive('\n')
        .filter(|line| {
            !line
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("pot-creation-date:")
        })
        .collect()
}
