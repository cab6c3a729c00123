// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog model: domains and domain lists.

use std::collections::HashMap;

use encoding_rs::Encoding;

use crate::po::header::strip_pot_creation_date;
use crate::po::message::Message;

/// Name of the default domain.
pub const DEFAULT_DOMAIN: &str = "messages";

/// A named bucket of messages with fast `(msgctxt, msgid)` lookup over the
/// non-obsolete entries.
#[derive(Clone, Debug, Default)]
pub struct Domain {
    pub name: String,
    pub messages: Vec<Message>,
    index: HashMap<String, usize>,
}

impl Domain {
    #[must_use]
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            ..Default::default()
        }
    }

    /// Append a message, indexing it when it is not obsolete. The first
    /// definition of a key wins in the index.
    pub fn append(&mut self, message: Message) -> usize {
        let idx = self.messages.len();
        if !message.obsolete {
            self.index.entry(message.key()).or_insert(idx);
        }
        self.messages.push(message);
        idx
    }

    /// Index of the non-obsolete message with the given context and msgid.
    #[must_use]
    pub fn find_index(&self, msgctxt: Option<&str>, msgid: &str) -> Option<usize> {
        self.index
            .get(&Message::key_of(msgctxt, msgid))
            .copied()
    }

    /// The non-obsolete message with the given context and msgid.
    #[must_use]
    pub fn find(&self, msgctxt: Option<&str>, msgid: &str) -> Option<&Message> {
        self.find_index(msgctxt, msgid).map(|i| &self.messages[i])
    }

    /// The header entry of this domain.
    #[must_use]
    pub fn header(&self) -> Option<&Message> {
        self.find(None, "")
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, message) in self.messages.iter().enumerate() {
            if !message.obsolete {
                self.index.entry(message.key()).or_insert(idx);
            }
        }
    }

    /// Sort messages lexicographically on the combined context/msgid key.
    pub fn sort_by_msgid(&mut self) {
        self.messages.sort_by_key(Message::key);
        self.rebuild_index();
    }

    /// Sort messages by their first file reference, stable, entries without
    /// a reference ordered last.
    pub fn sort_by_filepos(&mut self) {
        self.messages.sort_by(|a, b| {
            match (a.filepos.first(), b.filepos.first()) {
                (Some(fa), Some(fb)) => fa.cmp(fb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        self.rebuild_index();
    }

    /// Move obsolete entries to the end, keeping relative order.
    pub fn move_obsolete_to_end(&mut self) {
        let (current, obsolete): (Vec<_>, Vec<_>) =
            self.messages.drain(..).partition(|m| !m.obsolete);
        self.messages = current;
        self.messages.extend(obsolete);
        self.rebuild_index();
    }

    /// Compare two domains, optionally ignoring the `POT-Creation-Date:`
    /// header line. Definition positions are not compared.
    #[must_use]
    pub fn equal(&self, other: &Domain, ignore_pot_date: bool) -> bool {
        self.name == other.name
            && self.messages.len() == other.messages.len()
            && self
                .messages
                .iter()
                .zip(&other.messages)
                .all(|(a, b)| messages_equal(a, b, ignore_pot_date))
    }
}

/// Compare two messages field by field, skipping the position of definition.
fn messages_equal(a: &Message, b: &Message, ignore_pot_date: bool) -> bool {
    let msgstr_equal = if ignore_pot_date && a.is_header() && b.is_header() {
        a.msgstr.len() == b.msgstr.len()
            && a.msgstr
                .iter()
                .zip(&b.msgstr)
                .all(|(x, y)| strip_pot_creation_date(x) == strip_pot_creation_date(y))
    } else {
        a.msgstr == b.msgstr
    };
    msgstr_equal
        && a.msgctxt == b.msgctxt
        && a.msgid == b.msgid
        && a.msgid_plural == b.msgid_plural
        && a.prev_msgctxt == b.prev_msgctxt
        && a.prev_msgid == b.prev_msgid
        && a.prev_msgid_plural == b.prev_msgid_plural
        && a.fuzzy == b.fuzzy
        && a.obsolete == b.obsolete
        && a.formats == b.formats
        && a.range == b.range
        && a.wrap == b.wrap
        && a.comments == b.comments
        && a.extracted == b.extracted
        && a.filepos == b.filepos
}

/// An ordered sequence of domains with an optional canonical encoding.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub domains: Vec<Domain>,
    /// Encoding declared by the file the catalog was read from. Strings are
    /// held as UTF-8 in memory; this drives the encoding used on write.
    pub encoding: Option<&'static Encoding>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Catalog::default()
    }

    #[must_use]
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// The domain with the given name, created empty when missing.
    pub fn domain_mut(&mut self, name: &str) -> &mut Domain {
        let idx = match self.domains.iter().position(|d| d.name == name) {
            Some(idx) => idx,
            None => {
                self.domains.push(Domain::new(name));
                self.domains.len() - 1
            }
        };
        &mut self.domains[idx]
    }

    /// The header entry: the default domain's when present, otherwise the
    /// first domain carrying one.
    #[must_use]
    pub fn header(&self) -> Option<&Message> {
        if let Some(header) = self.domain(DEFAULT_DOMAIN).and_then(Domain::header) {
            return Some(header);
        }
        self.domains.iter().find_map(Domain::header)
    }

    /// Total number of messages across all domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.iter().map(|d| d.messages.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sort_by_msgid(&mut self) {
        for domain in &mut self.domains {
            domain.sort_by_msgid();
        }
    }

    pub fn sort_by_filepos(&mut self) {
        for domain in &mut self.domains {
            domain.sort_by_filepos();
        }
    }

    pub fn move_obsolete_to_end(&mut self) {
        for domain in &mut self.domains {
            domain.move_obsolete_to_end();
        }
    }

    /// Compare two catalogs, optionally ignoring `POT-Creation-Date:` so
    /// that a regenerated template does not register as a change.
    #[must_use]
    pub fn equal(&self, other: &Catalog, ignore_pot_date: bool) -> bool {
        self.domains.len() == other.domains.len()
            && self
                .domains
                .iter()
                .zip(&other.domains)
                .all(|(a, b)| a.equal(b, ignore_pot_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::po::message::FilePos;

    fn message(msgid: &str, msgstr: &str) -> Message {
        let mut msg = Message::new(msgid);
        msg.msgstr = vec![msgstr.to_string()];
        msg
    }

    #[test]
    fn test_append_and_find() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        domain.append(message("hello", "bonjour"));
        let mut with_ctxt = message("may", "mai");
        with_ctxt.msgctxt = Some("month".to_string());
        domain.append(with_ctxt);
        assert_eq!(domain.find(None, "hello").unwrap().msgstr[0], "bonjour");
        assert!(domain.find(None, "may").is_none());
        assert_eq!(domain.find(Some("month"), "may").unwrap().msgstr[0], "mai");
    }

    #[test]
    fn test_obsolete_not_indexed() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        let mut obsolete = message("old", "vieux");
        obsolete.obsolete = true;
        domain.append(obsolete);
        assert!(domain.find(None, "old").is_none());
        assert_eq!(domain.messages.len(), 1);
    }

    #[test]
    fn test_first_definition_wins_in_index() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        domain.append(message("key", "first"));
        domain.append(message("key", "second"));
        assert_eq!(domain.find(None, "key").unwrap().msgstr[0], "first");
    }

    #[test]
    fn test_sort_by_msgid_keeps_header_first() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        domain.append(message("zebra", ""));
        domain.append(message("", "Project-Id-Version: x\n"));
        domain.append(message("apple", ""));
        domain.sort_by_msgid();
        let ids: Vec<_> = domain.messages.iter().map(|m| m.msgid.as_str()).collect();
        assert_eq!(ids, vec!["", "apple", "zebra"]);
        assert!(domain.find(None, "apple").is_some());
    }

    #[test]
    fn test_sort_by_filepos_is_stable_and_idempotent() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        let mut a = message("a", "");
        a.filepos.push(FilePos::new("src/z.c", 10));
        let mut b = message("b", "");
        b.filepos.push(FilePos::new("src/a.c", 5));
        let c = message("c", "");
        let mut d = message("d", "");
        d.filepos.push(FilePos::new("src/a.c", 5));
        domain.append(a);
        domain.append(b);
        domain.append(c);
        domain.append(d);
        domain.sort_by_filepos();
        let order: Vec<_> = domain.messages.iter().map(|m| m.msgid.as_str()).collect();
        // Same reference keeps insertion order; no reference sorts last.
        assert_eq!(order, vec!["b", "d", "a", "c"]);
        let before = domain.messages.clone();
        domain.sort_by_filepos();
        assert_eq!(domain.messages, before);
    }

    #[test]
    fn test_move_obsolete_to_end() {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        let mut old = message("old", "vieux");
        old.obsolete = true;
        domain.append(old);
        domain.append(message("new", "nouveau"));
        domain.move_obsolete_to_end();
        let ids: Vec<_> = domain.messages.iter().map(|m| m.msgid.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_equal_ignores_pot_creation_date() {
        let mut a = Catalog::new();
        a.domain_mut(DEFAULT_DOMAIN).append(message(
            "",
            "Project-Id-Version: x\nPOT-Creation-Date: 2025-01-01 00:00+0000\n",
        ));
        let mut b = Catalog::new();
        b.domain_mut(DEFAULT_DOMAIN).append(message(
            "",
            "Project-Id-Version: x\nPOT-Creation-Date: 2026-07-30 09:00+0200\n",
        ));
        assert!(!a.equal(&b, false));
        assert!(a.equal(&b, true));
    }

    #[test]
    fn test_equal_ignores_definition_position() {
        let mut a = Catalog::new();
        let mut msg = message("hello", "bonjour");
        msg.pos = FilePos::new("fr.po", 12);
        a.domain_mut(DEFAULT_DOMAIN).append(msg);
        let mut b = Catalog::new();
        let mut msg = message("hello", "bonjour");
        msg.pos = FilePos::new("fr.po", 99);
        b.domain_mut(DEFAULT_DOMAIN).append(msg);
        assert!(a.equal(&b, false));
    }

    #[test]
    fn test_domain_mut_creates() {
        let mut catalog = Catalog::new();
        assert!(catalog.domain("extra").is_none());
        catalog.domain_mut("extra").append(message("x", "y"));
        assert_eq!(catalog.domain("extra").unwrap().messages.len(), 1);
    }
}
