// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! PO grammar driver.
//!
//! Assembles lexer tokens into catalog entries. Comments accumulate between
//! entries and attach to the next message; a blank line resets them. The
//! header entry is handled as soon as it completes, so the declared charset
//! drives the decoding of everything after it.

use std::path::Path;

use crate::diagnostic::{DEFAULT_ERROR_CEILING, Diagnostic, Severity};
use crate::po::catalog::{Catalog, DEFAULT_DOMAIN};
use crate::po::charset;
use crate::po::format::Dialect;
use crate::po::header::Header;
use crate::po::lexer::{CommentKind, Lexer, Token, TokenKind};
use crate::po::message::{FilePos, FormatFlag, Message};

#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Keep duplicate `(msgctxt, msgid)` definitions instead of reporting
    /// them; meant for compendium concatenation.
    pub allow_duplicates: bool,
    /// The file is a template (`.pot`): missing or placeholder charsets are
    /// tolerated silently.
    pub is_template: bool,
    /// Abort after this many errors; 0 means effectively unlimited.
    pub error_ceiling: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_duplicates: false,
            is_template: false,
            error_ceiling: DEFAULT_ERROR_CEILING,
        }
    }
}

impl ParseOptions {
    /// Template options for the given path: `.pot` files tolerate a
    /// missing charset.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self {
            is_template: path.extension().is_some_and(|ext| ext == "pot"),
            ..Default::default()
        }
    }
}

pub struct ParseResult {
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ParseResult {
    /// Return `true` when the parse produced no error-severity diagnostic.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error_count == 0
    }
}

/// Comments accumulated for the next message.
#[derive(Default)]
struct PendingComments {
    comments: Vec<String>,
    extracted: Vec<String>,
    filepos: Vec<FilePos>,
    flags: Vec<String>,
}

impl PendingComments {
    fn reset(&mut self) {
        self.comments.clear();
        self.extracted.clear();
        self.filepos.clear();
        self.flags.clear();
    }

    fn add(&mut self, kind: CommentKind, text: String) {
        match kind {
            CommentKind::Translator => self.comments.push(text),
            CommentKind::Extracted => self.extracted.push(text),
            CommentKind::FilePos => parse_filepos_text(&text, &mut self.filepos),
            CommentKind::Flags => self.flags.push(text),
        }
    }

    /// Attach the accumulated comments to a message and parse its flags.
    fn attach(&mut self, msg: &mut Message) {
        msg.comments = std::mem::take(&mut self.comments);
        msg.extracted = std::mem::take(&mut self.extracted);
        msg.filepos = std::mem::take(&mut self.filepos);
        for line in self.flags.drain(..) {
            for flag in line.split(',') {
                apply_flag(msg, flag.trim());
            }
        }
    }
}

/// Parse the references of a `#:` line. A file name containing spaces is
/// wrapped between U+2068 FIRST STRONG ISOLATE and U+2069 POP DIRECTIONAL
/// ISOLATE.
fn parse_filepos_text(text: &str, out: &mut Vec<FilePos>) {
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('\u{2068}')
            && let Some(end) = stripped.find('\u{2069}')
        {
            let file = &stripped[..end];
            let after = &stripped[end + '\u{2069}'.len_utf8()..];
            let digits = after
                .strip_prefix(':')
                .map(|a| a.split_whitespace().next().unwrap_or(""))
                .unwrap_or("");
            if digits.chars().all(|c| c.is_ascii_digit()) && !digits.is_empty() {
                out.push(FilePos::new(file, digits.parse().unwrap_or(0)));
                rest = after[1 + digits.len()..].trim_start();
            } else {
                out.push(FilePos::new(file, 0));
                rest = after.trim_start();
            }
            continue;
        }
        let token = rest.split_whitespace().next().unwrap_or(rest);
        match token.rsplit_once(':') {
            Some((file, line))
                if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) =>
            {
                out.push(FilePos::new(file, line.parse().unwrap_or(0)));
            }
            _ => out.push(FilePos::new(token, 0)),
        }
        rest = rest[token.len()..].trim_start();
    }
}

fn apply_flag(msg: &mut Message, flag: &str) {
    if flag == "fuzzy" {
        msg.fuzzy = true;
    } else if flag == "wrap" {
        msg.wrap = Some(true);
    } else if flag == "no-wrap" {
        msg.wrap = Some(false);
    } else if let Some(range) = flag.strip_prefix("range:") {
        if let Some((min, max)) = range.trim().split_once("..")
            && let (Ok(min), Ok(max)) = (min.trim().parse::<u32>(), max.trim().parse::<u32>())
        {
            // Several range flags in one entry unite.
            msg.range = match msg.range {
                Some((old_min, old_max)) => Some((old_min.min(min), old_max.max(max))),
                None => Some((min, max)),
            };
        }
    } else if let Some(name) = flag.strip_suffix("-format") {
        let (name, value) = if let Some(name) = name.strip_prefix("no-") {
            (name, FormatFlag::No)
        } else if let Some(name) = name.strip_prefix("possible-") {
            (name, FormatFlag::Possible)
        } else {
            (name, FormatFlag::Yes)
        };
        if let Some(dialect) = Dialect::from_name(name) {
            msg.formats.insert(dialect, value);
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    catalog: Catalog,
    domain: String,
    pending: PendingComments,
    options: ParseOptions,
    path: String,
    header_seen: bool,
    aborted: bool,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8], path: &Path, options: ParseOptions) -> Self {
        let mut lexer = Lexer::new(data, path);
        lexer.reader.reporter.set_ceiling(options.error_ceiling);
        Self {
            lexer,
            lookahead: None,
            catalog: Catalog::new(),
            domain: DEFAULT_DOMAIN.to_string(),
            pending: PendingComments::default(),
            options,
            path: path.display().to_string(),
            header_seen: false,
            aborted: false,
        }
    }

    fn peek(&mut self) -> &Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lexer.next_token());
        }
        match &self.lookahead {
            Some(token) => token,
            None => unreachable!(),
        }
    }

    fn bump(&mut self) -> Token {
        match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        }
    }

    fn error(&mut self, line: usize, column: usize, message: String) {
        if !self
            .lexer
            .reader
            .reporter
            .error(line, column, "po-syntax", message)
        {
            self.aborted = true;
        }
    }

    fn warning(&mut self, line: usize, message: String) {
        self.lexer
            .reader
            .reporter
            .warning(line, 0, "po-charset", message);
    }

    fn run(mut self) -> ParseResult {
        loop {
            if self.aborted || self.lexer.reader.reporter.exhausted() {
                break;
            }
            let token = self.bump();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::BlankLine => self.pending.reset(),
                TokenKind::Comment(kind, text) => self.pending.add(kind, text),
                TokenKind::Domain => self.parse_domain_directive(&token),
                TokenKind::PrevMsgctxt
                | TokenKind::PrevMsgid
                | TokenKind::Msgctxt
                | TokenKind::Msgid => self.parse_entry(token),
                TokenKind::Msgstr => {
                    self.error(token.line, token.column, "msgstr without msgid".to_string());
                    self.skip_strings();
                }
                TokenKind::Name(name) => {
                    self.error(token.line, token.column, format!("keyword \"{name}\" unknown"));
                }
                _ => {
                    self.error(token.line, token.column, "parse error".to_string());
                }
            }
        }
        let reporter = &mut self.lexer.reader.reporter;
        ParseResult {
            catalog: self.catalog,
            diagnostics: std::mem::take(&mut reporter.diagnostics),
            error_count: reporter.error_count,
            warning_count: reporter.warning_count,
        }
    }

    fn parse_domain_directive(&mut self, token: &Token) {
        if matches!(self.peek().kind, TokenKind::Str(_)) {
            self.domain = self.string_value();
        } else {
            self.error(
                token.line,
                token.column,
                "missing domain name after \"domain\"".to_string(),
            );
        }
    }

    /// Concatenate one or more adjacent string tokens.
    fn string_value(&mut self) -> String {
        let mut value = String::new();
        while matches!(
            self.peek().kind,
            TokenKind::Str(_) | TokenKind::PrevStr(_)
        ) {
            match self.bump().kind {
                TokenKind::Str(s) | TokenKind::PrevStr(s) => value.push_str(&s),
                _ => unreachable!(),
            }
        }
        value
    }

    /// Expect a string after a keyword token; report and yield an empty
    /// string when it is missing.
    fn expect_string(&mut self, keyword: &Token, what: &str) -> String {
        if matches!(
            self.peek().kind,
            TokenKind::Str(_) | TokenKind::PrevStr(_)
        ) {
            self.string_value()
        } else {
            self.error(
                keyword.line,
                keyword.column,
                format!("missing string after {what}"),
            );
            String::new()
        }
    }

    fn skip_strings(&mut self) {
        while matches!(
            self.peek().kind,
            TokenKind::Str(_) | TokenKind::PrevStr(_)
        ) {
            self.bump();
        }
    }

    fn parse_entry(&mut self, first: Token) {
        let mut msg = Message::default();
        self.pending.attach(&mut msg);
        msg.pos = FilePos::new(&self.path, first.line);
        let mut obsolete = first.obsolete;
        let mut token = first;

        // Previous-msg section.
        if token.kind == TokenKind::PrevMsgctxt {
            msg.prev_msgctxt = Some(self.expect_string(&token, "#| msgctxt"));
            token = self.bump();
        }
        if token.kind == TokenKind::PrevMsgid {
            msg.prev_msgid = Some(self.expect_string(&token, "#| msgid"));
            token = self.bump();
            if token.kind == TokenKind::PrevMsgidPlural {
                msg.prev_msgid_plural = Some(self.expect_string(&token, "#| msgid_plural"));
                token = self.bump();
            }
        }

        if token.kind == TokenKind::Msgctxt {
            msg.msgctxt = Some(self.expect_string(&token, "msgctxt"));
            token = self.bump();
        }
        if token.kind == TokenKind::Msgid {
            obsolete = obsolete || token.obsolete;
            msg.msgid = self.expect_string(&token, "msgid");
        } else {
            self.error(
                token.line,
                token.column,
                "missing \"msgid\" section".to_string(),
            );
            return;
        }

        if self.peek().kind == TokenKind::MsgidPlural {
            let keyword = self.bump();
            msg.msgid_plural = Some(self.expect_string(&keyword, "msgid_plural"));
        }

        self.parse_msgstrs(&mut msg, &token);
        msg.obsolete = obsolete;

        if msg.fuzzy && msg.is_header() && !msg.obsolete {
            self.lexer.reader.reporter.warning(
                msg.pos.line,
                0,
                "po-syntax",
                "the header entry should not be marked fuzzy".to_string(),
            );
        }
        if msg.is_header() && !msg.obsolete && !self.header_seen {
            self.header_seen = true;
            self.process_header(&msg);
        }
        self.add_message(msg);
    }

    fn parse_msgstrs(&mut self, msg: &mut Message, at: &Token) {
        if self.peek().kind != TokenKind::Msgstr {
            self.error(
                at.line,
                at.column,
                "missing \"msgstr\" section".to_string(),
            );
            msg.msgstr.push(String::new());
            return;
        }
        let keyword = self.bump();
        if self.peek().kind == TokenKind::LBracket {
            if msg.msgid_plural.is_none() {
                self.error(
                    keyword.line,
                    keyword.column,
                    "msgstr[] used without msgid_plural".to_string(),
                );
            }
            let mut expected = 0u32;
            let mut keyword = keyword;
            loop {
                self.bump(); // '['
                match self.bump() {
                    Token {
                        kind: TokenKind::Number(index),
                        line,
                        column,
                        ..
                    } => {
                        if index != expected {
                            self.error(
                                line,
                                column,
                                format!(
                                    "plural form index out of sequence: expected msgstr[{expected}], found msgstr[{index}]"
                                ),
                            );
                        }
                    }
                    token => {
                        self.error(
                            token.line,
                            token.column,
                            "missing plural form index".to_string(),
                        );
                    }
                }
                if self.peek().kind == TokenKind::RBracket {
                    self.bump();
                } else {
                    self.error(keyword.line, keyword.column, "missing ']'".to_string());
                }
                msg.msgstr.push(self.expect_string(&keyword, "msgstr[]"));
                expected += 1;
                if self.peek().kind != TokenKind::Msgstr {
                    break;
                }
                keyword = self.bump();
                if self.peek().kind != TokenKind::LBracket {
                    self.error(
                        keyword.line,
                        keyword.column,
                        "indexed and plain msgstr cannot be mixed".to_string(),
                    );
                    msg.msgstr.push(self.expect_string(&keyword, "msgstr"));
                    return;
                }
            }
        } else {
            if msg.msgid_plural.is_some() {
                self.error(
                    keyword.line,
                    keyword.column,
                    "msgstr used together with msgid_plural".to_string(),
                );
            }
            msg.msgstr.push(self.expect_string(&keyword, "msgstr"));
        }
    }

    /// Extract the charset from a completed header entry and install the
    /// converter for the remainder of the file.
    fn process_header(&mut self, msg: &Message) {
        let Some(msgstr) = msg.msgstr.first() else {
            return;
        };
        let header = Header::parse(msgstr);
        match header.charset() {
            None => {
                if !self.options.is_template {
                    self.warning(
                        msg.pos.line,
                        "header entry is missing the charset in Content-Type".to_string(),
                    );
                }
            }
            Some(charset::CHARSET_TEMPLATE) => {
                // Tolerated silently on templates.
                if !self.options.is_template {
                    self.warning(
                        msg.pos.line,
                        "charset \"CHARSET\" is a placeholder, assuming UTF-8".to_string(),
                    );
                }
            }
            Some(name) => match charset::canonicalize(name) {
                Some(encoding) => {
                    self.catalog.encoding = Some(encoding);
                    if charset::converter_disabled() && charset::is_weird(encoding) {
                        self.lexer.reader.reporter.fatal(
                            msg.pos.line,
                            0,
                            "po-charset",
                            format!(
                                "cannot parse charset \"{name}\" without a converter"
                            ),
                        );
                        self.aborted = true;
                        return;
                    }
                    self.lexer.set_encoding(Some(encoding));
                }
                None => {
                    self.warning(
                        msg.pos.line,
                        format!(
                            "charset \"{name}\" is not a portable encoding name; \
                             message conversion to user's charset might not work"
                        ),
                    );
                }
            },
        }
    }

    fn add_message(&mut self, msg: Message) {
        if !msg.obsolete && !self.options.allow_duplicates {
            let domain = self.catalog.domain_mut(&self.domain);
            if let Some(idx) = domain.find_index(msg.msgctxt.as_deref(), &msg.msgid) {
                if domain.messages[idx].same_text(&msg) {
                    // A textually identical redefinition is dropped silently.
                    return;
                }
                let first_line = domain.messages[idx].pos.line;
                self.error(msg.pos.line, 0, "duplicate message definition".to_string());
                self.lexer.reader.reporter.diagnostics.push(
                    Diagnostic::new(
                        Path::new(&self.path),
                        "po-syntax",
                        Severity::Error,
                        "this is the location of the first definition".to_string(),
                    )
                    .at(first_line, 0),
                );
                return;
            }
        }
        self.catalog.domain_mut(&self.domain).append(msg);
    }
}

/// Parse a PO file into a catalog, collecting diagnostics.
#[must_use]
pub fn parse_po(data: &[u8], path: &Path, options: ParseOptions) -> ParseResult {
    Parser::new(data, path, options).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::po::message::FormatFlag;

    fn parse(content: &str) -> ParseResult {
        parse_po(
            content.as_bytes(),
            Path::new("test.po"),
            ParseOptions::default(),
        )
    }

    fn messages(result: &ParseResult) -> &[Message] {
        &result.catalog.domains[0].messages
    }

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.catalog.is_empty());
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_simple_entry() {
        let result = parse("msgid \"hello\"\nmsgstr \"bonjour\"\n");
        assert!(result.is_ok());
        let msgs = messages(&result);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].msgid, "hello");
        assert_eq!(msgs[0].msgstr, vec!["bonjour"]);
        assert_eq!(msgs[0].pos.line, 1);
    }

    #[test]
    fn test_parse_context_and_plural() {
        let result = parse(
            r#"msgctxt "files"
msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d fichier"
msgstr[1] "%d fichiers"
"#,
        );
        assert!(result.is_ok());
        let msg = &messages(&result)[0];
        assert_eq!(msg.msgctxt.as_deref(), Some("files"));
        assert_eq!(msg.msgid, "%d file");
        assert_eq!(msg.msgid_plural.as_deref(), Some("%d files"));
        assert_eq!(msg.msgstr, vec!["%d fichier", "%d fichiers"]);
    }

    #[test]
    fn test_multiline_strings_concatenate() {
        let result = parse(
            r#"msgid ""
"hello "
"world"
msgstr "bonjour le monde"
"#,
        );
        assert!(result.is_ok());
        assert_eq!(messages(&result)[0].msgid, "hello world");
    }

    #[test]
    fn test_comments_attach_to_entry() {
        let result = parse(
            r#"# a translator note
#. extracted note
#: src/main.c:42 src/lib.c:7
#, fuzzy, c-format, no-wrap, range: 0..10
msgid "%d file"
msgstr "%d fichier"
"#,
        );
        assert!(result.is_ok());
        let msg = &messages(&result)[0];
        assert_eq!(msg.comments, vec!["a translator note"]);
        assert_eq!(msg.extracted, vec!["extracted note"]);
        assert_eq!(
            msg.filepos,
            vec![FilePos::new("src/main.c", 42), FilePos::new("src/lib.c", 7)]
        );
        assert!(msg.fuzzy);
        assert_eq!(msg.format_flag(Dialect::C), FormatFlag::Yes);
        assert_eq!(msg.wrap, Some(false));
        assert_eq!(msg.range, Some((0, 10)));
    }

    #[test]
    fn test_range_flags_unite() {
        let result = parse(
            "#, range: 0..5\n#, range: 3..10\nmsgid \"x\"\nmsgstr \"y\"\n",
        );
        assert_eq!(messages(&result)[0].range, Some((0, 10)));
    }

    #[test]
    fn test_blank_line_resets_comments() {
        let result = parse("# stray comment\n\nmsgid \"a\"\nmsgstr \"b\"\n");
        assert!(messages(&result)[0].comments.is_empty());
    }

    #[test]
    fn test_previous_fields() {
        let result = parse(
            r#"#, fuzzy
#| msgctxt "old ctxt"
#| msgid "old id"
msgctxt "new ctxt"
msgid "new id"
msgstr "translated"
"#,
        );
        assert!(result.is_ok());
        let msg = &messages(&result)[0];
        assert_eq!(msg.prev_msgctxt.as_deref(), Some("old ctxt"));
        assert_eq!(msg.prev_msgid.as_deref(), Some("old id"));
        assert_eq!(msg.msgctxt.as_deref(), Some("new ctxt"));
        assert_eq!(msg.msgid, "new id");
    }

    #[test]
    fn test_obsolete_entry() {
        let result = parse(
            "msgid \"live\"\nmsgstr \"vivant\"\n\n#~ msgid \"dead\"\n#~ msgstr \"mort\"\n",
        );
        assert!(result.is_ok());
        let msgs = messages(&result);
        assert_eq!(msgs.len(), 2);
        assert!(!msgs[0].obsolete);
        assert!(msgs[1].obsolete);
        assert_eq!(msgs[1].msgid, "dead");
        assert_eq!(msgs[1].msgstr, vec!["mort"]);
    }

    #[test]
    fn test_obsolete_with_previous() {
        let result = parse(
            "#~| msgid \"oldest\"\n#~ msgid \"old\"\n#~ msgstr \"vieux\"\n",
        );
        assert!(result.is_ok());
        let msg = &messages(&result)[0];
        assert!(msg.obsolete);
        assert_eq!(msg.prev_msgid.as_deref(), Some("oldest"));
    }

    #[test]
    fn test_domain_directive() {
        let result = parse(
            "msgid \"a\"\nmsgstr \"x\"\n\ndomain \"extra\"\n\nmsgid \"b\"\nmsgstr \"y\"\n",
        );
        assert!(result.is_ok());
        assert_eq!(result.catalog.domains.len(), 2);
        assert_eq!(result.catalog.domains[0].name, DEFAULT_DOMAIN);
        assert_eq!(result.catalog.domains[1].name, "extra");
        assert!(result.catalog.domain("extra").unwrap().find(None, "b").is_some());
    }

    #[test]
    fn test_header_charset_switches_decoding() {
        let content = r#"msgid ""
msgstr "Content-Type: text/plain; charset=ISO-8859-15\n"

msgid "tested"
msgstr "testé"
"#;
        let encoded = encoding_rs::ISO_8859_15.encode(content).0.into_owned();
        let result = parse_po(&encoded, Path::new("test.po"), ParseOptions::default());
        assert!(result.is_ok(), "{:?}", result.diagnostics);
        assert_eq!(result.catalog.encoding, Some(encoding_rs::ISO_8859_15));
        let msgs = messages(&result);
        assert_eq!(msgs[1].msgstr, vec!["testé"]);
    }

    #[test]
    fn test_missing_charset_warns() {
        let result = parse("msgid \"\"\nmsgstr \"Project-Id-Version: x\\n\"\n");
        assert_eq!(result.warning_count, 1);
        assert!(result.diagnostics[0].message.contains("charset"));
    }

    #[test]
    fn test_template_charset_placeholder_tolerated() {
        let content = "msgid \"\"\nmsgstr \"Content-Type: text/plain; charset=CHARSET\\n\"\n";
        let result = parse_po(
            content.as_bytes(),
            Path::new("test.pot"),
            ParseOptions::for_path(Path::new("test.pot")),
        );
        assert_eq!(result.warning_count, 0);
        let result = parse(content);
        assert_eq!(result.warning_count, 1);
    }

    #[test]
    fn test_fuzzy_header_warns_and_preserves() {
        let result = parse("#, fuzzy\nmsgid \"\"\nmsgstr \"Content-Type: text/plain; charset=UTF-8\\n\"\n");
        assert_eq!(result.warning_count, 1);
        assert!(messages(&result)[0].fuzzy);
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let result = parse(
            "msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"y\"\n",
        );
        assert_eq!(result.error_count, 1);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics[0].message.contains("duplicate message definition"));
        assert_eq!(result.diagnostics[0].line, 4);
        assert!(result.diagnostics[1].message.contains("first definition"));
        assert_eq!(result.diagnostics[1].line, 1);
        // The first definition survives.
        assert_eq!(messages(&result)[0].msgstr, vec!["x"]);
    }

    #[test]
    fn test_identical_duplicate_tolerated() {
        let result = parse(
            "msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"x\"\n",
        );
        assert!(result.is_ok());
        assert_eq!(messages(&result).len(), 1);
    }

    #[test]
    fn test_allow_duplicates() {
        let result = parse_po(
            b"msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"y\"\n",
            Path::new("compendium.po"),
            ParseOptions {
                allow_duplicates: true,
                ..Default::default()
            },
        );
        assert!(result.is_ok());
        assert_eq!(messages(&result).len(), 2);
    }

    #[test]
    fn test_msgstr_before_msgid_rejected() {
        let result = parse("msgstr \"orphan\"\n");
        assert_eq!(result.error_count, 1);
        assert!(result.diagnostics[0].message.contains("msgstr without msgid"));
    }

    #[test]
    fn test_double_msgid_rejected() {
        let result = parse("msgid \"a\" msgid \"b\"\nmsgstr \"x\"\n");
        assert!(result.error_count >= 1);
    }

    #[test]
    fn test_plural_index_gap_rejected() {
        let result = parse(
            "msgid \"f\"\nmsgid_plural \"fs\"\nmsgstr[0] \"a\"\nmsgstr[2] \"b\"\n",
        );
        assert_eq!(result.error_count, 1);
        assert!(result.diagnostics[0].message.contains("expected msgstr[1]"));
    }

    #[test]
    fn test_plural_index_wrong_start_rejected() {
        let result = parse("msgid \"f\"\nmsgid_plural \"fs\"\nmsgstr[1] \"a\"\n");
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_indexed_msgstr_without_plural_rejected() {
        let result = parse("msgid \"f\"\nmsgstr[0] \"a\"\n");
        assert_eq!(result.error_count, 1);
        assert!(
            result.diagnostics[0]
                .message
                .contains("msgstr[] used without msgid_plural")
        );
    }

    #[test]
    fn test_plain_msgstr_with_plural_rejected() {
        let result = parse("msgid \"f\"\nmsgid_plural \"fs\"\nmsgstr \"a\"\n");
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_error_ceiling_aborts() {
        let mut content = String::new();
        for i in 0..30 {
            content.push_str(&format!("msgstr \"orphan {i}\"\n\n"));
        }
        let result = parse(&content);
        assert_eq!(result.error_count, DEFAULT_ERROR_CEILING);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.message.contains("too many errors"))
        );
    }

    #[test]
    fn test_crlf_input() {
        let result = parse("msgid \"a\"\r\nmsgstr \"b\"\r\n");
        assert!(result.is_ok());
        assert_eq!(messages(&result)[0].msgstr, vec!["b"]);
    }
}
