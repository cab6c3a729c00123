// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! PO lexer.
//!
//! Tokenizes the character stream into keywords, strings, numbers,
//! bracketed indices and classified comments. Lines starting with `#~` put
//! their tokens in obsolete context, lines starting with `#|` (or `#~|`) in
//! previous-msg context; both contexts end at the next line.

use std::path::Path;

use encoding_rs::Encoding;

use crate::po::message::MSGCTXT_SEPARATOR;
use crate::po::reader::{Ch, CharReader};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    /// `# …`
    Translator,
    /// `#. …`
    Extracted,
    /// `#: …`
    FilePos,
    /// `#, …`
    Flags,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Domain,
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    PrevMsgctxt,
    PrevMsgid,
    PrevMsgidPlural,
    Str(String),
    PrevStr(String),
    Number(u32),
    Name(String),
    LBracket,
    RBracket,
    Comment(CommentKind, String),
    BlankLine,
    Eof,
    Junk(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    /// Lexed on a `#~` line.
    pub obsolete: bool,
}

pub struct Lexer<'a> {
    pub reader: CharReader<'a>,
    obsolete_line: bool,
    prev_line: bool,
    line_has_content: bool,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Append a character to the accumulated text; undecodable bytes keep
/// their raw value.
fn push_ch(out: &mut String, ch: &Ch) {
    match ch.scalar {
        Some(c) => out.push(c),
        None => out.extend(ch.raw().iter().map(|&b| char::from(b))),
    }
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], path: &Path) -> Self {
        Self {
            reader: CharReader::new(data, path),
            obsolete_line: false,
            prev_line: false,
            line_has_content: false,
        }
    }

    /// Install the converter for the declared charset.
    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.reader.set_encoding(encoding);
    }

    fn token(&self, kind: TokenKind, line: usize, column: usize) -> Token {
        Token {
            kind,
            line,
            column,
            obsolete: self.obsolete_line,
        }
    }

    /// Lex the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(ch) = self.reader.get() else {
                return self.token(TokenKind::Eof, self.reader.line(), self.reader.column());
            };
            let Some(c) = ch.scalar else {
                // The reader already reported the invalid sequence.
                self.line_has_content = true;
                continue;
            };
            match c {
                '\n' => {
                    let blank = !self.line_has_content;
                    self.line_has_content = false;
                    self.obsolete_line = false;
                    self.prev_line = false;
                    if blank {
                        return Token {
                            kind: TokenKind::BlankLine,
                            line: ch.line,
                            column: ch.column,
                            obsolete: false,
                        };
                    }
                }
                '\\' => {
                    // Backslash-newline continuation.
                    match self.reader.get() {
                        Some(next) if next.is('\n') => {}
                        Some(next) => {
                            self.reader.unget(next);
                            self.line_has_content = true;
                            return self.token(TokenKind::Junk("\\".to_string()), ch.line, ch.column);
                        }
                        None => {
                            return self.token(TokenKind::Junk("\\".to_string()), ch.line, ch.column);
                        }
                    }
                }
                '#' if ch.column == 0 => {
                    self.line_has_content = true;
                    if let Some(token) = self.lex_comment_line(&ch) {
                        return token;
                    }
                }
                '"' => {
                    self.line_has_content = true;
                    return self.lex_string(&ch);
                }
                '[' => {
                    self.line_has_content = true;
                    return self.token(TokenKind::LBracket, ch.line, ch.column);
                }
                ']' => {
                    self.line_has_content = true;
                    return self.token(TokenKind::RBracket, ch.line, ch.column);
                }
                _ if c.is_whitespace() => {}
                _ if is_ident_start(c) => {
                    self.line_has_content = true;
                    return self.lex_keyword(&ch);
                }
                _ if c.is_ascii_digit() => {
                    self.line_has_content = true;
                    return self.lex_number(&ch);
                }
                _ => {
                    self.line_has_content = true;
                    return self.token(TokenKind::Junk(c.to_string()), ch.line, ch.column);
                }
            }
        }
    }

    /// Handle a line starting with `#`. Returns a comment token, or `None`
    /// for the `#~` / `#|` markers whose remainder is lexed as ordinary
    /// tokens in the respective context.
    fn lex_comment_line(&mut self, hash: &Ch) -> Option<Token> {
        let marker = self.reader.get();
        match marker.as_ref().and_then(|ch| ch.scalar) {
            Some('~') => {
                self.obsolete_line = true;
                match self.reader.get() {
                    Some(next) if next.is('|') => self.prev_line = true,
                    Some(next) => self.reader.unget(next),
                    None => {}
                }
                None
            }
            Some('|') => {
                self.prev_line = true;
                None
            }
            Some('.') => Some(self.comment_token(CommentKind::Extracted, hash)),
            Some(':') => Some(self.comment_token(CommentKind::FilePos, hash)),
            Some(',') => Some(self.comment_token(CommentKind::Flags, hash)),
            Some('\n') => {
                // An empty `#` comment still ends the line.
                self.line_has_content = false;
                self.obsolete_line = false;
                self.prev_line = false;
                Some(self.token(TokenKind::Comment(CommentKind::Translator, String::new()), hash.line, hash.column))
            }
            Some(_) | None => {
                if let Some(ch) = marker {
                    self.reader.unget(ch);
                }
                Some(self.comment_token(CommentKind::Translator, hash))
            }
        }
    }

    /// Accumulate the rest of the line as comment text, stripping one
    /// leading space.
    fn comment_token(&mut self, kind: CommentKind, hash: &Ch) -> Token {
        let mut text = String::new();
        loop {
            match self.reader.get() {
                Some(ch) if ch.is('\n') => {
                    self.line_has_content = false;
                    self.obsolete_line = false;
                    self.prev_line = false;
                    break;
                }
                Some(ch) => push_ch(&mut text, &ch),
                None => break,
            }
        }
        let text = text.strip_prefix(' ').unwrap_or(&text).to_string();
        Token {
            kind: TokenKind::Comment(kind, text),
            line: hash.line,
            column: hash.column,
            obsolete: false,
        }
    }

    fn lex_keyword(&mut self, first: &Ch) -> Token {
        let mut ident = String::new();
        push_ch(&mut ident, first);
        loop {
            match self.reader.get() {
                Some(ch) if ch.scalar.is_some_and(is_ident_continue) => {
                    push_ch(&mut ident, &ch);
                }
                Some(ch) => {
                    self.reader.unget(ch);
                    break;
                }
                None => break,
            }
        }
        let kind = if self.prev_line {
            match ident.as_str() {
                "msgctxt" => TokenKind::PrevMsgctxt,
                "msgid" => TokenKind::PrevMsgid,
                "msgid_plural" => TokenKind::PrevMsgidPlural,
                _ => TokenKind::Name(ident),
            }
        } else {
            match ident.as_str() {
                "domain" => TokenKind::Domain,
                "msgctxt" => TokenKind::Msgctxt,
                "msgid" => TokenKind::Msgid,
                "msgid_plural" => TokenKind::MsgidPlural,
                "msgstr" => TokenKind::Msgstr,
                _ => TokenKind::Name(ident),
            }
        };
        self.token(kind, first.line, first.column)
    }

    fn lex_number(&mut self, first: &Ch) -> Token {
        let mut digits = String::new();
        push_ch(&mut digits, first);
        loop {
            match self.reader.get() {
                Some(ch) if ch.scalar.is_some_and(|c| c.is_ascii_digit()) => {
                    push_ch(&mut digits, &ch);
                }
                Some(ch) => {
                    self.reader.unget(ch);
                    break;
                }
                None => break,
            }
        }
        let value = match digits.parse::<u32>() {
            Ok(value) => value,
            Err(_) => {
                self.reader.reporter.error(
                    first.line,
                    first.column,
                    "po-syntax",
                    format!("number {digits} out of range"),
                );
                0
            }
        };
        self.token(TokenKind::Number(value), first.line, first.column)
    }

    /// Lex a quoted string, decoding escape sequences.
    fn lex_string(&mut self, open: &Ch) -> Token {
        let mut value = String::new();
        loop {
            match self.reader.get() {
                None => {
                    self.reader.reporter.error(
                        open.line,
                        open.column,
                        "po-syntax",
                        "end-of-file within string".to_string(),
                    );
                    break;
                }
                Some(ch) if ch.is('\n') => {
                    self.reader.reporter.error(
                        open.line,
                        open.column,
                        "po-syntax",
                        "end-of-line within string".to_string(),
                    );
                    self.reader.unget(ch);
                    break;
                }
                Some(ch) if ch.is('"') => break,
                Some(ch) if ch.is('\\') => {
                    if let Some(c) = self.lex_escape(&ch) {
                        self.push_string_char(&mut value, c, &ch);
                    } else {
                        // EOL or EOF inside the escape; rewind to let the
                        // string-termination handling report it.
                        continue;
                    }
                }
                Some(ch) => match ch.scalar {
                    Some(c) => self.push_string_char(&mut value, c, &ch),
                    None => push_ch(&mut value, &ch),
                },
            }
        }
        let kind = if self.prev_line {
            TokenKind::PrevStr(value)
        } else {
            TokenKind::Str(value)
        };
        self.token(kind, open.line, open.column)
    }

    /// Append a decoded character, rejecting the msgctxt separator byte.
    fn push_string_char(&mut self, value: &mut String, c: char, at: &Ch) {
        if c == MSGCTXT_SEPARATOR {
            self.reader.reporter.error(
                at.line,
                at.column,
                "po-syntax",
                "string contains the msgctxt separator <EOT>".to_string(),
            );
            return;
        }
        value.push(c);
    }

    /// Decode one escape sequence after a backslash. Returns `None` when
    /// the line or file ends inside the escape.
    fn lex_escape(&mut self, backslash: &Ch) -> Option<char> {
        let ch = self.reader.get()?;
        if ch.is('\n') {
            self.reader.unget(ch);
            return None;
        }
        let c = match ch.scalar {
            Some(c) => c,
            None => return Some('\u{fffd}'),
        };
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'b' => Some('\x08'),
            'r' => Some('\r'),
            'f' => Some('\x0c'),
            'v' => Some('\x0b'),
            'a' => Some('\x07'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '0'..='7' => Some(self.lex_octal_escape(c)),
            'x' | 'X' => Some(self.lex_hex_escape(backslash)),
            'u' | 'U' => {
                // Recognized but not decoded: keep the sequence literally by
                // re-reading the marker as an ordinary character.
                self.reader.unget(ch);
                Some('\\')
            }
            _ => {
                self.reader.reporter.error(
                    backslash.line,
                    backslash.column,
                    "po-syntax",
                    format!("invalid control sequence \\{c}"),
                );
                Some(c)
            }
        }
    }

    /// Up to three octal digits, the first already consumed.
    fn lex_octal_escape(&mut self, first: char) -> char {
        let mut value = first as u32 - '0' as u32;
        for _ in 0..2 {
            match self.reader.get() {
                Some(ch) if ch.scalar.is_some_and(|c| ('0'..='7').contains(&c)) => {
                    let digit = ch.scalar.unwrap_or('0') as u32 - '0' as u32;
                    value = value * 8 + digit;
                }
                Some(ch) => {
                    self.reader.unget(ch);
                    break;
                }
                None => break,
            }
        }
        char::from_u32(value).unwrap_or('\u{fffd}')
    }

    /// Hex digits of arbitrary length.
    fn lex_hex_escape(&mut self, backslash: &Ch) -> char {
        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            match self.reader.get() {
                Some(ch) if ch.scalar.is_some_and(|c| c.is_ascii_hexdigit()) => {
                    let digit = ch.scalar.and_then(|c| c.to_digit(16)).unwrap_or(0);
                    value = value.wrapping_mul(16).wrapping_add(digit);
                    digits += 1;
                }
                Some(ch) => {
                    self.reader.unget(ch);
                    break;
                }
                None => break,
            }
        }
        if digits == 0 {
            self.reader.reporter.error(
                backslash.line,
                backslash.column,
                "po-syntax",
                "invalid control sequence \\x".to_string(),
            );
            return 'x';
        }
        char::from_u32(value).unwrap_or('\u{fffd}')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(data: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(data.as_bytes(), Path::new("test.po"));
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token.kind);
            if eof {
                break;
            }
        }
        tokens
    }

    fn lex_one_string(data: &str) -> (String, usize) {
        let mut lexer = Lexer::new(data.as_bytes(), Path::new("test.po"));
        let token = lexer.next_token();
        let TokenKind::Str(value) = token.kind else {
            panic!("expected a string token, got {:?}", token.kind);
        };
        (value, lexer.reader.reporter.error_count)
    }

    #[test]
    fn test_keywords_and_strings() {
        let tokens = lex_all("msgid \"hello\"\nmsgstr \"bonjour\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Msgid,
                TokenKind::Str("hello".to_string()),
                TokenKind::Msgstr,
                TokenKind::Str("bonjour".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_plural_index_tokens() {
        let tokens = lex_all("msgstr[0] \"fichier\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Msgstr,
                TokenKind::LBracket,
                TokenKind::Number(0),
                TokenKind::RBracket,
                TokenKind::Str("fichier".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_identifier_is_name() {
        let tokens = lex_all("msgfoo \"x\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Name("msgfoo".to_string()),
                TokenKind::Str("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let (value, errors) = lex_one_string(r#""a\tb\nc\"d\\e\a\b\f\v\r""#);
        assert_eq!(value, "a\tb\nc\"d\\e\x07\x08\x0c\x0b\r");
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_octal_and_hex_escapes() {
        let (value, errors) = lex_one_string(r#""\101\102\0038\x41\x00e9z""#);
        // \101 = A, \102 = B, \003 then literal 8, \x41 = A, \x00e9 = é.
        assert_eq!(value, "AB\u{3}8Aéz");
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_unicode_escape_kept_literally() {
        let (value, errors) = lex_one_string(r#""\u2026""#);
        assert_eq!(value, "\\u2026");
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_invalid_escape_reported() {
        let (value, errors) = lex_one_string(r#""a\qb""#);
        assert_eq!(value, "aqb");
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_end_of_line_within_string() {
        let mut lexer = Lexer::new(b"msgid \"abc\nmsgstr", Path::new("test.po"));
        assert_eq!(lexer.next_token().kind, TokenKind::Msgid);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Str("abc".to_string()));
        assert_eq!(lexer.reader.reporter.error_count, 1);
        assert!(
            lexer.reader.reporter.diagnostics[0]
                .message
                .contains("end-of-line within string")
        );
        // Lexing continues after the error.
        assert_eq!(lexer.next_token().kind, TokenKind::Msgstr);
    }

    #[test]
    fn test_end_of_file_within_string() {
        let mut lexer = Lexer::new(b"msgid \"abc", Path::new("test.po"));
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Str("abc".to_string()));
        assert!(
            lexer.reader.reporter.diagnostics[0]
                .message
                .contains("end-of-file within string")
        );
    }

    #[test]
    fn test_msgctxt_separator_rejected() {
        let (value, errors) = lex_one_string("\"a\u{4}b\"");
        assert_eq!(value, "ab");
        assert_eq!(errors, 1);
        let (_, errors) = lex_one_string(r#""a\004b""#);
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_comment_classification() {
        let tokens = lex_all("# translator\n#. extracted\n#: src/main.c:42\n#, fuzzy, c-format\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Comment(CommentKind::Translator, "translator".to_string()),
                TokenKind::Comment(CommentKind::Extracted, "extracted".to_string()),
                TokenKind::Comment(CommentKind::FilePos, "src/main.c:42".to_string()),
                TokenKind::Comment(CommentKind::Flags, "fuzzy, c-format".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_obsolete_context() {
        let mut lexer = Lexer::new(b"#~ msgid \"old\"\n#~ msgstr \"vieux\"\n", Path::new("t.po"));
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Msgid);
        assert!(token.obsolete);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Str("old".to_string()));
        assert!(token.obsolete);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Msgstr);
        assert!(token.obsolete);
    }

    #[test]
    fn test_previous_context() {
        let tokens = lex_all("#| msgid \"old id\"\nmsgid \"new id\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::PrevMsgid,
                TokenKind::PrevStr("old id".to_string()),
                TokenKind::Msgid,
                TokenKind::Str("new id".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_obsolete_previous_context() {
        let mut lexer = Lexer::new(b"#~| msgid \"oldest\"\n", Path::new("t.po"));
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::PrevMsgid);
        assert!(token.obsolete);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::PrevStr("oldest".to_string()));
        assert!(token.obsolete);
    }

    #[test]
    fn test_blank_line_token() {
        let tokens = lex_all("msgid \"a\"\n\nmsgid \"b\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Msgid,
                TokenKind::Str("a".to_string()),
                TokenKind::BlankLine,
                TokenKind::Msgid,
                TokenKind::Str("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_backslash_newline_continuation() {
        let tokens = lex_all("msgid \\\n\"a\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Msgid,
                TokenKind::Str("a".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_junk() {
        let tokens = lex_all("msgid @ \"a\"\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Msgid,
                TokenKind::Junk("@".to_string()),
                TokenKind::Str("a".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let mut lexer = Lexer::new(b"msgid \"a\"\n", Path::new("t.po"));
        let token = lexer.next_token();
        assert_eq!((token.line, token.column), (1, 0));
        let token = lexer.next_token();
        assert_eq!((token.line, token.column), (1, 6));
    }
}
