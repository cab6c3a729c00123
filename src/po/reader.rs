// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Byte/multibyte character stream.
//!
//! Wraps the raw bytes of a PO file and yields whole characters, feeding an
//! `encoding_rs` decoder one byte at a time so that each character keeps its
//! exact source byte sequence. CR, CR-LF and LF all normalize to LF. The
//! stream tracks line and display column (tabs advance to the next multiple
//! of 8, East-Asian wide characters count 2) and supports pushing back up to
//! three characters.

use std::collections::VecDeque;
use std::path::Path;

use encoding_rs::{DecoderResult, Encoding};
use unicode_width::UnicodeWidthChar;

use crate::diagnostic::Reporter;
use crate::po::charset;

/// One character for CR folding, one for backslash-newline folding, one for
/// the grammar.
pub const MAX_PUSHBACK: usize = 3;

/// A decoder that consumed this many bytes without producing a character is
/// stuck on garbage.
const MAX_BYTES_PER_CHAR: usize = 8;

const TAB_WIDTH: usize = 8;

/// A character read from the stream.
///
/// `scalar` is `None` for bytes that do not decode; `raw` always holds the
/// original source bytes, so the exact input sequence is retained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ch {
    pub scalar: Option<char>,
    raw: [u8; MAX_BYTES_PER_CHAR],
    raw_len: u8,
    pub line: usize,
    pub column: usize,
}

impl Ch {
    fn new(scalar: Option<char>, raw: &[u8]) -> Self {
        let mut buf = [0u8; MAX_BYTES_PER_CHAR];
        let len = raw.len().min(MAX_BYTES_PER_CHAR);
        buf[..len].copy_from_slice(&raw[..len]);
        Self {
            scalar,
            raw: buf,
            raw_len: u8::try_from(len).unwrap_or(0),
            line: 0,
            column: 0,
        }
    }

    /// The original source bytes of this character.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw[..usize::from(self.raw_len)]
    }

    /// Return `true` if this character is the given scalar.
    #[must_use]
    pub fn is(&self, c: char) -> bool {
        self.scalar == Some(c)
    }
}

/// Display width of a character at the given column.
fn char_width(scalar: Option<char>, column: usize) -> usize {
    match scalar {
        Some('\t') => TAB_WIDTH - (column % TAB_WIDTH),
        Some(c) => c.width().unwrap_or(usize::from(!c.is_control())),
        // An undecodable byte occupies one column.
        None => 1,
    }
}

pub struct CharReader<'a> {
    data: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
    decoder: Option<encoding_rs::Decoder>,
    /// Weird-CJK two-byte commit when no converter is installed.
    weird_cjk_passthrough: bool,
    flushed: bool,
    pending: VecDeque<char>,
    raw_pending: Option<Ch>,
    pushback: Vec<Ch>,
    outbuf: String,
    /// Suppress repeated invalid-sequence reports until a character decodes.
    invalid_run: bool,
    pub reporter: Reporter,
}

impl<'a> CharReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], path: &Path) -> Self {
        let mut reader = Self {
            data,
            offset: 0,
            line: 1,
            column: 0,
            decoder: None,
            weird_cjk_passthrough: false,
            flushed: false,
            pending: VecDeque::new(),
            raw_pending: None,
            pushback: Vec::with_capacity(MAX_PUSHBACK),
            outbuf: String::with_capacity(16),
            invalid_run: false,
            reporter: Reporter::new(path),
        };
        reader.set_encoding(Some(encoding_rs::UTF_8));
        reader
    }

    /// Install the converter for the declared charset, effective for all
    /// bytes not yet consumed. With `OLD_PO_FILE_INPUT` set no converter is
    /// installed and every byte is treated as itself; for weird CJK
    /// encodings the stream still commits two-byte characters so that a
    /// trailing `0x5C` byte is not misread as a backslash.
    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        if charset::converter_disabled() {
            self.decoder = None;
            self.weird_cjk_passthrough = encoding.is_some_and(charset::is_weird_cjk);
        } else {
            self.decoder = encoding.map(Encoding::new_decoder_without_bom_handling);
            self.weird_cjk_passthrough = false;
        }
    }

    /// Line number (1-based) of the next character to be read.
    #[must_use]
    pub fn line(&self) -> usize {
        self.pushback.last().map_or(self.line, |ch| ch.line)
    }

    /// Display column (0-based) of the next character to be read.
    #[must_use]
    pub fn column(&self) -> usize {
        self.pushback.last().map_or(self.column, |ch| ch.column)
    }

    /// Push a character back onto the stream. At most [`MAX_PUSHBACK`]
    /// characters may be pending at once.
    pub fn unget(&mut self, ch: Ch) {
        debug_assert!(self.pushback.len() < MAX_PUSHBACK);
        self.pushback.push(ch);
    }

    /// Read the next character, folding CR and CR-LF to LF. Returns `None`
    /// at end of file.
    pub fn get(&mut self) -> Option<Ch> {
        if let Some(ch) = self.pushback.pop() {
            return Some(ch);
        }
        let mut ch = self.next_raw()?;
        if ch.is('\r') {
            match self.next_raw() {
                Some(next) if next.is('\n') => {
                    let mut raw = ch.raw().to_vec();
                    raw.extend_from_slice(next.raw());
                    ch = Ch::new(Some('\n'), &raw);
                }
                Some(next) => {
                    self.raw_pending = Some(next);
                    ch = Ch::new(Some('\n'), ch.raw());
                }
                None => ch = Ch::new(Some('\n'), ch.raw()),
            }
        }
        ch.line = self.line;
        ch.column = self.column;
        if ch.is('\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += char_width(ch.scalar, self.column);
        }
        Some(ch)
    }

    /// Decode the next character without position stamping or CR folding.
    fn next_raw(&mut self) -> Option<Ch> {
        if let Some(ch) = self.raw_pending.take() {
            return Some(ch);
        }
        if let Some(c) = self.pending.pop_front() {
            return Some(Ch::new(Some(c), &[]));
        }
        if self.decoder.is_some() {
            self.next_decoded()
        } else {
            self.next_passthrough()
        }
    }

    fn next_passthrough(&mut self) -> Option<Ch> {
        if self.offset >= self.data.len() {
            return None;
        }
        let b = self.data[self.offset];
        if self.weird_cjk_passthrough
            && b >= 0x80
            && self.offset + 1 < self.data.len()
            && self.data[self.offset + 1] >= 0x30
        {
            let raw = &self.data[self.offset..self.offset + 2];
            self.offset += 2;
            return Some(Ch::new(None, raw));
        }
        self.offset += 1;
        Some(Ch::new(Some(char::from(b)), &[b]))
    }

    fn next_decoded(&mut self) -> Option<Ch> {
        let start = self.offset;
        loop {
            if self.offset >= self.data.len() {
                return self.flush_decoder(start);
            }
            self.outbuf.clear();
            self.outbuf.reserve(16);
            let decoder = self.decoder.as_mut()?;
            let (result, read) = decoder.decode_to_string_without_replacement(
                &self.data[self.offset..=self.offset],
                &mut self.outbuf,
                false,
            );
            self.offset += read;
            match result {
                DecoderResult::InputEmpty | DecoderResult::OutputFull => {
                    if let Some(c) = self.take_decoded() {
                        self.invalid_run = false;
                        return Some(Ch::new(Some(c), &self.data[start..self.offset]));
                    }
                    // The decoder wants more bytes for this character.
                    if self.offset - start >= MAX_BYTES_PER_CHAR {
                        return self.invalid_sequence(start);
                    }
                }
                DecoderResult::Malformed(_, _) => {
                    if self.offset == start {
                        // Guarantee progress even if the decoder consumed nothing.
                        self.offset += 1;
                    }
                    return self.invalid_sequence(start);
                }
            }
        }
    }

    /// Take the first decoded character from the output buffer, queueing any
    /// extra characters the decoder produced in the same step.
    fn take_decoded(&mut self) -> Option<char> {
        let mut chars = self.outbuf.chars();
        let first = chars.next()?;
        self.pending.extend(chars);
        Some(first)
    }

    fn flush_decoder(&mut self, start: usize) -> Option<Ch> {
        if self.flushed {
            return None;
        }
        self.flushed = true;
        self.outbuf.clear();
        self.outbuf.reserve(16);
        let decoder = self.decoder.as_mut()?;
        let (result, _) = decoder.decode_to_string_without_replacement(&[], &mut self.outbuf, true);
        if let Some(c) = self.take_decoded() {
            return Some(Ch::new(Some(c), &self.data[start..self.offset]));
        }
        if matches!(result, DecoderResult::Malformed(_, _)) || self.offset > start {
            self.reporter.error(
                self.line,
                self.column,
                "po-charset",
                "incomplete multibyte sequence at end of file".to_string(),
            );
            return Some(Ch::new(None, &self.data[start..self.offset]));
        }
        None
    }

    /// Report an invalid multibyte sequence once per run of garbage and
    /// return the offending bytes as a scalar-less character.
    fn invalid_sequence(&mut self, start: usize) -> Option<Ch> {
        if !self.invalid_run {
            self.invalid_run = true;
            self.reporter.error(
                self.line,
                self.column,
                "po-charset",
                "invalid multibyte sequence".to_string(),
            );
        }
        Some(Ch::new(None, &self.data[start..self.offset]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(reader: &mut CharReader) -> String {
        let mut out = String::new();
        while let Some(ch) = reader.get() {
            match ch.scalar {
                Some(c) => out.push(c),
                None => out.push('\u{fffd}'),
            }
        }
        out
    }

    #[test]
    fn test_ascii_positions() {
        let mut reader = CharReader::new(b"ab\ncd", Path::new("test.po"));
        let a = reader.get().unwrap();
        assert_eq!((a.scalar, a.line, a.column), (Some('a'), 1, 0));
        let b = reader.get().unwrap();
        assert_eq!((b.scalar, b.line, b.column), (Some('b'), 1, 1));
        let nl = reader.get().unwrap();
        assert_eq!((nl.scalar, nl.line, nl.column), (Some('\n'), 1, 2));
        let c = reader.get().unwrap();
        assert_eq!((c.scalar, c.line, c.column), (Some('c'), 2, 0));
    }

    #[test]
    fn test_crlf_folds_to_lf() {
        let mut reader = CharReader::new(b"a\r\nb\rc", Path::new("test.po"));
        assert_eq!(collect(&mut reader), "a\nb\nc");
        assert_eq!(reader.reporter.error_count, 0);
    }

    #[test]
    fn test_unget() {
        let mut reader = CharReader::new(b"xy", Path::new("test.po"));
        let x = reader.get().unwrap();
        reader.unget(x.clone());
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.column(), 0);
        let again = reader.get().unwrap();
        assert_eq!(again, x);
        assert_eq!(reader.get().unwrap().scalar, Some('y'));
        assert!(reader.get().is_none());
    }

    #[test]
    fn test_tab_advances_to_multiple_of_8() {
        let mut reader = CharReader::new(b"a\tb", Path::new("test.po"));
        reader.get();
        reader.get();
        let b = reader.get().unwrap();
        assert_eq!(b.column, 8);
    }

    #[test]
    fn test_wide_characters_count_two_columns() {
        let mut reader = CharReader::new("你a".as_bytes(), Path::new("test.po"));
        let wide = reader.get().unwrap();
        assert_eq!(wide.scalar, Some('你'));
        assert_eq!(wide.raw().len(), 3);
        let a = reader.get().unwrap();
        assert_eq!(a.column, 2);
    }

    #[test]
    fn test_latin1_with_converter() {
        let mut reader = CharReader::new(b"caf\xe9", Path::new("test.po"));
        reader.set_encoding(Some(encoding_rs::ISO_8859_15));
        assert_eq!(collect(&mut reader), "café");
        assert_eq!(reader.reporter.error_count, 0);
    }

    #[test]
    fn test_invalid_utf8_reported_once_per_run() {
        let mut reader = CharReader::new(b"a\xff\xffb", Path::new("test.po"));
        let s = collect(&mut reader);
        assert_eq!(s, "a\u{fffd}\u{fffd}b");
        assert_eq!(reader.reporter.error_count, 1);
    }

    #[test]
    fn test_incomplete_sequence_at_eof() {
        // 0xC3 starts a two-byte UTF-8 sequence that never completes.
        let mut reader = CharReader::new(b"a\xc3", Path::new("test.po"));
        let s = collect(&mut reader);
        assert_eq!(s, "a\u{fffd}");
        assert_eq!(reader.reporter.error_count, 1);
        assert!(
            reader.reporter.diagnostics[0]
                .message
                .contains("incomplete multibyte sequence")
        );
    }

    #[test]
    fn test_raw_bytes_retained() {
        let mut reader = CharReader::new(b"caf\xe9", Path::new("test.po"));
        reader.set_encoding(Some(encoding_rs::ISO_8859_15));
        reader.get();
        reader.get();
        reader.get();
        let e = reader.get().unwrap();
        assert_eq!(e.scalar, Some('é'));
        assert_eq!(e.raw(), &[0xe9]);
    }
}
