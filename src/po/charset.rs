// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Charset resolution for PO files.
//!
//! A PO header declares its charset in the `Content-Type:` field. This module
//! canonicalizes the declared name, classifies the encodings that need
//! character-boundary awareness, and decides whether a converter is used at
//! all (the historical `OLD_PO_FILE_INPUT` override disables conversion and
//! treats every byte as itself).

use encoding_rs::Encoding;

/// Placeholder charset found in untranslated templates.
pub const CHARSET_TEMPLATE: &str = "CHARSET";

/// Encodings with double-byte characters whose trailing byte can be an ASCII
/// byte such as `0x5C`: strings cannot be scanned byte-wise in these.
const WEIRD_CJK: [&str; 4] = ["Big5", "GBK", "gb18030", "Shift_JIS"];

/// Canonicalize a declared charset name, mapping aliases to the canonical
/// spelling. Returns `None` for unknown names (and for the `CHARSET`
/// template placeholder).
#[must_use]
pub fn canonicalize(name: &str) -> Option<&'static Encoding> {
    if name == CHARSET_TEMPLATE {
        return None;
    }
    Encoding::for_label(name.trim().as_bytes())
}

/// Return `true` for encodings where strings need character boundary
/// awareness to parse correctly.
#[must_use]
pub fn is_weird(encoding: &'static Encoding) -> bool {
    // All the weird encodings encoding_rs knows are the CJK ones.
    is_weird_cjk(encoding)
}

/// Return `true` for the CJK subset of the weird encodings.
#[must_use]
pub fn is_weird_cjk(encoding: &'static Encoding) -> bool {
    WEIRD_CJK.contains(&encoding.name())
}

/// Return `true` when the historical `OLD_PO_FILE_INPUT` override is set:
/// conversion is disabled entirely and every byte is treated as itself.
#[must_use]
pub fn converter_disabled() -> bool {
    std::env::var("OLD_PO_FILE_INPUT").is_ok_and(|v| !v.is_empty())
}

/// Byte sequences representing U+2068 FIRST STRONG ISOLATE and U+2069 POP
/// DIRECTIONAL ISOLATE in the given encoding, when it can express them
/// (UTF-8 and GB18030 can; the legacy 8-bit encodings cannot).
#[must_use]
pub fn isolate_markers(encoding: &'static Encoding) -> Option<(Vec<u8>, Vec<u8>)> {
    let (fsi, _, fsi_unmappable) = encoding.encode("\u{2068}");
    let (pdi, _, pdi_unmappable) = encoding.encode("\u{2069}");
    if fsi_unmappable || pdi_unmappable {
        None
    } else {
        Some((fsi.into_owned(), pdi.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("UTF-8"), Some(encoding_rs::UTF_8));
        assert_eq!(canonicalize("utf8"), Some(encoding_rs::UTF_8));
        assert_eq!(canonicalize("latin1"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(canonicalize("ISO-8859-15"), Some(encoding_rs::ISO_8859_15));
        assert_eq!(canonicalize("EUC-KR"), Some(encoding_rs::EUC_KR));
        assert_eq!(canonicalize("CHARSET"), None);
        assert_eq!(canonicalize("no-such-charset"), None);
    }

    #[test]
    fn test_weird() {
        assert!(is_weird_cjk(encoding_rs::BIG5));
        assert!(is_weird_cjk(encoding_rs::SHIFT_JIS));
        assert!(is_weird_cjk(encoding_rs::GB18030));
        assert!(is_weird_cjk(encoding_rs::GBK));
        assert!(!is_weird_cjk(encoding_rs::UTF_8));
        assert!(!is_weird_cjk(encoding_rs::ISO_8859_15));
        assert!(!is_weird_cjk(encoding_rs::EUC_KR));
        assert!(is_weird(encoding_rs::BIG5));
    }

    #[test]
    fn test_isolate_markers() {
        let (fsi, pdi) = isolate_markers(encoding_rs::UTF_8).unwrap();
        assert_eq!(fsi, [0xe2, 0x81, 0xa8]);
        assert_eq!(pdi, [0xe2, 0x81, 0xa9]);
        assert!(isolate_markers(encoding_rs::GB18030).is_some());
        assert!(isolate_markers(encoding_rs::ISO_8859_15).is_none());
    }
}
