// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Similarity-based nearest-msgid lookup.
//!
//! The index precomputes, per candidate message, its msgid length and a
//! sorted character-bigram signature. Both give cheap upper bounds on the
//! normalized edit similarity, so the expensive Levenshtein computation
//! runs only for plausible candidates. Matching context is strongly
//! preferred: a candidate with a different msgctxt has its score scaled
//! down.

use strsim::normalized_levenshtein;

use crate::po::message::Message;

/// Minimum similarity for a fuzzy match.
pub const FUZZY_THRESHOLD: f64 = 0.6;

/// Score factor applied when the msgctxt differs.
const CONTEXT_PENALTY: f64 = 0.8;

struct Signature {
    /// Index of the message in the list the index was built from.
    index: usize,
    chars: usize,
    bigrams: Vec<u64>,
}

pub struct FuzzyIndex {
    entries: Vec<Signature>,
}

fn bigrams(s: &str) -> Vec<u64> {
    let chars: Vec<char> = s.chars().collect();
    let mut grams: Vec<u64> = chars
        .windows(2)
        .map(|w| (u64::from(w[0] as u32) << 32) | u64::from(w[1] as u32))
        .collect();
    grams.sort_unstable();
    grams
}

/// Dice coefficient of two sorted bigram multisets.
fn dice(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let mut common = 0usize;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    2.0 * common as f64 / (a.len() + b.len()) as f64
}

/// Upper bound on the normalized edit similarity from the lengths alone:
/// the edit distance is at least the length difference.
fn length_bound(a: usize, b: usize) -> f64 {
    if a == 0 && b == 0 {
        return 1.0;
    }
    a.min(b) as f64 / a.max(b) as f64
}

impl FuzzyIndex {
    /// Build an index over the translated messages of a list. The header
    /// never takes part in fuzzy matching.
    #[must_use]
    pub fn build(messages: &[Message]) -> Self {
        let entries = messages
            .iter()
            .enumerate()
            .filter(|(_, msg)| !msg.is_header() && msg.is_translated())
            .map(|(index, msg)| Signature {
                index,
                chars: msg.msgid.chars().count(),
                bigrams: bigrams(&msg.msgid),
            })
            .collect();
        Self { entries }
    }

    /// Find the most similar candidate above `lower_bound` (and above the
    /// fixed [`FUZZY_THRESHOLD`]). Returns the message index and its score.
    #[must_use]
    pub fn search(
        &self,
        messages: &[Message],
        msgctxt: Option<&str>,
        msgid: &str,
        lower_bound: f64,
    ) -> Option<(usize, f64)> {
        let query_chars = msgid.chars().count();
        let query_bigrams = bigrams(msgid);
        let mut best: Option<(usize, f64)> = None;
        for entry in &self.entries {
            let floor = best
                .map_or(FUZZY_THRESHOLD, |(_, score)| score)
                .max(lower_bound)
                .max(FUZZY_THRESHOLD);
            if length_bound(query_chars, entry.chars) < floor {
                continue;
            }
            // The bigram signature screens out the hopeless candidates
            // cheaply; a slightly loosened floor keeps it a screen rather
            // than a verdict.
            if dice(&query_bigrams, &entry.bigrams) < floor * 0.5 {
                continue;
            }
            let candidate = &messages[entry.index];
            let mut score = normalized_levenshtein(msgid, &candidate.msgid);
            if candidate.msgctxt.as_deref() != msgctxt {
                score *= CONTEXT_PENALTY;
            }
            if score >= floor && best.is_none_or(|(_, b)| score > b) {
                best = Some((entry.index, score));
            }
        }
        best.filter(|(_, score)| *score >= FUZZY_THRESHOLD && *score >= lower_bound)
    }
}
