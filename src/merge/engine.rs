// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Three-way merge of a translated catalog against a fresh template.
//!
//! The search phase runs in parallel: each reference message is looked up
//! exactly (definitions first, then the compendiums) and, failing that,
//! fuzzy-matched. The merge phase is sequential and consumes the search
//! results in reference order, so parallelism never affects the output.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::merge::fuzzy::FuzzyIndex;
use crate::po::catalog::{Catalog, DEFAULT_DOMAIN, Domain};
use crate::po::format::{self, Dialect};
use crate::po::header::{Header, merge_headers};
use crate::po::message::{FormatFlag, Message};
use crate::po::plural::{self, PluralDistribution, PluralExpr};

/// Print one progress dot per this many processed reference messages.
const PROGRESS_STEP: usize = 100;

#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub use_fuzzy_matching: bool,
    /// Keep `#|` previous-msg fields on fuzzied messages.
    pub keep_previous: bool,
    /// Suppress output useless to msgfmt: untranslated and fuzzy messages,
    /// obsolete entries.
    pub for_msgfmt: bool,
    /// Apply the reference's default domain to every definition domain.
    pub multi_domain: bool,
    /// Override for the `Language:` header field.
    pub catalogname: Option<String>,
    pub quiet: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            use_fuzzy_matching: true,
            keep_previous: false,
            for_msgfmt: false,
            multi_domain: false,
            catalogname: None,
            quiet: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    pub fuzzied: usize,
    pub missing: usize,
    pub obsolete: usize,
}

impl std::fmt::Display for MergeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} translated messages, {} fuzzy translations, {} untranslated messages, {} obsolete entries.",
            self.merged, self.fuzzied, self.missing, self.obsolete
        )
    }
}

/// Where a search found its candidate: the definitions list or one of the
/// compendiums.
#[derive(Clone, Copy, Debug)]
struct SearchHit {
    /// 0 for the definitions, `i + 1` for compendium `i`.
    list: usize,
    index: usize,
    fuzzy: bool,
}

/// Deferred plural repair, applied once the merged header's nplurals is
/// known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reshape {
    None,
    /// Reference went plural, definition was singular: replicate the one
    /// form.
    Replicate,
    /// Reference went singular, definition was plural: keep the first form.
    Trim,
}

/// Merge `definitions` (a translated catalog) with `references` (a freshly
/// extracted template), consulting `compendiums` when an exact match fails.
#[must_use]
pub fn merge(
    definitions: &Catalog,
    references: &Catalog,
    compendiums: &[Catalog],
    options: &MergeOptions,
) -> (Catalog, MergeStats) {
    let mut result = Catalog::new();
    result.encoding = definitions.encoding.or(references.encoding);
    let mut stats = MergeStats::default();
    let empty = Domain::default();

    if options.multi_domain {
        let reference = references
            .domain(DEFAULT_DOMAIN)
            .or_else(|| references.domains.first())
            .unwrap_or(&empty);
        if definitions.domains.is_empty() {
            let merged = merge_domain(&empty, reference, compendiums, options, &mut stats);
            result.domains.push(named(merged, DEFAULT_DOMAIN));
        }
        for def_domain in &definitions.domains {
            let merged = merge_domain(def_domain, reference, compendiums, options, &mut stats);
            result.domains.push(named(merged, &def_domain.name));
        }
    } else {
        if references.domains.is_empty() {
            // An empty template still yields a catalog with a header.
            let def_domain = definitions.domain(DEFAULT_DOMAIN).unwrap_or(&empty);
            let merged = merge_domain(def_domain, &empty, compendiums, options, &mut stats);
            result.domains.push(named(merged, DEFAULT_DOMAIN));
        }
        for ref_domain in &references.domains {
            let def_domain = definitions.domain(&ref_domain.name).unwrap_or(&empty);
            let merged = merge_domain(def_domain, ref_domain, compendiums, options, &mut stats);
            result.domains.push(named(merged, &ref_domain.name));
        }
    }
    (result, stats)
}

fn named(mut domain: Domain, name: &str) -> Domain {
    domain.name = name.to_string();
    domain
}

/// The compendium domain matching a reference domain: same name, else the
/// compendium's default domain.
fn compendium_domain<'a>(compendium: &'a Catalog, name: &str) -> Option<&'a Domain> {
    compendium
        .domain(name)
        .or_else(|| compendium.domain(DEFAULT_DOMAIN))
        .or_else(|| compendium.domains.first())
}

fn merge_domain(
    def: &Domain,
    reference: &Domain,
    compendiums: &[Catalog],
    options: &MergeOptions,
    stats: &mut MergeStats,
) -> Domain {
    let comp_domains: Vec<&Domain> = compendiums
        .iter()
        .filter_map(|c| compendium_domain(c, &reference.name))
        .collect();

    // The references must have a header entry; synthesize one if absent.
    let mut refs: Vec<Message> = reference.messages.clone();
    if !refs.iter().any(|m| m.is_header() && !m.obsolete) {
        let mut header = Message::new("");
        header.msgstr = vec![Header::template().to_msgstr()];
        header.fuzzy = true;
        refs.insert(0, header);
    }

    // Exact lookup must also revive matching obsolete definitions.
    let mut obsolete_index = std::collections::HashMap::new();
    for (idx, msg) in def.messages.iter().enumerate() {
        if msg.obsolete {
            obsolete_index.entry(msg.key()).or_insert(idx);
        }
    }

    // Definitions-side plural distribution, for the format repair checks.
    let def_distribution = distribution_for(def.header());

    // Search phase, parallel across reference messages; results land in
    // per-reference slots consumed in order below.
    let def_fuzzy: OnceLock<FuzzyIndex> = OnceLock::new();
    let comp_fuzzy: Vec<OnceLock<FuzzyIndex>> =
        comp_domains.iter().map(|_| OnceLock::new()).collect();
    let processed = AtomicUsize::new(0);
    let hits: Vec<Option<SearchHit>> = refs
        .par_iter()
        .map(|refmsg| {
            let done = processed.fetch_add(1, Ordering::Relaxed);
            if !options.quiet && done % PROGRESS_STEP == PROGRESS_STEP - 1 {
                eprint!(".");
            }
            search_message(
                refmsg,
                def,
                &obsolete_index,
                &comp_domains,
                &def_fuzzy,
                &comp_fuzzy,
                options,
            )
        })
        .collect();

    // Merge phase, sequential. The header is merged first so that the
    // result's nplurals is known for the finalization passes.
    let def_header = def.header();
    let merged_header = merge_header(def_header, &refs, options);
    let nplurals = nplurals_of(&merged_header);

    let mut out = Domain::new(&reference.name);
    let mut used = vec![false; def.messages.len()];
    let mut reshapes: Vec<(usize, Reshape)> = Vec::new();
    for (refmsg, hit) in refs.iter().zip(&hits) {
        if refmsg.is_header() && !refmsg.obsolete {
            if let Some(hit) = hit
                && hit.list == 0
            {
                used[hit.index] = true;
            }
            out.append(merged_header.clone());
            continue;
        }
        match hit {
            Some(hit) => {
                let defmsg = if hit.list == 0 {
                    used[hit.index] = true;
                    &def.messages[hit.index]
                } else {
                    &comp_domains[hit.list - 1].messages[hit.index]
                };
                let (merged, reshape) =
                    message_merge(defmsg, refmsg, hit.fuzzy, &def_distribution, options);
                if merged.fuzzy {
                    stats.fuzzied += 1;
                } else {
                    stats.merged += 1;
                }
                if options.for_msgfmt
                    && (merged.fuzzy || merged.obsolete || !merged.is_translated())
                {
                    continue;
                }
                if reshape != Reshape::None {
                    reshapes.push((out.messages.len(), reshape));
                }
                out.append(merged);
            }
            None => {
                stats.missing += 1;
                if options.for_msgfmt {
                    continue;
                }
                out.append(untranslated(refmsg, nplurals));
            }
        }
    }

    // Plural repair, deferred until the merged header's nplurals is known.
    for (idx, reshape) in reshapes {
        let msg = &mut out.messages[idx];
        match reshape {
            Reshape::Replicate => {
                let form = msg.msgstr.first().cloned().unwrap_or_default();
                msg.msgstr = vec![form; nplurals as usize];
            }
            Reshape::Trim => msg.msgstr.truncate(1),
            Reshape::None => {}
        }
    }

    // Definition-only messages become obsolete entries, stripped of their
    // extraction data; untranslated ones are dropped.
    if !options.for_msgfmt {
        for (defmsg, used) in def.messages.iter().zip(&used) {
            if *used || !defmsg.is_translated() {
                continue;
            }
            let mut obsolete = defmsg.clone();
            obsolete.obsolete = true;
            obsolete.extracted.clear();
            obsolete.filepos.clear();
            stats.obsolete += 1;
            out.append(obsolete);
        }
    }

    // A message that is not fuzzy (or not translated) must not carry
    // previous-msg fields.
    for msg in &mut out.messages {
        if !msg.fuzzy || !msg.is_translated() {
            msg.clear_previous();
        }
    }
    if !options.quiet && processed.load(Ordering::Relaxed) >= PROGRESS_STEP {
        eprintln!();
    }
    out
}

fn search_message(
    refmsg: &Message,
    def: &Domain,
    obsolete_index: &std::collections::HashMap<String, usize>,
    comp_domains: &[&Domain],
    def_fuzzy: &OnceLock<FuzzyIndex>,
    comp_fuzzy: &[OnceLock<FuzzyIndex>],
    options: &MergeOptions,
) -> Option<SearchHit> {
    let msgctxt = refmsg.msgctxt.as_deref();
    if let Some(index) = def.find_index(msgctxt, &refmsg.msgid) {
        return Some(SearchHit {
            list: 0,
            index,
            fuzzy: false,
        });
    }
    if let Some(index) = obsolete_index.get(&refmsg.key()) {
        return Some(SearchHit {
            list: 0,
            index: *index,
            fuzzy: false,
        });
    }
    for (c, comp) in comp_domains.iter().enumerate() {
        if let Some(index) = comp.find_index(msgctxt, &refmsg.msgid) {
            return Some(SearchHit {
                list: c + 1,
                index,
                fuzzy: false,
            });
        }
    }
    if !options.use_fuzzy_matching || refmsg.is_header() {
        return None;
    }
    let index = def_fuzzy.get_or_init(|| FuzzyIndex::build(&def.messages));
    let mut best = index
        .search(&def.messages, msgctxt, &refmsg.msgid, 0.0)
        .map(|(index, score)| (0usize, index, score));
    for (c, comp) in comp_domains.iter().enumerate() {
        let lower = best.map_or(0.0, |(_, _, score)| score);
        let index = comp_fuzzy[c].get_or_init(|| FuzzyIndex::build(&comp.messages));
        if let Some((idx, score)) = index.search(&comp.messages, msgctxt, &refmsg.msgid, lower)
            && best.is_none_or(|(_, _, b)| score > b)
        {
            best = Some((c + 1, idx, score));
        }
    }
    best.map(|(list, index, _)| SearchHit {
        list,
        index,
        fuzzy: true,
    })
}

/// Merge the header entry: a field-level union of the definitions' and the
/// reference's header. Without a definitions header the reference header
/// is carried over, marked fuzzy like any untranslated template header.
fn merge_header(def_header: Option<&Message>, refs: &[Message], options: &MergeOptions) -> Message {
    let ref_header = refs.iter().find(|m| m.is_header() && !m.obsolete);
    let ref_fields = ref_header
        .and_then(|m| m.msgstr.first())
        .map(|s| Header::parse(s))
        .unwrap_or_default();
    match def_header {
        Some(def) => {
            let def_fields = def
                .msgstr
                .first()
                .map(|s| Header::parse(s))
                .unwrap_or_default();
            let merged = merge_headers(&def_fields, &ref_fields, options.catalogname.as_deref());
            let mut out = def.clone();
            out.msgstr = vec![merged.to_msgstr()];
            out.fuzzy = false;
            out.obsolete = false;
            out.clear_previous();
            out
        }
        None => {
            let mut out = ref_header.cloned().unwrap_or_else(|| Message::new(""));
            if let Some(lang) = &options.catalogname {
                let mut fields = ref_fields;
                fields.set("Language", lang);
                out.msgstr = vec![fields.to_msgstr()];
            }
            out.fuzzy = true;
            out
        }
    }
}

/// nplurals declared by a header message, 2 when absent or unparsable.
fn nplurals_of(header: &Message) -> u32 {
    header
        .msgstr
        .first()
        .map(|s| Header::parse(s))
        .and_then(|h| {
            h.get("Plural-Forms")
                .and_then(|value| plural::parse_plural_forms(value).ok())
        })
        .map_or(2, |(_, nplurals)| nplurals)
}

/// The plural distribution of a header, Germanic default when absent.
fn distribution_for(header: Option<&Message>) -> PluralDistribution {
    let parsed = header
        .and_then(|m| m.msgstr.first())
        .map(|s| Header::parse(s))
        .and_then(|h| {
            h.get("Plural-Forms")
                .and_then(|value| plural::parse_plural_forms(value).ok())
        });
    let (expr, nplurals) = parsed.unwrap_or_else(PluralExpr::default_germanic);
    plural::check_plural_eval(&expr, nplurals)
}

/// An untranslated entry synthesized from a reference message.
fn untranslated(refmsg: &Message, nplurals: u32) -> Message {
    let mut out = refmsg.clone();
    out.msgstr = if refmsg.has_plural() {
        vec![String::new(); nplurals as usize]
    } else {
        vec![String::new()]
    };
    out.comments.clear();
    out.fuzzy = false;
    out.clear_previous();
    out
}

/// Merge one definition message with one reference message.
///
/// msgid, plural, extraction data, format flags, range and wrap come from
/// the reference; translator comments and msgstr come from the definition.
fn message_merge(
    def: &Message,
    refmsg: &Message,
    force_fuzzy: bool,
    distribution: &PluralDistribution,
    options: &MergeOptions,
) -> (Message, Reshape) {
    let mut out = Message::new(&refmsg.msgid);
    out.msgctxt = refmsg.msgctxt.clone();
    out.msgid_plural = refmsg.msgid_plural.clone();
    out.msgstr = def.msgstr.clone();
    out.comments = def.comments.clone();
    out.extracted = refmsg.extracted.clone();
    out.filepos = refmsg.filepos.clone();
    out.formats = refmsg.formats.clone();
    out.range = refmsg.range;
    out.wrap = refmsg.wrap;
    out.syntax_checks = refmsg.syntax_checks.clone();
    out.pos = refmsg.pos.clone();
    out.obsolete = refmsg.obsolete;

    let mut fuzzy = def.fuzzy || force_fuzzy;
    let reshape = match (refmsg.has_plural(), def.has_plural()) {
        (true, false) => {
            fuzzy = true;
            Reshape::Replicate
        }
        (false, true) => {
            fuzzy = true;
            Reshape::Trim
        }
        (true, true) => {
            // Both plural, but the plural msgid itself changed: the forms
            // need review even though their count still fits.
            if refmsg.msgid_plural != def.msgid_plural {
                fuzzy = true;
            }
            Reshape::None
        }
        (false, false) => Reshape::None,
    };

    if !fuzzy {
        for dialect in Dialect::ALL {
            let ref_flag = refmsg.format_flag(dialect);
            let def_flag = def.format_flag(dialect);
            if ref_flag == FormatFlag::Possible
                && def_flag == FormatFlag::No
                && !passes_format_check(dialect, refmsg, &out.msgstr, distribution)
            {
                fuzzy = true;
                break;
            }
        }
    }

    if let Some((def_min, def_max)) = def.range {
        let encompassed = refmsg
            .range
            .is_some_and(|(ref_min, ref_max)| ref_min <= def_min && ref_max >= def_max);
        if !encompassed {
            fuzzy = true;
        }
    }

    if options.keep_previous {
        if def.fuzzy {
            out.prev_msgctxt = def.prev_msgctxt.clone();
            out.prev_msgid = def.prev_msgid.clone();
            out.prev_msgid_plural = def.prev_msgid_plural.clone();
        } else {
            out.prev_msgctxt = def.msgctxt.clone();
            out.prev_msgid = Some(def.msgid.clone());
            out.prev_msgid_plural = def.msgid_plural.clone();
        }
    }
    out.fuzzy = fuzzy;
    (out, reshape)
}

/// Check the msgstr forms against the reference msgid in the given
/// dialect. Plural forms used only for `n == 1` are checked against the
/// singular msgid.
fn passes_format_check(
    dialect: Dialect,
    refmsg: &Message,
    msgstr: &[String],
    distribution: &PluralDistribution,
) -> bool {
    let Ok(msgid_fmt) = dialect.parse(&refmsg.msgid) else {
        // A reference msgid that does not parse cannot be checked.
        return true;
    };
    let plural_fmt = refmsg
        .msgid_plural
        .as_deref()
        .and_then(|plural| dialect.parse(plural).ok());
    for (i, form) in msgstr.iter().enumerate() {
        if form.is_empty() {
            continue;
        }
        let Ok(form_fmt) = dialect.parse(form) else {
            return false;
        };
        let against = if refmsg.has_plural() && i > 0 && !distribution.form_only_for_one(i) {
            match &plural_fmt {
                Some(fmt) => fmt,
                None => return false,
            }
        } else {
            &msgid_fmt
        };
        if !format::check(against, &form_fmt, false).is_empty() {
            return false;
        }
    }
    true
}
