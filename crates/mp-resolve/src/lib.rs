// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-resolve
//!
//! Deterministic merge of one extractor update into a passport: temporal
//! upsert of facts and preferences, entity coalescence through alias
//! transitivity, open-loop dedupe, and the append-only contradiction ledger.
//!
//! Truth here means *the most recent non-equal value wins, and every
//! divergence is remembered*. The merge itself cannot fail; item-level
//! validation happened upstream in extraction.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;

use chrono::{DateTime, Utc};
use mp_core::{
    key_ident, values_equal, Contradiction, Fact, OpenLoop, Passport, PassportUpdate, Preference,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use entity::{coalesce_entities, entity_ident};

/// Counters describing what one merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStats {
    /// Facts appended or replaced.
    pub facts_upserted: usize,
    /// Preferences appended or replaced.
    pub prefs_upserted: usize,
    /// Entities appended or merged.
    pub entities_merged: usize,
    /// Open loops appended or refreshed.
    pub open_loops_added: usize,
    /// Contradictions recorded.
    pub contradictions_added: usize,
}

/// Keyed temporal entry: the shape [`Fact`] and [`Preference`] share.
trait TemporalEntry {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
    fn value(&self) -> &Value;
    fn ts(&self) -> DateTime<Utc>;
    fn set_ts(&mut self, ts: DateTime<Utc>);
    fn confidence(&self) -> f64;
    fn set_confidence(&mut self, confidence: f64);
    fn source(&self) -> &str;
    fn set_source(&mut self, source: String);
}

macro_rules! impl_temporal_entry {
    ($ty:ty) => {
        impl TemporalEntry for $ty {
            fn key(&self) -> &str {
                &self.key
            }
            fn set_key(&mut self, key: String) {
                self.key = key;
            }
            fn value(&self) -> &Value {
                &self.value
            }
            fn ts(&self) -> DateTime<Utc> {
                self.ts
            }
            fn set_ts(&mut self, ts: DateTime<Utc>) {
                self.ts = ts;
            }
            fn confidence(&self) -> f64 {
                self.confidence
            }
            fn set_confidence(&mut self, confidence: f64) {
                self.confidence = confidence;
            }
            fn source(&self) -> &str {
                &self.source
            }
            fn set_source(&mut self, source: String) {
                self.source = source;
            }
        }
    };
}

impl_temporal_entry!(Fact);
impl_temporal_entry!(Preference);

/// Upsert by normalized key with temporal priority.
///
/// Equal values refresh timestamp/source/confidence without counting as an
/// upsert. Non-equal values: the later timestamp wins the slot, and a
/// contradiction is recorded either way, roles assigned so `ts_old <= ts_new`.
fn upsert_temporal<T: TemporalEntry>(
    items: &mut Vec<T>,
    mut incoming: T,
    ledger: &mut Vec<Contradiction>,
) -> (bool, bool) {
    let key = key_ident(incoming.key());
    incoming.set_key(key.clone());

    let Some(idx) = items.iter().position(|it| key_ident(it.key()) == key) else {
        items.push(incoming);
        return (true, false);
    };

    // Canonicalize the stored key once matched, so a legacy "Tone" cannot
    // linger next to "tone" forever.
    items[idx].set_key(key.clone());

    if values_equal(items[idx].value(), incoming.value()) {
        if incoming.ts() > items[idx].ts() {
            items[idx].set_ts(incoming.ts());
            items[idx].set_source(incoming.source().to_string());
        }
        if incoming.confidence() > items[idx].confidence() {
            items[idx].set_confidence(incoming.confidence());
        }
        return (false, false);
    }

    if incoming.ts() >= items[idx].ts() {
        ledger.push(Contradiction {
            key,
            old: items[idx].value().clone(),
            new: incoming.value().clone(),
            ts_old: items[idx].ts(),
            ts_new: incoming.ts(),
            source_old: items[idx].source().to_string(),
            source_new: incoming.source().to_string(),
        });
        items[idx] = incoming;
        (true, true)
    } else {
        // Older conflicting value: the slot keeps the newer truth, but the
        // divergence still goes on the ledger.
        ledger.push(Contradiction {
            key,
            old: incoming.value().clone(),
            new: items[idx].value().clone(),
            ts_old: incoming.ts(),
            ts_new: items[idx].ts(),
            source_old: incoming.source().to_string(),
            source_new: items[idx].source().to_string(),
        });
        (false, true)
    }
}

/// Whitespace-collapsed lowercase identity for open-loop items.
fn loop_ident(item: &str) -> String {
    item.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Dedupe an incoming open loop against the list; same normalized text keeps
/// the later timestamp. Returns whether the list changed.
fn upsert_open_loop(existing: &mut Vec<OpenLoop>, incoming: OpenLoop) -> bool {
    let ident = loop_ident(&incoming.item);
    if ident.is_empty() {
        return false;
    }
    for current in existing.iter_mut() {
        if loop_ident(&current.item) == ident {
            if incoming.ts > current.ts {
                *current = incoming;
                return true;
            }
            return false;
        }
    }
    existing.push(incoming);
    true
}

/// Re-establish the canonical ordering invariant on every list.
pub fn canonical_sort(passport: &mut Passport) {
    passport
        .facts
        .sort_by(|a, b| key_ident(&a.key).cmp(&key_ident(&b.key)).then(b.ts.cmp(&a.ts)));
    passport
        .prefs
        .sort_by(|a, b| key_ident(&a.key).cmp(&key_ident(&b.key)).then(b.ts.cmp(&a.ts)));
    passport.entities.sort_by(|a, b| {
        entity_ident(&a.name)
            .cmp(&entity_ident(&b.name))
            .then(a.kind.as_str().cmp(b.kind.as_str()))
    });
    passport.open_loops.sort_by(|a, b| {
        b.ts.cmp(&a.ts)
            .then_with(|| a.item.to_lowercase().cmp(&b.item.to_lowercase()))
    });
    passport.contradictions.sort_by(|a, b| {
        key_ident(&a.key)
            .cmp(&key_ident(&b.key))
            .then(b.ts_new.cmp(&a.ts_new))
    });
}

/// [`merge_passport_update_at`] stamped now.
#[must_use]
pub fn merge_passport_update(passport: Passport, update: PassportUpdate) -> (Passport, ResolveStats) {
    merge_passport_update_at(passport, update, Utc::now())
}

/// Deterministically merge one extractor update into the passport.
///
/// Takes and returns the passport by value; the merge is all-or-nothing per
/// call and performs no I/O.
#[must_use]
pub fn merge_passport_update_at(
    mut passport: Passport,
    update: PassportUpdate,
    now: DateTime<Utc>,
) -> (Passport, ResolveStats) {
    let mut stats = ResolveStats::default();

    for fact in update.facts {
        let (upserted, contradicted) =
            upsert_temporal(&mut passport.facts, fact, &mut passport.contradictions);
        stats.facts_upserted += usize::from(upserted);
        stats.contradictions_added += usize::from(contradicted);
    }

    for pref in update.prefs {
        let (upserted, contradicted) =
            upsert_temporal(&mut passport.prefs, pref, &mut passport.contradictions);
        stats.prefs_upserted += usize::from(upserted);
        stats.contradictions_added += usize::from(contradicted);
    }

    stats.entities_merged = coalesce_entities(&mut passport.entities, update.entities);

    for open_loop in update.open_loops {
        stats.open_loops_added += usize::from(upsert_open_loop(&mut passport.open_loops, open_loop));
    }

    canonical_sort(&mut passport);
    passport.touch_at(now);

    debug!(
        facts = stats.facts_upserted,
        prefs = stats.prefs_upserted,
        entities = stats.entities_merged,
        open_loops = stats.open_loops_added,
        contradictions = stats.contradictions_added,
        "merged passport update"
    );
    (passport, stats)
}
