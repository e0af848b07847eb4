// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-render
//!
//! Renders a passport into a compact plain-text briefing under a character
//! budget, preferring the most recent and most confident information.
//!
//! Sections appear in fixed order: facts, preferences, entities, open loops,
//! recent updates. When the budget is exceeded, per-section caps shrink in
//! the reverse of that order; facts never drop below five; as a last resort
//! the joined text is hard-truncated.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use mp_core::{normalize_key, truncate_chars, Contradiction, Entity, EntityType, Fact, OpenLoop, Passport, Preference};
use serde_json::Value;

/// Default briefing header line.
pub const DEFAULT_HEADER: &str = "MEMORY PASSPORT v1";

/// Default character budget.
pub const DEFAULT_BUDGET_CHARS: usize = 3000;

/// Budgets below this are clamped up; tiny budgets cannot hold a briefing.
const MIN_BUDGET_CHARS: usize = 400;

/// Facts never trim below this many entries.
const MIN_FACTS: usize = 5;

/// Per-value render cap.
const VALUE_CHARS: usize = 220;

/// Open-loop items get a little more room than plain values.
const LOOP_CHARS: usize = 240;

#[derive(Debug, Clone, Copy)]
struct SectionCaps {
    facts: usize,
    prefs: usize,
    entities: usize,
    open_loops: usize,
    contradictions: usize,
}

impl SectionCaps {
    const INITIAL: Self = Self {
        facts: 25,
        prefs: 15,
        entities: 12,
        open_loops: 10,
        contradictions: 8,
    };

    /// Shrink the least important populated section by one. Returns `false`
    /// once every section is at its floor.
    fn shrink(&mut self) -> bool {
        if self.contradictions > 0 {
            self.contradictions -= 1;
        } else if self.open_loops > 0 {
            self.open_loops -= 1;
        } else if self.entities > 0 {
            self.entities -= 1;
        } else if self.prefs > 0 {
            self.prefs -= 1;
        } else if self.facts > MIN_FACTS {
            self.facts -= 1;
        } else {
            return false;
        }
        true
    }
}

fn value_to_str(value: &Value, max_len: usize) -> String {
    let rendered = match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    truncate_chars(&rendered, max_len)
}

fn item_to_str(item: &str, max_len: usize) -> String {
    truncate_chars(item.trim(), max_len)
}

/// Linear rank: unix seconds scaled down plus half the confidence.
fn score(ts: DateTime<Utc>, confidence: f64) -> f64 {
    (ts.timestamp() as f64) / 1e9 + confidence * 0.5
}

fn top_facts(facts: &[Fact], n: usize) -> Vec<&Fact> {
    let mut ranked: Vec<&Fact> = facts.iter().collect();
    ranked.sort_by(|a, b| score(b.ts, b.confidence).total_cmp(&score(a.ts, a.confidence)));
    ranked.truncate(n);
    ranked
}

fn top_prefs(prefs: &[Preference], n: usize) -> Vec<&Preference> {
    let mut ranked: Vec<&Preference> = prefs.iter().collect();
    ranked.sort_by(|a, b| score(b.ts, b.confidence).total_cmp(&score(a.ts, a.confidence)));
    ranked.truncate(n);
    ranked
}

fn top_open_loops(open_loops: &[OpenLoop], n: usize) -> Vec<&OpenLoop> {
    let mut ranked: Vec<&OpenLoop> = open_loops.iter().collect();
    ranked.sort_by(|a, b| b.ts.cmp(&a.ts));
    ranked.truncate(n);
    ranked
}

fn top_contradictions(contradictions: &[Contradiction], n: usize) -> Vec<&Contradiction> {
    let mut ranked: Vec<&Contradiction> = contradictions.iter().collect();
    ranked.sort_by(|a, b| b.ts_new.cmp(&a.ts_new));
    ranked.truncate(n);
    ranked
}

fn entity_line(entity: &Entity) -> String {
    if entity.kind != EntityType::Other {
        format!("{} ({})", entity.name, entity.kind.as_str())
    } else {
        entity.name.clone()
    }
}

fn build_lines(passport: &Passport, header: &str, caps: SectionCaps) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(header.to_string());
    if let Some(user_key) = &passport.user_key {
        lines.push(format!("User: {user_key}"));
    }
    lines.push(format!("Updated: {}", passport.updated_at.to_rfc3339()));

    let facts = top_facts(&passport.facts, caps.facts);
    if !facts.is_empty() {
        lines.push(String::new());
        lines.push("Facts (current beliefs):".to_string());
        for f in facts {
            lines.push(format!(
                "- {}: {}",
                normalize_key(&f.key),
                value_to_str(&f.value, VALUE_CHARS)
            ));
        }
    }

    let prefs = top_prefs(&passport.prefs, caps.prefs);
    if !prefs.is_empty() {
        lines.push(String::new());
        lines.push("Preferences:".to_string());
        for p in prefs {
            lines.push(format!(
                "- {}: {}",
                normalize_key(&p.key),
                value_to_str(&p.value, VALUE_CHARS)
            ));
        }
    }

    // Entities keep their input order; they are context, not the payload.
    let entities: Vec<&Entity> = passport.entities.iter().take(caps.entities).collect();
    if !entities.is_empty() {
        lines.push(String::new());
        lines.push("Key entities:".to_string());
        for e in entities {
            lines.push(format!("- {}", entity_line(e)));
        }
    }

    let open_loops = top_open_loops(&passport.open_loops, caps.open_loops);
    if !open_loops.is_empty() {
        lines.push(String::new());
        lines.push("Open loops:".to_string());
        for o in open_loops {
            lines.push(format!("- {}", item_to_str(&o.item, LOOP_CHARS)));
        }
    }

    let contradictions = top_contradictions(&passport.contradictions, caps.contradictions);
    if !contradictions.is_empty() {
        lines.push(String::new());
        lines.push("Recent updates (contradictions resolved by time):".to_string());
        for c in contradictions {
            lines.push(format!(
                "- {} changed: {} -> {}",
                normalize_key(&c.key),
                value_to_str(&c.old, VALUE_CHARS),
                value_to_str(&c.new, VALUE_CHARS)
            ));
        }
    }

    lines
}

fn joined_chars(lines: &[String]) -> usize {
    let newline_count = lines.len().saturating_sub(1);
    lines.iter().map(|l| l.chars().count()).sum::<usize>() + newline_count
}

/// Render the passport as a budget-bounded plain-text briefing.
///
/// The output never exceeds `budget_chars + 1` characters; `budget_chars`
/// itself is clamped to a minimum of 400.
#[must_use]
pub fn export_context(passport: &Passport, budget_chars: usize, header: &str) -> String {
    let budget = budget_chars.max(MIN_BUDGET_CHARS);

    let mut caps = SectionCaps::INITIAL;
    let mut lines = build_lines(passport, header, caps);

    let mut rounds = 0;
    while joined_chars(&lines) > budget && rounds < 80 {
        if !caps.shrink() {
            return truncate_chars(&lines.join("\n"), budget);
        }
        lines = build_lines(passport, header, caps);
        rounds += 1;
    }
    if joined_chars(&lines) > budget {
        return truncate_chars(&lines.join("\n"), budget);
    }
    lines.join("\n")
}
