// SPDX-License-Identifier: MIT OR Apache-2.0
//! Section layout and budget-enforcement tests.

use chrono::{DateTime, TimeZone, Utc};
use mp_core::{Contradiction, Entity, EntityType, Fact, OpenLoop, Passport, Preference};
use mp_render::{export_context, DEFAULT_HEADER};
use serde_json::json;

fn dt(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, 10, 0, 0).unwrap()
}

fn full_passport() -> Passport {
    let mut p = Passport::for_user("u1");
    p.updated_at = dt(3);
    p.facts.push(Fact {
        key: "role".into(),
        value: json!("developer"),
        ts: dt(3),
        confidence: 0.9,
        source: "t1".into(),
    });
    p.prefs.push(Preference {
        key: "tone".into(),
        value: json!("direct"),
        ts: dt(3),
        confidence: 0.9,
        source: "t1".into(),
    });
    let mut e = Entity::new("SozoGraph", EntityType::Project);
    e.push_alias("Sozo Graph");
    p.entities.push(e);
    p.entities.push(Entity::new("Misc", EntityType::Other));
    p.open_loops.push(OpenLoop {
        item: "Finalize v1 repo".into(),
        ts: dt(3),
        source: "t1".into(),
    });
    p.contradictions.push(Contradiction {
        key: "location".into(),
        old: json!("Harare"),
        new: json!("Bulawayo"),
        ts_old: dt(1),
        ts_new: dt(3),
        source_old: "t0".into(),
        source_new: "t1".into(),
    });
    p
}

#[test]
fn all_sections_render_in_order() {
    let txt = export_context(&full_passport(), 3000, DEFAULT_HEADER);

    assert!(txt.starts_with(DEFAULT_HEADER));
    assert!(txt.contains("User: u1"));
    assert!(txt.contains("Facts (current beliefs):"));
    assert!(txt.contains("- role: developer"));
    assert!(txt.contains("Preferences:"));
    assert!(txt.contains("- tone: direct"));
    assert!(txt.contains("Key entities:"));
    assert!(txt.contains("- SozoGraph (project)"));
    assert!(txt.contains("- Misc\n"));
    assert!(txt.contains("Open loops:"));
    assert!(txt.contains("Finalize v1 repo"));
    assert!(txt.contains("Recent updates (contradictions resolved by time):"));
    assert!(txt.contains("- location changed: Harare -> Bulawayo"));

    let facts_pos = txt.find("Facts").unwrap();
    let prefs_pos = txt.find("Preferences").unwrap();
    let entities_pos = txt.find("Key entities").unwrap();
    let loops_pos = txt.find("Open loops").unwrap();
    let updates_pos = txt.find("Recent updates").unwrap();
    assert!(facts_pos < prefs_pos && prefs_pos < entities_pos);
    assert!(entities_pos < loops_pos && loops_pos < updates_pos);
}

#[test]
fn empty_sections_are_omitted() {
    let mut p = Passport::new();
    p.updated_at = dt(3);
    let txt = export_context(&p, 3000, DEFAULT_HEADER);
    assert!(!txt.contains("Facts"));
    assert!(!txt.contains("Open loops"));
    assert!(txt.contains("Updated: "));
}

#[test]
fn budget_trims_to_within_one_char_of_budget() {
    let mut p = Passport::for_user("u1");
    p.updated_at = dt(3);
    for i in 0..60 {
        p.facts.push(Fact {
            key: format!("fact_{i}"),
            value: json!("x".repeat(200)),
            ts: dt(3),
            confidence: 0.5,
            source: "t1".into(),
        });
    }

    let txt = export_context(&p, 900, DEFAULT_HEADER);
    assert!(txt.chars().count() <= 910);
    assert!(txt.contains("Facts (current beliefs):"));
}

#[test]
fn hard_truncation_ends_with_ellipsis() {
    let mut p = Passport::new();
    p.updated_at = dt(3);
    for i in 0..10 {
        p.facts.push(Fact {
            key: format!("k{i}"),
            value: json!("v".repeat(200)),
            ts: dt(3),
            confidence: 0.5,
            source: "t1".into(),
        });
    }
    let txt = export_context(&p, 400, DEFAULT_HEADER);
    assert!(txt.chars().count() <= 401);
    assert!(txt.ends_with('…'));
}

#[test]
fn tiny_budgets_clamp_to_four_hundred() {
    let mut p = Passport::new();
    p.updated_at = dt(3);
    for i in 0..20 {
        p.facts.push(Fact {
            key: format!("k{i}"),
            value: json!("v".repeat(100)),
            ts: dt(3),
            confidence: 0.5,
            source: "t1".into(),
        });
    }
    let tiny = export_context(&p, 10, DEFAULT_HEADER);
    let clamped = export_context(&p, 400, DEFAULT_HEADER);
    assert_eq!(tiny, clamped);
}

#[test]
fn trimming_drops_contradictions_before_facts() {
    let mut p = full_passport();
    for i in 0..8 {
        p.contradictions.push(Contradiction {
            key: format!("churn_{i}"),
            old: json!("a".repeat(120)),
            new: json!("b".repeat(120)),
            ts_old: dt(1),
            ts_new: dt(2),
            source_old: "t0".into(),
            source_new: "t1".into(),
        });
    }
    let txt = export_context(&p, 600, DEFAULT_HEADER);
    // Facts survive; the noisy contradiction tail does not.
    assert!(txt.contains("- role: developer"));
    assert!(!txt.contains("churn_7 changed"));
}
