// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire-contract tests for the passport JSON shape.

use chrono::{TimeZone, Utc};
use mp_core::{Entity, EntityType, Fact, OpenLoop, Passport, Preference, SourceKind, SourceRef};
use serde_json::json;

fn sample_passport() -> Passport {
    let ts = Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap();
    let mut p = Passport::for_user("u1");
    p.updated_at = ts;
    p.facts.push(Fact {
        key: "location".into(),
        value: json!("Harare"),
        ts,
        confidence: 0.9,
        source: "t1".into(),
    });
    p.prefs.push(Preference {
        key: "tone".into(),
        value: json!("direct"),
        ts,
        confidence: 0.8,
        source: "t1".into(),
    });
    let mut e = Entity::new("SozoGraph", EntityType::Project);
    e.push_alias("Sozo Graph");
    p.entities.push(e);
    p.open_loops.push(OpenLoop {
        item: "Finalize v1 repo".into(),
        ts,
        source: "t1".into(),
    });
    p.upsert_source(SourceRef {
        id: "t1".into(),
        kind: SourceKind::Transcript,
        ts,
        hash: Some("00".repeat(32)),
        source: Some("transcript:fixture".into()),
    });
    p
}

#[test]
fn round_trips_through_json() {
    let p = sample_passport();
    let text = serde_json::to_string(&p).unwrap();
    let back: Passport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, p);
}

#[test]
fn timestamps_serialize_with_timezone() {
    let v = serde_json::to_value(sample_passport()).unwrap();
    let updated = v["updated_at"].as_str().unwrap();
    assert!(updated.ends_with('Z') || updated.contains("+00:00"));
}

#[test]
fn extra_fields_are_rejected() {
    let mut v = serde_json::to_value(sample_passport()).unwrap();
    v["surprise"] = json!(true);
    assert!(serde_json::from_value::<Passport>(v).is_err());
}

#[test]
fn extra_fields_on_entries_are_rejected() {
    let mut v = serde_json::to_value(sample_passport()).unwrap();
    v["facts"][0]["note"] = json!("nope");
    assert!(serde_json::from_value::<Passport>(v).is_err());
}

#[test]
fn minimal_passport_parses_with_defaults() {
    let p: Passport = serde_json::from_value(json!({
        "updated_at": "2026-02-03T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(p.version, mp_core::PASSPORT_VERSION);
    assert!(p.facts.is_empty());
    assert!(p.user_key.is_none());
}

#[test]
fn empty_collections_are_still_listed_but_meta_is_omitted() {
    let v = serde_json::to_value(Passport::new()).unwrap();
    let obj = v.as_object().unwrap();
    assert!(obj.contains_key("facts"));
    assert!(obj.contains_key("sources"));
    assert!(!obj.contains_key("meta"));
    assert!(!obj.contains_key("user_key"));
}
