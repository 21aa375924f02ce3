//! Unit tests for field paths, timestamps and records

use chrono::{TimeZone, Utc};
use docvault_domain::value_objects::{
    Aggregation, EntityVersion, FieldPath, OutboxEvent, OutboxStatus, flatten_update, timestamp,
};
use serde_json::{Map, Value, json};

fn doc(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_field_path_parse_and_display() {
    let path = FieldPath::parse("profile.address.city").unwrap();
    assert_eq!(path.segments(), ["profile", "address", "city"]);
    assert_eq!(path.to_string(), "profile.address.city");
    assert!(FieldPath::parse("profile..city").is_err());
    assert!(FieldPath::parse("").is_err());
}

#[test]
fn test_field_path_get_set_remove() {
    let mut data = doc(json!({"profile": {"name": "Ada"}}));
    let name = FieldPath::parse("profile.name").unwrap();
    let city = FieldPath::parse("profile.address.city").unwrap();

    assert_eq!(name.get(&data), Some(&json!("Ada")));
    assert_eq!(city.get(&data), None);

    city.set(&mut data, json!("London"));
    assert_eq!(data, doc(json!({"profile": {"name": "Ada", "address": {"city": "London"}}})));

    assert_eq!(name.remove(&mut data), Some(json!("Ada")));
    assert_eq!(name.get(&data), None);
}

#[test]
fn test_field_path_set_replaces_scalar_intermediate() {
    let mut data = doc(json!({"profile": "legacy"}));
    FieldPath::parse("profile.name").unwrap().set(&mut data, json!("Ada"));
    assert_eq!(data, doc(json!({"profile": {"name": "Ada"}})));
}

#[test]
fn test_field_path_prefix() {
    let profile = FieldPath::parse("profile").unwrap();
    let name = FieldPath::parse("profile.name").unwrap();
    assert!(profile.is_prefix_of(&name));
    assert!(name.is_prefix_of(&name));
    assert!(!name.is_prefix_of(&profile));
}

#[test]
fn test_flatten_update_preserves_unspecified_nested_keys() {
    let changes = doc(json!({"title": "x", "profile": {"name": "Ada", "address": {"city": "Rome"}}}));
    let mut flat: Vec<(String, Value)> = flatten_update(&changes, &[])
        .into_iter()
        .map(|(path, value)| (path.to_string(), value))
        .collect();
    flat.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        flat,
        vec![
            ("profile.address.city".to_string(), json!("Rome")),
            ("profile.name".to_string(), json!("Ada")),
            ("title".to_string(), json!("x")),
        ]
    );
}

#[test]
fn test_flatten_update_stops_at_leaves_and_empty_objects() {
    let changes = doc(json!({"secret": {"pin": 1234}, "meta": {}}));
    let leaves = vec![FieldPath::parse("secret").unwrap()];
    let flat = flatten_update(&changes, &leaves);
    assert_eq!(flat.len(), 2);
    assert!(flat.contains(&(FieldPath::parse("secret").unwrap(), json!({"pin": 1234}))));
    assert!(flat.contains(&(FieldPath::parse("meta").unwrap(), json!({}))));
}

#[test]
fn test_timestamp_format_is_fixed_width_and_ordered() {
    let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let later = early + chrono::Duration::microseconds(1);
    let a = timestamp::format(early);
    let b = timestamp::format(later);
    assert_eq!(a, "2026-01-02T03:04:05.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(timestamp::parse(&b).unwrap(), later);
}

#[test]
fn test_timestamp_from_value() {
    assert_eq!(timestamp::from_value(None).unwrap(), None);
    assert_eq!(timestamp::from_value(Some(&Value::Null)).unwrap(), None);
    assert!(timestamp::from_value(Some(&json!(42))).is_err());
}

#[test]
fn test_outbox_event_wire_format() {
    let event = OutboxEvent {
        id: "evt-1".to_string(),
        topic: "task.created".to_string(),
        payload: json!({"id": "t1"}),
        status: OutboxStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
        tenant_id: None,
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["status"], json!("PENDING"));
    assert_eq!(value["createdAt"], json!("2026-05-01T00:00:00.000000Z"));
    assert!(value.get("tenantId").is_none());
}

#[test]
fn test_entity_version_skips_absent_payloads() {
    let at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let version = EntityVersion {
        id: "v1".to_string(),
        entity_id: "t1".to_string(),
        valid_from: at,
        valid_to: at,
        actor_id: Some("user-1".to_string()),
        reason: None,
        data: None,
        diff: Some(json!({"title": "old"})),
    };
    let value = serde_json::to_value(&version).unwrap();
    assert_eq!(value["entityId"], json!("t1"));
    assert_eq!(value["actorId"], json!("user-1"));
    assert!(value.get("data").is_none());
    assert_eq!(value["diff"]["title"], json!("old"));
}

#[test]
fn test_aggregation_aliases() {
    let amount = FieldPath::parse("amount").unwrap();
    assert_eq!(Aggregation::Count.alias(), "count");
    assert_eq!(Aggregation::Sum(amount.clone()).alias(), "sum_amount");
    assert_eq!(Aggregation::Average(amount).alias(), "avg_amount");
}
