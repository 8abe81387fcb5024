//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use voxrelay_core::protocol::{BindingKey, Envelope};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_frame_min() {
    // An empty object is a valid frame: every field is normalized.
    let env: Envelope = serde_json::from_str(&load("frame_min.json")).unwrap();
    assert_eq!(env.kind, "unknown");
    assert_eq!(env.origin, "unknown");
    assert!(env.topic.is_none());
    assert!(env.payload.is_null());
    assert!(env.sequence.is_none());
}

#[test]
fn parse_frame_full() {
    let env: Envelope = serde_json::from_str(&load("frame_full.json")).unwrap();
    assert_eq!(env.kind, "action");
    assert_eq!(env.topic.as_deref(), Some("reload"));
    assert_eq!(env.origin, "ui");
    assert_eq!(env.payload["path"], "notes/today");
    // Senders never assign sequences; the field still parses if present.
    assert_eq!(env.sequence, Some(7));
}

#[test]
fn unknown_fields_are_tolerated() {
    let env: Envelope = serde_json::from_str(&load("frame_extra_fields.json")).unwrap();
    assert_eq!(env.kind, "event");
    assert_eq!(env.origin, "worker");
}

#[test]
fn sequence_omitted_until_stamped() {
    let mut env: Envelope = serde_json::from_str(r#"{"kind":"event","origin":"ui"}"#).unwrap();
    let s = serde_json::to_string(&env).unwrap();
    assert!(!s.contains("sequence"));

    env.sequence = Some(42);
    let s = serde_json::to_string(&env).unwrap();
    assert!(s.contains("\"sequence\":42"));
}

#[test]
fn binding_key_exact_pair() {
    let env: Envelope = serde_json::from_str(&load("frame_full.json")).unwrap();
    assert_eq!(
        BindingKey::from_envelope(&env),
        BindingKey::of("action", Some("reload"))
    );
    assert_ne!(
        BindingKey::of("action", Some("reload")),
        BindingKey::of("action", None)
    );
}

#[test]
fn heartbeat_detection() {
    let ping: Envelope = serde_json::from_str(r#"{"kind":"ping","origin":"worker"}"#).unwrap();
    assert!(ping.is_heartbeat());
    let hb: Envelope =
        serde_json::from_str(r#"{"kind":"event","topic":"heartbeat","origin":"worker"}"#).unwrap();
    assert!(hb.is_heartbeat());
    let other: Envelope = serde_json::from_str(r#"{"kind":"event","origin":"worker"}"#).unwrap();
    assert!(!other.is_heartbeat());
}
