#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use voxrelay_broker::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
relay:
  listen: "127.0.0.1:8765"
  history_cap: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.relay.listen, "127.0.0.1:8765");
    assert_eq!(cfg.relay.history_capacity, 10);
    assert!(cfg.relay.log_frames);
}

#[test]
fn rejects_wrong_version() {
    let bad = r#"
version: 2
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_zero_capacity() {
    let bad = r#"
version: 1
relay:
  history_capacity: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn rejects_unparseable_listen() {
    let bad = r#"
version: 1
relay:
  listen: "not-an-addr"
"#;
    assert!(config::load_from_str(bad).is_err());
}
