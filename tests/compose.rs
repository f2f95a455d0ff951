//! Composition tests: documents in, instances or errors out.

use namerd::config::{ConfigError, ParseError};
use namerd::registry::Role;

mod common;

#[test]
fn test_two_namers_one_interface() {
    let doc = common::document(&common::fixed_namers_toml(&["/a", "/b"])).unwrap();
    let instance = doc.compose().unwrap();

    assert_eq!(instance.namers().len(), 2);
    assert_eq!(instance.interfaces().len(), 1);
    assert_eq!(instance.interfaces()[0].kind(), "http");
    assert_eq!(instance.telemeters().len(), 1);
    assert_eq!(instance.telemeters()[0].kind(), "adminMetricsExport");
    assert_eq!(instance.admin().config().ip.to_string(), "127.0.0.1");

    let prefixes: Vec<String> = instance.namers().prefixes().map(|(p, _)| p.to_string()).collect();
    assert_eq!(prefixes, vec!["/a", "/b"]);
}

#[test]
fn test_nested_prefix_conflicts() {
    let doc = common::document(&common::fixed_namers_toml(&["/a", "/b", "/a/x"])).unwrap();
    let err = doc.compose().unwrap_err();

    match &err {
        ConfigError::ConflictingNamers(earlier, later) => {
            assert_eq!(earlier.to_string(), "/a");
            assert_eq!(later.to_string(), "/a/x");
        }
        other => panic!("expected a conflict, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("/a") && message.contains("/a/x"), "{message}");
}

#[test]
fn test_empty_prefix_fails() {
    let doc = common::document(&common::fixed_namers_toml(&["/a", "/"])).unwrap();
    assert!(matches!(doc.compose(), Err(ConfigError::EmptyNamerPrefix { index: 1 })));
}

#[test]
fn test_no_namers_is_valid() {
    let doc = common::document(&common::fixed_namers_toml(&[])).unwrap();
    let instance = doc.compose().unwrap();
    assert!(instance.namers().is_empty());
}

#[test]
fn test_empty_interfaces_fail_before_kinds_resolve() {
    let err = common::document(
        r#"
        interfaces = []

        [storage]
        kind = "noSuchStore"

        [[namers]]
        kind = "noSuchNamer"
        prefix = "/"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::NoInterfaces));
}

const PROBES: &str = r#"
[storage]
kind = "probe"
tag = "TAG"
EXPERIMENTAL

[[namers]]
kind = "probe"
prefix = "/svc"
tag = "TAG"

[[interfaces]]
kind = "probe"
tag = "TAG"

[[telemetry]]
kind = "probe"
tag = "TAG"
"#;

fn probes(tag: &str, experimental: bool) -> String {
    let flag = if experimental { "experimental = true" } else { "" };
    PROBES.replace("TAG", tag).replace("EXPERIMENTAL", flag)
}

#[test]
fn test_experimental_storage_without_opt_in_builds_nothing() {
    let doc = common::document(&probes("gate-closed", false)).unwrap();
    match doc.compose() {
        Err(ConfigError::ExperimentalFeatureDisabled { kind }) => assert_eq!(kind, "probe"),
        other => panic!("expected the experimental gate, got {other:?}"),
    }
    assert_eq!(common::builds("gate-closed"), 0);
}

#[test]
fn test_experimental_storage_with_opt_in() {
    let doc = common::document(&probes("gate-open", true)).unwrap();
    let instance = doc.compose().unwrap();
    // storage + namer + interface + telemeter
    assert_eq!(common::builds("gate-open"), 4);
    assert_eq!(instance.telemeters().len(), 1);
}

#[test]
fn test_check_matches_compose_gate() {
    let doc = common::document(&probes("dry-run", false)).unwrap();
    assert!(matches!(doc.check(), Err(ConfigError::ExperimentalFeatureDisabled { .. })));
    assert_eq!(common::builds("dry-run"), 0);

    let doc = common::document(&common::fixed_namers_toml(&["/a", "/a"])).unwrap();
    assert!(matches!(doc.check(), Err(ConfigError::ConflictingNamers(..))));
}

#[test]
fn test_telemeter_failure_stops_before_storage() {
    let text = probes("telemeter-fails", true)
        + r#"
[[telemetry]]
kind = "tracelog"
sampleRate = 2.0
"#;
    let doc = common::document(&text).unwrap();
    let err = doc.compose().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Component { role: Role::Telemeter, ref kind, .. } if kind == "tracelog"
    ));
    // Only the probe telemeter ran; storage, namers and interfaces never did.
    assert_eq!(common::builds("telemeter-fails"), 1);
}

#[test]
fn test_every_telemeter_sink_is_broadcast() {
    let text = common::fixed_namers_toml(&["/a"])
        + r#"
[[telemetry]]
kind = "adminMetricsExport"

[[telemetry]]
kind = "prometheus"

[[telemetry]]
kind = "tracelog"
"#;
    let instance = common::document(&text).unwrap().compose().unwrap();
    assert_eq!(instance.telemeters().len(), 3);
    for telemeter in instance.telemeters() {
        if let Some(sink) = telemeter.stats() {
            assert!(instance.stats().contains(&sink));
        }
        if let Some(tracer) = telemeter.tracer() {
            assert!(instance.tracer().contains(&tracer));
        }
    }
    assert_eq!(instance.stats().len(), 2);
    assert_eq!(instance.tracer().len(), 1);
}

#[test]
fn test_unknown_kind_names_role_and_location() {
    let text = common::fixed_namers_toml(&["/a"]).replace("kind = \"inMemory\"", "kind = \"zk\"");
    match common::document(&text).unwrap_err() {
        ConfigError::Parse(ParseError::UnknownKind { role, kind, location }) => {
            assert_eq!(role, Role::Storage);
            assert_eq!(kind, "zk");
            assert_eq!(location, "storage");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
