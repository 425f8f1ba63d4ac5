//! Tests for the TOML-backed settings surface

use super::helpers::init_logging;
use crate::config::{QuerySettings, SyncSettings, WeftConfig};
use crate::query::ast::ClauseKind;
use enumset::EnumSet;
use test_log::test;

#[test]
fn test_defaults() {
    let config = WeftConfig::default();
    assert!(config.sync.prevent_recursive_links);
    assert!(config.sync.collect_orphans);
    for kind in [
        ClauseKind::In,
        ClauseKind::Named,
        ClauseKind::With,
        ClauseKind::LinkedFrom,
    ] {
        assert!(config.query.multi_target.contains(kind));
    }
}

#[test]
fn test_store_and_load_round_trip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weft.toml");

    let config = WeftConfig {
        query: QuerySettings {
            multi_target: EnumSet::only(ClauseKind::LinkedFrom),
        },
        sync: SyncSettings {
            prevent_recursive_links: false,
            collect_orphans: true,
        },
    };
    config.store(&path).unwrap();

    let loaded = WeftConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_path_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = WeftConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded, WeftConfig::default());
}
