//! Integration tests over the shipped configuration in `data/config/`.

use std::fs;

use climate_core::Quantity;
use climate_rules::loader::{LoadStatus, RuleLoader};
use climate_rules::schema::RuleKind;
use climate_rules::validation::validate_document;
use climate_rules::AnalysisRules;

/// Integration tests run from the crate directory; go up two levels.
fn config_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/config")
}

#[test]
fn every_shipped_document_loads_and_validates() {
    let mut loader = RuleLoader::new(config_dir());
    let results = loader.load_all().unwrap();
    assert_eq!(results.len(), 4);
    for r in &results {
        assert!(
            matches!(r.status, LoadStatus::Loaded { .. }),
            "{}: {:?}",
            r.path.display(),
            r.status
        );
    }
    for kind in RuleKind::ALL {
        assert_eq!(loader.enabled_of_kind(kind).len(), 1, "{kind}");
    }
    for doc in loader.documents() {
        let result = validate_document(doc);
        assert!(result.valid, "{}: {}", doc.metadata().id, result.error_summary());
    }
}

#[test]
fn shipped_directory_equals_builtin() {
    let from_dir = AnalysisRules::load_dir(&config_dir()).unwrap();
    assert_eq!(from_dir, AnalysisRules::builtin().unwrap());
}

#[test]
fn site_override_extends_builtin_profiles() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(
        dir.path().join("site-rooms.yml"),
        r#"
apiVersion: v1
kind: RoomProfiles
metadata:
  id: site-rooms
  name: Site rooms
  extends: default-room-profiles
spec:
  rooms:
    server_room:
      ranges:
        temperature: { min: 17.0, max: 24.0, target: 20.0, critical_low: 10.0, critical_high: 28.0 }
"#,
    )
    .unwrap();

    let rules = AnalysisRules::load_dir(dir.path()).unwrap();
    let server = rules.rooms.get("server_room").unwrap();
    assert_eq!(server.range(Quantity::Temperature).unwrap().target, 20.0);
    // Untouched quantities and rooms come from the parent document.
    assert_eq!(server.range(Quantity::Humidity).unwrap().critical_high, Some(80.0));
    assert!(rules.rooms.get("data_center").is_some());
    assert_eq!(rules.rooms.default_room, "office");
}

#[test]
fn invalid_override_fails_the_load() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(
        dir.path().join("weights.yml"),
        r#"
apiVersion: v1
kind: EnsembleConfig
metadata:
  id: heavy-trend
  name: Heavy trend
  extends: default-ensemble
spec:
  weights:
    trend: 0.9
"#,
    )
    .unwrap();

    let err = AnalysisRules::load_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("vote weights must sum to 1.0"));
}
