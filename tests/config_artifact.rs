use reimburse::domain::config::{BaseCoefficients, EngineConfig};
use reimburse::domain::errors::ConfigurationError;
use reimburse::infrastructure::{EngineConfigPersistence, parse_engine_config};
use std::fs;
use std::path::Path;

fn shipped_config() -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/engine.toml");
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_shipped_artifact_matches_builtin_defaults() {
    let config = parse_engine_config(&shipped_config()).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_shipped_artifact_loads_through_persistence() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/engine.toml");
    let config = EngineConfigPersistence::new(path).load().unwrap();
    assert_eq!(config.rules.len(), 14);
    assert_eq!(config.edge_cases.len(), 4);
}

#[test]
fn test_unsupported_version_is_rejected() {
    let doc = shipped_config().replacen("version = 1", "version = 2", 1);
    assert_eq!(
        parse_engine_config(&doc),
        Err(ConfigurationError::UnsupportedVersion {
            found: 2,
            supported: 1
        })
    );
}

#[test]
fn test_malformed_artifact_is_rejected() {
    let doc = shipped_config().replacen("k = 5", "k = \"five\"", 1);
    assert!(matches!(
        parse_engine_config(&doc),
        Err(ConfigurationError::Parse { .. })
    ));

    let doc = shipped_config().replacen("multiply = 1.15", "multiply = -1.15", 1);
    assert!(matches!(
        parse_engine_config(&doc),
        Err(ConfigurationError::InvalidAdjustment { .. })
    ));
}

#[test]
fn test_duplicate_rule_name_is_rejected() {
    let doc = shipped_config().replacen("name = \"six_day_bonus\"", "name = \"five_day_bonus\"", 1);
    assert_eq!(
        parse_engine_config(&doc),
        Err(ConfigurationError::DuplicateRuleName {
            name: "five_day_bonus".to_string()
        })
    );
}

#[test]
fn test_refit_coefficients_round_trip_through_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitted.toml");
    let fitted = EngineConfig::default().with_coefficients(BaseCoefficients {
        days: 52.125,
        miles: 0.4375,
        receipts: 0.3125,
        intercept: 260.5,
    });

    EngineConfigPersistence::new(&path).save(&fitted).unwrap();
    let reloaded = parse_engine_config(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, fitted);
}
