//! Test: loading and saving dataset configs on disk

use crate::helpers::*;
use neuropipe::core::config::GlobalConfig;
use neuropipe::core::layout::DatasetLayout;
use neuropipe::ConfigError;

#[test]
fn test_round_trip_through_dataset_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path());
    let config = dataset_config();

    config.save(layout.global_config_file()).unwrap();
    let reloaded = GlobalConfig::from_file(layout.global_config_file()).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_load_rejects_typo_with_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("global_config.json");
    let typo = DATASET_CONFIG.replace("\"SUBSTITUTIONS\"", "\"SUBSTITUTION\"");
    std::fs::write(&path, typo).unwrap();

    let err = GlobalConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
    let msg = err.to_string();
    assert!(msg.contains("global_config.json"));
    assert!(msg.contains("SUBSTITUTION"));
}

#[test]
fn test_load_rejects_unnamed_step_in_multi_step_pipeline() {
    let broken = DATASET_CONFIG.replace("{\"NAME\": \"prepare\"}", "{}");
    let err = GlobalConfig::from_json(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
    assert!(err.to_string().contains("heudiconv 0.12.2"));
}
