//! Test: pipeline and step lookup against a dataset config

use crate::helpers::*;
use neuropipe::core::pipeline::PipelineKind;
use neuropipe::core::step::StepSelector;
use neuropipe::ConfigError;

#[test]
fn test_lookup_picks_exact_version() {
    let config = dataset_config();
    let pipeline = config.find_pipeline("fmriprep", "20.2.7").unwrap();
    assert_eq!(pipeline.version, "20.2.7");
    assert_eq!(
        pipeline
            .container_config
            .as_ref()
            .and_then(|c| c.command.as_deref()),
        Some("singularity")
    );
}

#[test]
fn test_lookup_reports_collection() {
    let config = dataset_config();
    let kinds: Vec<_> = config
        .pipelines()
        .map(|(kind, p)| (kind, p.id()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (PipelineKind::Bids, "heudiconv 0.12.2".to_string()),
            (PipelineKind::Proc, "fmriprep 23.1.3".to_string()),
            (PipelineKind::Proc, "fmriprep 20.2.7".to_string()),
        ]
    );
}

#[test]
fn test_unknown_pipeline_and_step() {
    let config = dataset_config();

    let err = config.find_pipeline("mriqc", "23.1.0").unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { kind: "Pipeline", .. }));
    assert!(err.to_string().contains("mriqc 23.1.0"));

    let heudiconv = config.find_pipeline("heudiconv", "0.12.2").unwrap();
    let err = heudiconv.find_step(StepSelector::Named("unpack")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { kind: "Step", .. }));
    assert!(err.to_string().contains("unpack"));
}

#[test]
fn test_sessions_listed_explicitly() {
    let config = dataset_config();
    assert_eq!(config.sessions(), ["ses-BL", "ses-M12"]);
    assert_eq!(config.default_pipeline_version("fmriprep").unwrap(), "23.1.3");
}
