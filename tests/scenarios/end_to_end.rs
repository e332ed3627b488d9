//! Test: resolving complete invocations from a dataset config

use crate::helpers::*;
use neuropipe::core::step::StepSelector;
use neuropipe::execution::{resolve_invocation, InvocationResolver};
use neuropipe::core::Subject;
use neuropipe::ConfigError;
use std::path::{Path, PathBuf};

#[test]
fn test_license_substitution_in_pipeline_args() {
    let config = dataset_config();
    let resolved = resolve_invocation(
        &config,
        "fmriprep",
        "23.1.3",
        StepSelector::Default,
        Path::new("/ds"),
    )
    .unwrap();

    assert_eq!(
        resolved.args,
        vec!["--cleanenv", "--bind", "/opt/fs/license.txt"]
    );
    assert_eq!(resolved.executable, "apptainer");
    assert_eq!(
        resolved.image_path,
        Some(PathBuf::from("/ds/proc/containers/fmriprep_23.1.3.sif"))
    );
    assert!(resolved.check_resolved().is_ok());
}

#[test]
fn test_env_vars_merge_and_substitute() {
    let config = dataset_config();
    let resolved = InvocationResolver::new(&config, "/ds")
        .resolve("fmriprep", "23.1.3", StepSelector::Default)
        .unwrap();

    assert_eq!(resolved.env_vars["OMP_NUM_THREADS"], "4");
    assert_eq!(resolved.env_vars["TEMPLATEFLOW_HOME"], "/opt/templateflow");
}

#[test]
fn test_heudiconv_convert_step_args_follow_global_defaults() {
    let config = dataset_config();
    let resolved = InvocationResolver::new(&config, "/ds")
        .resolve("heudiconv", "0.12.2", StepSelector::Named("convert"))
        .unwrap();

    assert_eq!(
        resolved.args,
        vec!["--cleanenv", "--bind", "/ds/code/heuristic.py"]
    );
    assert_eq!(resolved.bind_paths, vec!["/ds/code/heuristic.py"]);
    assert_eq!(
        resolved.invocation_file_path,
        PathBuf::from("/ds/proc/invocations/heudiconv-0.12.2-convert.json")
    );
    assert_eq!(
        resolved.descriptor_file_path,
        PathBuf::from("/ds/proc/descriptors/heudiconv-0.12.2-convert.json")
    );
    assert_eq!(
        resolved.image_uri.as_deref(),
        Some("docker://nipy/heudiconv:0.12.2")
    );
}

#[test]
fn test_default_paths_differ_between_steps() {
    let config = dataset_config();
    let steps = InvocationResolver::new(&config, "/ds")
        .resolve_all_steps("heudiconv", "0.12.2")
        .unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].step_name.as_deref(), Some("prepare"));
    assert_eq!(steps[0].args, vec!["--cleanenv"]);
    assert_ne!(steps[0].descriptor_file_path, steps[1].descriptor_file_path);
    assert_ne!(steps[0].invocation_file_path, steps[1].invocation_file_path);
}

#[test]
fn test_multi_step_pipeline_without_step_name() {
    let config = dataset_config();
    let err = InvocationResolver::new(&config, "/ds")
        .resolve("heudiconv", "0.12.2", StepSelector::Default)
        .unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("heudiconv 0.12.2"));
}

#[test]
fn test_non_inheriting_pipeline_drops_global_defaults() {
    let config = dataset_config();
    let resolver = InvocationResolver::new(&config, "/ds");
    let resolved = resolver
        .resolve("fmriprep", "20.2.7", StepSelector::Default)
        .unwrap();

    assert_eq!(resolved.executable, "singularity");
    assert_eq!(
        resolved.args,
        vec!["--participant-label", "[[NEUROPIPE_PARTICIPANT_ID]]"]
    );
    assert!(resolved.env_vars.is_empty());
    assert_eq!(resolved.image_path, None);
    assert!(matches!(
        resolved.check_resolved(),
        Err(ConfigError::UnresolvedPlaceholders { .. })
    ));
}

#[test]
fn test_participant_tokens_resolve_deferred_args() {
    let config = dataset_config();
    let resolved = InvocationResolver::new(&config, "/ds")
        .with_subject(Subject::new("sub-0042").with_session("ses-M12"))
        .resolve("fmriprep", "20.2.7", StepSelector::Default)
        .unwrap();

    assert_eq!(resolved.args, vec!["--participant-label", "0042"]);
    assert!(resolved.check_resolved().is_ok());
}

#[test]
fn test_resolution_is_deterministic() {
    let config = dataset_config();
    let resolver = InvocationResolver::new(&config, "/ds");
    let first = resolver
        .resolve("heudiconv", "0.12.2", StepSelector::Named("convert"))
        .unwrap();
    let second = resolver
        .resolve("heudiconv", "0.12.2", StepSelector::Index(1))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_substitution_value_can_reference_dataset_root() {
    let mut config = dataset_config();
    config.substitutions.insert(
        "[[LICENSE]]".to_string(),
        "[[NEUROPIPE_DPATH_ROOT]]/code/license.txt".to_string(),
    );
    config.proc_pipelines[0].container_config = Some(
        neuropipe::ContainerConfig::new().with_args(["--bind", "[[LICENSE]]"]),
    );

    let resolved = resolve_invocation(
        &config,
        "fmriprep",
        "23.1.3",
        StepSelector::Default,
        Path::new("/ds"),
    )
    .unwrap();

    assert_eq!(
        resolved.args,
        vec!["--cleanenv", "--bind", "/ds/code/license.txt"]
    );
    assert!(resolved.check_resolved().is_ok());
}
