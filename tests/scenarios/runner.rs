//! Test: handing resolved invocations to a container runner

use crate::helpers::*;
use neuropipe::core::step::StepSelector;
use neuropipe::execution::{ContainerRunner, InvocationResolver, SubprocessRunner};

#[tokio::test]
async fn test_runner_receives_full_command_line() {
    let config = dataset_config();
    let invocation = InvocationResolver::new(&config, "/ds")
        .resolve("heudiconv", "0.12.2", StepSelector::Named("convert"))
        .unwrap();

    let runner = MockRunner::new(0);
    let outcome = runner.run(&invocation).await.unwrap();

    assert!(outcome.success());
    assert_eq!(
        runner.calls(),
        vec![vec![
            "apptainer".to_string(),
            "run".to_string(),
            "--cleanenv".to_string(),
            "--bind".to_string(),
            "/ds/code/heuristic.py".to_string(),
            "/ds/proc/containers/heudiconv_0.12.2.sif".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_failed_exit_code_is_reported() {
    let config = dataset_config();
    let invocation = InvocationResolver::new(&config, "/ds")
        .resolve("fmriprep", "23.1.3", StepSelector::Default)
        .unwrap();

    let outcome = MockRunner::new(2).run(&invocation).await.unwrap();
    assert!(!outcome.success());
    assert_eq!(outcome.exit_code, Some(2));
}

#[tokio::test]
async fn test_dry_run_with_subprocess_runner() {
    let config = dataset_config();
    let invocation = InvocationResolver::new(&config, "/ds")
        .resolve("fmriprep", "23.1.3", StepSelector::Default)
        .unwrap();

    let runner = SubprocessRunner::new().with_dry_run(true);
    assert!(runner.run(&invocation).await.unwrap().success());
}
