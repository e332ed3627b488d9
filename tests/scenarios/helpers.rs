//! Test utility functions for neuropipe scenarios

use async_trait::async_trait;
use neuropipe::core::config::GlobalConfig;
use neuropipe::execution::{ContainerRunner, ResolvedInvocation, RunOutcome, RunnerError};
use std::sync::Mutex;

/// Global config shaped like a typical dataset: one BIDS converter with two
/// steps and two versions of a processing pipeline
pub const DATASET_CONFIG: &str = r#"{
    "DATASET_NAME": "mydataset",
    "VISITS": ["BL", "M12"],
    "SESSIONS": ["ses-BL", "ses-M12"],
    "SUBSTITUTIONS": {
        "[[FREESURFER_LICENSE_FILE]]": "/opt/fs/license.txt",
        "[[HEURISTIC_FILE]]": "/ds/code/heuristic.py",
        "[[TEMPLATEFLOW_HOME]]": "/opt/templateflow"
    },
    "CONTAINER_CONFIG": {
        "COMMAND": "apptainer",
        "ARGS": ["--cleanenv"],
        "ENV_VARS": {"TEMPLATEFLOW_HOME": "[[TEMPLATEFLOW_HOME]]", "OMP_NUM_THREADS": "1"}
    },
    "BIDS_PIPELINES": [
        {
            "NAME": "heudiconv",
            "VERSION": "0.12.2",
            "CONTAINER_INFO": {
                "FILE": "[[NEUROPIPE_DPATH_CONTAINERS]]/heudiconv_[[NEUROPIPE_PIPELINE_VERSION]].sif",
                "URI": "docker://nipy/heudiconv:[[NEUROPIPE_PIPELINE_VERSION]]"
            },
            "STEPS": [
                {"NAME": "prepare"},
                {
                    "NAME": "convert",
                    "INVOCATION_FILE": "[[NEUROPIPE_DPATH_INVOCATIONS]]/heudiconv-[[NEUROPIPE_PIPELINE_VERSION]]-convert.json",
                    "CONTAINER_CONFIG": {"ARGS": ["--bind", "[[HEURISTIC_FILE]]"]}
                }
            ]
        }
    ],
    "PROC_PIPELINES": [
        {
            "NAME": "fmriprep",
            "VERSION": "23.1.3",
            "CONTAINER_INFO": {
                "FILE": "[[NEUROPIPE_DPATH_CONTAINERS]]/fmriprep_[[NEUROPIPE_PIPELINE_VERSION]].sif"
            },
            "CONTAINER_CONFIG": {
                "ARGS": ["--bind", "[[FREESURFER_LICENSE_FILE]]"],
                "ENV_VARS": {"OMP_NUM_THREADS": "4"}
            },
            "STEPS": [{}]
        },
        {
            "NAME": "fmriprep",
            "VERSION": "20.2.7",
            "CONTAINER_CONFIG": {"COMMAND": "singularity", "INHERIT": false},
            "STEPS": [
                {
                    "CONTAINER_CONFIG": {
                        "ARGS": ["--participant-label", "[[NEUROPIPE_PARTICIPANT_ID]]"]
                    }
                }
            ]
        }
    ],
    "CUSTOM": {}
}"#;

pub fn dataset_config() -> GlobalConfig {
    GlobalConfig::from_json(DATASET_CONFIG).expect("dataset config should parse")
}

/// Runner that records invocations instead of spawning anything
pub struct MockRunner {
    exit_code: i32,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Command lines received so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRunner for MockRunner {
    async fn run(&self, invocation: &ResolvedInvocation) -> Result<RunOutcome, RunnerError> {
        self.calls
            .lock()
            .unwrap()
            .push(invocation.command_line("run"));
        Ok(RunOutcome {
            exit_code: Some(self.exit_code),
        })
    }
}
