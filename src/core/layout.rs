//! Dataset directory layout and the built-in path tokens derived from it

use crate::core::placeholder::token;
use std::path::{Path, PathBuf};

pub const TOKEN_DPATH_ROOT: &str = "NEUROPIPE_DPATH_ROOT";
pub const TOKEN_DPATH_BIDS: &str = "NEUROPIPE_DPATH_BIDS";
pub const TOKEN_DPATH_DERIVATIVES: &str = "NEUROPIPE_DPATH_DERIVATIVES";
pub const TOKEN_DPATH_SOURCEDATA: &str = "NEUROPIPE_DPATH_SOURCEDATA";
pub const TOKEN_DPATH_CONTAINERS: &str = "NEUROPIPE_DPATH_CONTAINERS";
pub const TOKEN_DPATH_DESCRIPTORS: &str = "NEUROPIPE_DPATH_DESCRIPTORS";
pub const TOKEN_DPATH_INVOCATIONS: &str = "NEUROPIPE_DPATH_INVOCATIONS";
pub const TOKEN_DPATH_TRACKER_CONFIGS: &str = "NEUROPIPE_DPATH_TRACKER_CONFIGS";
pub const TOKEN_DPATH_SCRATCH: &str = "NEUROPIPE_DPATH_SCRATCH";
pub const TOKEN_DPATH_LOGS: &str = "NEUROPIPE_DPATH_LOGS";

/// Fixed subpaths of a dataset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bids(&self) -> PathBuf {
        self.root.join("bids")
    }

    pub fn derivatives(&self) -> PathBuf {
        self.root.join("derivatives")
    }

    pub fn sourcedata(&self) -> PathBuf {
        self.root.join("sourcedata")
    }

    pub fn containers(&self) -> PathBuf {
        self.root.join("proc").join("containers")
    }

    pub fn descriptors(&self) -> PathBuf {
        self.root.join("proc").join("descriptors")
    }

    pub fn invocations(&self) -> PathBuf {
        self.root.join("proc").join("invocations")
    }

    pub fn tracker_configs(&self) -> PathBuf {
        self.root.join("proc").join("tracker_configs")
    }

    pub fn scratch(&self) -> PathBuf {
        self.root.join("scratch")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Default location of the global config document
    pub fn global_config_file(&self) -> PathBuf {
        self.root.join("proc").join("global_config.json")
    }

    /// Built-in `[[TOKEN]] -> path` pairs
    pub fn tokens(&self) -> Vec<(String, String)> {
        [
            (TOKEN_DPATH_ROOT, self.root.clone()),
            (TOKEN_DPATH_BIDS, self.bids()),
            (TOKEN_DPATH_DERIVATIVES, self.derivatives()),
            (TOKEN_DPATH_SOURCEDATA, self.sourcedata()),
            (TOKEN_DPATH_CONTAINERS, self.containers()),
            (TOKEN_DPATH_DESCRIPTORS, self.descriptors()),
            (TOKEN_DPATH_INVOCATIONS, self.invocations()),
            (TOKEN_DPATH_TRACKER_CONFIGS, self.tracker_configs()),
            (TOKEN_DPATH_SCRATCH, self.scratch()),
            (TOKEN_DPATH_LOGS, self.logs()),
        ]
        .into_iter()
        .map(|(name, path)| (token(name), path.to_string_lossy().into_owned()))
        .collect()
    }
}
