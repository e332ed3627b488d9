//! Resolution context - the token layers used to expand one pipeline step

use crate::core::{
    layout::DatasetLayout,
    pipeline::PipelineConfig,
    placeholder::{token, TokenContext},
    step::StepConfig,
};
use std::collections::BTreeMap;
use tracing::warn;

pub const TOKEN_PIPELINE_NAME: &str = "NEUROPIPE_PIPELINE_NAME";
pub const TOKEN_PIPELINE_VERSION: &str = "NEUROPIPE_PIPELINE_VERSION";
pub const TOKEN_PIPELINE_STEP: &str = "NEUROPIPE_PIPELINE_STEP";
pub const TOKEN_PARTICIPANT_ID: &str = "NEUROPIPE_PARTICIPANT_ID";
pub const TOKEN_BIDS_PARTICIPANT_ID: &str = "NEUROPIPE_BIDS_PARTICIPANT_ID";
pub const TOKEN_SESSION_ID: &str = "NEUROPIPE_SESSION_ID";
pub const TOKEN_BIDS_SESSION_ID: &str = "NEUROPIPE_BIDS_SESSION_ID";

const BIDS_PARTICIPANT_PREFIX: &str = "sub-";
const BIDS_SESSION_PREFIX: &str = "ses-";

/// Participant/session a step is being resolved for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub participant_id: String,
    pub session_id: Option<String>,
}

impl Subject {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: strip_prefix(&participant_id.into(), BIDS_PARTICIPANT_PREFIX),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(strip_prefix(&session_id.into(), BIDS_SESSION_PREFIX));
        self
    }

    pub fn bids_participant_id(&self) -> String {
        format!("{}{}", BIDS_PARTICIPANT_PREFIX, self.participant_id)
    }

    pub fn bids_session_id(&self) -> Option<String> {
        self.session_id
            .as_ref()
            .map(|s| format!("{}{}", BIDS_SESSION_PREFIX, s))
    }

    fn tokens(&self) -> Vec<(String, String)> {
        let mut tokens = vec![
            (token(TOKEN_PARTICIPANT_ID), self.participant_id.clone()),
            (token(TOKEN_BIDS_PARTICIPANT_ID), self.bids_participant_id()),
        ];
        if let (Some(session), Some(bids_session)) = (&self.session_id, self.bids_session_id()) {
            tokens.push((token(TOKEN_SESSION_ID), session.clone()));
            tokens.push((token(TOKEN_BIDS_SESSION_ID), bids_session));
        }
        tokens
    }
}

fn strip_prefix(id: &str, prefix: &str) -> String {
    id.strip_prefix(prefix).unwrap_or(id).to_string()
}

/// Layered token sources for one (pipeline, step) resolution
///
/// Layers, lowest precedence first: dataset layout, pipeline identity,
/// participant/session, user substitutions.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    builtins: TokenContext,
    substitutions: BTreeMap<String, String>,
}

impl ResolutionContext {
    /// Collect built-in tokens for `pipeline`/`step` under `layout`
    pub fn new(
        layout: &DatasetLayout,
        pipeline: &PipelineConfig,
        step: &StepConfig,
        subject: Option<&Subject>,
    ) -> Self {
        let mut builtins = TokenContext::new().with_layer(layout.tokens());

        builtins.insert(token(TOKEN_PIPELINE_NAME), pipeline.name.as_str());
        builtins.insert(token(TOKEN_PIPELINE_VERSION), pipeline.version.as_str());
        if let Some(step_name) = step.name() {
            builtins.insert(token(TOKEN_PIPELINE_STEP), step_name);
        }

        if let Some(subject) = subject {
            builtins.layer(subject.tokens());
        }

        Self {
            builtins,
            substitutions: BTreeMap::new(),
        }
    }

    /// Attach the user substitution map, applied last
    ///
    /// Each value is expanded once against the built-ins before it is stored,
    /// so substitutions may point at dataset paths or pipeline identity.
    pub fn with_substitutions(mut self, substitutions: &BTreeMap<String, String>) -> Self {
        self.substitutions = substitutions
            .iter()
            .map(|(key, value)| {
                if self.builtins.contains(key) {
                    warn!("User substitution '{}' overrides a built-in token", key);
                }
                (key.clone(), self.builtins.resolve(value))
            })
            .collect();
        self
    }

    /// Built-ins only: used for image and descriptor/invocation paths
    pub fn path_tokens(&self) -> &TokenContext {
        &self.builtins
    }

    /// Built-ins with user substitutions layered on top
    pub fn full_tokens(&self) -> TokenContext {
        self.builtins
            .clone()
            .with_layer(self.substitutions.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}
