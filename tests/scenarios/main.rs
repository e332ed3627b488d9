//! Scenario-based tests for neuropipe

mod helpers;

mod dataset_config;
mod end_to_end;
mod pipeline_lookup;
mod runner;
