//! CLI output formatting

use crate::core::config::GlobalConfig;
use crate::execution::{render_command_line, ResolvedInvocation};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Multi-line human-readable view of a resolved invocation
pub fn format_invocation(invocation: &ResolvedInvocation, subcommand: &str) -> String {
    let mut out = format!(
        "{} {} ({})\n",
        INFO,
        style(invocation.id()).bold(),
        invocation.pipeline_kind
    );

    out.push_str(&format!(
        "  Command:    {}\n",
        style(render_command_line(&invocation.command_line(subcommand))).cyan()
    ));
    if let Some(uri) = &invocation.image_uri {
        out.push_str(&format!("  Image URI:  {}\n", style(uri).dim()));
    }
    out.push_str(&format!(
        "  Invocation: {}\n",
        invocation.invocation_file_path.display()
    ));
    out.push_str(&format!(
        "  Descriptor: {}\n",
        invocation.descriptor_file_path.display()
    ));
    if let Some(tracker) = &invocation.tracker_config_path {
        out.push_str(&format!("  Tracker:    {}\n", tracker.display()));
    }

    if !invocation.env_vars.is_empty() {
        out.push_str("  Environment:\n");
        for (key, value) in &invocation.env_vars {
            out.push_str(&format!("    {}={}\n", style(key).cyan(), value));
        }
    }

    let unresolved = invocation.unresolved_tokens();
    if !unresolved.is_empty() {
        out.push_str(&format!(
            "  {}Unresolved: {}\n",
            WARN,
            style(unresolved.join(", ")).yellow()
        ));
    }

    out
}

/// One line per configured pipeline
pub fn format_pipeline_list(config: &GlobalConfig) -> String {
    config
        .pipelines()
        .map(|(kind, pipeline)| {
            let steps = pipeline.step_names();
            let steps = if steps.is_empty() {
                format!("{} step(s)", pipeline.steps.len())
            } else {
                steps.join(", ")
            };
            format!(
                "  [{}] {} {} - {}",
                kind,
                style(&pipeline.name).bold(),
                style(&pipeline.version).cyan(),
                style(steps).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
