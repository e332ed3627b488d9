use anyhow::{Context, Result};
use neuropipe::cli::commands::{ResolveCommand, RunCommand, TargetArgs, ValidateCommand};
use neuropipe::cli::output::*;
use neuropipe::cli::{Cli, Command};
use neuropipe::core::config::GlobalConfig;
use neuropipe::execution::{
    ContainerRunner, InvocationResolver, ResolvedInvocation, SubprocessRunner,
};
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Resolve(cmd) => resolve(cmd)?,
        Command::Validate(cmd) => validate(cmd)?,
        Command::Run(cmd) => run(cmd).await?,
    }

    Ok(())
}

fn load_config(target: &TargetArgs) -> Result<GlobalConfig> {
    let path = target.dataset.config_path();
    GlobalConfig::from_file(&path)
        .with_context(|| format!("Failed to load global config {}", path.display()))
}

fn resolve_target(
    config: &GlobalConfig,
    target: &TargetArgs,
    all_steps: bool,
) -> Result<Vec<ResolvedInvocation>> {
    let version = match &target.pipeline_version {
        Some(version) => version.clone(),
        None => config.default_pipeline_version(&target.pipeline)?.to_string(),
    };

    let mut resolver = InvocationResolver::new(config, &target.dataset.root);
    if let Some(subject) = target.subject() {
        resolver = resolver.with_subject(subject);
    }

    let invocations = if all_steps {
        resolver.resolve_all_steps(&target.pipeline, &version)?
    } else {
        vec![resolver.resolve(&target.pipeline, &version, target.step_selector())?]
    };
    Ok(invocations)
}

fn resolve(cmd: &ResolveCommand) -> Result<()> {
    let config = load_config(&cmd.target)?;
    let invocations = resolve_target(&config, &cmd.target, cmd.all_steps)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&invocations)?);
    } else {
        for invocation in &invocations {
            println!("{}", format_invocation(invocation, "run"));
        }
    }

    Ok(())
}

fn validate(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating global config...", INFO);

    match GlobalConfig::from_file(&cmd.config) {
        Ok(config) => {
            println!("{} Global configuration is valid!", CHECK);
            println!("  Dataset: {}", style(&config.dataset_name).bold());
            println!("  Visits: {}", style(config.visits.join(", ")).cyan());
            println!("  Sessions: {}", style(config.sessions().join(", ")).cyan());
            println!("  Substitutions: {}", style(config.substitutions.len()).cyan());
            println!("  Pipelines:");
            println!("{}", format_pipeline_list(&config));

            if cmd.json {
                println!("\n{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn run(cmd: &RunCommand) -> Result<()> {
    let config = load_config(&cmd.target)?;
    let invocation = resolve_target(&config, &cmd.target, false)?
        .into_iter()
        .next()
        .context("No invocation resolved")?;

    invocation
        .check_resolved()
        .context("Refusing to launch a container with unresolved placeholders")?;

    println!("{}", format_invocation(&invocation, &cmd.subcommand));

    let mut runner = SubprocessRunner::new()
        .with_subcommand(cmd.subcommand.clone())
        .with_dry_run(cmd.dry_run);
    if let Some(secs) = cmd.timeout_secs {
        runner = runner.with_timeout(secs);
    }

    println!("{} Launching {}", ROCKET, style(invocation.id()).bold());
    let outcome = runner.run(&invocation).await?;

    if outcome.success() {
        println!(
            "\n{} {} completed {}",
            CHECK,
            style(invocation.id()).bold(),
            style("successfully").green()
        );
        Ok(())
    } else {
        println!(
            "\n{} {} {}",
            CROSS,
            style(invocation.id()).bold(),
            style("failed").red()
        );
        error!("Container exited with code {:?}", outcome.exit_code);
        std::process::exit(outcome.exit_code.unwrap_or(1));
    }
}
