use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tandem::prelude::*;
use tandem::TurnObserver;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem", version)]
#[command(about = "Let two language models hold a conversation")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    /// ollama, lm-studio or other
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Provider base URL (defaults depend on the provider)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer credential, only sent for the `other` provider
    #[arg(long, env = tandem::API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the models the provider offers
    Models,
    /// Run a conversation and stream it to stdout
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Opening message, spoken by Agent 1
    #[arg(long)]
    topic: Option<String>,

    /// Model for Agent 1
    #[arg(long)]
    agent_a: Option<String>,

    /// Model for Agent 2
    #[arg(long)]
    agent_b: Option<String>,

    /// Minutes before the run ends; 0 runs until stopped
    #[arg(long)]
    turn_limit: Option<u64>,

    #[arg(long)]
    system_prompt: Option<String>,

    /// Write a markdown transcript here; a directory gets chat_YYYYMMDD.md
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => TandemConfig::load(path)?,
        None => TandemConfig::default(),
    };

    let mut overrides = TandemConfig {
        provider: cli.provider,
        base_url: cli.base_url,
        api_key: cli.api_key,
        ..TandemConfig::default()
    };

    match cli.command {
        Command::Models => list(file_config.merge(overrides)).await,
        Command::Run(args) => {
            let export = args.export.clone();
            overrides.topic = args.topic;
            overrides.agent_a_model = args.agent_a;
            overrides.agent_b_model = args.agent_b;
            overrides.turn_limit_minutes = args.turn_limit;
            overrides.system_prompt = args.system_prompt;
            run(file_config.merge(overrides), export.as_deref()).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn list(config: TandemConfig) -> Result<()> {
    let build = config.provider_build_config()?;
    let listing = list_models(&build, default_provider_hooks()).await;

    if let Some(error) = &listing.error {
        eprintln!(
            "warning: model directory unavailable ({}); pass model names with --agent-a/--agent-b",
            error.message
        );
        return Ok(());
    }

    if listing.models.is_empty() {
        eprintln!("warning: the provider lists no models");
        return Ok(());
    }

    let selection = config.listed_models(&listing);
    for model in &listing.models {
        let mut marks = Vec::new();
        if *model == selection.agent_a {
            marks.push("Agent 1");
        }
        if *model == selection.agent_b {
            marks.push("Agent 2");
        }

        if marks.is_empty() {
            println!("{model}");
        } else {
            println!("{model}  ({})", marks.join(", "));
        }
    }

    Ok(())
}

async fn run(config: TandemConfig, export: Option<&Path>) -> Result<()> {
    let Some(topic) = config
        .topic
        .clone()
        .filter(|topic| !topic.trim().is_empty())
    else {
        bail!("a topic is required (--topic or `topic` in the config file)");
    };

    let build = config.provider_build_config()?;
    let provider = build_provider(&build, default_provider_hooks())
        .context("could not set up the provider")?;
    let kind = provider.kind();

    let controller =
        SessionController::with_hooks(provider, default_engine_hooks(), Some(print_observer()));
    let resolved = controller
        .resolve_models(&config.agent_models())
        .await
        .context("could not choose models")?;
    tracing::info!(
        provider = %kind,
        agent_a = %resolved.models.agent_a,
        agent_b = %resolved.models.agent_b,
        "models resolved"
    );

    let stop = controller.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested");
            stop.request_stop();
        }
    });

    let mut session = config.session(resolved.models);
    println!("**Agent 1** ({})\n{}", Local::now().format("%H:%M:%S"), topic);

    let result = controller.run(&mut session, &topic).await;
    match &result {
        Ok(TurnOutcome::Stopped) => eprintln!("conversation stopped"),
        Ok(TurnOutcome::TimeLimitReached) => eprintln!("turn limit reached"),
        Ok(TurnOutcome::Appended { .. }) | Err(_) => {}
    }

    if let Some(target) = export {
        let path = export_path(target);
        write_markdown(&path, &session.transcript())
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("transcript saved to {}", path.display());
    }

    result.context("the conversation ended with an error")?;
    Ok(())
}

fn print_observer() -> TurnObserver {
    Arc::new(|event: &TurnEvent| {
        let mut stdout = std::io::stdout().lock();
        let _ = match event {
            TurnEvent::TurnStarted { speaker, .. } => write!(
                stdout,
                "\n**{speaker}** ({})\n",
                Local::now().format("%H:%M:%S")
            ),
            TurnEvent::Fragment { text, .. } => write!(stdout, "{text}"),
            TurnEvent::TurnCompleted { .. } => writeln!(stdout),
        };
        let _ = stdout.flush();
    })
}

fn export_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(default_export_file_name(Local::now().date_naive()))
    } else {
        target.to_path_buf()
    }
}
