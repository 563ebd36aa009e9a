use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crossover::config::Config;
use crossover::logging::init_tracing;
use crossover::prefs::PreferencesFile;
use crossover::session::Session;
use crossover::store::ExternalAction;
use crossover::surface::SurfaceEvent;

/// Headless crosshair overlay: runs the preference store with its
/// surfaces, applies the requested actions and prints the result.
#[derive(Parser, Debug)]
#[command(name = "crossover", version)]
struct Cli {
    /// Config file (default: ~/.config/crossover/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Preference file, overriding the configured location
    #[arg(short, long, value_name = "PATH")]
    prefs: Option<PathBuf>,

    /// Duplicate the primary overlay this many times
    #[arg(long, value_name = "N", default_value_t = 0)]
    shadows: usize,

    /// Lock the overlay before exiting
    #[arg(long)]
    lock: bool,

    /// Reset preferences to defaults first
    #[arg(long)]
    reset: bool,

    /// Tray or hotkey action to run, e.g. center, toggle_lock, move_up (repeatable)
    #[arg(short, long = "action", value_name = "NAME")]
    actions: Vec<ExternalAction>,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (_, true) => "debug",
        _ => "info",
    };
    init_tracing(level);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let file = cli
        .prefs
        .clone()
        .map(PreferencesFile::new)
        .unwrap_or_else(|| config.preferences_file());
    tracing::info!(path = %file.path().display(), "Using preference file");

    let session = Session::start(&config, file).context("Failed to start session")?;
    let shutdown = session.shutdown_handle();

    tokio::select! {
        result = run_script(&session, &cli) => result?,
        _ = shutdown.wait() => tracing::info!("Quit requested"),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    println!("{}", session.summary());
    session.shutdown().await.context("Shutdown failed")?;
    Ok(())
}

async fn run_script(session: &Session, cli: &Cli) -> anyhow::Result<()> {
    let primary = session.primary()?;
    let shutdown = session.shutdown_handle();

    if cli.reset {
        primary.send(SurfaceEvent::Reset).await?;
        session.settle().await;
    }

    for _ in 0..cli.shadows {
        primary.send(SurfaceEvent::Duplicate).await?;
    }
    session.settle().await;

    for action in &cli.actions {
        if shutdown.is_shutting_down() {
            break;
        }
        session
            .dispatch(*action)
            .await
            .with_context(|| format!("Action {action:?} failed"))?;
        session.settle().await;
    }

    if cli.lock && !shutdown.is_shutting_down() && !session.state().is_locked() {
        session.dispatch(ExternalAction::ToggleLock).await?;
        session.settle().await;
    }
    Ok(())
}
