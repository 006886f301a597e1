//! pomodoro-tasks - A terminal Pomodoro timer with a to-do list
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after 4 pomodoros

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};

use pomodoro_tasks::cli::{Cli, Commands, Display, RunArgs, SoundCommand, TaskCommand};
use pomodoro_tasks::session::Preferences;
use pomodoro_tasks::sound::{self, SoundPlayer};
use pomodoro_tasks::storage::{self, JsonFileStore, KeyValueStore};
use pomodoro_tasks::tasks::TaskStore;
use pomodoro_tasks::tui;

/// Name of the log file written while the interactive timer runs.
const LOG_FILE_NAME: &str = "pomodoro-tasks.log";

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// The interactive timer owns the terminal, so its logs go to a file in the
/// data directory instead of stderr.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let log_file = log_dir.and_then(|dir| {
        fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE_NAME))
            .ok()
    });

    match log_file {
        Some(file) => fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None if log_dir.is_some() => fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init(),
        None => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let data_dir = storage::resolve_data_dir(cli.data_dir.as_deref());
    let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));

    let log_dir = matches!(command, Commands::Run(_)).then_some(data_dir.as_path());
    init_tracing(cli.verbose, log_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&data_dir));

    match command {
        Commands::Run(args) => {
            let settings = args.settings()?;
            let player = sound::try_create_player(args.no_sound)
                .map(|player| player as Arc<dyn SoundPlayer>);
            tui::run(settings, store, player).await?;
        }
        Commands::Task(command) => execute_task(command, store)?,
        Commands::Sound(command) => execute_sound(command, store).await?,
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Executes a task subcommand.
fn execute_task(command: TaskCommand, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let mut tasks = TaskStore::load(store);

    match command {
        TaskCommand::Add { text, estimate } => {
            let id = tasks.add(&text, estimate)?;
            tasks.flush().context("Failed to save tasks")?;
            Display::show_task_added(id);
        }
        TaskCommand::List { filter, sort } => {
            let view = tasks.list(filter, sort);
            Display::show_tasks(&view, tasks.empty_message());
            if !view.is_empty() {
                println!(
                    "{}",
                    Display::format_task_summary(tasks.len(), tasks.active_count())
                );
            }
        }
        TaskCommand::Toggle { id } => {
            let id = tasks.resolve(&id)?;
            tasks.toggle(id);
            tasks.flush().context("Failed to save tasks")?;
            let task = tasks
                .get(id)
                .ok_or_else(|| anyhow!("Task {} disappeared", id.short()))?;
            Display::show_task_toggled(task);
        }
        TaskCommand::Delete { id } => {
            let id = tasks.resolve(&id)?;
            let task = tasks
                .delete(id)
                .ok_or_else(|| anyhow!("Task {} disappeared", id.short()))?;
            tasks.flush().context("Failed to save tasks")?;
            Display::show_task_deleted(&task);
        }
    }

    Ok(())
}

/// Executes a sound subcommand.
async fn execute_sound(command: SoundCommand, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let mut preferences = Preferences::load(store);

    match command {
        SoundCommand::List => {
            Display::show_sounds(preferences.sound().id, preferences.volume());
        }
        SoundCommand::Set { id } => {
            let sound = sound::find_sound(&id)?;
            preferences
                .set_sound(sound)
                .context("Failed to save sound")?;
            Display::show_sound_selected(sound);
        }
        SoundCommand::Volume { level } => {
            preferences
                .set_volume(level)
                .context("Failed to save volume")?;
            Display::show_volume_set(preferences.volume());
        }
        SoundCommand::Test => {
            let player = sound::RodioSoundPlayer::new(false).map_err(|e| {
                let hint = e.suggestion();
                anyhow!(e).context(hint)
            })?;
            let selected = preferences.sound();
            player
                .play(selected, preferences.volume())
                .context("Failed to play sound")?;
            // Keep the output stream alive until the tone has played.
            tokio::time::sleep(selected.tone.total_duration()).await;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
