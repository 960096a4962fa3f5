//! Dockbar CLI
//!
//! Entry point for working with the dockbar engine outside a desktop shell:
//! - Replay recorded window enumerations through the button manager
//! - Inspect the effective configuration
//! - Edit the pinned application list

mod replay;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dockbar_core::config::{Config, Directories};
use dockbar_core::{Button, PinnedAppDescriptor, PinnedButton};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Dockbar CLI
#[derive(Parser)]
#[command(name = "dockbar")]
#[command(about = "Dockbar - grouped taskbar button engine")]
#[command(version)]
#[command(after_help = "\
Examples:
  dockbar replay session.json           Replay a recorded session
  dockbar replay session.json --json    Print every UI update as JSON
  dockbar config show                   Print the effective configuration
  dockbar pins add Terminal --app-id Microsoft.WindowsTerminal
  dockbar pins move 2 0                 Move the third pin to the front
")]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded scenario through the button manager
    Replay {
        /// Scenario JSON file; relative names are also looked up in the
        /// scenarios data directory
        scenario: PathBuf,

        /// Hide applications with a single window and no pin
        #[arg(long)]
        hide_single: bool,

        /// Print UI updates as JSON lines instead of the bar layout
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Pinned application commands
    Pins {
        #[command(subcommand)]
        command: PinsCommand,
    },
}

#[derive(Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Subcommand)]
enum PinsCommand {
    /// List pinned applications in bar order
    List,

    /// Pin an application
    Add {
        /// Display title
        title: String,

        #[arg(long)]
        exe: Option<String>,

        #[arg(long)]
        app_id: Option<String>,

        /// Shortcut target the pin launches
        #[arg(long)]
        link: Option<String>,
    },

    /// Unpin the application of a group (app id or executable)
    Remove { group: String },

    /// Move a pin to another position
    Move { from: usize, to: usize },
}

fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dockbar={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("dockbar-{timestamp}.log");
        let log_path = temp_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();

        eprintln!("Logging to: {} (and stderr)", log_path.display());
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging();

    let dirs = Directories::new();
    let config_path = match (cli.config, &dirs) {
        (Some(path), _) => path,
        (None, Ok(dirs)) => dirs.config_file.clone(),
        (None, Err(e)) => bail!("{e}; pass --config to choose a config file"),
    };

    match cli.command {
        Commands::Replay {
            scenario,
            hide_single,
            json,
        } => {
            let mut config = load_config(&config_path)?;
            if hide_single {
                config.taskbar.hide_single_window_apps = true;
            }
            let scenario = match &dirs {
                Ok(dirs) => dirs.resolve_scenario(&scenario),
                Err(_) => scenario,
            };
            replay::run(&scenario, &config, json)
        }
        Commands::Config { command } => run_config_command(command, &config_path),
        Commands::Pins { command } => run_pins_command(command, &config_path),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn save_config(config: &Config, path: &Path) -> Result<()> {
    config
        .save(path)
        .with_context(|| format!("Failed to save config to {}", path.display()))?;
    info!("Saved config to {}", path.display());
    Ok(())
}

fn run_config_command(command: ConfigCommand, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = load_config(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn run_pins_command(command: PinsCommand, path: &Path) -> Result<()> {
    let mut config = load_config(path)?;

    match command {
        PinsCommand::List => {
            if config.pinned_apps.is_empty() {
                println!("No pinned apps.");
                return Ok(());
            }
            println!("\nPinned Apps:\n");
            println!("{:<4} {:<24} GROUP", "#", "TITLE");
            println!("{}", "-".repeat(60));
            for (pos, desc) in config.pinned_apps.iter().enumerate() {
                let group = pin_group(pos, desc);
                println!("{pos:<4} {:<24} {group}", desc.title);
            }
        }
        PinsCommand::Add {
            title,
            exe,
            app_id,
            link,
        } => {
            let desc = PinnedAppDescriptor {
                title,
                executable: exe,
                app_id,
                link_target: link,
                package_app_id: None,
            };
            let group = pin_group(config.pinned_apps.len(), &desc);
            if config.pin(desc) {
                save_config(&config, path)?;
                println!("Pinned '{group}'");
            } else {
                println!("'{group}' is already pinned");
            }
        }
        PinsCommand::Remove { group } => {
            if config.unpin(&group) {
                save_config(&config, path)?;
                println!("Unpinned '{group}'");
            } else {
                println!("No pin for '{group}'");
            }
        }
        PinsCommand::Move { from, to } => {
            if config.move_pin(from, to)? {
                save_config(&config, path)?;
                println!("Moved pin {from} to {to}");
            }
        }
    }
    Ok(())
}

fn pin_group(pos: usize, desc: &PinnedAppDescriptor) -> String {
    let order = u32::try_from(pos).unwrap_or(u32::MAX);
    PinnedButton::new(order, desc).group().to_string()
}
