mod apply_cmd;
mod config;
mod console;
mod run_cmd;
mod session_file;
mod snapshot_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tabi_core::HttpPlannerConfig;
use tabi_core::color::group_color;

use config::TabiConfig;

#[derive(Parser)]
#[command(name = "tabi", about = "Reconcile natural-language tab and bookmark plans against a browser session")]
struct Cli {
    /// Planner base URL (overrides TABI_PLANNER_URL env var; `init` writes it to the config)
    #[arg(long, global = true)]
    planner_url: Option<String>,

    /// Session JSON file (overrides TABI_SESSION env var)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a tabi config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the context that would be sent to the planner
    Snapshot {
        /// Include the bookmark tree
        #[arg(long)]
        bookmarks: bool,
    },
    /// Send a prompt to the planner and apply the resulting plan
    Run {
        /// What to do, in plain words
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Apply a plan from a JSON file without calling the planner
    Apply {
        /// Path to a `{"action": ..., "output": ...}` file
        file: PathBuf,
    },
    /// Print the color a group name is assigned
    Color {
        /// Group name
        name: String,
    },
}

fn cmd_init(planner_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        planner: config::PlannerSection {
            url: planner_url.to_string(),
            timeout_secs: None,
        },
        ..Default::default()
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  planner.url = {planner_url}");
    println!("  session file = {}", config::default_session_path().display());

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let succeeded = match cli.command {
        Commands::Init { force } => {
            let planner_url = cli
                .planner_url
                .as_deref()
                .unwrap_or(HttpPlannerConfig::DEFAULT_URL);
            cmd_init(planner_url, force)?;
            true
        }
        Commands::Color { name } => {
            println!("{}", group_color(&name));
            true
        }
        Commands::Snapshot { bookmarks } => {
            let resolved = TabiConfig::resolve(cli.planner_url.as_deref(), cli.session.as_deref())?;
            snapshot_cmd::run_snapshot(&resolved, bookmarks).await?;
            true
        }
        Commands::Run { prompt } => {
            let resolved = TabiConfig::resolve(cli.planner_url.as_deref(), cli.session.as_deref())?;
            run_cmd::run_prompt(&resolved, &prompt.join(" ")).await?
        }
        Commands::Apply { file } => {
            let resolved = TabiConfig::resolve(cli.planner_url.as_deref(), cli.session.as_deref())?;
            apply_cmd::run_apply(&resolved, &file).await?
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
