//! Warden - role-based access control backend

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden::services::{SeedAdmin, seed};
use warden::{Config, Warden};

#[derive(Debug, Parser)]
#[command(name = "warden", version, about = "Role-based access control backend")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "config/warden.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve HTTP (default)
    Serve,
    /// Create the default policies and roles, optionally with an admin account
    Init {
        #[arg(long, default_value = "admin")]
        admin_name: String,
        #[arg(long, env = "WARDEN_ADMIN_EMAIL")]
        admin_email: Option<String>,
        #[arg(long, env = "WARDEN_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_file(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_tracing(&config);

    let warden = Warden::new(config).await.context("starting warden")?;
    info!("warden {} ({})", warden::VERSION, warden::build_info().git_hash);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => warden.run().await?,
        Command::Init {
            admin_name,
            admin_email,
            admin_password,
        } => {
            let admin = match (admin_email, admin_password) {
                (Some(email), Some(password)) => Some(SeedAdmin {
                    name: admin_name,
                    email,
                    password,
                }),
                (None, None) => None,
                _ => anyhow::bail!("--admin-email and --admin-password must be given together"),
            };
            let report = seed(&warden, admin.as_ref()).await.context("seeding")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false);
    if config.server.log_json {
        builder.json().init();
    } else {
        builder.with_target(true).init();
    }
}
