//! waypostd — service registry daemon.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use waypost_api::ApiState;
use waypost_core::config::WaypostConfig;
use waypost_registry::{AllowAll, Authenticator, BasicAuthenticator, RandomRegistry, Registry};

#[derive(Parser, Debug)]
#[command(name = "waypostd")]
#[command(about = "Service registry with random selection")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log: Option<PathBuf>,

    /// Basic auth username (requires --pass)
    #[arg(long)]
    user: Option<String>,

    /// Basic auth password (requires --user)
    #[arg(long)]
    pass: Option<String>,

    /// Seconds a renewal keeps a service discoverable
    #[arg(long)]
    active_window: Option<u64>,

    /// Seconds a service is kept before it is purged
    #[arg(long)]
    retention_window: Option<u64>,

    /// Config file (defaults to $WAYPOST_CONFIG or ~/.config/waypost/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file and environment.
    fn apply(&self, config: &mut WaypostConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(log) = &self.log {
            config.server.log_file = Some(log.clone());
        }
        if let Some(user) = &self.user {
            config.auth.username = user.clone();
        }
        if let Some(pass) = &self.pass {
            config.auth.password = pass.clone();
        }
        if let Some(secs) = self.active_window {
            config.server.active_window_secs = secs;
        }
        if let Some(secs) = self.retention_window {
            config.server.retention_window_secs = secs;
        }
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> WaypostConfig {
    let loaded = match &cli.config {
        Some(path) => WaypostConfig::load_path(path),
        None => WaypostConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("waypostd: {e}; using defaults");
        WaypostConfig::default()
    });
    cli.apply(&mut config);
    config
}

fn authenticator(config: &WaypostConfig) -> Result<Arc<dyn Authenticator>> {
    Ok(match config.auth.credentials()? {
        Some((user, pass)) => {
            tracing::info!(user, "basic auth enabled");
            Arc::new(BasicAuthenticator::new(user, pass))
        }
        None => Arc::new(AllowAll),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli);
    init_tracing(config.server.log_file.as_ref())?;

    if cli.config.is_none() {
        if let Err(e) = WaypostConfig::write_default_if_missing() {
            tracing::warn!(error = %e, "failed to write default config");
        }
    }

    let auth = authenticator(&config)?;

    let windows = config.server.windows();
    if !windows.is_ordered() {
        tracing::warn!(
            active_secs = windows.active.as_secs(),
            retention_secs = windows.retention.as_secs(),
            "active window exceeds retention window; records will purge before going inactive"
        );
    }
    let registry: Arc<dyn Registry> = Arc::new(RandomRegistry::new(windows));

    tracing::info!(
        bind = %config.server.bind_addr,
        port = config.server.port,
        active_secs = windows.active.as_secs(),
        retention_secs = windows.retention.as_secs(),
        "waypostd starting"
    );

    let addr = (config.server.bind_addr.as_str(), config.server.port);
    waypost_api::serve(ApiState::new(registry, auth), addr, shutdown_signal())
        .await
        .with_context(|| {
            format!(
                "failed to serve on {}:{}",
                config.server.bind_addr, config.server.port
            )
        })
}
