//! waypost-ctl — command-line interface for a waypost registry.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use waypost_core::basic_auth_token;
use waypost_core::config::{ClientConfig, WaypostConfig};

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "waypost-ctl")]
#[command(about = "Register and discover services in a waypost registry")]
#[command(version)]
struct Cli {
    /// Registry base URL
    #[arg(long, env = "WAYPOST_REGISTRY", global = true)]
    registry: Option<String>,

    /// Raw Authorization header value
    #[arg(long, env = "WAYPOST_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Basic auth username (used with --pass instead of --token)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, global = true)]
    pass: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the registry is reachable
    Ping,

    /// Pick one active host for a service
    Discover {
        name: String,
    },

    /// List known services
    List {
        /// Service name; omit to list every service
        #[arg(default_value = "")]
        name: String,

        /// Only show records inside the active window
        #[arg(long)]
        active: bool,
    },

    /// Register (or renew) a service once
    Register {
        name: String,
        host: String,
    },

    /// Remove a service
    Deregister {
        name: String,
        host: String,
    },

    /// Keep a service registered until interrupted, then deregister it
    Announce {
        name: String,
        host: String,

        /// Renewal interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show or change the registry's windows
    Windows {
        /// New active window in seconds
        #[arg(long)]
        active: Option<u64>,

        /// New retention window in seconds
        #[arg(long)]
        retention: Option<u64>,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = WaypostConfig::load()
            .map(|c| c.client)
            .unwrap_or_default();
        if let Some(url) = &self.registry {
            config.registry_url = url.clone();
        }
        match (&self.user, &self.pass) {
            (Some(user), Some(pass)) => config.token = basic_auth_token(user, pass),
            (None, None) => {}
            _ => anyhow::bail!("--user and --pass must be given together"),
        }
        if let Some(token) = &self.token {
            config.token = token.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;

    match cli.command {
        Command::Ping => cmd::discover::cmd_ping(&config).await,
        Command::Discover { name } => cmd::discover::cmd_discover(&config, &name).await,
        Command::List { name, active } => cmd::discover::cmd_list(&config, &name, active).await,
        Command::Register { name, host } => cmd::register::cmd_register(&config, &name, &host).await,
        Command::Deregister { name, host } => {
            cmd::register::cmd_deregister(&config, &name, &host).await
        }
        Command::Announce { name, host, interval } => {
            cmd::register::cmd_announce(&config, &name, &host, interval).await
        }
        Command::Windows { active, retention } => {
            cmd::windows::cmd_windows(&config, active, retention).await
        }
    }
}
