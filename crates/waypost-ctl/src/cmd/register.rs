//! Write commands: register, deregister, announce.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use waypost_client::{HttpTransport, RegistrationAgent, RegistryTransport};
use waypost_core::config::ClientConfig;
use waypost_core::ServiceRecord;

pub async fn cmd_register(config: &ClientConfig, name: &str, host: &str) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    transport
        .register(&ServiceRecord::new(name, host))
        .await
        .context("register failed")?;
    println!("registered {name} at {host}");
    Ok(())
}

pub async fn cmd_deregister(config: &ClientConfig, name: &str, host: &str) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    transport
        .deregister(&ServiceRecord::new(name, host))
        .await
        .context("deregister failed")?;
    println!("deregistered {name} at {host}");
    Ok(())
}

pub async fn cmd_announce(
    config: &ClientConfig,
    name: &str,
    host: &str,
    interval: Option<u64>,
) -> Result<()> {
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.renew_interval());
    anyhow::ensure!(!interval.is_zero(), "renewal interval must be positive");

    let transport = HttpTransport::new(config)?;
    transport
        .ping()
        .await
        .with_context(|| format!("is waypostd running at {}?", config.registry_url))?;
    let agent = RegistrationAgent::with_transport(
        ServiceRecord::new(name, host),
        Arc::new(transport) as Arc<dyn RegistryTransport>,
    );

    agent.auto(interval);
    println!(
        "announcing {name} at {host} every {}s (ctrl-c to stop)",
        interval.as_secs()
    );

    tokio::signal::ctrl_c().await?;
    agent.deregister().await.context("deregister failed")?;
    println!("deregistered {name} at {host}");
    Ok(())
}
