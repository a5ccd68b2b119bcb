//! Read-only commands: ping, discover, list.

use anyhow::{Context, Result};
use waypost_client::Client;
use waypost_core::config::ClientConfig;

use super::age_secs;

async fn connect(config: &ClientConfig) -> Result<Client> {
    Client::connect(config)
        .await
        .with_context(|| format!("is waypostd running at {}?", config.registry_url))
}

pub async fn cmd_ping(config: &ClientConfig) -> Result<()> {
    connect(config).await?;
    println!("registry at {} is up", config.registry_url);
    Ok(())
}

pub async fn cmd_discover(config: &ClientConfig, name: &str) -> Result<()> {
    let client = connect(config).await?;
    match client.discover(name).await {
        Ok(host) => {
            println!("{host}");
            Ok(())
        }
        Err(e) if e.is_not_found() => anyhow::bail!("no active instance of '{name}'"),
        Err(e) => Err(e).context("discover failed"),
    }
}

pub async fn cmd_list(config: &ClientConfig, name: &str, active_only: bool) -> Result<()> {
    let client = connect(config).await?;
    let services = if active_only {
        client.list_active(name).await
    } else {
        client.list(name).await
    }
    .context("list failed")?;

    if services.is_empty() {
        println!("No services registered.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Services ({})", services.len());
    println!("═══════════════════════════════════════");
    println!("  {:<24} {:<28} {:>8}", "NAME", "HOST", "AGE");
    for s in &services {
        println!("  {:<24} {:<28} {:>7}s", s.name, s.host, age_secs(s));
    }
    Ok(())
}
