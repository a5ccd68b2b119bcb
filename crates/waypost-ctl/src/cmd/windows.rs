//! Inspect or adjust the registry's liveness windows.

use anyhow::{Context, Result};
use waypost_client::HttpTransport;
use waypost_core::config::ClientConfig;
use waypost_core::WindowSettings;

fn show(settings: &WindowSettings) {
    let fmt = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |s| format!("{s}s"));
    println!("  Active window    : {}", fmt(settings.active_window_secs));
    println!("  Retention window : {}", fmt(settings.retention_window_secs));
}

pub async fn cmd_windows(
    config: &ClientConfig,
    active: Option<u64>,
    retention: Option<u64>,
) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    let settings = if active.is_none() && retention.is_none() {
        transport.windows().await.context("failed to read windows")?
    } else {
        let update = WindowSettings {
            active_window_secs: active,
            retention_window_secs: retention,
        };
        transport
            .set_windows(&update)
            .await
            .context("failed to update windows")?
    };
    show(&settings);
    Ok(())
}
