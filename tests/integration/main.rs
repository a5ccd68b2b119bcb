//! waypost integration test harness.
//!
//! Each test starts its own gateway on an ephemeral loopback port and talks
//! to it over real HTTP. Registries run on a `ManualClock` so window
//! behaviour can be exercised without waiting.
//!
//!   cargo test --test integration

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use waypost_api::ApiState;
use waypost_core::config::ClientConfig;
use waypost_core::Windows;
use waypost_registry::{
    AllowAll, Authenticator, ManualClock, MemoryRegistry, UniformRandom,
};

mod agent;
mod discovery;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const HOUR: Duration = Duration::from_secs(3600);

/// A gateway running in the background of the current test runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    pub clock: ManualClock,
    pub registry: Arc<MemoryRegistry<UniformRandom, ManualClock>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    /// Default windows, no auth.
    pub async fn start() -> Result<Self> {
        Self::start_with(Windows::default(), Arc::new(AllowAll)).await
    }

    pub async fn start_with(windows: Windows, auth: Arc<dyn Authenticator>) -> Result<Self> {
        let clock = ManualClock::default();
        let registry = Arc::new(MemoryRegistry::with_parts(
            windows,
            UniformRandom,
            clock.clone(),
        ));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let state = ApiState::new(registry.clone(), auth);
        let handle = tokio::spawn(waypost_api::serve_with_listener(listener, state, async {
            let _ = rx.await;
        }));

        Ok(Self {
            addr,
            clock,
            registry,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}/{}", self.addr, route.trim_start_matches('/'))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            registry_url: format!("http://{}", self.addr),
            timeout_ms: 2_000,
            ..ClientConfig::default()
        }
    }

    /// Stop the gateway and wait for it to exit cleanly.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.context("server task panicked")?,
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A `{name, host}` registration body.
pub fn body(name: &str, host: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "host": host })
}

/// Poll `check` every 5ms for up to `attempts` tries.
pub async fn eventually(attempts: usize, mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..attempts {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_starts_and_stops() {
    let server = TestServer::start().await.unwrap();
    let resp = reqwest::get(server.url("/ping")).await.unwrap();
    assert_eq!(resp.status(), 200);
    server.stop().await.unwrap();
}
