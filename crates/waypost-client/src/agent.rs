//! Registration agent: keeps one service registered by periodic renewal.
//!
//! State machine: Idle → Running → Stopping → Idle.
//!
//! `auto` is a compare-and-set from Idle to Running, so concurrent calls start
//! at most one renewal loop. `deregister` flips Running to Stopping and drops
//! a stop signal into a single-slot channel; if a signal is already pending
//! the new one is discarded. The loop observes the signal at its next
//! boundary and returns the agent to Idle.
//!
//! A renewal already in flight when `deregister` runs can still reach the
//! registry after the deregistration, so the record may briefly reappear.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use waypost_core::config::ClientConfig;
use waypost_core::ServiceRecord;

use crate::error::ClientError;
use crate::transport::{HttpTransport, RegistryTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AgentState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl AgentState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => AgentState::Running,
            2 => AgentState::Stopping,
            _ => AgentState::Idle,
        }
    }
}

struct AgentInner {
    record: ServiceRecord,
    transport: Arc<dyn RegistryTransport>,
    state: AtomicU8,
    stop_tx: mpsc::Sender<()>,
    /// Held by the running loop for its whole lifetime.
    stop_rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
}

impl AgentInner {
    fn state(&self) -> AgentState {
        AgentState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: AgentState, to: AgentState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub struct RegistrationAgent {
    inner: Arc<AgentInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RegistrationAgent {
    /// Agent for `name`/`host` against the configured registry. Pings first.
    pub async fn connect(
        name: impl Into<String>,
        host: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        transport.ping().await.map_err(|e| ClientError::Connect {
            url: transport.base_url().to_string(),
            source: Box::new(e),
        })?;
        Ok(Self::with_transport(
            ServiceRecord::new(name, host),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(record: ServiceRecord, transport: Arc<dyn RegistryTransport>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        Self {
            inner: Arc::new(AgentInner {
                record,
                transport,
                state: AtomicU8::new(AgentState::Idle as u8),
                stop_tx,
                stop_rx: tokio::sync::Mutex::new(stop_rx),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn record(&self) -> &ServiceRecord {
        &self.inner.record
    }

    pub fn state(&self) -> AgentState {
        self.inner.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == AgentState::Running
    }

    /// One register call; does not touch the loop state.
    pub async fn register(&self) -> Result<(), ClientError> {
        self.inner.transport.register(&self.inner.record).await
    }

    /// Start renewing every `interval`. Returns false, and does nothing, unless
    /// the agent was Idle and a tokio runtime is available.
    pub fn auto(&self, interval: Duration) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(name = %self.inner.record.name, error = %e, "cannot start renewal loop");
                return false;
            }
        };
        if !self.inner.transition(AgentState::Idle, AgentState::Running) {
            return false;
        }
        let handle = runtime.spawn(renewal_loop(self.inner.clone(), interval));
        *self.task.lock() = Some(handle);
        true
    }

    /// Remove the record from the registry and ask a running loop to stop.
    ///
    /// The stop request is sent before the remote call and regardless of its
    /// outcome. Returns once the remote call completes; the loop may exit
    /// later. Poll `is_running`/`state` for a stronger guarantee.
    pub async fn deregister(&self) -> Result<(), ClientError> {
        if self.inner.transition(AgentState::Running, AgentState::Stopping)
            && self.inner.stop_tx.try_send(()).is_err()
        {
            tracing::debug!(name = %self.inner.record.name, "stop already pending");
        }
        self.inner.transport.deregister(&self.inner.record).await
    }
}

impl Drop for RegistrationAgent {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn renewal_loop(inner: Arc<AgentInner>, interval: Duration) {
    let mut stop_rx = inner.stop_rx.lock().await;
    tracing::info!(
        name = %inner.record.name,
        host = %inner.record.host,
        interval_ms = interval.as_millis() as u64,
        "renewal loop started"
    );

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }
        if let Err(e) = inner.transport.register(&inner.record).await {
            tracing::warn!(name = %inner.record.name, error = %e, "renewal failed; retrying next interval");
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stop_rx.recv() => break,
        }
    }

    inner.state.store(AgentState::Idle as u8, Ordering::Release);
    tracing::info!(name = %inner.record.name, "renewal loop stopped");
}
