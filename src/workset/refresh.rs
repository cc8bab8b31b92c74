//! Periodic refresh of `current_value` from the memory access service
//!
//! The refresher never holds working-set state across a read: each pass
//! snapshots the `(address, type)` pairs from the owner, reads memory, and
//! hands the rendered values back as a single command.

use super::actor::WorksetHandle;
use crate::core::types::{Address, ValueType, WorksetError, WorksetResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Reads raw bytes from the target process
pub trait MemoryAccess: Send + Sync {
    fn read(&self, address: Address, size: usize) -> WorksetResult<Vec<u8>>;
}

impl<T: MemoryAccess + ?Sized> MemoryAccess for Arc<T> {
    fn read(&self, address: Address, size: usize) -> WorksetResult<Vec<u8>> {
        (**self).read(address, size)
    }
}

/// Live process memory through `/proc/<pid>/mem`
#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct ProcMemory {
    pid: u32,
    mem: std::fs::File,
}

#[cfg(target_os = "linux")]
impl ProcMemory {
    pub fn open(pid: u32) -> WorksetResult<Self> {
        let mem = std::fs::File::open(format!("/proc/{}/mem", pid))
            .map_err(|e| WorksetError::read_failed(format!("pid {}", pid), e.to_string()))?;
        info!(pid, "attached to process memory");
        Ok(ProcMemory { pid, mem })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

#[cfg(target_os = "linux")]
impl MemoryAccess for ProcMemory {
    fn read(&self, address: Address, size: usize) -> WorksetResult<Vec<u8>> {
        use std::os::unix::fs::FileExt;

        let mut buffer = vec![0u8; size];
        self.mem
            .read_exact_at(&mut buffer, address.as_u64())
            .map_err(|e| WorksetError::read_failed(address, e.to_string()))?;
        Ok(buffer)
    }
}

/// Reads every target and renders the values that could be decoded
pub fn read_values<M: MemoryAccess + ?Sized>(
    memory: &M,
    targets: &[(Address, ValueType)],
) -> Vec<(Address, String)> {
    targets
        .iter()
        .filter_map(|&(address, value_type)| {
            let rendered = memory
                .read(address, value_type.size())
                .and_then(|bytes| value_type.render(&bytes));
            match rendered {
                Ok(value) => Some((address, value)),
                Err(e) => {
                    debug!(%address, error = %e, "value refresh skipped");
                    None
                }
            }
        })
        .collect()
}

/// Background poller feeding fresh values to the working-set owner
///
/// Reads may block (file or syscall backed), so each pass runs them on the
/// blocking thread pool.
pub struct ValueRefresher<M> {
    memory: Arc<M>,
    handle: WorksetHandle,
    interval: Duration,
}

impl<M: MemoryAccess + 'static> ValueRefresher<M> {
    pub fn new(memory: M, handle: WorksetHandle, interval: Duration) -> Self {
        ValueRefresher {
            memory: Arc::new(memory),
            handle,
            interval,
        }
    }

    /// One snapshot, read, apply cycle; returns how many values were read
    pub async fn refresh_once(&self) -> WorksetResult<usize> {
        let targets = self.handle.read_targets().await?;
        if targets.is_empty() {
            return Ok(0);
        }
        let requested = targets.len();
        let memory = Arc::clone(&self.memory);
        let values = tokio::task::spawn_blocking(move || read_values(&*memory, &targets))
            .await
            .map_err(|e| WorksetError::read_failed("refresh pass", e.to_string()))?;
        let count = values.len();
        if count < requested {
            debug!(read = count, requested, "partial refresh");
        }
        self.handle.apply_values(values).await?;
        Ok(count)
    }

    /// Polls until `shutdown` flips to true or the owner goes away
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "value refresher started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.refresh_once().await {
                        Ok(_) => {}
                        Err(WorksetError::ChannelClosed) => break,
                        Err(e) => warn!(error = %e, "value refresh failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("value refresher stopped");
    }
}
