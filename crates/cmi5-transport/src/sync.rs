//! Synchronous emulation bridge.
//!
//! The legacy primitive has no true synchronous mode, so a blocking
//! caller waits, bounded, on the same completion future the async path
//! uses. Exceeding the bound is a failure, never an indefinite hang.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::warn;

use cmi5_protocol::error::{Cmi5Result, TransportError};

/// Default upper bound, matching the legacy environments this emulates.
pub const DEFAULT_EMULATION_BOUND: Duration = Duration::from_secs(10);

/// Adapts async completions to blocking callers.
///
/// Must not be used from within an async context; it parks the calling
/// thread on the supplied runtime handle.
#[derive(Debug, Clone)]
pub struct SyncBridge {
    handle: Handle,
    bound: Duration,
}

impl SyncBridge {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            bound: DEFAULT_EMULATION_BOUND,
        }
    }

    #[must_use]
    pub fn with_bound(mut self, bound: Duration) -> Self {
        self.bound = bound;
        self
    }

    pub fn bound(&self) -> Duration {
        self.bound
    }

    /// Bounded blocking wait: the synchronous emulation path.
    pub fn wait<T>(&self, fut: impl Future<Output = Cmi5Result<T>>) -> Cmi5Result<T> {
        let started = Instant::now();
        match self
            .handle
            .block_on(async { tokio::time::timeout(self.bound, fut).await })
        {
            Ok(result) => result,
            Err(_elapsed) => {
                let waited_ms = started.elapsed().as_millis() as u64;
                warn!(waited_ms, "synchronous emulation timed out");
                Err(TransportError::SynchronousEmulationTimeout { waited_ms }.into())
            }
        }
    }

    /// Unbounded blocking wait, for primitives with a real synchronous
    /// mode.
    pub fn block<T>(&self, fut: impl Future<Output = Cmi5Result<T>>) -> Cmi5Result<T> {
        self.handle.block_on(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmi5_protocol::error::Cmi5Error;

    #[test]
    fn wait_returns_completed_results() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let bridge = SyncBridge::new(runtime.handle().clone());
        let value = bridge.wait(async { Ok::<_, Cmi5Error>(7) }).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn wait_times_out_instead_of_hanging() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let bridge =
            SyncBridge::new(runtime.handle().clone()).with_bound(Duration::from_millis(50));
        // A request whose primitive never fires any event.
        let err = bridge
            .wait(std::future::pending::<Cmi5Result<()>>())
            .unwrap_err();
        assert!(matches!(
            err,
            Cmi5Error::Transport(TransportError::SynchronousEmulationTimeout { .. })
        ));
    }

    #[test]
    fn block_has_no_bound() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let bridge =
            SyncBridge::new(runtime.handle().clone()).with_bound(Duration::from_millis(10));
        let value = bridge
            .block(async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, Cmi5Error>("done")
            })
            .unwrap();
        assert_eq!(value, "done");
    }
}
