use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::Error;
use crate::host::{Capability, CapabilityProbe};

/// Capabilities the probe does not report yet.
pub fn missing_capabilities(probe: &dyn CapabilityProbe) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|cap| !probe.has_capability(*cap))
        .collect()
}

/// Poll `probe` every `interval` until the host exposes everything.
/// Without a `deadline` this waits forever.
pub async fn wait_until_ready(
    probe: &dyn CapabilityProbe,
    interval: Duration,
    deadline: Option<Duration>,
) -> Result<(), Error> {
    let started = Instant::now();

    loop {
        let missing = missing_capabilities(probe);
        if missing.is_empty() {
            debug!(waited = ?started.elapsed(), "Host ready");
            return Ok(());
        }

        if let Some(limit) = deadline {
            if started.elapsed() >= limit {
                return Err(Error::HostNotReady { missing });
            }
        }

        debug!(?missing, "Waiting for host");
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ready_host_returns_immediately() {
        let host = MemoryHost::new();
        wait_until_ready(&host, Duration::from_millis(1), Some(Duration::ZERO))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deadline_names_missing() {
        let host = MemoryHost::new();
        host.set_capability(Capability::ContextMenu, false);

        let err = wait_until_ready(&host, Duration::from_millis(1), Some(Duration::from_millis(10)))
            .await
            .unwrap_err();

        match err {
            Error::HostNotReady { missing } => assert_eq!(missing, vec![Capability::ContextMenu]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_waits_until_capability_appears() {
        let host = Arc::new(MemoryHost::new());
        host.set_capability(Capability::Queue, false);

        let late = host.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            late.set_capability(Capability::Queue, true);
        });

        wait_until_ready(host.as_ref(), Duration::from_millis(2), None)
            .await
            .unwrap();
        assert!(missing_capabilities(host.as_ref()).is_empty());
    }
}
