//! Connection keep-alive task

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::stream::KeepAlive;

/// Running keep-alive task. Dropping it stops the pings.
pub struct KeepAliveTask {
    handle: JoinHandle<()>,
}

impl KeepAliveTask {
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for KeepAliveTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Ping every `interval` until a ping fails or the task is stopped.
///
/// A failed ping ends the task quietly; the read side notices the dead
/// connection on its own.
pub fn spawn_keepalive(pinger: Arc<dyn KeepAlive>, interval: Duration) -> KeepAliveTask {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = pinger.ping().await {
                debug!("Keep-alive stopped: {}", e);
                break;
            }
            debug!("Keep-alive ping sent");
        }
    });
    KeepAliveTask { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPinger;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_pings_on_interval() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let pinger = Arc::new(MockPinger::new(attempts.clone(), None));
        let task = spawn_keepalive(pinger, Duration::from_secs(20));

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        task.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_failed_ping() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let pinger = Arc::new(MockPinger::new(attempts.clone(), Some(2)));
        let task = spawn_keepalive(pinger, Duration::from_secs(20));

        tokio::time::sleep(Duration::from_secs(300)).await;
        // Two good pings, one failure, then nothing
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(task.is_finished());
    }
}
