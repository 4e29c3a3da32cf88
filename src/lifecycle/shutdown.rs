//! Stopping the route reloader.
//!
//! # Design Decisions
//! - The first stop request wins; later ones are logged and dropped, so the
//!   reloader sees exactly one reason
//! - Tasks that subscribe after the stop still find out through `reason()`,
//!   since a broadcast only reaches receivers that already exist

use std::sync::OnceLock;

use tokio::sync::broadcast;

/// Why background router tasks were asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// ctrl-c or SIGTERM.
    Signal,
    /// The route file watcher went away; nothing will arrive to reload.
    WatcherClosed,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Signal => "signal",
            StopReason::WatcherClosed => "watcher_closed",
        }
    }
}

/// One-shot stop switch for the route reloader and other background tasks.
pub struct Shutdown {
    tx: broadcast::Sender<StopReason>,
    reason: OnceLock<StopReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            reason: OnceLock::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StopReason> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop. Returns false if a stop was already
    /// requested, in which case nothing is sent.
    pub fn trigger(&self, reason: StopReason) -> bool {
        if self.reason.set(reason).is_err() {
            tracing::debug!(reason = reason.as_str(), "Stop already requested, ignoring");
            return false;
        }
        let listeners = self.tx.send(reason).unwrap_or(0);
        tracing::info!(reason = reason.as_str(), listeners, "Stopping router tasks");
        true
    }

    /// The reason of the first stop request, if any.
    pub fn reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    /// Number of tasks still listening.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_stop_reason_wins() {
        let shutdown = Shutdown::new();
        let mut reloader = shutdown.subscribe();
        assert_eq!(shutdown.listeners(), 1);
        assert_eq!(shutdown.reason(), None);

        assert!(shutdown.trigger(StopReason::WatcherClosed));
        assert!(!shutdown.trigger(StopReason::Signal));

        assert_eq!(reloader.recv().await.unwrap(), StopReason::WatcherClosed);
        assert!(reloader.try_recv().is_err());
        assert_eq!(shutdown.reason(), Some(StopReason::WatcherClosed));
    }

    #[test]
    fn test_trigger_without_listeners() {
        let shutdown = Shutdown::default();
        assert!(shutdown.trigger(StopReason::Signal));

        // too late for the broadcast, but the reason is still visible
        let mut late = shutdown.subscribe();
        assert!(late.try_recv().is_err());
        assert_eq!(shutdown.reason(), Some(StopReason::Signal));
    }
}
