//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// One-shot stop signal fanned out to every subscriber.
///
/// The server subscribes before it starts serving; the signal task (or a test
/// harness) fires it.
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Fire the signal and return how many subscribers were still listening.
    pub fn trigger(&self) -> usize {
        self.notify.send(()).unwrap_or(0)
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
    async fn trigger_reaches_live_subscribers_only() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.subscribe();
        let gone = shutdown.subscribe();
        drop(gone);

        assert_eq!(shutdown.trigger(), 1);
        assert!(server.recv().await.is_ok());

        drop(server);
        assert_eq!(shutdown.trigger(), 0);
    }
}
