use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    Terminate,
    Requested,
}

/// Broadcasts the first stop request to every listener. Later requests are
/// ignored so the logged reason is the one that actually stopped the server.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: watch::Sender<Option<StopReason>>,
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<Option<StopReason>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns `false` when a stop was already requested.
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    pub async fn stopped(&mut self) -> StopReason {
        loop {
            if let Some(reason) = *self.receiver.borrow_and_update() {
                return reason;
            }
            if self.receiver.changed().await.is_err() {
                return StopReason::Requested;
            }
        }
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.receiver.borrow()
    }
}

pub fn install_signal_handlers(shutdown: &Shutdown) {
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "lifecycle", "ctrl-c received");
            interrupt.trigger(StopReason::Interrupt);
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let terminate = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    tracing::info!(target: "lifecycle", "SIGTERM received");
                    terminate.trigger(StopReason::Terminate);
                }
                Err(err) => {
                    tracing::warn!(target: "lifecycle", error = %err, "SIGTERM handler not installed")
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_reason_wins() {
        let shutdown = Shutdown::new();
        let mut early = shutdown.subscribe();
        assert_eq!(early.reason(), None);

        assert!(shutdown.trigger(StopReason::Terminate));
        assert!(!shutdown.trigger(StopReason::Interrupt));

        let mut late = shutdown.subscribe();
        assert_eq!(early.stopped().await, StopReason::Terminate);
        assert_eq!(late.stopped().await, StopReason::Terminate);
    }
}
