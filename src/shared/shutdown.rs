//! Graceful shutdown handling
//!
//! A cloneable [`ShutdownSignal`] shared between the OS signal listener and
//! the HTTP server's graceful-shutdown future.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("Shutdown signal triggered");
            self.sender.send_replace(true);
        }
    }

    /// Resolves once [`trigger`](Self::trigger) has been called, including
    /// when it was called before this future was created.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        if *rx.borrow_and_update() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for OS shutdown signals (SIGTERM, SIGINT) and trigger `shutdown`.
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }

        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        info!("Received Ctrl+C");
        shutdown.trigger();
    }
}

/// Owns the shutdown signal and bounds cleanup time.
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_shutdown_signals(signal).await;
        });
    }

    /// Run `cleanup` bounded by the configured timeout. Returns `false` on timeout.
    pub async fn run_cleanup<F, Fut>(&self, cleanup: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        match tokio::time::timeout(self.timeout, cleanup()).await {
            Ok(()) => {
                info!("Graceful shutdown completed");
                true
            }
            Err(_) => {
                warn!("Graceful shutdown timed out after {:?}", self.timeout);
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_after_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .expect("waiter should not panic");
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn wait_after_trigger_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("already-triggered signal should not block");
    }

    #[tokio::test]
    async fn cleanup_timeout_is_reported() {
        let coordinator = ShutdownCoordinator::new(0);
        let finished = coordinator
            .run_cleanup(|| async { tokio::time::sleep(Duration::from_millis(50)).await })
            .await;
        assert!(!finished);
    }
}
