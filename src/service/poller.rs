//! Status polling driven from outside the controller.
//!
//! Rows such as knowledge files being parsed or fine-tune jobs being
//! trained carry an in-progress status that the server resolves later.
//! [`StatusPoller`] periodically inspects the current rows and calls
//! `reload()` while a caller predicate says something is still pending.
//! The controller itself knows nothing about timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::RemoteListController;

/// Why a poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStop {
    /// The predicate no longer matched the current rows.
    Settled,
    /// The controller was dropped.
    ControllerDropped,
    /// [`StatusPoller::stop`] was called (or the task was cancelled).
    Stopped,
}

/// Background task reloading a controller while rows are pending.
///
/// The task holds only a weak reference to the controller, so dropping
/// the view's controller ends polling. Dropping the poller aborts it.
#[derive(Debug)]
pub struct StatusPoller {
    handle: JoinHandle<PollStop>,
}

impl StatusPoller {
    /// Starts polling `controller` every `interval`.
    ///
    /// On each tick the current rows are passed to `pending`; if it
    /// returns `true` a reload is issued and awaited, otherwise polling
    /// stops. Failed reloads are logged and polling continues.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime or if `interval` is zero.
    #[must_use]
    pub fn spawn<R, P>(
        controller: &Arc<RemoteListController<R>>,
        interval: Duration,
        pending: P,
    ) -> Self
    where
        R: Clone + Send + Sync + 'static,
        P: Fn(&[R]) -> bool + Send + 'static,
    {
        let weak = Arc::downgrade(controller);
        let controller_id = controller.id();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(controller) = weak.upgrade() else {
                    tracing::debug!(%controller_id, "controller gone, poller exiting");
                    return PollStop::ControllerDropped;
                };
                if !pending(controller.state().rows()) {
                    tracing::debug!(%controller_id, "no pending rows, poller exiting");
                    return PollStop::Settled;
                }

                let reload = controller.reload();
                drop(controller);
                if let Err(err) = reload.await {
                    tracing::warn!(%controller_id, error = %err, "status poll reload failed");
                }
            }
        });

        Self { handle }
    }

    /// Stops polling.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Returns `true` once the polling task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for polling to end and reports why.
    pub async fn wait(&mut self) -> PollStop {
        (&mut self.handle).await.unwrap_or(PollStop::Stopped)
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
