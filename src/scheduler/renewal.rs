use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::RenewalError;
use crate::helpers::time::{display_ts, now_i64, renewal_delay};
use crate::session::Session;
use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Sleeping until the current token is due for renewal
    Waiting,
    /// Refresh request in flight
    Renewing,
    /// Stopped, either on request or after a failed renewal
    Terminated,
}

#[derive(Debug, Clone, Copy)]
pub struct RenewalSettings {
    /// Renew this many seconds ahead of `exp`
    pub safety_margin_seconds: u64,
}

impl Default for RenewalSettings {
    fn default() -> Self {
        Self {
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
        }
    }
}

/// Background loop keeping a session's token fresh.
///
/// Sleeps until the installed token is due, renews it, and starts over from
/// the new expiration. Only the token installed at start may be due
/// immediately; a renewed token that is already due counts as a failed
/// renewal, so the loop never refreshes back to back. A failed renewal ends the loop and the error is handed
/// to whoever owns the [`SchedulerHandle`]; the loop never restarts itself.
pub struct RenewalScheduler {
    session: Arc<Session>,
    settings: RenewalSettings,
    state: watch::Sender<SchedulerState>,
}

impl RenewalScheduler {
    pub fn new(session: Arc<Session>, settings: RenewalSettings) -> Self {
        let (state, _) = watch::channel(SchedulerState::Waiting);
        Self {
            session,
            settings,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Run until `shutdown` fires (or its sender is dropped) or a renewal fails.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) -> Result<(), RenewalError> {
        loop {
            self.state.send_replace(SchedulerState::Waiting);

            let expires_at = self.session.token_expires_at().await;
            let delay = renewal_delay(expires_at, now_i64(), self.settings.safety_margin_seconds);
            info!(
                "sleep interval {} seconds, token expires at {}",
                delay.as_secs(),
                display_ts(expires_at)
            );

            tokio::select! {
                _ = &mut shutdown => {
                    info!("renewal scheduler shutting down");
                    self.state.send_replace(SchedulerState::Terminated);
                    return Ok(());
                }
                _ = tokio::time::sleep(delay) => {}
            }

            self.state.send_replace(SchedulerState::Renewing);
            debug!("renewing token");
            if let Err(e) = self
                .session
                .renew_ahead(self.settings.safety_margin_seconds)
                .await
            {
                error!(error = %e, "token renewal failed, stopping scheduler");
                self.state.send_replace(SchedulerState::Terminated);
                return Err(e);
            }
        }
    }

    /// Run on the tokio runtime and return a handle to observe or stop it.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = self.subscribe();
        let join = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle {
            shutdown: shutdown_tx,
            state,
            join,
        }
    }
}

/// Owner side of a spawned [`RenewalScheduler`].
///
/// Dropping the handle stops the loop at its next wait.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: oneshot::Sender<()>,
    state: watch::Receiver<SchedulerState>,
    join: JoinHandle<Result<(), RenewalError>>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Ask the loop to stop and wait for it. An in-flight renewal completes first.
    pub async fn stop(self) -> Result<(), RenewalError> {
        let _ = self.shutdown.send(());
        finish(self.join).await
    }

    /// Wait for the loop to end on its own, i.e. for a renewal failure.
    pub async fn join(self) -> Result<(), RenewalError> {
        let SchedulerHandle { shutdown, join, .. } = self;
        let result = finish(join).await;
        drop(shutdown);
        result
    }
}

async fn finish(join: JoinHandle<Result<(), RenewalError>>) -> Result<(), RenewalError> {
    match join.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Ok(()),
    }
}
