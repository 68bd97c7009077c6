use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    appearance_types::{AppearanceSnapshot, ThemeSource},
    errors::SubscriptionError,
    theme_oracle::{OracleListener, ThemeOracle},
};

/// Caller side of a subscription's cancellation. Dropping it also cancels.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        let cancelled = *self.rx.borrow();
        cancelled || self.rx.has_changed().is_err()
    }

    pub async fn cancelled(&mut self) {
        loop {
            let cancelled = *self.rx.borrow_and_update();
            if cancelled {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPhase {
    Idle,
    AwaitingEvent,
    Closed,
}

enum Wake {
    Cancelled,
    Changed,
    OracleClosed,
}

/// One subscriber's view of the appearance stream.
///
/// The first call to [`next`](Self::next) yields the snapshot captured at
/// subscribe time. Later calls suspend until the oracle publishes a change or
/// the cancel signal fires. Changes that arrive while the subscriber is not
/// polling collapse into the latest state.
pub struct AppearanceSubscription {
    listener: Option<OracleListener>,
    cancel: CancelSignal,
    phase: SubscriptionPhase,
    initial: AppearanceSnapshot,
    last_emitted: Option<AppearanceSnapshot>,
}

impl AppearanceSubscription {
    pub fn phase(&self) -> SubscriptionPhase {
        self.phase
    }

    pub async fn next(&mut self) -> Option<Result<AppearanceSnapshot, SubscriptionError>> {
        loop {
            match self.phase {
                SubscriptionPhase::Closed => return None,
                SubscriptionPhase::Idle => {
                    if self.cancel.is_cancelled() {
                        self.close();
                        return None;
                    }
                    self.phase = SubscriptionPhase::AwaitingEvent;
                    self.last_emitted = Some(self.initial);
                    return Some(Ok(self.initial));
                }
                SubscriptionPhase::AwaitingEvent => {
                    let Some(listener) = self.listener.as_mut() else {
                        self.close();
                        return None;
                    };

                    let wake = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => Wake::Cancelled,
                        changed = listener.changed() => match changed {
                            Ok(()) => Wake::Changed,
                            Err(_) => Wake::OracleClosed,
                        },
                    };

                    match wake {
                        Wake::Cancelled => {
                            self.close();
                            return None;
                        }
                        Wake::OracleClosed => {
                            self.close();
                            return Some(Err(SubscriptionError::OracleClosed));
                        }
                        Wake::Changed => {}
                    }

                    // An event that raced with cancellation is dropped.
                    if self.cancel.is_cancelled() {
                        self.close();
                        return None;
                    }

                    let state = *listener.borrow_and_update();
                    let snapshot = state.snapshot();
                    if self.last_emitted == Some(snapshot) {
                        continue;
                    }
                    self.last_emitted = Some(snapshot);
                    return Some(Ok(snapshot));
                }
            }
        }
    }

    fn close(&mut self) {
        self.phase = SubscriptionPhase::Closed;
        self.listener = None;
    }
}

#[derive(Clone)]
pub struct AppearanceSynchronizer {
    oracle: Arc<ThemeOracle>,
}

impl AppearanceSynchronizer {
    pub fn new(oracle: Arc<ThemeOracle>) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &Arc<ThemeOracle> {
        &self.oracle
    }

    pub fn snapshot(&self) -> AppearanceSnapshot {
        self.oracle.state().snapshot()
    }

    /// Does not persist anything; persistence is the caller's separate step.
    pub fn set_theme_source(&self, next: ThemeSource) -> AppearanceSnapshot {
        if self.oracle.set_theme_source(next) {
            tracing::info!(theme.source = %next, "appearance theme source updated");
        }
        self.snapshot()
    }

    pub fn subscribe(&self, cancel: CancelSignal) -> AppearanceSubscription {
        let mut listener = self.oracle.listen();
        let initial = listener.borrow_and_update().snapshot();
        AppearanceSubscription {
            listener: Some(listener),
            cancel,
            phase: SubscriptionPhase::Idle,
            initial,
            last_emitted: None,
        }
    }

    pub fn subscribe_with_handle(&self) -> (CancelHandle, AppearanceSubscription) {
        let (handle, signal) = cancel_pair();
        (handle, self.subscribe(signal))
    }
}
