//! Host-side half of `appearance.onChanged`.
//!
//! Each subscriber gets one forwarding task that drains its
//! [`AppearanceSubscription`] into a [`SnapshotSink`]. Unsubscribing, closing
//! the owning surface, or a failing sink ends exactly that task.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use serde::Serialize;
use tokio::runtime::Handle;

use crate::{
    appearance_sync::{AppearanceSynchronizer, CancelHandle},
    appearance_types::AppearanceSnapshot,
    errors::SubscriptionError,
};

pub type SubscriptionId = u64;

/// Wire shape of one pushed stream item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AppearanceStreamEvent {
    Data { snapshot: AppearanceSnapshot },
    Error { message: String },
}

pub trait SnapshotSink: Send + 'static {
    fn send(&self, event: AppearanceStreamEvent) -> Result<(), String>;
}

struct ActiveSubscription {
    owner: String,
    cancel: CancelHandle,
}

type ActiveMap = Arc<Mutex<HashMap<SubscriptionId, ActiveSubscription>>>;

pub struct SubscriptionHub {
    appearance: AppearanceSynchronizer,
    runtime: Handle,
    active: ActiveMap,
    next_id: AtomicU64,
}

impl SubscriptionHub {
    pub fn new(appearance: AppearanceSynchronizer, runtime: Handle) -> Self {
        Self {
            appearance,
            runtime,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<S: SnapshotSink>(&self, owner: &str, sink: S) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (cancel, mut subscription) = self.appearance.subscribe_with_handle();
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                ActiveSubscription {
                    owner: owner.to_string(),
                    cancel,
                },
            );
        tracing::debug!(subscription.id = id, subscription.owner = owner, "appearance subscriber added");

        let active = Arc::clone(&self.active);
        self.runtime.spawn(async move {
            while let Some(item) = subscription.next().await {
                let event = match item {
                    Ok(snapshot) => AppearanceStreamEvent::Data { snapshot },
                    Err(error) => {
                        tracing::warn!(subscription.id = id, %error, "appearance stream failed");
                        let _ = sink.send(AppearanceStreamEvent::Error {
                            message: error.to_string(),
                        });
                        break;
                    }
                };
                if let Err(reason) = sink.send(event) {
                    let error = SubscriptionError::SinkClosed(reason);
                    tracing::debug!(subscription.id = id, %error, "dropping appearance subscriber");
                    break;
                }
            }
            active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        });

        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(subscription) => {
                subscription.cancel.cancel();
                tracing::debug!(subscription.id = id, "appearance subscriber cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every subscription opened by one display surface.
    pub fn unsubscribe_owner(&self, owner: &str) -> usize {
        let removed: Vec<ActiveSubscription> = {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            let ids: Vec<SubscriptionId> = active
                .iter()
                .filter(|(_, subscription)| subscription.owner == owner)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| active.remove(&id))
                .collect()
        };
        for subscription in &removed {
            subscription.cancel.cancel();
        }
        removed.len()
    }

    pub fn shutdown(&self) {
        let drained: Vec<ActiveSubscription> = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, subscription)| subscription)
            .collect();
        for subscription in &drained {
            subscription.cancel.cancel();
        }
    }

    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
