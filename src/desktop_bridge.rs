//! Handlers behind the procedure boundary exposed to display surfaces.
//!
//! Queries are side-effect free and safe to retry, mutations are not retried,
//! and subscriptions are owned by the surface that opened them. Storage
//! failures leave here as generic internal errors; their causes are only logged.

use std::sync::Arc;

use crate::{
    app_types::{BridgeResult, OpenedWindow},
    appearance_sync::AppearanceSynchronizer,
    appearance_types::{AppearanceSnapshot, ThemeSource, ThemeSourcePayload},
    errors::{BridgeError, WindowError},
    preference_store::PreferenceStore,
    subscription_hub::{SnapshotSink, SubscriptionHub, SubscriptionId},
    window_host::{HostWindow, WindowHost},
    window_registry::WindowRegistry,
    window_types::{WindowDescriptor, WindowId},
};

const LOAD_THEME_SOURCE_FAILED: &str = "Failed to load themeSource";
const PERSIST_THEME_SOURCE_FAILED: &str = "Failed to persist themeSource";
const OPEN_WINDOW_FAILED: &str = "Failed to open window";

pub struct DesktopBridge<H: WindowHost> {
    appearance: AppearanceSynchronizer,
    preferences: Arc<dyn PreferenceStore>,
    windows: Arc<WindowRegistry<H>>,
    subscriptions: SubscriptionHub,
}

impl<H: WindowHost> DesktopBridge<H> {
    pub fn new(
        appearance: AppearanceSynchronizer,
        preferences: Arc<dyn PreferenceStore>,
        windows: Arc<WindowRegistry<H>>,
        subscriptions: SubscriptionHub,
    ) -> Self {
        Self {
            appearance,
            preferences,
            windows,
            subscriptions,
        }
    }

    pub fn appearance(&self) -> &AppearanceSynchronizer {
        &self.appearance
    }

    pub fn windows(&self) -> &Arc<WindowRegistry<H>> {
        &self.windows
    }

    pub fn subscriptions(&self) -> &SubscriptionHub {
        &self.subscriptions
    }

    pub fn appearance_get_snapshot(&self) -> AppearanceSnapshot {
        self.appearance.snapshot()
    }

    pub fn appearance_set_theme_source(&self, input: ThemeSourcePayload) -> AppearanceSnapshot {
        self.appearance.set_theme_source(input.theme_source)
    }

    pub fn appearance_on_changed<S: SnapshotSink>(&self, owner: &str, sink: S) -> SubscriptionId {
        self.subscriptions.subscribe(owner, sink)
    }

    pub fn appearance_unsubscribe(&self, subscription_id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(subscription_id)
    }

    pub fn preferences_get_theme_source(&self) -> Result<ThemeSourcePayload, BridgeError> {
        read_theme_preference(self.preferences.as_ref())
    }

    pub fn preferences_set_theme_source(
        &self,
        input: ThemeSourcePayload,
    ) -> Result<BridgeResult, BridgeError> {
        persist_theme_preference(self.preferences.as_ref(), input)
    }

    pub fn windows_list(&self) -> Vec<WindowDescriptor> {
        self.windows.descriptors().collect()
    }

    pub fn windows_open(&self, id: WindowId) -> Result<OpenedWindow, BridgeError> {
        self.ensure_known_window(&id)?;
        match self.windows.open(&id) {
            Ok(window) => Ok(OpenedWindow {
                id,
                label: window.label(),
            }),
            Err(WindowError::UnknownWindow(id)) => Err(unknown_window(&id)),
            // The in-flight open will show and focus it once built.
            Err(WindowError::Opening(id)) => Ok(OpenedWindow {
                label: id.to_string(),
                id,
            }),
            Err(error) => {
                tracing::error!(%error, "window open failed at the bridge");
                Err(BridgeError::internal(OPEN_WINDOW_FAILED))
            }
        }
    }

    pub fn windows_focus(&self, id: WindowId) -> Result<bool, BridgeError> {
        self.ensure_known_window(&id)?;
        self.windows.focus(&id).map_err(|_| unknown_window(&id))
    }

    /// A surface went away: drop every stream it still holds.
    pub fn surface_closed(&self, owner: &str) {
        let cancelled = self.subscriptions.unsubscribe_owner(owner);
        if cancelled > 0 {
            tracing::debug!(surface = owner, cancelled, "released subscriptions of closed surface");
        }
    }

    fn ensure_known_window(&self, id: &WindowId) -> Result<(), BridgeError> {
        if self.windows.is_registered(id) {
            Ok(())
        } else {
            Err(unknown_window(id))
        }
    }
}

/// Absence reads as `System`; only storage failures are errors.
pub fn read_theme_preference(
    preferences: &dyn PreferenceStore,
) -> Result<ThemeSourcePayload, BridgeError> {
    match preferences.read_theme_source() {
        Ok(stored) => Ok(ThemeSourcePayload {
            theme_source: stored.unwrap_or(ThemeSource::System),
        }),
        Err(error) => {
            tracing::error!(%error, "failed to load theme source preference");
            Err(BridgeError::internal(LOAD_THEME_SOURCE_FAILED))
        }
    }
}

pub fn persist_theme_preference(
    preferences: &dyn PreferenceStore,
    input: ThemeSourcePayload,
) -> Result<BridgeResult, BridgeError> {
    preferences
        .upsert_theme_source(input.theme_source)
        .map(|()| BridgeResult::ok())
        .map_err(|error| {
            tracing::error!(%error, "failed to persist theme source preference");
            BridgeError::internal(PERSIST_THEME_SOURCE_FAILED)
        })
}

fn unknown_window(id: &WindowId) -> BridgeError {
    BridgeError::not_found(format!("Unknown window id: {id}"))
}
