//! Display-surface side of appearance reconciliation.
//!
//! A surface paints an optimistic theme from the persisted preference before
//! any round trip completes, hands that preference to the host, and from then
//! on treats host snapshots as authoritative. User choices go the other way:
//! paint locally, persist, then tell the host. The last write to land wins.

use std::sync::Arc;

use crate::{
    appearance_sync::{AppearanceSubscription, AppearanceSynchronizer, CancelHandle},
    appearance_types::{AppearanceSnapshot, ThemeSource, ThemeSourcePayload},
    desktop_bridge::{persist_theme_preference, read_theme_preference, DesktopBridge},
    errors::BridgeError,
    preference_store::PreferenceStore,
    window_host::WindowHost,
};

/// The procedure boundary as seen from a display surface.
pub trait AppearanceEndpoint {
    fn get_persisted_theme_source(&self) -> Result<ThemeSource, BridgeError>;
    fn persist_theme_source(&self, theme_source: ThemeSource) -> Result<(), BridgeError>;
    fn set_theme_source(&self, theme_source: ThemeSource) -> Result<AppearanceSnapshot, BridgeError>;
    fn get_snapshot(&self) -> Result<AppearanceSnapshot, BridgeError>;
    fn subscribe(&self) -> (CancelHandle, AppearanceSubscription);
}

impl<H: WindowHost> AppearanceEndpoint for DesktopBridge<H> {
    fn get_persisted_theme_source(&self) -> Result<ThemeSource, BridgeError> {
        self.preferences_get_theme_source()
            .map(|payload| payload.theme_source)
    }

    fn persist_theme_source(&self, theme_source: ThemeSource) -> Result<(), BridgeError> {
        self.preferences_set_theme_source(ThemeSourcePayload { theme_source })
            .map(|_| ())
    }

    fn set_theme_source(&self, theme_source: ThemeSource) -> Result<AppearanceSnapshot, BridgeError> {
        Ok(self.appearance_set_theme_source(ThemeSourcePayload { theme_source }))
    }

    fn get_snapshot(&self) -> Result<AppearanceSnapshot, BridgeError> {
        Ok(self.appearance_get_snapshot())
    }

    fn subscribe(&self) -> (CancelHandle, AppearanceSubscription) {
        self.appearance().subscribe_with_handle()
    }
}

/// In-process endpoint over the synchronizer and the preference store.
#[derive(Clone)]
pub struct LocalEndpoint {
    appearance: AppearanceSynchronizer,
    preferences: Arc<dyn PreferenceStore>,
}

impl LocalEndpoint {
    pub fn new(appearance: AppearanceSynchronizer, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            appearance,
            preferences,
        }
    }

    pub fn appearance(&self) -> &AppearanceSynchronizer {
        &self.appearance
    }
}

impl AppearanceEndpoint for LocalEndpoint {
    fn get_persisted_theme_source(&self) -> Result<ThemeSource, BridgeError> {
        read_theme_preference(self.preferences.as_ref()).map(|payload| payload.theme_source)
    }

    fn persist_theme_source(&self, theme_source: ThemeSource) -> Result<(), BridgeError> {
        persist_theme_preference(self.preferences.as_ref(), ThemeSourcePayload { theme_source })
            .map(|_| ())
    }

    fn set_theme_source(&self, theme_source: ThemeSource) -> Result<AppearanceSnapshot, BridgeError> {
        Ok(self.appearance.set_theme_source(theme_source))
    }

    fn get_snapshot(&self) -> Result<AppearanceSnapshot, BridgeError> {
        Ok(self.appearance.snapshot())
    }

    fn subscribe(&self) -> (CancelHandle, AppearanceSubscription) {
        self.appearance.subscribe_with_handle()
    }
}

/// Where a surface paints its resolved dark-mode flag.
pub trait Presentation {
    fn apply_dark_mode(&mut self, is_dark_mode: bool);
}

impl<F: FnMut(bool)> Presentation for F {
    fn apply_dark_mode(&mut self, is_dark_mode: bool) {
        self(is_dark_mode)
    }
}

/// Makes the host's live theme source match the persisted choice.
///
/// `before_host` runs between reading the preference and handing it to the
/// host. Returns the persisted source, or `None` when it could not be read.
pub fn adopt_persisted_preference<E: AppearanceEndpoint>(
    endpoint: &E,
    before_host: impl FnOnce(ThemeSource),
) -> Option<ThemeSource> {
    let persisted = match endpoint.get_persisted_theme_source() {
        Ok(persisted) => persisted,
        Err(error) => {
            tracing::warn!(%error, "persisted theme source unavailable; keeping host state");
            return None;
        }
    };

    before_host(persisted);
    if let Err(error) = endpoint.set_theme_source(persisted) {
        tracing::warn!(%error, theme.source = %persisted, "host rejected persisted theme source");
    }
    Some(persisted)
}

pub struct SurfaceAppearance<P: Presentation> {
    presentation: P,
    current: AppearanceSnapshot,
    local_prefers_dark: bool,
    stream: Option<(CancelHandle, AppearanceSubscription)>,
}

impl<P: Presentation> SurfaceAppearance<P> {
    /// Runs the startup reconciliation and leaves the surface subscribed.
    pub fn start<E: AppearanceEndpoint>(
        endpoint: &E,
        local_prefers_dark: bool,
        mut presentation: P,
    ) -> Result<Self, BridgeError> {
        let initial = AppearanceSnapshot::resolve(ThemeSource::System, local_prefers_dark);
        presentation.apply_dark_mode(initial.is_dark_mode);
        let mut surface = Self {
            presentation,
            current: initial,
            local_prefers_dark,
            stream: None,
        };

        adopt_persisted_preference(endpoint, |persisted| {
            surface.present(AppearanceSnapshot::resolve(persisted, local_prefers_dark));
        });

        let canonical = endpoint.get_snapshot()?;
        surface.present(canonical);

        // The stream opens with the snapshot at subscribe time; re-applying it
        // is harmless.
        surface.stream = Some(endpoint.subscribe());
        Ok(surface)
    }

    pub fn current(&self) -> AppearanceSnapshot {
        self.current
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Applies the next pushed snapshot. `None` once the stream has ended.
    pub async fn next_update(&mut self) -> Option<AppearanceSnapshot> {
        let (_, subscription) = self.stream.as_mut()?;
        let next = subscription.next().await;
        match next {
            Some(Ok(snapshot)) => {
                self.present(snapshot);
                Some(snapshot)
            }
            Some(Err(error)) => {
                tracing::warn!(%error, "appearance stream ended with an error");
                self.stream = None;
                None
            }
            None => {
                self.stream = None;
                None
            }
        }
    }

    /// User-initiated change: paint, persist, then inform the host.
    pub fn choose<E: AppearanceEndpoint>(
        &mut self,
        endpoint: &E,
        next: ThemeSource,
    ) -> Result<(), BridgeError> {
        self.present(AppearanceSnapshot::resolve(next, self.local_prefers_dark));
        endpoint.persist_theme_source(next)?;
        endpoint.set_theme_source(next)?;
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some((cancel, _)) = self.stream.take() {
            cancel.cancel();
        }
    }

    fn present(&mut self, snapshot: AppearanceSnapshot) {
        self.current = snapshot;
        self.presentation.apply_dark_mode(snapshot.is_dark_mode);
    }
}

impl<P: Presentation> Drop for SurfaceAppearance<P> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use super::*;
    use crate::{
        errors::StorageError, preference_store::MemoryPreferenceStore, theme_oracle::ThemeOracle,
    };

    #[derive(Default)]
    struct CallLog(Mutex<Vec<String>>);

    impl CallLog {
        fn push(&self, call: String) {
            self.0.lock().expect("call log").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().expect("call log").clone()
        }
    }

    /// Records boundary calls in order on top of a local endpoint.
    struct RecordingEndpoint {
        inner: LocalEndpoint,
        log: Arc<CallLog>,
        fail_persist: bool,
    }

    impl AppearanceEndpoint for RecordingEndpoint {
        fn get_persisted_theme_source(&self) -> Result<ThemeSource, BridgeError> {
            self.log.push("preferences.getThemeSource".to_string());
            self.inner.get_persisted_theme_source()
        }

        fn persist_theme_source(&self, theme_source: ThemeSource) -> Result<(), BridgeError> {
            self.log
                .push(format!("preferences.setThemeSource:{theme_source}"));
            if self.fail_persist {
                return Err(BridgeError::internal("Failed to persist themeSource"));
            }
            self.inner.persist_theme_source(theme_source)
        }

        fn set_theme_source(
            &self,
            theme_source: ThemeSource,
        ) -> Result<AppearanceSnapshot, BridgeError> {
            self.log
                .push(format!("appearance.setThemeSource:{theme_source}"));
            self.inner.set_theme_source(theme_source)
        }

        fn get_snapshot(&self) -> Result<AppearanceSnapshot, BridgeError> {
            self.log.push("appearance.getSnapshot".to_string());
            self.inner.get_snapshot()
        }

        fn subscribe(&self) -> (CancelHandle, AppearanceSubscription) {
            self.log.push("appearance.onChanged".to_string());
            self.inner.subscribe()
        }
    }

    struct UnreadableStore;

    impl PreferenceStore for UnreadableStore {
        fn read_theme_source(&self) -> Result<Option<ThemeSource>, StorageError> {
            Err(StorageError::Unavailable("locked".to_string()))
        }

        fn upsert_theme_source(&self, _theme_source: ThemeSource) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn endpoint(
        system_dark: bool,
        preferences: Arc<dyn PreferenceStore>,
        fail_persist: bool,
    ) -> RecordingEndpoint {
        let appearance = AppearanceSynchronizer::new(Arc::new(ThemeOracle::new(system_dark)));
        RecordingEndpoint {
            inner: LocalEndpoint::new(appearance, preferences),
            log: Arc::new(CallLog::default()),
            fail_persist,
        }
    }

    #[tokio::test]
    async fn startup_follows_read_apply_inform_read_subscribe_order() {
        let endpoint = endpoint(
            false,
            Arc::new(MemoryPreferenceStore::with_theme_source(ThemeSource::Dark)),
            false,
        );
        let painted = Arc::new(Mutex::new(Vec::new()));
        let sink = painted.clone();
        let surface = SurfaceAppearance::start(&endpoint, false, move |dark: bool| {
            sink.lock().expect("painted").push(dark)
        })
        .expect("startup");

        assert_eq!(
            endpoint.log.calls(),
            vec![
                "preferences.getThemeSource",
                "appearance.setThemeSource:dark",
                "appearance.getSnapshot",
                "appearance.onChanged",
            ]
        );
        // Local OS guess, then optimistic dark, then canonical dark.
        assert_eq!(*painted.lock().expect("painted"), vec![false, true, true]);
        assert_eq!(
            surface.current(),
            AppearanceSnapshot {
                is_dark_mode: true,
                theme_source: ThemeSource::Dark,
            }
        );
    }

    #[tokio::test]
    async fn unreadable_preference_falls_back_to_host_state() {
        let endpoint = endpoint(true, Arc::new(UnreadableStore), false);
        let surface =
            SurfaceAppearance::start(&endpoint, false, |_dark: bool| {}).expect("startup");

        assert!(!endpoint
            .log
            .calls()
            .iter()
            .any(|call| call.starts_with("appearance.setThemeSource")));
        // Host is authoritative once reachable, even over the local OS guess.
        assert_eq!(
            surface.current(),
            AppearanceSnapshot {
                is_dark_mode: true,
                theme_source: ThemeSource::System,
            }
        );
    }

    #[tokio::test]
    async fn user_choice_paints_then_persists_then_informs_host() {
        let endpoint = endpoint(false, Arc::new(MemoryPreferenceStore::default()), false);
        let mut surface =
            SurfaceAppearance::start(&endpoint, false, |_dark: bool| {}).expect("startup");
        let before = endpoint.log.calls().len();

        surface
            .choose(&endpoint, ThemeSource::Dark)
            .expect("choice should land");
        assert!(surface.current().is_dark_mode);
        assert_eq!(
            endpoint.log.calls()[before..].to_vec(),
            vec![
                "preferences.setThemeSource:dark".to_string(),
                "appearance.setThemeSource:dark".to_string(),
            ]
        );
        assert_eq!(
            endpoint.inner.get_persisted_theme_source(),
            Ok(ThemeSource::Dark)
        );
    }

    #[tokio::test]
    async fn failed_persist_keeps_optimistic_paint_and_skips_host_write() {
        let endpoint = endpoint(false, Arc::new(MemoryPreferenceStore::default()), true);
        let mut surface =
            SurfaceAppearance::start(&endpoint, false, |_dark: bool| {}).expect("startup");

        assert!(surface.choose(&endpoint, ThemeSource::Dark).is_err());
        assert!(surface.current().is_dark_mode);
        assert_eq!(
            endpoint.inner.get_snapshot().expect("snapshot").theme_source,
            ThemeSource::System
        );
    }

    #[tokio::test]
    async fn pushed_snapshots_are_applied_until_close() {
        let endpoint = endpoint(false, Arc::new(MemoryPreferenceStore::default()), false);
        let mut surface =
            SurfaceAppearance::start(&endpoint, false, |_dark: bool| {}).expect("startup");

        // Opening emission mirrors the canonical snapshot.
        let opening = surface.next_update().await;
        assert_eq!(opening, Some(surface.current()));

        endpoint.inner.appearance().oracle().report_system_theme(true);
        let pushed = tokio::time::timeout(Duration::from_secs(1), surface.next_update())
            .await
            .expect("push should arrive");
        assert_eq!(
            pushed,
            Some(AppearanceSnapshot {
                is_dark_mode: true,
                theme_source: ThemeSource::System,
            })
        );

        surface.close();
        assert_eq!(surface.next_update().await, None);
        assert_eq!(endpoint.inner.appearance().oracle().listener_count(), 0);
    }
}
