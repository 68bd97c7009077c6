//! Live OS appearance signal plus the runtime theme-source override.
//!
//! The oracle is the only place the active theme source lives. Every reader
//! (snapshot queries, subscriber recompute steps) goes through it, and every
//! change is published on a single-slot `watch` channel so that bursts of
//! updates coalesce into "latest state" for each listener.

use std::sync::Arc;

use tokio::sync::watch;

use crate::appearance_types::{AppearanceSnapshot, ThemeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleState {
    pub theme_source: ThemeSource,
    pub system_prefers_dark: bool,
}

impl OracleState {
    pub fn snapshot(&self) -> AppearanceSnapshot {
        AppearanceSnapshot::resolve(self.theme_source, self.system_prefers_dark)
    }
}

/// Platform hook that makes a theme-source override visible to native chrome.
pub trait NativeThemeOverride: Send + Sync {
    fn apply_theme_source(&self, theme_source: ThemeSource);
}

/// Reads the live OS appearance. `None` when the platform cannot tell.
pub trait SystemAppearance: Send + Sync {
    fn prefers_dark(&self) -> Option<bool>;
}

pub type OracleListener = watch::Receiver<OracleState>;

pub struct ThemeOracle {
    state: watch::Sender<OracleState>,
    native: Option<Arc<dyn NativeThemeOverride>>,
    system_appearance: Option<Arc<dyn SystemAppearance>>,
}

impl ThemeOracle {
    pub fn new(system_prefers_dark: bool) -> Self {
        let (state, _) = watch::channel(OracleState {
            theme_source: ThemeSource::System,
            system_prefers_dark,
        });
        Self {
            state,
            native: None,
            system_appearance: None,
        }
    }

    pub fn with_native_override(mut self, native: Arc<dyn NativeThemeOverride>) -> Self {
        self.native = Some(native);
        self
    }

    /// Seeds the OS signal from `system` and re-reads it whenever the source
    /// returns to `System`.
    pub fn with_system_appearance(mut self, system: Arc<dyn SystemAppearance>) -> Self {
        if let Some(prefers_dark) = system.prefers_dark() {
            self.state
                .send_modify(|state| state.system_prefers_dark = prefers_dark);
        }
        self.system_appearance = Some(system);
        self
    }

    pub fn state(&self) -> OracleState {
        *self.state.borrow()
    }

    pub fn theme_source(&self) -> ThemeSource {
        self.state.borrow().theme_source
    }

    pub fn system_prefers_dark(&self) -> bool {
        self.state.borrow().system_prefers_dark
    }

    /// Returns `true` when the stored source actually changed.
    ///
    /// Switching to `System` also re-reads the OS signal, published together
    /// with the source change.
    pub fn set_theme_source(&self, theme_source: ThemeSource) -> bool {
        let live_dark = match theme_source {
            ThemeSource::System => self.read_system_dark(),
            ThemeSource::Light | ThemeSource::Dark => None,
        };

        let mut source_changed = false;
        self.state.send_if_modified(|state| {
            let mut modified = false;
            if state.theme_source != theme_source {
                state.theme_source = theme_source;
                source_changed = true;
                modified = true;
            }
            if let Some(prefers_dark) = live_dark {
                if state.system_prefers_dark != prefers_dark {
                    state.system_prefers_dark = prefers_dark;
                    modified = true;
                }
            }
            modified
        });

        if source_changed {
            tracing::debug!(theme.source = %theme_source, "theme source override changed");
            if let Some(native) = &self.native {
                native.apply_theme_source(theme_source);
            }
        }
        source_changed
    }

    /// Feeds the OS dark-mode signal. Returns `true` when it changed.
    pub fn report_system_theme(&self, prefers_dark: bool) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if state.system_prefers_dark == prefers_dark {
                return false;
            }
            state.system_prefers_dark = prefers_dark;
            true
        });

        if changed {
            tracing::debug!(system.dark = prefers_dark, "os appearance signal changed");
        }
        changed
    }

    /// Re-reads the OS signal. `None` when no reader is attached or it could
    /// not tell; otherwise whether the mirrored value changed.
    pub fn refresh_system_theme(&self) -> Option<bool> {
        self.read_system_dark()
            .map(|prefers_dark| self.report_system_theme(prefers_dark))
    }

    fn read_system_dark(&self) -> Option<bool> {
        self.system_appearance
            .as_ref()
            .and_then(|system| system.prefers_dark())
    }

    /// Registers a listener. Dropping the returned receiver deregisters it.
    pub fn listen(&self) -> OracleListener {
        self.state.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.state.receiver_count()
    }
}

impl Default for ThemeOracle {
    fn default() -> Self {
        Self::new(false)
    }
}
