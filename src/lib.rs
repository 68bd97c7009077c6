//! Core of the SparkPilot desktop shell.
//!
//! Everything here runs without a GUI toolkit: the window registry talks to a
//! [`window_host::WindowHost`], and the appearance synchronizer is driven by a
//! [`theme_oracle::ThemeOracle`]. The Tauri binding lives in the binary behind
//! the `desktop` feature.

mod app_constants;
pub mod app_types;
pub mod appearance_sync;
pub mod appearance_types;
pub mod desktop_bridge;
pub mod errors;
pub mod logging;
pub mod preference_store;
pub mod shell_config;
pub mod subscription_hub;
pub mod surface_appearance;
pub mod theme_oracle;
pub mod tray_actions;
pub mod window_addressing;
pub mod window_host;
pub mod window_modules;
pub mod window_registry;
pub mod window_types;

#[cfg(test)]
mod fake_host;

pub use app_constants::*;
pub use app_types::{BridgeResult, OpenedWindow};
pub use appearance_sync::{
    cancel_pair, AppearanceSubscription, AppearanceSynchronizer, CancelHandle, CancelSignal,
    SubscriptionPhase,
};
pub use appearance_types::{AppearanceSnapshot, ThemeSource, ThemeSourcePayload};
pub use desktop_bridge::DesktopBridge;
pub use errors::{BridgeError, NavigationError, StorageError, SubscriptionError, WindowError};
pub use logging::{append_desktop_log, append_startup_log};
pub use preference_store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use shell_config::ShellConfig;
pub use surface_appearance::{
    adopt_persisted_preference, AppearanceEndpoint, LocalEndpoint, SurfaceAppearance,
};
pub use theme_oracle::{NativeThemeOverride, SystemAppearance, ThemeOracle};
pub use window_host::{HostWindow, WindowHost};
pub use window_registry::WindowRegistry;
pub use window_types::{WindowDescriptor, WindowId, WindowModule};
