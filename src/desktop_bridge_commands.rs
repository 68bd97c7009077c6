use sparkpilot_desktop::{
    subscription_hub::{AppearanceStreamEvent, SnapshotSink, SubscriptionId},
    AppearanceSnapshot, BridgeError, BridgeResult, OpenedWindow, ThemeSource, ThemeSourcePayload,
    WindowDescriptor, WindowId,
};
use tauri::{ipc::Channel, State, WebviewWindow};

use crate::ShellBridge;

struct ChannelSink(Channel<AppearanceStreamEvent>);

impl SnapshotSink for ChannelSink {
    fn send(&self, event: AppearanceStreamEvent) -> Result<(), String> {
        self.0.send(event).map_err(|error| error.to_string())
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_appearance_get_snapshot(
    bridge: State<'_, ShellBridge>,
) -> AppearanceSnapshot {
    bridge.appearance_get_snapshot()
}

#[tauri::command]
pub(crate) fn desktop_bridge_appearance_set_theme_source(
    bridge: State<'_, ShellBridge>,
    theme_source: ThemeSource,
) -> AppearanceSnapshot {
    bridge.appearance_set_theme_source(ThemeSourcePayload { theme_source })
}

#[tauri::command]
pub(crate) fn desktop_bridge_appearance_on_changed(
    webview_window: WebviewWindow,
    bridge: State<'_, ShellBridge>,
    on_event: Channel<AppearanceStreamEvent>,
) -> SubscriptionId {
    bridge.appearance_on_changed(webview_window.label(), ChannelSink(on_event))
}

#[tauri::command]
pub(crate) fn desktop_bridge_appearance_unsubscribe(
    bridge: State<'_, ShellBridge>,
    subscription_id: SubscriptionId,
) -> bool {
    bridge.appearance_unsubscribe(subscription_id)
}

#[tauri::command]
pub(crate) fn desktop_bridge_preferences_get_theme_source(
    bridge: State<'_, ShellBridge>,
) -> Result<ThemeSourcePayload, BridgeError> {
    bridge.preferences_get_theme_source()
}

#[tauri::command]
pub(crate) fn desktop_bridge_preferences_set_theme_source(
    bridge: State<'_, ShellBridge>,
    theme_source: ThemeSource,
) -> Result<BridgeResult, BridgeError> {
    bridge.preferences_set_theme_source(ThemeSourcePayload { theme_source })
}

#[tauri::command]
pub(crate) fn desktop_bridge_windows_list(bridge: State<'_, ShellBridge>) -> Vec<WindowDescriptor> {
    bridge.windows_list()
}

// Window creation from a synchronous command deadlocks on Windows.
#[tauri::command]
pub(crate) async fn desktop_bridge_windows_open(
    bridge: State<'_, ShellBridge>,
    id: WindowId,
) -> Result<OpenedWindow, BridgeError> {
    bridge.windows_open(id)
}

#[tauri::command]
pub(crate) fn desktop_bridge_windows_focus(
    bridge: State<'_, ShellBridge>,
    id: WindowId,
) -> Result<bool, BridgeError> {
    bridge.windows_focus(id)
}
