use sparkpilot_desktop::tray_actions::{self, TrayMenuAction};
use tauri::{AppHandle, Manager};

use crate::{append_desktop_log, window_actions, ShellBridge};

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match tray_actions::action_from_menu_id(menu_id) {
        Some(TrayMenuAction::OpenWindow(id)) => {
            window_actions::open_window(app_handle, &id, append_desktop_log)
        }
        Some(TrayMenuAction::Quit) => {
            if let Some(bridge) = app_handle.try_state::<ShellBridge>() {
                bridge.subscriptions().shutdown();
            }
            append_desktop_log("tray quit requested, exiting desktop process");
            app_handle.exit(0);
        }
        None => append_desktop_log(&format!("ignoring unknown tray menu id: {menu_id}")),
    }
}
