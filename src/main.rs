#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_runtime;
mod desktop_bridge_commands;
mod tauri_host;
mod tray_menu_handler;
mod tray_setup;
mod window_actions;

pub(crate) use sparkpilot_desktop::{append_desktop_log, append_startup_log, TRAY_ID, TRAY_TOOLTIP};

pub(crate) type ShellBridge = sparkpilot_desktop::DesktopBridge<tauri_host::TauriHost>;

fn main() {
    app_runtime::run();
}
