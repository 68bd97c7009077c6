use sparkpilot_desktop::{errors::WindowError, window_host::HostWindow, WindowId};
use tauri::{AppHandle, Manager};

use crate::ShellBridge;

pub fn open_window<F>(app_handle: &AppHandle, id: &WindowId, log: F)
where
    F: Fn(&str),
{
    let Some(bridge) = app_handle.try_state::<ShellBridge>() else {
        log(&format!("open_window skipped: shell not ready for {id}"));
        return;
    };

    match bridge.windows().open(id) {
        Ok(window) => log(&format!("window ready: id={id} label={}", window.label())),
        Err(WindowError::Opening(_)) => log(&format!("window {id} is already opening")),
        Err(error) => log(&format!("failed to open window {id}: {error}")),
    }
}

/// Brings the first open singleton forward, or opens the first registered
/// window when none is open.
pub fn focus_first_open_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(bridge) = app_handle.try_state::<ShellBridge>() else {
        log("focus_first_open_window skipped: shell not ready");
        return;
    };

    let mut first_registered = None;
    for descriptor in bridge.windows().descriptors() {
        if first_registered.is_none() {
            first_registered = Some(descriptor.id.clone());
        }
        if let Ok(true) = bridge.windows().focus(&descriptor.id) {
            log(&format!("second instance focused window {}", descriptor.id));
            return;
        }
    }

    match first_registered {
        Some(id) => open_window(app_handle, &id, log),
        None => log("focus_first_open_window skipped: no windows registered"),
    }
}
