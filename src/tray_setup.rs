use sparkpilot_desktop::{
    tray_actions::{self, TrayMenuEntry},
    window_modules::SETTINGS_WINDOW,
    WindowId,
};
use tauri::{
    menu::{IsMenuItem, Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager, Wry,
};

use crate::{
    append_desktop_log, tray_menu_handler, window_actions, ShellBridge, TRAY_ID, TRAY_TOOLTIP,
};

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let descriptors = app_handle
        .try_state::<ShellBridge>()
        .map(|bridge| bridge.windows_list())
        .ok_or_else(|| "Shell state is not managed yet.".to_string())?;

    let mut items: Vec<Box<dyn IsMenuItem<Wry>>> = Vec::new();
    for entry in tray_actions::tray_menu_entries(descriptors) {
        match entry {
            TrayMenuEntry::Item { menu_id, label } => {
                let item = MenuItem::with_id(app_handle, menu_id.as_str(), &label, true, None::<&str>)
                    .map_err(|error| {
                        format!("Failed to create tray menu item {menu_id}: {error}")
                    })?;
                items.push(Box::new(item));
            }
            TrayMenuEntry::Separator => {
                let separator = PredefinedMenuItem::separator(app_handle).map_err(|error| {
                    format!("Failed to create tray separator menu item: {error}")
                })?;
                items.push(Box::new(separator));
            }
        }
    }
    let item_refs: Vec<&dyn IsMenuItem<Wry>> = items.iter().map(|item| item.as_ref()).collect();
    let menu = Menu::with_items(app_handle, &item_refs)
        .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(TRAY_TOOLTIP)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                window_actions::open_window(
                    tray.app_handle(),
                    &WindowId::from(SETTINGS_WINDOW),
                    append_desktop_log,
                );
            }
        });
    if let Some(icon) = app_handle.default_window_icon().cloned() {
        tray_builder = tray_builder.icon(icon);
    }

    #[cfg(target_os = "macos")]
    let tray_builder = tray_builder.icon_as_template(true);

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;
    Ok(())
}
