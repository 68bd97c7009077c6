use std::sync::Arc;

use sparkpilot_desktop::{
    adopt_persisted_preference, logging, subscription_hub::SubscriptionHub,
    window_addressing::window_id_from_url, window_modules::register_builtin_windows,
    AppearanceSynchronizer, DesktopBridge, JsonPreferenceStore, MemoryPreferenceStore,
    PreferenceStore, ShellConfig, ThemeOracle, ThemeSource, WindowRegistry,
};
use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, Theme, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log,
    tauri_host::{OsAppearance, TauriHost, TauriThemeOverride},
    tray_setup, window_actions, ShellBridge,
};

fn build_bridge(app_handle: &AppHandle, config: &ShellConfig) -> ShellBridge {
    let oracle = ThemeOracle::new(config.initial_system_dark)
        .with_system_appearance(Arc::new(OsAppearance))
        .with_native_override(Arc::new(TauriThemeOverride::new(app_handle.clone())));
    let appearance = AppearanceSynchronizer::new(Arc::new(oracle));

    let preferences: Arc<dyn PreferenceStore> = match config.root_dir() {
        Some(root_dir) => Arc::new(JsonPreferenceStore::in_root_dir(root_dir)),
        None => {
            append_startup_log("no data directory resolved, preferences will not persist");
            Arc::new(MemoryPreferenceStore::default())
        }
    };

    let registry = WindowRegistry::new(
        Arc::new(TauriHost::new(app_handle.clone())),
        config.renderer_base.clone(),
    )
    .with_appearance(appearance.clone());
    register_builtin_windows(&registry);

    let runtime = tauri::async_runtime::handle().inner().clone();
    let subscriptions = SubscriptionHub::new(appearance.clone(), runtime);
    DesktopBridge::new(appearance, preferences, Arc::new(registry), subscriptions)
}

/// Prefers a direct OS read. The window theme is only a fallback, and only
/// counts while no override is forcing native chrome.
fn report_window_theme(app_handle: &AppHandle, theme: Option<Theme>) {
    let Some(bridge) = app_handle.try_state::<ShellBridge>() else {
        return;
    };
    let oracle = bridge.appearance().oracle();
    if oracle.refresh_system_theme().is_some() {
        return;
    }
    if let Some(theme) = theme {
        if oracle.theme_source() == ThemeSource::System {
            oracle.report_system_theme(theme == Theme::Dark);
        }
    }
}

pub(crate) fn run() {
    let config = ShellConfig::from_env();
    let log_path = logging::init_logging(&config);

    append_startup_log("desktop process starting");
    if let Some(log_path) = &log_path {
        append_startup_log(&format!("desktop log path: {}", log_path.display()));
    }
    append_startup_log(&format!("renderer base url: {}", config.renderer_base));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            window_actions::focus_first_open_window(app, append_desktop_log);
        }))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_appearance_get_snapshot,
            crate::desktop_bridge_commands::desktop_bridge_appearance_set_theme_source,
            crate::desktop_bridge_commands::desktop_bridge_appearance_on_changed,
            crate::desktop_bridge_commands::desktop_bridge_appearance_unsubscribe,
            crate::desktop_bridge_commands::desktop_bridge_preferences_get_theme_source,
            crate::desktop_bridge_commands::desktop_bridge_preferences_set_theme_source,
            crate::desktop_bridge_commands::desktop_bridge_windows_list,
            crate::desktop_bridge_commands::desktop_bridge_windows_open,
            crate::desktop_bridge_commands::desktop_bridge_windows_focus,
        ])
        .on_window_event(|window, event| match event {
            WindowEvent::ThemeChanged(theme) => {
                report_window_theme(window.app_handle(), Some(*theme))
            }
            // Catches OS flips that arrived while a forced theme hid them.
            WindowEvent::Focused(true) => report_window_theme(window.app_handle(), None),
            WindowEvent::Destroyed => {
                if let Some(bridge) = window.app_handle().try_state::<ShellBridge>() {
                    bridge.surface_closed(window.label());
                }
            }
            _ => {}
        })
        .on_page_load(|webview, payload| {
            if payload.event() != PageLoadEvent::Finished {
                return;
            }
            match window_id_from_url(payload.url()) {
                Some(id) => append_desktop_log(&format!("page-load finished for window {id}")),
                None => append_desktop_log(&format!("page-load finished: {}", payload.url())),
            }
            report_window_theme(webview.app_handle(), webview.window().theme().ok());
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            app.manage(build_bridge(&app_handle, &config));

            let bridge = app_handle.state::<ShellBridge>();
            let adopted = adopt_persisted_preference(bridge.inner(), |persisted| {
                append_startup_log(&format!("restoring persisted theme source: {persisted}"));
            });
            if adopted.is_none() {
                append_startup_log("persisted theme source unavailable, keeping system theme");
            }

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            // Closing the last window keeps the tray alive; only an explicit
            // exit carries a code.
            RunEvent::ExitRequested { code: None, api, .. } => api.prevent_exit(),
            RunEvent::Exit => {
                if let Some(bridge) = app_handle.try_state::<ShellBridge>() {
                    bridge.subscriptions().shutdown();
                }
                append_desktop_log("desktop process exiting");
            }
            _ => {}
        });
}
