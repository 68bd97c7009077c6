pub const PREFERENCE_RECORD_ID: &str = "singleton";
pub const DESKTOP_STATE_FILE: &str = "desktop_state.json";
pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DEFAULT_DATA_DIR_NAME: &str = ".sparkpilot";

pub const ROOT_ENV: &str = "SPARKPILOT_ROOT";
pub const RENDERER_URL_ENV: &str = "SPARKPILOT_RENDERER_URL";
pub const LOG_FILTER_ENV: &str = "SPARKPILOT_LOG";
pub const SYSTEM_DARK_ENV: &str = "SPARKPILOT_SYSTEM_DARK";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const WINDOW_QUERY_PARAM: &str = "win";

#[cfg(target_os = "windows")]
pub const PACKAGED_RENDERER_URL: &str = "http://tauri.localhost/index.html";
#[cfg(not(target_os = "windows"))]
pub const PACKAGED_RENDERER_URL: &str = "tauri://localhost/index.html";

pub const DARK_WINDOW_BACKGROUND: (u8, u8, u8) = (0x0f, 0x0f, 0x0f);
pub const LIGHT_WINDOW_BACKGROUND: (u8, u8, u8) = (0xff, 0xff, 0xff);

pub const TRAY_ID: &str = "sparkpilot-tray";
pub const TRAY_TOOLTIP: &str = "SparkPilot";
