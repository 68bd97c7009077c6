use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use sparkpilot_desktop::{
    errors::NavigationError,
    window_host::{HostWindow, WindowBuildRequest, WindowHost, WindowLifecycle},
    NativeThemeOverride, SystemAppearance, ThemeSource, DARK_WINDOW_BACKGROUND, LIGHT_WINDOW_BACKGROUND,
};
use tauri::{
    webview::PageLoadEvent, window::Color, AppHandle, Theme, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, WindowEvent,
};
use url::Url;

use crate::append_desktop_log;

const BLANK_PAGE: &str = "about:blank";

type Callback = Mutex<Option<Box<dyn FnOnce() + Send>>>;

fn take_and_run(callback: &Callback) {
    let callback = callback
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(callback) = callback {
        callback();
    }
}

#[derive(Clone)]
pub struct TauriWindow {
    window: WebviewWindow,
    destroyed: Arc<AtomicBool>,
}

impl HostWindow for TauriWindow {
    fn label(&self) -> String {
        self.window.label().to_string()
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn is_minimized(&self) -> bool {
        self.window.is_minimized().unwrap_or(false)
    }

    fn unminimize(&self) {
        if let Err(error) = self.window.unminimize() {
            append_desktop_log(&format!(
                "failed to unminimize window {}: {error}",
                self.window.label()
            ));
        }
    }

    fn show(&self) {
        if let Err(error) = self.window.show() {
            append_desktop_log(&format!("failed to show window {}: {error}", self.window.label()));
        }
    }

    fn set_focus(&self) {
        if let Err(error) = self.window.set_focus() {
            append_desktop_log(&format!("failed to focus window {}: {error}", self.window.label()));
        }
    }
}

pub struct TauriHost {
    app_handle: AppHandle,
}

impl TauriHost {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl WindowHost for TauriHost {
    type Window = TauriWindow;

    fn build_window(
        &self,
        request: WindowBuildRequest<'_>,
        lifecycle: WindowLifecycle,
    ) -> Result<TauriWindow, String> {
        let descriptor = request.descriptor;
        let blank = Url::parse(BLANK_PAGE).map_err(|error| format!("Invalid blank URL: {error}"))?;
        let (r, g, b) = if request.dark_background {
            DARK_WINDOW_BACKGROUND
        } else {
            LIGHT_WINDOW_BACKGROUND
        };

        let on_ready: Arc<Callback> = Arc::new(Mutex::new(Some(lifecycle.on_ready)));
        let on_closed: Callback = Mutex::new(Some(lifecycle.on_closed));
        let destroyed = Arc::new(AtomicBool::new(false));

        let mut builder = WebviewWindowBuilder::new(
            &self.app_handle,
            request.label.as_str(),
            WebviewUrl::External(blank),
        )
        .title(&descriptor.title)
        .inner_size(f64::from(descriptor.width), f64::from(descriptor.height))
        .background_color(Color(r, g, b, 255))
        .visible(false)
        .on_page_load(move |_webview, payload| {
            if payload.event() == PageLoadEvent::Finished && payload.url().as_str() != BLANK_PAGE {
                take_and_run(&on_ready);
            }
        });
        if descriptor.min_width.is_some() || descriptor.min_height.is_some() {
            builder = builder.min_inner_size(
                f64::from(descriptor.min_width.unwrap_or(0)),
                f64::from(descriptor.min_height.unwrap_or(0)),
            );
        }
        #[cfg(target_os = "macos")]
        let builder = builder
            .title_bar_style(tauri::TitleBarStyle::Overlay)
            .hidden_title(true);

        let window = builder
            .build()
            .map_err(|error| format!("Failed to build window {}: {error}", request.label))?;

        let destroyed_flag = Arc::clone(&destroyed);
        window.on_window_event(move |event| {
            if let WindowEvent::Destroyed = event {
                destroyed_flag.store(true, Ordering::SeqCst);
                take_and_run(&on_closed);
            }
        });

        Ok(TauriWindow { window, destroyed })
    }

    fn navigate(&self, window: &TauriWindow, url: &Url) -> Result<(), NavigationError> {
        window
            .window
            .navigate(url.clone())
            .map_err(|error| NavigationError {
                url: url.to_string(),
                reason: error.to_string(),
            })
    }
}

/// Pushes theme-source overrides to native chrome for every window.
pub struct TauriThemeOverride {
    app_handle: AppHandle,
}

impl TauriThemeOverride {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl NativeThemeOverride for TauriThemeOverride {
    fn apply_theme_source(&self, theme_source: ThemeSource) {
        let theme = match theme_source {
            ThemeSource::System => None,
            ThemeSource::Light => Some(Theme::Light),
            ThemeSource::Dark => Some(Theme::Dark),
        };
        self.app_handle.set_theme(theme);
    }
}

/// Reads the desktop appearance directly, independent of any forced window theme.
pub struct OsAppearance;

impl SystemAppearance for OsAppearance {
    fn prefers_dark(&self) -> Option<bool> {
        match dark_light::detect() {
            dark_light::Mode::Dark => Some(true),
            dark_light::Mode::Light => Some(false),
            dark_light::Mode::Default => None,
        }
    }
}
