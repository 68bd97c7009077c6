use url::Url;

use crate::{errors::NavigationError, window_types::WindowDescriptor};

/// A live native window. The host owns its lifetime; the registry only looks it up.
pub trait HostWindow: Clone + Send + Sync + 'static {
    fn label(&self) -> String;
    fn is_destroyed(&self) -> bool;
    fn is_minimized(&self) -> bool;
    fn unminimize(&self);
    fn show(&self);
    fn set_focus(&self);
}

pub struct WindowBuildRequest<'a> {
    pub descriptor: &'a WindowDescriptor,
    pub label: String,
    pub dark_background: bool,
}

/// Callbacks the host fires for a window it built.
pub struct WindowLifecycle {
    pub on_ready: Box<dyn FnOnce() + Send>,
    pub on_closed: Box<dyn FnOnce() + Send>,
}

/// Window creation primitive: size, chrome, preload and isolation are the host's concern.
pub trait WindowHost: Send + Sync + 'static {
    type Window: HostWindow;

    /// Builds a hidden window that has not started loading content yet.
    fn build_window(
        &self,
        request: WindowBuildRequest<'_>,
        lifecycle: WindowLifecycle,
    ) -> Result<Self::Window, String>;

    fn navigate(&self, window: &Self::Window, url: &Url) -> Result<(), NavigationError>;
}
