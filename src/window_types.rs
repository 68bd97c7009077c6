use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDescriptor {
    pub id: WindowId,
    pub title: String,
    pub menu_label: String,
    pub single_instance: bool,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    /// Initial fragment handed to the window content alongside its id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

pub type WindowHook<W> = Arc<dyn Fn(&W) + Send + Sync>;
pub type ClosedHook = Arc<dyn Fn() + Send + Sync>;

pub struct WindowModule<W> {
    pub descriptor: WindowDescriptor,
    pub on_before_load: Option<WindowHook<W>>,
    pub on_ready: Option<WindowHook<W>>,
    pub on_closed: Option<ClosedHook>,
}

impl<W> WindowModule<W> {
    pub fn new(descriptor: WindowDescriptor) -> Self {
        Self {
            descriptor,
            on_before_load: None,
            on_ready: None,
            on_closed: None,
        }
    }

    pub fn on_before_load(mut self, hook: impl Fn(&W) + Send + Sync + 'static) -> Self {
        self.on_before_load = Some(Arc::new(hook));
        self
    }

    pub fn on_ready(mut self, hook: impl Fn(&W) + Send + Sync + 'static) -> Self {
        self.on_ready = Some(Arc::new(hook));
        self
    }

    pub fn on_closed(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_closed = Some(Arc::new(hook));
        self
    }
}

impl<W> fmt::Debug for WindowModule<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowModule")
            .field("descriptor", &self.descriptor)
            .field("on_before_load", &self.on_before_load.is_some())
            .field("on_ready", &self.on_ready.is_some())
            .field("on_closed", &self.on_closed.is_some())
            .finish()
    }
}
