//! Window registry and singleton controller.
//!
//! Maps window ids to their modules (in registration order) and keeps a
//! lookup-only index from id to the live native window for single-instance
//! descriptors. The host owns window lifetimes; the index entry is removed by
//! the host's close callback, never by dropping a handle.
//!
//! No lock is held while the host builds a window. A singleton being built is
//! reserved as pending, and concurrent opens of it return
//! [`WindowError::Opening`] instead of waiting.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, OnceLock, PoisonError, RwLock,
    },
};

use url::Url;

use crate::{
    appearance_sync::AppearanceSynchronizer,
    errors::WindowError,
    window_addressing::renderer_url_for,
    window_host::{HostWindow, WindowBuildRequest, WindowHost, WindowLifecycle},
    window_types::{WindowDescriptor, WindowId, WindowModule},
};

enum LiveSlot<W> {
    Pending { instance: u64 },
    Open { instance: u64, window: W },
}

impl<W> LiveSlot<W> {
    fn instance(&self) -> u64 {
        match self {
            LiveSlot::Pending { instance } | LiveSlot::Open { instance, .. } => *instance,
        }
    }
}

type LiveIndex<W> = Arc<Mutex<HashMap<WindowId, LiveSlot<W>>>>;

pub struct WindowRegistry<H: WindowHost> {
    host: Arc<H>,
    renderer_base: Url,
    appearance: Option<AppearanceSynchronizer>,
    modules: RwLock<Vec<Arc<WindowModule<H::Window>>>>,
    live: LiveIndex<H::Window>,
    next_instance: AtomicU64,
}

impl<H: WindowHost> WindowRegistry<H> {
    pub fn new(host: Arc<H>, renderer_base: Url) -> Self {
        Self {
            host,
            renderer_base,
            appearance: None,
            modules: RwLock::new(Vec::new()),
            live: Arc::new(Mutex::new(HashMap::new())),
            next_instance: AtomicU64::new(1),
        }
    }

    /// New windows pick their background from the current appearance.
    pub fn with_appearance(mut self, appearance: AppearanceSynchronizer) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Inserts or replaces the module for its id. A replaced module keeps its
    /// position; already-live windows are unaffected.
    pub fn register(&self, module: WindowModule<H::Window>) {
        let module = Arc::new(module);
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        let id = module.descriptor.id.clone();
        match modules
            .iter_mut()
            .find(|existing| existing.descriptor.id == id)
        {
            Some(existing) => {
                *existing = module;
                tracing::debug!(window.id = %id, "window module replaced");
            }
            None => {
                modules.push(module);
                tracing::debug!(window.id = %id, "window module registered");
            }
        }
    }

    pub fn is_registered(&self, id: &WindowId) -> bool {
        self.module(id).is_some()
    }

    /// Registered descriptors in registration order. Each call starts a fresh pass.
    pub fn descriptors(&self) -> std::vec::IntoIter<WindowDescriptor> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|module| module.descriptor.clone())
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn live_window(&self, id: &WindowId) -> Option<H::Window> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .and_then(|slot| match slot {
                LiveSlot::Open { window, .. } => Some(window.clone()),
                LiveSlot::Pending { .. } => None,
            })
    }

    /// Focus-or-create for single-instance descriptors, always-create otherwise.
    pub fn open(&self, id: &WindowId) -> Result<H::Window, WindowError> {
        let module = self.module(id).ok_or_else(|| {
            tracing::error!(window.id = %id, "open requested for unregistered window");
            WindowError::UnknownWindow(id.clone())
        })?;

        if !module.descriptor.single_instance {
            let instance = self.next_instance();
            return self.create_window(module, instance, format!("{id}-{instance}"));
        }

        let instance = self.next_instance();
        let existing = {
            let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
            match live.get(id) {
                Some(LiveSlot::Pending { .. }) => {
                    tracing::debug!(window.id = %id, "singleton window is still opening");
                    return Err(WindowError::Opening(id.clone()));
                }
                Some(LiveSlot::Open { window, .. }) if !window.is_destroyed() => {
                    Some(window.clone())
                }
                _ => {
                    live.insert(id.clone(), LiveSlot::Pending { instance });
                    None
                }
            }
        };

        if let Some(existing) = existing {
            focus_existing(&existing);
            tracing::debug!(window.id = %id, "focused existing singleton window");
            return Ok(existing);
        }
        self.create_window(module, instance, id.to_string())
    }

    /// Focuses a live window without ever creating one.
    pub fn focus(&self, id: &WindowId) -> Result<bool, WindowError> {
        if !self.is_registered(id) {
            tracing::error!(window.id = %id, "focus requested for unregistered window");
            return Err(WindowError::UnknownWindow(id.clone()));
        }

        match self.live_window(id) {
            Some(existing) if !existing.is_destroyed() => {
                focus_existing(&existing);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn module(&self, id: &WindowId) -> Option<Arc<WindowModule<H::Window>>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|module| &module.descriptor.id == id)
            .cloned()
    }

    fn next_instance(&self) -> u64 {
        self.next_instance.fetch_add(1, Ordering::Relaxed)
    }

    /// Builds outside every lock. A singleton's pending slot is filled on
    /// success and released on failure.
    fn create_window(
        &self,
        module: Arc<WindowModule<H::Window>>,
        instance: u64,
        label: String,
    ) -> Result<H::Window, WindowError> {
        let descriptor = &module.descriptor;
        let id = descriptor.id.clone();
        let built: Arc<OnceLock<H::Window>> = Arc::new(OnceLock::new());

        let lifecycle = WindowLifecycle {
            on_ready: {
                let module = Arc::clone(&module);
                let built = Arc::clone(&built);
                Box::new(move || {
                    let Some(window) = built.get() else {
                        return;
                    };
                    if !window.is_destroyed() {
                        window.show();
                    }
                    if let Some(hook) = &module.on_ready {
                        hook(window);
                    }
                })
            },
            on_closed: {
                let module = Arc::clone(&module);
                let live = Arc::clone(&self.live);
                let id = id.clone();
                let label = label.clone();
                Box::new(move || {
                    if module.descriptor.single_instance {
                        forget_live(&live, &id, instance);
                    }
                    tracing::debug!(window.id = %id, window.label = %label, "window closed");
                    if let Some(hook) = &module.on_closed {
                        hook();
                    }
                })
            },
        };

        let dark_background = self
            .appearance
            .as_ref()
            .map(|appearance| appearance.snapshot().is_dark_mode)
            .unwrap_or(false);
        let request = WindowBuildRequest {
            descriptor,
            label: label.clone(),
            dark_background,
        };
        let window = self
            .host
            .build_window(request, lifecycle)
            .map_err(|reason| {
                tracing::error!(window.id = %id, %reason, "failed to build window");
                if descriptor.single_instance {
                    forget_live(&self.live, &id, instance);
                }
                WindowError::Host {
                    id: id.clone(),
                    reason,
                }
            })?;
        let _ = built.set(window.clone());

        if descriptor.single_instance {
            let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = live.get_mut(&id) {
                if slot.instance() == instance {
                    *slot = LiveSlot::Open {
                        instance,
                        window: window.clone(),
                    };
                }
            }
        }

        if let Some(hook) = &module.on_before_load {
            hook(&window);
        }

        let url = renderer_url_for(&self.renderer_base, descriptor);
        if let Err(error) = self.host.navigate(&window, &url) {
            // The window shell stays usable; the user can reload it.
            tracing::warn!(window.id = %id, %error, "window navigation failed");
        }

        tracing::info!(window.id = %id, window.label = %label, "window created");
        Ok(window)
    }
}

fn focus_existing<W: HostWindow>(window: &W) {
    if window.is_minimized() {
        window.unminimize();
    }
    window.set_focus();
}

fn forget_live<W: HostWindow>(live: &LiveIndex<W>, id: &WindowId, instance: u64) {
    let mut live = live.lock().unwrap_or_else(PoisonError::into_inner);
    if live.get(id).is_some_and(|slot| slot.instance() == instance) {
        live.remove(id);
    }
}
