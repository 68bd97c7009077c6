use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc, Arc, Mutex,
};

use url::Url;

use crate::{
    errors::NavigationError,
    window_host::{HostWindow, WindowBuildRequest, WindowHost, WindowLifecycle},
};

#[derive(Debug, Default)]
struct FakeWindowState {
    label: String,
    dark_background: bool,
    destroyed: AtomicBool,
    minimized: AtomicBool,
    visible: AtomicBool,
    focus_count: AtomicUsize,
    unminimize_count: AtomicUsize,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeWindow {
    state: Arc<FakeWindowState>,
}

impl FakeWindow {
    pub(crate) fn set_minimized(&self, minimized: bool) {
        self.state.minimized.store(minimized, Ordering::SeqCst);
    }

    pub(crate) fn mark_destroyed(&self) {
        self.state.destroyed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.state.visible.load(Ordering::SeqCst)
    }

    pub(crate) fn focus_count(&self) -> usize {
        self.state.focus_count.load(Ordering::SeqCst)
    }

    pub(crate) fn unminimize_count(&self) -> usize {
        self.state.unminimize_count.load(Ordering::SeqCst)
    }

    pub(crate) fn dark_background(&self) -> bool {
        self.state.dark_background
    }
}

impl HostWindow for FakeWindow {
    fn label(&self) -> String {
        self.state.label.clone()
    }

    fn is_destroyed(&self) -> bool {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    fn is_minimized(&self) -> bool {
        self.state.minimized.load(Ordering::SeqCst)
    }

    fn unminimize(&self) {
        self.state.minimized.store(false, Ordering::SeqCst);
        self.state.unminimize_count.fetch_add(1, Ordering::SeqCst);
    }

    fn show(&self) {
        self.state.visible.store(true, Ordering::SeqCst);
    }

    fn set_focus(&self) {
        self.state.focus_count.fetch_add(1, Ordering::SeqCst);
    }
}

struct BuiltWindow {
    window: FakeWindow,
    on_ready: Option<Box<dyn FnOnce() + Send>>,
    on_closed: Option<Box<dyn FnOnce() + Send>>,
}

struct BuildGate {
    started: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

/// In-memory window host that records what the registry asked it to do.
#[derive(Default)]
pub(crate) struct FakeHost {
    built: Mutex<Vec<BuiltWindow>>,
    navigations: Mutex<Vec<(String, Url)>>,
    fail_navigation: AtomicBool,
    fail_build: AtomicBool,
    gate: Mutex<Option<BuildGate>>,
}

impl FakeHost {
    /// Makes the next build block, like a native build waiting on a busy UI
    /// thread. Returns a receiver that fires once the build has started and a
    /// sender that lets it finish.
    pub(crate) fn hold_next_build(&self) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (started, started_rx) = mpsc::channel();
        let (release_tx, release) = mpsc::channel();
        *self.gate.lock().expect("fake host lock") = Some(BuildGate { started, release });
        (started_rx, release_tx)
    }

    pub(crate) fn built_labels(&self) -> Vec<String> {
        self.built
            .lock()
            .expect("fake host lock")
            .iter()
            .map(|built| built.window.label())
            .collect()
    }

    pub(crate) fn navigations(&self) -> Vec<(String, Url)> {
        self.navigations.lock().expect("fake host lock").clone()
    }

    pub(crate) fn fail_navigation(&self, fail: bool) {
        self.fail_navigation.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_build(&self, fail: bool) {
        self.fail_build.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fire_ready(&self, window: &FakeWindow) {
        let hook = self.take_hook(window, |built| built.on_ready.take());
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Destroys the window the way a user closing it would.
    pub(crate) fn close(&self, window: &FakeWindow) {
        window.mark_destroyed();
        let hook = self.take_hook(window, |built| built.on_closed.take());
        if let Some(hook) = hook {
            hook();
        }
    }

    fn take_hook(
        &self,
        window: &FakeWindow,
        take: impl FnOnce(&mut BuiltWindow) -> Option<Box<dyn FnOnce() + Send>>,
    ) -> Option<Box<dyn FnOnce() + Send>> {
        let mut built = self.built.lock().expect("fake host lock");
        built
            .iter_mut()
            .find(|built| Arc::ptr_eq(&built.window.state, &window.state))
            .and_then(take)
    }
}

impl WindowHost for FakeHost {
    type Window = FakeWindow;

    fn build_window(
        &self,
        request: WindowBuildRequest<'_>,
        lifecycle: WindowLifecycle,
    ) -> Result<Self::Window, String> {
        let gate = self.gate.lock().expect("fake host lock").take();
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.recv();
        }
        if self.fail_build.load(Ordering::SeqCst) {
            return Err("window creation refused".to_string());
        }

        let window = FakeWindow {
            state: Arc::new(FakeWindowState {
                label: request.label,
                dark_background: request.dark_background,
                ..FakeWindowState::default()
            }),
        };
        self.built.lock().expect("fake host lock").push(BuiltWindow {
            window: window.clone(),
            on_ready: Some(lifecycle.on_ready),
            on_closed: Some(lifecycle.on_closed),
        });
        Ok(window)
    }

    fn navigate(&self, window: &Self::Window, url: &Url) -> Result<(), NavigationError> {
        if self.fail_navigation.load(Ordering::SeqCst) {
            return Err(NavigationError {
                url: url.to_string(),
                reason: "content unavailable".to_string(),
            });
        }
        self.navigations
            .lock()
            .expect("fake host lock")
            .push((window.label(), url.clone()));
        Ok(())
    }
}
