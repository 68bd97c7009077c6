use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use sparkpilot_desktop::{
    AppearanceEndpoint, AppearanceSnapshot, AppearanceSynchronizer, JsonPreferenceStore,
    LocalEndpoint, MemoryPreferenceStore, PreferenceStore, SurfaceAppearance, SystemAppearance,
    ThemeOracle, ThemeSource,
};

/// Desktop appearance that flips without any window noticing.
#[derive(Default)]
struct Desktop {
    dark: AtomicBool,
}

impl SystemAppearance for Desktop {
    fn prefers_dark(&self) -> Option<bool> {
        Some(self.dark.load(Ordering::SeqCst))
    }
}

fn local_endpoint(system_dark: bool, preferences: Arc<dyn PreferenceStore>) -> LocalEndpoint {
    let appearance = AppearanceSynchronizer::new(Arc::new(ThemeOracle::new(system_dark)));
    LocalEndpoint::new(appearance, preferences)
}

fn painted_log() -> (Arc<Mutex<Vec<bool>>>, impl FnMut(bool)) {
    let painted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&painted);
    (painted, move |dark: bool| sink.lock().expect("painted").push(dark))
}

#[tokio::test]
async fn persisted_dark_preference_wins_over_light_os() {
    let endpoint = local_endpoint(
        false,
        Arc::new(MemoryPreferenceStore::with_theme_source(ThemeSource::Dark)),
    );
    let (painted, presentation) = painted_log();
    let mut surface = SurfaceAppearance::start(&endpoint, false, presentation).expect("startup");

    // Dark is painted before the canonical snapshot arrives.
    assert!(painted.lock().expect("painted")[1]);
    assert_eq!(
        surface.current(),
        AppearanceSnapshot {
            is_dark_mode: true,
            theme_source: ThemeSource::Dark,
        }
    );

    // Opening emission.
    let opening = surface.next_update().await;
    assert_eq!(opening, Some(surface.current()));

    // The OS turning dark changes the mirrored signal but not the snapshot.
    assert!(endpoint.appearance().oracle().report_system_theme(true));
    assert!(endpoint.appearance().oracle().system_prefers_dark());
    let no_change = tokio::time::timeout(Duration::from_millis(50), surface.next_update()).await;
    assert!(no_change.is_err(), "identical snapshot must not be re-emitted");
    assert_eq!(
        endpoint.get_snapshot().expect("snapshot"),
        AppearanceSnapshot {
            is_dark_mode: true,
            theme_source: ThemeSource::Dark,
        }
    );
}

#[tokio::test]
async fn system_source_tracks_os_flip_without_a_write() {
    let endpoint = local_endpoint(false, Arc::new(MemoryPreferenceStore::default()));
    let (_painted, presentation) = painted_log();
    let mut surface = SurfaceAppearance::start(&endpoint, false, presentation).expect("startup");
    surface.next_update().await;

    surface
        .choose(&endpoint, ThemeSource::System)
        .expect("choice should land");
    assert_eq!(
        endpoint.get_snapshot().expect("snapshot"),
        AppearanceSnapshot {
            is_dark_mode: false,
            theme_source: ThemeSource::System,
        }
    );

    endpoint.appearance().oracle().report_system_theme(true);
    let pushed = tokio::time::timeout(Duration::from_secs(1), surface.next_update())
        .await
        .expect("push should arrive");
    assert_eq!(
        pushed,
        Some(AppearanceSnapshot {
            is_dark_mode: true,
            theme_source: ThemeSource::System,
        })
    );
    assert!(surface.current().is_dark_mode);
}

#[tokio::test]
async fn choice_survives_a_restart_through_the_state_file() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let store: Arc<dyn PreferenceStore> = Arc::new(JsonPreferenceStore::in_root_dir(dir.path()));
        let endpoint = local_endpoint(false, store);
        let (_painted, presentation) = painted_log();
        let mut surface =
            SurfaceAppearance::start(&endpoint, false, presentation).expect("first run");
        surface
            .choose(&endpoint, ThemeSource::Light)
            .expect("choice should land");
    }

    // Second process: OS is dark now, but the persisted Light choice holds.
    let store: Arc<dyn PreferenceStore> = Arc::new(JsonPreferenceStore::in_root_dir(dir.path()));
    let endpoint = local_endpoint(true, store);
    let (_painted, presentation) = painted_log();
    let surface = SurfaceAppearance::start(&endpoint, true, presentation).expect("second run");
    assert_eq!(
        surface.current(),
        AppearanceSnapshot {
            is_dark_mode: false,
            theme_source: ThemeSource::Light,
        }
    );
}

#[tokio::test]
async fn closing_one_surface_leaves_the_other_subscribed() {
    let endpoint = local_endpoint(false, Arc::new(MemoryPreferenceStore::default()));
    let (_a, first_presentation) = painted_log();
    let (_b, second_presentation) = painted_log();
    let mut first =
        SurfaceAppearance::start(&endpoint, false, first_presentation).expect("first surface");
    let mut second =
        SurfaceAppearance::start(&endpoint, false, second_presentation).expect("second surface");
    first.next_update().await;
    second.next_update().await;

    first.close();
    let expected = endpoint
        .set_theme_source(ThemeSource::Dark)
        .expect("host write");

    assert_eq!(first.next_update().await, None);
    let pushed = tokio::time::timeout(Duration::from_secs(1), second.next_update())
        .await
        .expect("push should arrive");
    assert_eq!(pushed, Some(expected));
    assert_eq!(endpoint.appearance().oracle().listener_count(), 1);
}

#[tokio::test]
async fn os_flip_during_forced_source_shows_up_when_returning_to_system() {
    let desktop = Arc::new(Desktop::default());
    let oracle = ThemeOracle::new(false).with_system_appearance(desktop.clone());
    let endpoint = LocalEndpoint::new(
        AppearanceSynchronizer::new(Arc::new(oracle)),
        Arc::new(MemoryPreferenceStore::with_theme_source(ThemeSource::Dark)),
    );
    let (_painted, presentation) = painted_log();
    let mut surface = SurfaceAppearance::start(&endpoint, false, presentation).expect("startup");
    surface.next_update().await;

    // The OS turns dark while Dark is forced; nothing reports it.
    desktop.dark.store(true, Ordering::SeqCst);

    surface
        .choose(&endpoint, ThemeSource::System)
        .expect("choice should land");
    let expected = AppearanceSnapshot {
        is_dark_mode: true,
        theme_source: ThemeSource::System,
    };
    assert_eq!(endpoint.get_snapshot().expect("snapshot"), expected);
    let pushed = tokio::time::timeout(Duration::from_secs(1), surface.next_update())
        .await
        .expect("push should arrive");
    assert_eq!(pushed, Some(expected));
    assert!(surface.current().is_dark_mode);
}
