//! The async shell around `ViewportReducer`.

use std::sync::Arc;

use mapchat_common::{Coordinates, MapStyle, MapViewState, ViewportSettings};
use mapchat_links::NavigateFn;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ResolveError;
use crate::reducer::{Transition, ViewportEvent, ViewportReducer};
use crate::resolver::NameResolver;
use crate::surface::{DetachedSurface, MapSurface};

/// Result of handing an event to the reconciler.
#[derive(Debug)]
pub struct Dispatched {
    /// What the event did to the state, synchronously.
    pub transition: Transition,
    /// The place-name lookup the event started, if any. Resolves to the transition the
    /// lookup result caused (`Stale` when the view moved on in the meantime).
    pub lookup: Option<JoinHandle<Transition>>,
}

impl Dispatched {
    /// Wait for the background lookup, if one was started. A lookup task that panicked or
    /// was cancelled is logged and reported as `None`.
    pub async fn settle(self) -> Option<Transition> {
        let handle = self.lookup?;
        match handle.await {
            Ok(transition) => Some(transition),
            Err(e) => {
                warn!(error = %e, "Place name lookup task did not complete");
                None
            }
        }
    }
}

/// Owns the authoritative `MapViewState` for one session.
///
/// State lives in a `watch` channel: every transition runs inside `send_if_modified`, so
/// writers are serialized and a completing lookup always compares against the latest
/// center, never a snapshot taken when it was issued. Cloning yields another handle to
/// the same state.
///
/// Lookups are spawned on the tokio runtime that was current when the reconciler was
/// built, or the one given to `with_runtime`, so the entry points can be called from any
/// thread. Without a runtime, state still updates but no lookups are started.
#[derive(Clone)]
pub struct ViewportReconciler {
    state: Arc<watch::Sender<MapViewState>>,
    reducer: Arc<ViewportReducer>,
    resolver: Arc<dyn NameResolver>,
    surface: Arc<dyn MapSurface>,
    runtime: Option<Handle>,
}

impl ViewportReconciler {
    pub fn new(
        initial: MapViewState,
        settings: ViewportSettings,
        resolver: Arc<dyn NameResolver>,
    ) -> Self {
        let reducer = ViewportReducer::new(settings);
        let mut initial = initial;
        initial.zoom = reducer.settings().clamp_zoom(initial.zoom);
        let (state, _) = watch::channel(initial);

        Self {
            state: Arc::new(state),
            reducer: Arc::new(reducer),
            resolver,
            surface: Arc::new(DetachedSurface),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Run lookups on `runtime` instead of the runtime current at construction.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Attach the rendering surface that programmatic changes are pushed to.
    pub fn with_surface(mut self, surface: Arc<dyn MapSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn settings(&self) -> &ViewportSettings {
        self.reducer.settings()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> MapViewState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<MapViewState> {
        self.state.subscribe()
    }

    /// The map surface reported a pan or zoom.
    pub fn viewport_changed(&self, center: Coordinates, zoom: f64) -> Dispatched {
        let (transition, _) = self.apply(&ViewportEvent::ViewportChanged { center, zoom });
        if transition.is_applied() {
            debug!(lat = center.lat, lng = center.lng, zoom, "Viewport moved");
        }
        self.follow_up(transition)
    }

    /// Jump to `center`, keeping the current zoom when `zoom` is `None`.
    pub fn navigate_to(&self, center: Coordinates, zoom: Option<f64>) -> Dispatched {
        let (transition, view) = self.apply(&ViewportEvent::NavigateTo { center, zoom });
        if let Some((center, zoom)) = view {
            info!(lat = center.lat, lng = center.lng, zoom, "Navigating");
            self.surface.set_view(center, zoom);
        }
        self.follow_up(transition)
    }

    pub fn set_map_style(&self, style: MapStyle) -> Transition {
        let (transition, _) = self.apply(&ViewportEvent::MapStyleChanged(style));
        if transition.is_applied() {
            info!(style = %style, "Map style changed");
            self.surface.set_style(style);
        }
        transition
    }

    /// Look up the name of whatever the map currently shows (e.g. the start-up view).
    /// `None` when no runtime is available.
    pub fn resolve_current(&self) -> Option<JoinHandle<Transition>> {
        let center = self.state.borrow().center;
        self.spawn_lookup(center)
    }

    /// Feed in the outcome of a lookup issued for `requested_for`.
    ///
    /// Failures never surface: the previous name stays, or the coordinate label is used
    /// when fallback names are enabled. Either way the result only lands if the map is
    /// still centered on `requested_for`.
    pub fn apply_resolution(
        &self,
        requested_for: Coordinates,
        outcome: Result<String, ResolveError>,
    ) -> Transition {
        let name = match outcome {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    lat = requested_for.lat,
                    lng = requested_for.lng,
                    error = %e,
                    "Place name lookup failed"
                );
                if !self.settings().fallback_names {
                    return Transition::Unchanged;
                }
                requested_for.fallback_label()
            }
        };

        let (transition, _) = self.apply(&ViewportEvent::NameResolved {
            requested_for,
            name: name.clone(),
        });
        if transition.is_applied() {
            info!(name = name.as_str(), "Place name resolved");
        }
        transition
    }

    /// Navigation callback for rendered links.
    pub fn navigator(&self) -> NavigateFn {
        let this = self.clone();
        Arc::new(move |coordinates: Coordinates, zoom: Option<u32>| {
            this.navigate_to(coordinates, zoom.map(f64::from));
        })
    }

    /// Run one event through the reducer under the channel lock. On an applied transition,
    /// also returns the resulting center and zoom.
    fn apply(&self, event: &ViewportEvent) -> (Transition, Option<(Coordinates, f64)>) {
        let mut outcome = (Transition::Unchanged, None);
        self.state.send_if_modified(|state| {
            let transition = self.reducer.reduce(state, event);
            let applied = transition.is_applied();
            outcome = (transition, applied.then_some((state.center, state.zoom)));
            applied
        });
        outcome
    }

    fn follow_up(&self, transition: Transition) -> Dispatched {
        let lookup = transition.lookup().and_then(|at| self.spawn_lookup(at));
        Dispatched { transition, lookup }
    }

    fn spawn_lookup(&self, at: Coordinates) -> Option<JoinHandle<Transition>> {
        let Some(runtime) = &self.runtime else {
            warn!(lat = at.lat, lng = at.lng, "No tokio runtime, skipping place name lookup");
            return None;
        };
        let this = self.clone();
        Some(runtime.spawn(async move {
            let outcome = this.resolver.resolve(at).await;
            this.apply_resolution(at, outcome)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::CoordinateResolver;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FailingResolver;

    #[async_trait]
    impl NameResolver for FailingResolver {
        async fn resolve(&self, _at: Coordinates) -> crate::error::Result<String> {
            Err(ResolveError::Status(503))
        }
    }

    struct PanickingResolver;

    #[async_trait]
    impl NameResolver for PanickingResolver {
        async fn resolve(&self, _at: Coordinates) -> crate::error::Result<String> {
            panic!("resolver blew up")
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        views: Mutex<Vec<(Coordinates, f64)>>,
        styles: Mutex<Vec<MapStyle>>,
    }

    impl MapSurface for RecordingSurface {
        fn set_view(&self, center: Coordinates, zoom: f64) {
            self.views.lock().unwrap().push((center, zoom));
        }

        fn set_style(&self, style: MapStyle) {
            self.styles.lock().unwrap().push(style);
        }
    }

    fn nyc() -> MapViewState {
        MapViewState::new(Coordinates::new(40.7128, -74.0060), 13.0, MapStyle::Standard)
    }

    #[tokio::test]
    async fn initial_zoom_is_clamped() {
        let mut view = nyc();
        view.zoom = 40.0;
        let reconciler =
            ViewportReconciler::new(view, ViewportSettings::default(), Arc::new(CoordinateResolver));
        assert_eq!(reconciler.snapshot().zoom, 18.0);
    }

    #[tokio::test]
    async fn resolve_current_names_start_view() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver));
        let t = reconciler.resolve_current().unwrap().await.unwrap();
        assert!(t.is_applied());
        assert_eq!(
            reconciler.snapshot().resolved_name.as_deref(),
            Some("Location (40.7128, -74.0060)")
        );
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_name_without_fallback() {
        let settings = ViewportSettings {
            fallback_names: false,
            ..ViewportSettings::default()
        };
        let mut view = nyc();
        view.resolved_name = Some("New York".into());
        let reconciler = ViewportReconciler::new(view, settings, Arc::new(FailingResolver));

        let d = reconciler.viewport_changed(Coordinates::new(40.8, -74.0), 13.0);
        assert!(d.transition.is_applied());
        assert_eq!(d.settle().await, Some(Transition::Unchanged));
        assert_eq!(reconciler.snapshot().resolved_name.as_deref(), Some("New York"));
    }

    #[tokio::test]
    async fn failed_lookup_uses_fallback_label() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(FailingResolver));

        let target = Coordinates::new(48.8606, 2.3376);
        let settled = reconciler.navigate_to(target, Some(16.0)).settle().await;
        assert!(settled.unwrap().is_applied());
        assert_eq!(
            reconciler.snapshot().resolved_name.as_deref(),
            Some("Location (48.8606, 2.3376)")
        );
    }

    #[tokio::test]
    async fn navigation_drives_the_surface() {
        let surface = Arc::new(RecordingSurface::default());
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver))
                .with_surface(surface.clone());

        let target = Coordinates::new(40.7484, -73.9857);
        reconciler.navigate_to(target, Some(30.0)).settle().await;
        reconciler.set_map_style(MapStyle::Dark);
        reconciler.set_map_style(MapStyle::Dark);

        assert_eq!(*surface.views.lock().unwrap(), vec![(target, 18.0)]);
        assert_eq!(*surface.styles.lock().unwrap(), vec![MapStyle::Dark]);
    }

    #[tokio::test]
    async fn suppressed_change_starts_no_lookup() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver));
        let d = reconciler.viewport_changed(Coordinates::new(40.7129, -74.0060), 13.0);
        assert_eq!(d.transition, Transition::Suppressed);
        assert!(d.lookup.is_none());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver));
        let mut rx = reconciler.subscribe();

        reconciler.set_map_style(MapStyle::Relief);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().map_style, MapStyle::Relief);

        // A suppressed event does not notify.
        reconciler.viewport_changed(Coordinates::new(40.7128, -74.0060), 13.0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn navigator_callback_navigates() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver));
        let navigate = reconciler.navigator();

        navigate(Coordinates::new(40.6892, -74.0445), Some(16));
        let view = reconciler.snapshot();
        assert_eq!(view.center, Coordinates::new(40.6892, -74.0445));
        assert_eq!(view.zoom, 16.0);
    }

    #[tokio::test]
    async fn panicked_lookup_settles_to_none() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(PanickingResolver));
        let d = reconciler.navigate_to(Coordinates::new(40.8, -74.0), None);
        assert!(d.lookup.is_some());
        assert_eq!(d.settle().await, None);
        assert_eq!(reconciler.snapshot().center, Coordinates::new(40.8, -74.0));
    }

    #[test]
    fn without_runtime_state_updates_and_no_lookup_starts() {
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver));

        let d = reconciler.viewport_changed(Coordinates::new(41.0, -74.0), 13.0);

        assert!(d.transition.is_applied());
        assert!(d.lookup.is_none());
        assert!(reconciler.resolve_current().is_none());
        assert_eq!(reconciler.snapshot().center, Coordinates::new(41.0, -74.0));
    }

    #[test]
    fn entry_points_work_from_a_plain_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let reconciler =
            ViewportReconciler::new(nyc(), ViewportSettings::default(), Arc::new(CoordinateResolver))
                .with_runtime(runtime.handle().clone());

        let host = reconciler.clone();
        let dispatched = std::thread::spawn(move || {
            host.viewport_changed(Coordinates::new(41.0, -74.0), 13.0)
        })
        .join()
        .unwrap();

        assert!(dispatched.lookup.is_some());
        let settled = runtime.block_on(dispatched.settle());
        assert!(settled.unwrap().is_applied());
        assert_eq!(
            reconciler.snapshot().resolved_name.as_deref(),
            Some("Location (41.0000, -74.0000)")
        );
    }
}
