use mapchat_common::{Coordinates, MapStyle, MapViewState, ViewportSettings};
use tracing::{debug, warn};

/// Everything that can change the map view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// The user panned or zoomed the map surface.
    ViewportChanged { center: Coordinates, zoom: f64 },
    /// A programmatic jump (link activation, directed search).
    NavigateTo { center: Coordinates, zoom: Option<f64> },
    MapStyleChanged(MapStyle),
    /// A name lookup issued for `requested_for` completed.
    NameResolved { requested_for: Coordinates, name: String },
}

/// What an event did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Below the significance threshold, or unusable input. State untouched.
    Suppressed,
    /// Valid event that left the state as it was.
    Unchanged,
    /// State changed. `lookup` carries the coordinates that now need a place name.
    Applied { lookup: Option<Coordinates> },
    /// A name arrived for a viewport that is no longer current.
    Stale,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }

    pub fn lookup(&self) -> Option<Coordinates> {
        match self {
            Transition::Applied { lookup } => *lookup,
            _ => None,
        }
    }
}

/// Pure state transitions over `MapViewState`. No I/O.
#[derive(Debug, Clone, Default)]
pub struct ViewportReducer {
    settings: ViewportSettings,
}

impl ViewportReducer {
    pub fn new(settings: ViewportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    /// Whether moving from `state` to (`center`, `zoom`) is more than rendering noise.
    pub fn is_significant(&self, state: &MapViewState, center: Coordinates, zoom: f64) -> bool {
        (center.lat - state.center.lat).abs() > self.settings.center_epsilon
            || (center.lng - state.center.lng).abs() > self.settings.center_epsilon
            || (zoom - state.zoom).abs() >= self.settings.zoom_epsilon
    }

    pub fn reduce(&self, state: &mut MapViewState, event: &ViewportEvent) -> Transition {
        match event {
            ViewportEvent::ViewportChanged { center, zoom } => {
                if !center.is_finite() || !zoom.is_finite() {
                    warn!(lat = center.lat, lng = center.lng, zoom, "Ignoring non-finite viewport change");
                    return Transition::Suppressed;
                }
                let zoom = self.settings.clamp_zoom(*zoom);
                if !self.is_significant(state, *center, zoom) {
                    return Transition::Suppressed;
                }
                state.center = *center;
                state.zoom = zoom;
                Transition::Applied {
                    lookup: Some(*center),
                }
            }

            ViewportEvent::NavigateTo { center, zoom } => {
                let zoom = zoom.unwrap_or(state.zoom);
                if !center.is_finite() || !zoom.is_finite() {
                    warn!(lat = center.lat, lng = center.lng, zoom, "Ignoring non-finite navigation target");
                    return Transition::Suppressed;
                }
                state.center = *center;
                state.zoom = self.settings.clamp_zoom(zoom);
                Transition::Applied {
                    lookup: Some(*center),
                }
            }

            ViewportEvent::MapStyleChanged(style) => {
                if state.map_style == *style {
                    return Transition::Unchanged;
                }
                state.map_style = *style;
                Transition::Applied { lookup: None }
            }

            ViewportEvent::NameResolved {
                requested_for,
                name,
            } => {
                if *requested_for != state.center {
                    debug!(
                        requested_lat = requested_for.lat,
                        requested_lng = requested_for.lng,
                        current_lat = state.center.lat,
                        current_lng = state.center.lng,
                        "Discarding stale place name"
                    );
                    return Transition::Stale;
                }
                if state.resolved_name.as_deref() == Some(name.as_str()) {
                    return Transition::Unchanged;
                }
                state.resolved_name = Some(name.clone());
                Transition::Applied { lookup: None }
            }
        }
    }
}
