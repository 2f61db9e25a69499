use mapchat_common::{Coordinates, MapStyle};

/// The rendering surface the reconciler drives for programmatic changes.
///
/// User gestures flow the other way: the surface reports them through
/// `ViewportReconciler::viewport_changed`.
pub trait MapSurface: Send + Sync {
    fn set_view(&self, center: Coordinates, zoom: f64);

    fn set_style(&self, _style: MapStyle) {}
}

/// No surface attached (headless sessions, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSurface;

impl MapSurface for DetachedSurface {
    fn set_view(&self, _center: Coordinates, _zoom: f64) {}
}
