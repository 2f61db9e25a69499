//! Turning a clicked link into a navigation call.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mapchat_common::{Coordinates, PlaceLink};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Navigation callback handed to the presentation layer: `(coordinates, zoom)`.
pub type NavigateFn = Arc<dyn Fn(Coordinates, Option<u32>) + Send + Sync>;

/// Invokes the navigation callback for activated links, slightly delayed, and ignores
/// repeated activations while one is still pending (double clicks).
///
/// The delay runs on the tokio runtime current at construction, or the one given to
/// `with_runtime`; without one, activations are rejected.
#[derive(Clone)]
pub struct LinkActivator {
    navigate: NavigateFn,
    delay: Duration,
    pending: Arc<AtomicBool>,
    runtime: Option<Handle>,
}

impl LinkActivator {
    pub fn new(navigate: NavigateFn, delay: Duration) -> Self {
        Self {
            navigate,
            delay,
            pending: Arc::new(AtomicBool::new(false)),
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Schedule navigation to `link`. Returns `None` when an earlier activation is
    /// still waiting to fire, or when there is no runtime to schedule on.
    pub fn activate(&self, link: &PlaceLink) -> Option<JoinHandle<()>> {
        let Some(runtime) = &self.runtime else {
            warn!(name = link.name.as_str(), "No tokio runtime, link activation ignored");
            return None;
        };
        if self.pending.swap(true, Ordering::AcqRel) {
            debug!(name = link.name.as_str(), "Link activation ignored, one already pending");
            return None;
        }

        let navigate = self.navigate.clone();
        let pending = self.pending.clone();
        let delay = self.delay;
        let coordinates = link.coordinates;
        let zoom = link.zoom;
        debug!(name = link.name.as_str(), lat = coordinates.lat, lng = coordinates.lng, "Link activated");

        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            pending.store(false, Ordering::Release);
            navigate(coordinates, zoom);
        }))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl fmt::Debug for LinkActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkActivator")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (NavigateFn, Arc<Mutex<Vec<(Coordinates, Option<u32>)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let navigate: NavigateFn =
            Arc::new(move |c: Coordinates, z: Option<u32>| sink.lock().unwrap().push((c, z)));
        (navigate, calls)
    }

    #[tokio::test]
    async fn activation_invokes_callback_after_delay() {
        let (navigate, calls) = recording();
        let activator = LinkActivator::new(navigate, Duration::from_millis(20));
        let link = PlaceLink::new("Park", Coordinates::new(40.78, -73.96), Some(14));

        let handle = activator.activate(&link).expect("first activation accepted");
        assert!(calls.lock().unwrap().is_empty());
        assert!(activator.is_pending());

        handle.await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec![(Coordinates::new(40.78, -73.96), Some(14))]);
        assert!(!activator.is_pending());
    }

    #[tokio::test]
    async fn double_activation_is_suppressed() {
        let (navigate, calls) = recording();
        let activator = LinkActivator::new(navigate, Duration::from_millis(50));
        let link = PlaceLink::new("Tower", Coordinates::new(40.75, -73.99), None);

        let first = activator.activate(&link).unwrap();
        assert!(activator.activate(&link).is_none());
        first.await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(activator.activate(&link).is_some());
    }

    #[test]
    fn activation_from_a_plain_thread_uses_the_given_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (navigate, calls) = recording();
        let activator =
            LinkActivator::new(navigate, Duration::from_millis(5)).with_runtime(runtime.handle().clone());
        let link = PlaceLink::new("Pier", Coordinates::new(40.70, -74.01), None);

        let handle = std::thread::spawn(move || activator.activate(&link))
            .join()
            .unwrap()
            .expect("activation accepted");
        runtime.block_on(handle).unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn activation_without_runtime_is_rejected() {
        let (navigate, calls) = recording();
        let activator = LinkActivator::new(navigate, Duration::from_millis(5));
        let link = PlaceLink::new("Pier", Coordinates::new(40.70, -74.01), None);

        assert!(activator.activate(&link).is_none());
        assert!(!activator.is_pending());
        assert!(calls.lock().unwrap().is_empty());
    }
}
