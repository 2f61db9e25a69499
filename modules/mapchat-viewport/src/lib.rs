//! Viewport reconciliation.
//!
//! Keeps the authoritative `MapViewState` consistent while viewport events stream in and
//! place-name lookups complete in the background, possibly out of order.
//!
//! The split mirrors a reduce/route event loop: `ViewportReducer` applies events to the
//! state without any I/O, and `ViewportReconciler` routes the side effects (name lookups,
//! map surface commands) and feeds lookup results back in as events.

pub mod error;
pub mod reconciler;
pub mod reducer;
pub mod resolver;
pub mod surface;

pub use error::ResolveError;
pub use reconciler::{Dispatched, ViewportReconciler};
pub use reducer::{Transition, ViewportEvent, ViewportReducer};
pub use resolver::{CoordinateResolver, NameResolver, NominatimResolver};
pub use surface::{DetachedSurface, MapSurface};
