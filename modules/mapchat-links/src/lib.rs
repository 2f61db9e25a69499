//! Place-link markup embedded in assistant text.
//!
//! Two surface syntaxes denote the same `PlaceLink`:
//!
//! - `[Label](geo:LAT,LNG)` / `[Label](geo:LAT,LNG?zoom=Z)`: the stored, user-facing form
//! - `[Label](nav:LAT,LNG,Z)`: the form the system emits when it references a place
//!
//! Text is scanned once per syntax, the match streams are merged by offset, and the result
//! is a gapless, ordered plan of text and link segments. Anything that does not match
//! stays plain text.

pub mod activation;
pub mod format;
pub mod grammar;
pub mod segments;

pub use activation::{LinkActivator, NavigateFn};
pub use format::{canonicalize_links, format_nav_link, format_place_link};
pub use grammar::{scan_links, LinkMatch, LinkSyntax};
pub use segments::{extract_place_links, parse_message, ParsedMessage, TextSegment};
