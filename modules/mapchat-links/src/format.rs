use std::borrow::Cow;

use mapchat_common::Coordinates;
use regex::Captures;

use crate::grammar::{link_from_captures, LinkSyntax, NAV_RE};

/// Serialize a place reference in `geo` form: `[name](geo:lat,lng?zoom=z)`.
/// The zoom clause is omitted when `zoom` is `None`.
///
/// Non-finite coordinates cannot be written as a link; only the label is returned.
pub fn format_place_link(name: &str, coordinates: Coordinates, zoom: Option<u32>) -> String {
    let label = label_for(name, coordinates);
    if !coordinates.is_finite() {
        return label;
    }
    let lat = coordinate(coordinates.lat);
    let lng = coordinate(coordinates.lng);
    match zoom {
        Some(z) => format!("[{label}](geo:{lat},{lng}?zoom={z})"),
        None => format!("[{label}](geo:{lat},{lng})"),
    }
}

/// Serialize a place reference in `nav` form: `[name](nav:lat,lng,zoom)`.
/// Like `format_place_link`, falls back to the bare label for non-finite coordinates.
pub fn format_nav_link(name: &str, coordinates: Coordinates, zoom: u32) -> String {
    let label = label_for(name, coordinates);
    if !coordinates.is_finite() {
        return label;
    }
    let lat = coordinate(coordinates.lat);
    let lng = coordinate(coordinates.lng);
    format!("[{label}](nav:{lat},{lng},{zoom})")
}

/// Rewrite every `nav` link in `text` into `geo` form. Everything else is left untouched.
pub fn canonicalize_links(text: &str) -> Cow<'_, str> {
    NAV_RE.replace_all(text, |caps: &Captures<'_>| {
        match link_from_captures(LinkSyntax::Nav, caps) {
            Some(m) => format_place_link(&m.link.name, m.link.coordinates, m.link.zoom),
            None => caps[0].to_string(),
        }
    })
}

/// Labels cannot contain `]`; an empty label falls back to the coordinates.
fn label_for(name: &str, coordinates: Coordinates) -> String {
    let label: String = name.chars().filter(|c| *c != ']').collect();
    if label.is_empty() {
        coordinates.fallback_label()
    } else {
        label
    }
}

/// Shortest round-trip decimal, always with a fractional part so `geo` can parse it back.
fn coordinate(value: f64) -> String {
    let mut out = value.to_string();
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}
