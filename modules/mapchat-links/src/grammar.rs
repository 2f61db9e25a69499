use std::ops::Range;
use std::sync::LazyLock;

use mapchat_common::{Coordinates, PlaceLink};
use regex::{Captures, Regex};

/// `[Label](geo:LAT,LNG)` with an optional `?zoom=Z`. Coordinates need a fractional part.
pub(crate) static GEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(geo:(-?[0-9]+\.[0-9]+),(-?[0-9]+\.[0-9]+)(?:\?zoom=([0-9]+))?\)")
        .expect("valid regex")
});

/// `[Label](nav:LAT,LNG,Z)`. Fractional part optional, zoom required.
pub(crate) static NAV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(nav:(-?[0-9]+\.?[0-9]*),(-?[0-9]+\.?[0-9]*),([0-9]+)\)")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSyntax {
    Geo,
    Nav,
}

impl LinkSyntax {
    pub const ALL: [LinkSyntax; 2] = [LinkSyntax::Geo, LinkSyntax::Nav];

    fn pattern(self) -> &'static Regex {
        match self {
            LinkSyntax::Geo => &GEO_RE,
            LinkSyntax::Nav => &NAV_RE,
        }
    }
}

/// One occurrence of link markup in a message.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMatch {
    /// Byte range of the whole markup in the scanned text.
    pub span: Range<usize>,
    pub syntax: LinkSyntax,
    pub link: PlaceLink,
}

/// Find every link in `text`, both syntaxes, ordered by start offset.
pub fn scan_links(text: &str) -> Vec<LinkMatch> {
    let mut matches: Vec<LinkMatch> = LinkSyntax::ALL
        .into_iter()
        .flat_map(|syntax| {
            syntax
                .pattern()
                .captures_iter(text)
                .filter_map(move |caps| link_from_captures(syntax, &caps))
        })
        .collect();

    matches.sort_by_key(|m| m.span.start);
    matches
}

/// Build a `PlaceLink` from a pattern match. Payloads that match the pattern but do not
/// fit the target types (a zoom beyond `u32`, a coordinate that overflows to infinity)
/// yield `None` and stay plain text.
pub(crate) fn link_from_captures(syntax: LinkSyntax, caps: &Captures<'_>) -> Option<LinkMatch> {
    let whole = caps.get(0)?;
    let lat: f64 = caps.get(2)?.as_str().parse().ok()?;
    let lng: f64 = caps.get(3)?.as_str().parse().ok()?;
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    let zoom = match (syntax, caps.get(4)) {
        (_, Some(z)) => Some(z.as_str().parse::<u32>().ok()?),
        (LinkSyntax::Geo, None) => None,
        (LinkSyntax::Nav, None) => return None,
    };

    Some(LinkMatch {
        span: whole.range(),
        syntax,
        link: PlaceLink {
            name: caps[1].to_string(),
            coordinates: Coordinates::new(lat, lng),
            zoom,
        },
    })
}
