use mapchat_common::{Coordinates, PlaceLink};
use mapchat_links::format_nav_link;

/// A well-known place the offline assistant can talk about.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub description: &'static str,
    pub coordinates: Coordinates,
    pub zoom: u32,
}

impl Landmark {
    /// Whether any keyword occurs in `lowercase_message`.
    pub fn mentioned_in(&self, lowercase_message: &str) -> bool {
        self.keywords.iter().any(|k| lowercase_message.contains(k))
    }

    pub fn place_link(&self) -> PlaceLink {
        PlaceLink::new(self.name, self.coordinates, Some(self.zoom))
    }

    pub fn nav_link(&self) -> String {
        format_nav_link(self.name, self.coordinates, self.zoom)
    }
}

pub const LANDMARKS: [Landmark; 4] = [
    Landmark {
        name: "Central Park",
        keywords: &["park", "nature", "green", "walk", "central park"],
        description: "A large urban park in Manhattan, New York City. It's a popular destination for tourists and locals.",
        coordinates: Coordinates::new(40.7812, -73.9665),
        zoom: 14,
    },
    Landmark {
        name: "Empire State Building",
        keywords: &["building", "tall", "skyscraper", "empire", "landmark"],
        description: "A 102-story skyscraper in Midtown Manhattan. It was the world's tallest building for nearly 40 years.",
        coordinates: Coordinates::new(40.7484, -73.9857),
        zoom: 18,
    },
    Landmark {
        name: "Statue of Liberty",
        keywords: &["statue", "liberty", "island", "monument"],
        description: "A colossal neoclassical sculpture on Liberty Island in New York Harbor.",
        coordinates: Coordinates::new(40.6892, -74.0445),
        zoom: 16,
    },
    Landmark {
        name: "Times Square",
        keywords: &["times", "square", "broadway", "theater", "shopping"],
        description: "A major commercial intersection, tourist destination, entertainment center, and neighborhood in Midtown Manhattan.",
        coordinates: Coordinates::new(40.7580, -73.9855),
        zoom: 17,
    },
];

/// First landmark, in table order, whose keywords appear in `lowercase_message`.
pub fn find_mentioned(lowercase_message: &str) -> Option<&'static Landmark> {
    LANDMARKS.iter().find(|l| l.mentioned_in(lowercase_message))
}

/// Up to `limit` landmarks ordered by great-circle distance from `from`, with the
/// distance in kilometers.
pub fn nearest(from: Coordinates, limit: usize) -> Vec<(&'static Landmark, f64)> {
    let mut ranked: Vec<(&'static Landmark, f64)> = LANDMARKS
        .iter()
        .map(|l| (l, from.distance_km(&l.coordinates)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(limit);
    ranked
}
