use mapchat_common::PlaceLink;
use serde::{Deserialize, Serialize};

use crate::grammar::scan_links;

/// One piece of a rendering plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextSegment {
    Text { content: String },
    Link { label: String, target: PlaceLink },
}

impl TextSegment {
    /// What the segment shows: the text itself, or the link label.
    pub fn display_text(&self) -> &str {
        match self {
            TextSegment::Text { content } => content,
            TextSegment::Link { label, .. } => label,
        }
    }

    pub fn as_link(&self) -> Option<&PlaceLink> {
        match self {
            TextSegment::Link { target, .. } => Some(target),
            TextSegment::Text { .. } => None,
        }
    }
}

/// A message split into links and an ordered segment plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub links: Vec<PlaceLink>,
    pub segments: Vec<TextSegment>,
}

impl ParsedMessage {
    /// The message as displayed, with every link replaced by its label.
    pub fn display_text(&self) -> String {
        self.segments.iter().map(TextSegment::display_text).collect()
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }
}

/// Extract every place link from `message`, in order of appearance.
pub fn extract_place_links(message: &str) -> Vec<PlaceLink> {
    scan_links(message).into_iter().map(|m| m.link).collect()
}

/// Parse `message` into its links and a gapless segment plan covering the whole input.
pub fn parse_message(message: &str) -> ParsedMessage {
    let matches = scan_links(message);
    if matches.is_empty() {
        return ParsedMessage {
            links: Vec::new(),
            segments: vec![TextSegment::Text {
                content: message.to_string(),
            }],
        };
    }

    let mut links = Vec::with_capacity(matches.len());
    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;

    for m in matches {
        // The two syntaxes cannot overlap, but a match starting inside the previous one
        // would otherwise duplicate text.
        if m.span.start < cursor {
            continue;
        }
        if m.span.start > cursor {
            segments.push(TextSegment::Text {
                content: message[cursor..m.span.start].to_string(),
            });
        }
        segments.push(TextSegment::Link {
            label: m.link.name.clone(),
            target: m.link.clone(),
        });
        links.push(m.link);
        cursor = m.span.end;
    }

    if cursor < message.len() {
        segments.push(TextSegment::Text {
            content: message[cursor..].to_string(),
        });
    }

    ParsedMessage { links, segments }
}
