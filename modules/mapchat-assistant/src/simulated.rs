use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::assistant::{Assistant, ChatTurn};
use crate::landmarks::{find_mentioned, nearest};
use crate::types::ChatRequest;

static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(hi|hello|hey|greetings)\b").expect("valid regex"));

const MEMORY_WORDS: &[&str] = &[
    "remember",
    "previous",
    "last time",
    "not reading",
    "memory",
    "context",
    "conversation",
];

const NEARBY_WORDS: &[&str] = &["nearby", "around me", "close by"];

/// Previous questions listed when the user asks what was discussed.
const MEMORY_RECALL: usize = 3;
const NEARBY_LIMIT: usize = 3;

/// Offline assistant answering from a fixed landmark table and simple keyword rules.
///
/// Place references are emitted as `nav` links.
#[derive(Debug, Clone, Default)]
pub struct LandmarkAssistant {
    latency: Duration,
}

impl LandmarkAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before answering each turn.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Reply text for `request`. Rules are tried in order; the first that applies wins.
    pub fn respond(&self, request: &ChatRequest) -> String {
        let message = request.message.trim();
        let lower = message.to_lowercase();
        let location = request.context.location_or_unknown();
        let previous: Vec<&str> = request
            .previous_user_messages()
            .map(|m| m.content.as_str())
            .collect();

        if lower.contains("mock")
            || lower.contains("real")
            || (lower.contains("is this") && lower.contains("application"))
        {
            debug!(rule = "authenticity", "Landmark assistant reply");
            return "I'm a real AI assistant designed to help you explore geographic locations. \
                    While I'm a demo version with simulated responses rather than a full production AI, \
                    I do remember our conversation history and can help you navigate the map. \
                    What would you like to explore today?"
                .to_string();
        }

        let repeated = previous.iter().any(|p| {
            let p = p.trim().to_lowercase();
            !p.is_empty() && (p.contains(&lower) || lower.contains(&p))
        });
        if repeated {
            debug!(rule = "repeat", "Landmark assistant reply");
            return format!(
                "I notice you've asked about this before. Let me elaborate further about {message}. \
                 What specific details are you looking for?"
            );
        }

        if MEMORY_WORDS.iter().any(|w| lower.contains(w)) {
            debug!(rule = "memory", previous = previous.len(), "Landmark assistant reply");
            if previous.is_empty() {
                return "I don't have any previous messages from you yet. This is our first conversation. \
                        How can I help you explore this location?"
                    .to_string();
            }
            let mut reply =
                String::from("Yes, I remember our conversation. Here's what we've discussed so far:\n\n");
            let skip = previous.len().saturating_sub(MEMORY_RECALL);
            for (i, asked) in previous.iter().skip(skip).enumerate() {
                reply.push_str(&format!("{}. You asked: \"{}\"\n", i + 1, asked));
            }
            reply.push_str("\nHow can I help you further with exploring this location?");
            return reply;
        }

        if GREETING_RE.is_match(&lower) {
            debug!(rule = "greeting", "Landmark assistant reply");
            if previous.is_empty() {
                return format!(
                    "Hello! I'm your EarthAI assistant. You're currently looking at {location}. \
                     How can I help you explore this area?"
                );
            }
            return format!(
                "Hello again! I see we've been chatting already. You're currently looking at {location}. \
                 How can I continue to help you explore this area?"
            );
        }

        if is_shouting(message) {
            debug!(rule = "frustration", "Landmark assistant reply");
            return format!(
                "I understand you might be frustrated. I am reading all your messages and maintaining \
                 our conversation context. Your current location is {location}. \
                 How can I help you better explore this area?"
            );
        }

        if lower.contains("where am i") || lower.contains("current location") {
            debug!(rule = "location", "Landmark assistant reply");
            let center = request.context.center;
            return format!(
                "You're currently looking at {location}. The coordinates are [{:.6}, {:.6}].",
                center.lat, center.lng
            );
        }

        if let Some(landmark) = find_mentioned(&lower) {
            debug!(rule = "landmark", landmark = landmark.name, "Landmark assistant reply");
            return format!(
                "{} You can view it here: {}",
                landmark.description,
                landmark.nav_link()
            );
        }

        if NEARBY_WORDS.iter().any(|w| lower.contains(w)) {
            debug!(rule = "nearby", "Landmark assistant reply");
            let mut reply = format!("Here are some places near {location}:\n\n");
            for (i, (landmark, _km)) in nearest(request.context.center, NEARBY_LIMIT)
                .into_iter()
                .enumerate()
            {
                reply.push_str(&format!(
                    "{}. {}: {}\n\n",
                    i + 1,
                    landmark.nav_link(),
                    landmark.description
                ));
            }
            return reply;
        }

        debug!(rule = "default", "Landmark assistant reply");
        format!(
            "I'm analyzing the area around {location}. I've taken note of your message: \"{message}\". \
             What else would you like to know about this location?"
        )
    }
}

/// Long, all-caps messages with at least one letter.
fn is_shouting(message: &str) -> bool {
    message.chars().count() > 10
        && message.chars().any(char::is_alphabetic)
        && message.to_uppercase() == message
}

#[async_trait]
impl Assistant for LandmarkAssistant {
    async fn reply(&self, turn: &ChatTurn) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.respond(&turn.request))
    }
}
