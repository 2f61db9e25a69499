use chrono::{DateTime, Utc};
use mapchat_common::{Coordinates, MapStyle, MapViewState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// What the user is looking at when they ask something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportContext {
    /// Resolved place name, if one is known yet.
    pub location: Option<String>,
    pub center: Coordinates,
    pub zoom: f64,
    pub map_style: MapStyle,
}

impl ViewportContext {
    pub fn from_view(view: &MapViewState) -> Self {
        Self {
            location: view.resolved_name.clone(),
            center: view.center,
            zoom: view.zoom,
            map_style: view.map_style,
        }
    }

    pub fn location_or_unknown(&self) -> &str {
        self.location.as_deref().unwrap_or("an unknown location")
    }
}

impl From<&MapViewState> for ViewportContext {
    fn from(view: &MapViewState) -> Self {
        Self::from_view(view)
    }
}

/// A user message plus everything an assistant needs to answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub context: ViewportContext,
    /// Earlier messages, oldest first. Does not include `message`.
    pub history: Vec<ChatMessage>,
}

impl ChatRequest {
    /// User messages from `history`, oldest first.
    pub fn previous_user_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter().filter(|m| m.is_user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_get_distinct_ids() {
        let a = ChatMessage::user("hi");
        let b = ChatMessage::user("hi");
        assert_ne!(a.id, b.id);
        assert!(a.is_user());
        assert!(!ChatMessage::assistant("hello").is_user());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("x")).unwrap();
        assert!(json.contains(r#""role":"assistant""#), "{json}");
    }

    #[test]
    fn context_from_unnamed_view() {
        let view = MapViewState::new(Coordinates::new(40.7128, -74.0060), 13.0, MapStyle::Dark);
        let ctx = ViewportContext::from(&view);
        assert_eq!(ctx.location, None);
        assert_eq!(ctx.location_or_unknown(), "an unknown location");
        assert_eq!(ctx.map_style, MapStyle::Dark);
    }
}
