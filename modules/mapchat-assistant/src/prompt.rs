use crate::types::{ChatRequest, Role, ViewportContext};

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Prompt Construction
// =============================================================================

/// System message describing the current view and the link markup the model may emit.
pub fn system_prompt(context: &ViewportContext) -> String {
    format!(
        "You are EarthAI, an assistant that helps users explore geographic locations.\n\
         The user is currently viewing {location} at coordinates [{lat}, {lng}] \
         with a zoom level of {zoom}. Provide helpful information about this location when asked.\n\
         If the user asks for directions or about specific places, you can suggest they navigate to those coordinates.\n\
         When referring to locations, you can create clickable links using the format [Place Name](nav:lat,lng,zoom).",
        location = context.location_or_unknown(),
        lat = context.center.lat,
        lng = context.center.lng,
        zoom = context.zoom,
    )
}

/// `[system, ...history, user]`.
pub fn build_prompt(request: &ChatRequest) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(PromptMessage::system(system_prompt(&request.context)));
    messages.extend(request.history.iter().map(|m| PromptMessage {
        role: m.role.into(),
        content: m.content.clone(),
    }));
    messages.push(PromptMessage::user(request.message.clone()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use mapchat_common::{Coordinates, MapStyle};

    fn context(location: Option<&str>) -> ViewportContext {
        ViewportContext {
            location: location.map(str::to_string),
            center: Coordinates::new(40.7812, -73.9665),
            zoom: 14.0,
            map_style: MapStyle::Standard,
        }
    }

    #[test]
    fn system_prompt_names_view_and_link_format() {
        let prompt = system_prompt(&context(Some("Central Park")));
        assert!(prompt.contains("viewing Central Park at coordinates [40.7812, -73.9665]"));
        assert!(prompt.contains("zoom level of 14"));
        assert!(prompt.contains("[Place Name](nav:lat,lng,zoom)"));
    }

    #[test]
    fn unnamed_view_is_unknown_location() {
        assert!(system_prompt(&context(None)).contains("viewing an unknown location"));
    }

    #[test]
    fn prompt_is_system_history_then_user() {
        let request = ChatRequest {
            message: "what's nearby?".into(),
            context: context(None),
            history: vec![ChatMessage::assistant("Hello!"), ChatMessage::user("hi")],
        };

        let prompt = build_prompt(&request);
        let roles: Vec<MessageRole> = prompt.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::User
            ]
        );
        assert_eq!(prompt.last().unwrap().content, "what's nearby?");
    }
}
