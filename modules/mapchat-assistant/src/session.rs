use std::sync::Arc;

use mapchat_common::MapChatError;
use mapchat_links::{canonicalize_links, parse_message, ParsedMessage};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assistant::{Assistant, ChatTurn};
use crate::types::{ChatMessage, ChatRequest, ViewportContext};

/// First message of every transcript.
pub const WELCOME_MESSAGE: &str =
    "Hello! I am EarthAI, your satellite navigation assistant. How can I help you explore this location?";

/// Stored in place of a reply when the assistant fails.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to my knowledge services right now. Could you try again in a moment?";

/// An assistant message ready for display: links are in `geo` form and already parsed.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub message: ChatMessage,
    pub parsed: ParsedMessage,
}

/// One user's conversation: the in-memory transcript and the assistant answering it.
pub struct ChatSession {
    id: Uuid,
    assistant: Arc<dyn Assistant>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(assistant: Arc<dyn Assistant>) -> Self {
        Self {
            id: Uuid::new_v4(),
            assistant,
            history: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The most recent assistant message, parsed.
    pub fn last_reply(&self) -> Option<ParsedMessage> {
        self.history
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .map(|m| parse_message(&m.content))
    }

    /// Start over with only the welcome message.
    pub fn clear(&mut self) {
        self.history = vec![ChatMessage::assistant(WELCOME_MESSAGE)];
    }

    /// Send `message` as the user while the map shows `context`.
    ///
    /// Blank messages are rejected and leave the transcript untouched. Assistant failures
    /// are logged and answered with [`FALLBACK_REPLY`].
    pub async fn send(
        &mut self,
        message: &str,
        context: ViewportContext,
    ) -> Result<AssistantReply, MapChatError> {
        if message.trim().is_empty() {
            return Err(MapChatError::Validation("message is empty".into()));
        }

        let turn = ChatTurn::new(ChatRequest {
            message: message.to_string(),
            context,
            history: self.history.clone(),
        });
        self.history.push(ChatMessage::user(message));

        let text = match self.assistant.reply(&turn).await {
            Ok(text) => canonicalize_links(&text).into_owned(),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Assistant failed to reply");
                FALLBACK_REPLY.to_string()
            }
        };

        let parsed = parse_message(&text);
        info!(
            session_id = %self.id,
            links = parsed.links.len(),
            "Assistant replied"
        );

        let reply = ChatMessage::assistant(text);
        self.history.push(reply.clone());
        Ok(AssistantReply {
            message: reply,
            parsed,
        })
    }
}
