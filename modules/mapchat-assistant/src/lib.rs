//! The chat half of mapchat: conversation history, viewport-aware prompts, and the
//! assistants that answer them.
//!
//! Assistant replies may reference places with `nav` links; `ChatSession` rewrites them into
//! the stored `geo` form and hands back a parsed rendering plan alongside the message.

pub mod assistant;
pub mod landmarks;
pub mod prompt;
pub mod session;
pub mod simulated;
pub mod types;

pub use assistant::{Assistant, ChatTurn};
pub use landmarks::{Landmark, LANDMARKS};
pub use prompt::{build_prompt, MessageRole, PromptMessage};
pub use session::{AssistantReply, ChatSession, FALLBACK_REPLY, WELCOME_MESSAGE};
pub use simulated::LandmarkAssistant;
pub use types::{ChatMessage, ChatRequest, Role, ViewportContext};
