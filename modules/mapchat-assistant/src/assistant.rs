use anyhow::Result;
use async_trait::async_trait;

use crate::prompt::{build_prompt, PromptMessage};
use crate::types::ChatRequest;

/// One exchange handed to an assistant: the raw request and the prompt built from it.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub request: ChatRequest,
    pub prompt: Vec<PromptMessage>,
}

impl ChatTurn {
    pub fn new(request: ChatRequest) -> Self {
        let prompt = build_prompt(&request);
        Self { request, prompt }
    }
}

/// Produces reply text for a chat turn. Replies may embed `geo` or `nav` place links.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn reply(&self, turn: &ChatTurn) -> Result<String>;
}
