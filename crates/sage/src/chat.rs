use std::sync::Arc;

use crate::agent::{Agent, StopReason};
use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::store::ConversationStore;
use crate::tools::truncate_chars;

pub const DEFAULT_DOCUMENT_PREFIX_CHARS: usize = 3000;
const DEFAULT_DOCUMENT_QUERY: &str = "Please summarize this document";

/// Entry point for one user turn: builds the user message, runs the agent on the
/// thread's history and returns the answer text
pub struct ChatHandler {
    agent: Agent,
    store: Arc<ConversationStore>,
    document_prefix_chars: usize,
}

impl ChatHandler {
    pub fn new(agent: Agent, store: Arc<ConversationStore>) -> Self {
        Self {
            agent,
            store,
            document_prefix_chars: DEFAULT_DOCUMENT_PREFIX_CHARS,
        }
    }

    pub fn with_document_prefix_chars(mut self, chars: usize) -> Self {
        self.document_prefix_chars = chars;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub async fn handle(
        &self,
        thread_id: &str,
        message: Option<&str>,
        document: Option<&str>,
    ) -> AgentResult<String> {
        let content = build_user_message(message, document, self.document_prefix_chars)?;

        let mut history = self.store.lock(thread_id).await;
        let committed = history.len();

        // The turn runs on a copy; the user message is stored together with the first
        // finished step, so an abandoned or failed-before-any-step turn leaves no trace
        let mut turn: Vec<Message> = history.to_vec();
        turn.push(Message::user(content));

        let outcome = self.agent.reply(&mut turn).await;
        if turn.len() > committed + 1 {
            *history = turn;
        }

        let reply = outcome?;
        if reply.stop_reason == StopReason::ToolRoundLimit {
            tracing::warn!(thread_id, rounds = reply.tool_rounds, "reply cut short by the tool round limit");
        }
        tracing::info!(
            thread_id,
            tool_rounds = reply.tool_rounds,
            history_len = history.len(),
            "reply complete"
        );
        Ok(reply.text)
    }
}

/// Compose the text of the user's message, folding in the start of a document when one is given
pub fn build_user_message(
    message: Option<&str>,
    document: Option<&str>,
    document_prefix_chars: usize,
) -> AgentResult<String> {
    let message = message.filter(|m| !m.is_empty());
    let document = document.filter(|d| !d.is_empty());

    match (message, document) {
        (None, None) => Err(AgentError::InvalidInput(
            "Message or document is required".to_string(),
        )),
        (Some(message), None) => Ok(message.to_string()),
        (message, Some(document)) => Ok(format!(
            "I've uploaded a document. Here's my query: {}\n\nDocument content (first {} chars):\n{}",
            message.unwrap_or(DEFAULT_DOCUMENT_QUERY),
            document_prefix_chars,
            truncate_chars(document, document_prefix_chars)
        )),
    }
}
