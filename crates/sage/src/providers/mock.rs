use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::ToolDescriptor;
use crate::providers::base::{Provider, Usage};

/// A provider that returns pre-configured responses, for tests and local wiring
///
/// Every history it is shown is recorded so callers can assert on exactly what
/// the model saw at each step.
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    repeat: Option<Message>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
    offered_tools: Arc<Mutex<Vec<usize>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Default::default()
        }
    }

    /// Create a mock provider that answers every call with the same message
    pub fn repeating(response: Message) -> Self {
        Self {
            repeat: Some(response),
            ..Default::default()
        }
    }

    /// The histories passed to each `complete` call, in call order
    pub fn seen_histories(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    /// How many tools were offered on each `complete` call, in call order
    pub fn offered_tool_counts(&self) -> Vec<usize> {
        self.offered_tools
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.seen_histories().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<(Message, Usage)> {
        self.seen
            .lock()
            .map_err(|_| anyhow!("mock provider lock poisoned"))?
            .push(messages.to_vec());
        self.offered_tools
            .lock()
            .map_err(|_| anyhow!("mock provider lock poisoned"))?
            .push(tools.len());

        if let Some(response) = &self.repeat {
            return Ok((response.clone(), Usage::default()));
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| anyhow!("mock provider lock poisoned"))?;
        if responses.is_empty() {
            Err(anyhow!("mock provider has no responses left"))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
