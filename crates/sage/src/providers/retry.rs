//! Retry transient model failures with exponential backoff.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use super::base::{Provider, Usage};
use super::utils::is_transient;
use crate::models::message::Message;
use crate::models::tool::ToolDescriptor;

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(4);

/// Wraps a provider and retries rate limits, server errors and dropped connections.
///
/// `max_retries` counts additional attempts, so a value of 2 allows three calls in total.
/// Permanent failures such as bad requests are returned immediately.
pub struct RetryProvider {
    inner: Box<dyn Provider>,
    max_retries: u32,
    initial_backoff: Duration,
}

impl RetryProvider {
    pub fn new(inner: Box<dyn Provider>, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            initial_backoff: INITIAL_BACKOFF,
        }
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }
}

#[async_trait]
impl Provider for RetryProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<(Message, Usage)> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.inner.complete(system, messages, tools).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "retrying model invocation"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
