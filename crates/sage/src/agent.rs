use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::tool::{ToolCallRequest, ToolDescriptor, ToolResult};
use crate::prompt_template::system_prompt;
use crate::providers::base::Provider;
use crate::tools::{call_tool, ToolRegistry};

const CEILING_APOLOGY: &str =
    "I wasn't able to finish looking that up. Could you rephrase or narrow down the question?";

/// Bounds on a single reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    /// Tool rounds allowed before the model is made to answer without tools
    pub max_tool_rounds: usize,
    /// Time each individual tool call may take
    pub tool_timeout: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_tool_rounds: 8,
            tool_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model answered without asking for more tools
    Completed,
    /// The round limit was hit and the answer was forced
    ToolRoundLimit,
}

/// The outcome of driving the loop to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub stop_reason: StopReason,
    pub tool_rounds: usize,
}

enum LoopState {
    AwaitingModel,
    ExecutingTools(Message),
    Done(Reply),
}

/// Agent pairs a model with the tools it can call
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    limits: AgentLimits,
    system_prompt: String,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> AgentResult<Self> {
        let system_prompt = system_prompt(registry.describe_all())
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        Ok(Self {
            provider,
            registry,
            limits: AgentLimits::default(),
            system_prompt,
        })
    }

    pub fn with_limits(mut self, limits: AgentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> AgentLimits {
        self.limits
    }

    /// Run the model and its tools until the model produces a final answer.
    ///
    /// `history` must already end with the user's message. Messages are only appended at the
    /// points where a step is complete: a final answer, or a tool request together with all of
    /// its results. Dropping the returned future therefore never leaves a tool request without
    /// its results in `history`.
    pub async fn reply(&self, history: &mut Vec<Message>) -> AgentResult<Reply> {
        let mut rounds = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    let response = self.invoke(history, self.registry.describe_all()).await?;
                    match response {
                        Message::AssistantFinal { ref content, .. } => {
                            let text = content.clone();
                            history.push(response);
                            LoopState::Done(Reply {
                                text,
                                stop_reason: StopReason::Completed,
                                tool_rounds: rounds,
                            })
                        }
                        Message::AssistantToolCalls {
                            content,
                            tool_calls,
                            ..
                        } if tool_calls.is_empty() => {
                            history.push(Message::assistant(content.clone()));
                            LoopState::Done(Reply {
                                text: content,
                                stop_reason: StopReason::Completed,
                                tool_rounds: rounds,
                            })
                        }
                        Message::AssistantToolCalls { .. } if rounds >= self.limits.max_tool_rounds => {
                            tracing::warn!(
                                rounds,
                                "tool round limit reached, asking for a final answer"
                            );
                            LoopState::Done(self.conclude(history, &response, rounds).await)
                        }
                        Message::AssistantToolCalls { .. } => LoopState::ExecutingTools(response),
                        Message::User { .. } | Message::ToolResult { .. } => {
                            return Err(AgentError::Internal(format!(
                                "model produced a {:?} message",
                                response.role()
                            )));
                        }
                    }
                }
                LoopState::ExecutingTools(request) => {
                    let results = self.dispatch(request.requested_tool_calls()).await;
                    history.push(request);
                    history.extend(results.into_iter().map(Message::tool_result));
                    rounds += 1;
                    LoopState::AwaitingModel
                }
                LoopState::Done(reply) => return Ok(reply),
            };
        }
    }

    async fn invoke(&self, history: &[Message], tools: &[ToolDescriptor]) -> AgentResult<Message> {
        let (response, usage) = self
            .provider
            .complete(&self.system_prompt, history, tools)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "model invocation failed");
                AgentError::ModelInvocation(e.to_string())
            })?;
        tracing::debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            tool_calls = response.requested_tool_calls().len(),
            "model responded"
        );
        Ok(response)
    }

    /// Ask once more with no tools on offer and settle for whatever text is available
    async fn conclude(&self, history: &mut Vec<Message>, discarded: &Message, rounds: usize) -> Reply {
        let forced = match self.invoke(history, &[]).await {
            Ok(response) => response.text().trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "final answer after tool round limit failed");
                String::new()
            }
        };

        let text = if !forced.is_empty() {
            forced
        } else {
            std::iter::once(discarded)
                .chain(history.iter().rev())
                .find_map(|message| match message {
                    Message::AssistantToolCalls { content, .. } if !content.trim().is_empty() => {
                        Some(content.trim().to_string())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| CEILING_APOLOGY.to_string())
        };

        history.push(Message::assistant(text.clone()));
        Reply {
            text,
            stop_reason: StopReason::ToolRoundLimit,
            tool_rounds: rounds,
        }
    }

    /// Run every requested call concurrently and return results in request order
    async fn dispatch(&self, calls: &[ToolCallRequest]) -> Vec<ToolResult> {
        let futures: Vec<_> = calls.iter().map(|call| self.run_call(call)).collect();
        join_all(futures).await
    }

    async fn run_call(&self, call: &ToolCallRequest) -> ToolResult {
        let content = match self.registry.resolve(&call.name) {
            Ok(tool) => {
                match tokio::time::timeout(
                    self.limits.tool_timeout,
                    call_tool(tool.as_ref(), call.arguments.clone()),
                )
                .await
                {
                    Ok(text) => text,
                    Err(_) => {
                        tracing::warn!(tool = %call.name, "tool call timed out");
                        format!(
                            "Tool \"{}\" timed out after {}s",
                            call.name,
                            self.limits.tool_timeout.as_secs_f64()
                        )
                    }
                }
            }
            Err(_) => {
                tracing::warn!(tool = %call.name, "model requested an unknown tool");
                format!(
                    "Tool \"{}\" not found. Available tools: {}",
                    call.name,
                    self.registry.names().join(", ")
                )
            }
        };
        ToolResult::new(&call.id, content)
    }
}
