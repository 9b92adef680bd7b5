//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - chat requests, sent from the HTTP boundary to the agent
//! - openai-compatible messages/tools, sent from the agent to the LLM
//! - tool calls, sent from the agent to the tools providing capabilities
//!
//! We always immediately convert those data models into the internal structs using
//! to/from helpers, so the agent loop only ever sees these types.
pub mod message;
pub mod role;
pub mod tool;
