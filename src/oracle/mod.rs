//! LLM decision oracle: request types, prompts and the OpenAI client

pub mod messages;
pub mod openai;
pub mod prompts;

pub use messages::{DecisionKind, OracleReply, OracleRequest, ToolCall};
pub use openai::OpenAiOracle;
