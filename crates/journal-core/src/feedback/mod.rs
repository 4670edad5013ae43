//! AI feedback: prompt templates, the LLM bridge, generation and detached dispatch.

mod dispatcher;
mod generator;
mod openrouter;
mod prompt;

pub use dispatcher::FeedbackDispatcher;
pub use generator::{build_user_message, parse_feedback, FeedbackGenerator, FeedbackJob, DEFAULT_FEEDBACK};
pub use openrouter::{CompletionRequest, FeedbackModel, OpenRouterBridge};
pub use prompt::PromptTemplate;
