pub mod client;
pub mod error;
pub mod types;
pub mod util;

pub use client::OpenAiClient;
pub use error::{AiError, Result};
pub use types::{
    ChatRequest, ChatResponse, ContentPart, MessageContent, ResponseFormat, Role, Usage,
    WireMessage,
};
