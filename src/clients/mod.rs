//! HTTP-backed implementations of the service traits.

mod openai;
mod tavily;

pub use openai::OpenAiClient;
pub use tavily::TavilyClient;
