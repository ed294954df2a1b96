mod common;
mod message;
mod openai;

pub use common::*;
pub use message::*;
pub use openai::OpenAIClient;
