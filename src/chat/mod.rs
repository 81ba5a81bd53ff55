//! Chat Module
//! Mission: Scripted chatbot replies and per-session conversation history

pub mod api;
pub mod history;
pub mod responder;

pub use api::ChatState;
pub use history::{ChatMessage, ChatStore};
pub use responder::{respond, ChatReply, SourceRef};
