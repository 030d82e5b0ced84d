//! Conversation and message rules for the chat backend.
//!
//! Storage sits behind the repository traits in [`conversation`] and [`message`];
//! [`memory`] provides the process-local implementations the server runs with.
//! Identifier aliases are re-exported from `events` so that every layer agrees on them.
pub use events::{ConversationId, Id, UserId};

pub mod conversation;
pub mod error;
pub mod jwt;
pub mod memory;
pub mod message;
pub mod seed;
