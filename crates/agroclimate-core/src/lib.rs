//! Domain layer for the AgroClimate Analyst chat client.
//!
//! Holds the conversation model, the source deduplicator, the controller
//! driving submissions, and the gateway trait the API client implements.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod message;
pub mod source;

pub use controller::{ChatController, ChatSnapshot};
pub use conversation::{Conversation, WELCOME_MESSAGE_ID};
pub use error::{AnalystError, Result};
pub use gateway::{QueryGateway, QueryReply};
pub use message::{Message, Role};
pub use source::{Source, UNTITLED_SOURCE, dedupe_sources};
