//! Client-side presentation state for a chat conversation screen.
//!
//! Tracks the message timeline and two short-lived typing indicators (the
//! local user and a simulated remote participant whose display name comes
//! from a names service).

pub mod config;
pub mod conversation;
pub mod message;
pub mod names;
pub mod timer;

pub use conversation::{ConversationState, Snapshot};
pub use message::Message;
pub use names::{NameError, NameProvider};
