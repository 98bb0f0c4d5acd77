//! Timeline message record.

use serde::{Deserialize, Serialize};

/// Author label used for messages written by the local user.
pub const LOCAL_AUTHOR: &str = "me";

/// Timestamp label stamped on synthesized messages.
pub const NOW_TIMESTAMP: &str = "Now";

/// Which avatar the rendering layer shows next to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Avatar {
    Me,
    Someone,
}

/// A single entry in the conversation timeline. Never mutated once added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    pub content: String,
    /// Display timestamp, already formatted for presentation.
    pub timestamp: String,
    /// Optional image reference attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    #[must_use]
    pub fn new(author: impl Into<String>, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { author: author.into(), content: content.into(), timestamp: timestamp.into(), image: None }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Avatar derived from the author: the local user gets their own picture.
    #[must_use]
    pub fn author_avatar(&self) -> Avatar {
        if self.author == LOCAL_AUTHOR { Avatar::Me } else { Avatar::Someone }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
