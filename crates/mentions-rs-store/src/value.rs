//! Mentionable value types.
//!
//! Each category of mentionable thing (entities, emoji, message types) maps to
//! a Rust type implementing [`MentionValue`]. A store is bound to exactly one
//! category, so the same text stored as an emoji and as an entity never mixes.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A value that can be recorded as a mention.
pub trait MentionValue: Clone + fmt::Debug + Send + Sync + 'static {
    /// Category name persisted alongside every record of this type.
    const CATEGORY: &'static str;

    /// Text form written to storage.
    fn as_stored(&self) -> String;

    /// Decode a value previously produced by [`MentionValue::as_stored`].
    fn from_stored(raw: &str) -> Result<Self, StoreError>;
}

/// A named entity extracted from message text (person, place, product...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(pub String);

/// An emoji short name such as `thumbsup`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emoji(pub String);

macro_rules! text_value {
    ($name:ident, $category:literal) => {
        impl $name {
            /// Borrow the underlying text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl MentionValue for $name {
            const CATEGORY: &'static str = $category;

            fn as_stored(&self) -> String {
                self.0.clone()
            }

            fn from_stored(raw: &str) -> Result<Self, StoreError> {
                Ok(Self(raw.to_string()))
            }
        }
    };
}

text_value!(Entity, "entity");
text_value!(Emoji, "emoji");

/// Closed set of message kinds a chat message can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Plain text message.
    Message,
    /// Message addressing another user.
    Mention,
    /// Message carrying a URL.
    Link,
    /// Message containing a code snippet.
    Code,
    /// Image upload.
    Image,
    /// File upload.
    File,
    /// Message phrased as a question.
    Question,
    /// Reaction to another message.
    Reaction,
}

impl MessageType {
    /// All message types in declaration order.
    pub const ALL: [MessageType; 8] = [
        MessageType::Message,
        MessageType::Mention,
        MessageType::Link,
        MessageType::Code,
        MessageType::Image,
        MessageType::File,
        MessageType::Question,
        MessageType::Reaction,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Message => "message",
            MessageType::Mention => "mention",
            MessageType::Link => "link",
            MessageType::Code => "code",
            MessageType::Image => "image",
            MessageType::File => "file",
            MessageType::Question => "question",
            MessageType::Reaction => "reaction",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| StoreError::Decode {
                category: <MessageType as MentionValue>::CATEGORY,
                value: raw.to_string(),
            })
    }
}

impl MentionValue for MessageType {
    const CATEGORY: &'static str = "message_type";

    fn as_stored(&self) -> String {
        self.as_str().to_string()
    }

    fn from_stored(raw: &str) -> Result<Self, StoreError> {
        raw.parse()
    }
}
