use base64::Engine;
use std::ops::Index;
use std::sync::Arc;

use super::messages::ImageMessage;
use crate::error::{GatewayError, GatewayResult};

/// One unit of sign playback: an image for a letter, or a separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Letter the image spells, or `"space"` for a separator
    pub label: String,
    /// Raw image bytes as delivered by the service
    pub payload: Option<Vec<u8>>,
}

impl Artifact {
    pub fn image(label: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            payload: Some(payload),
        }
    }

    pub fn separator() -> Self {
        Self {
            label: "space".to_string(),
            payload: None,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.payload.is_none()
    }

    /// Decode a wire item; the image travels base64-encoded
    pub fn from_message(message: ImageMessage) -> GatewayResult<Self> {
        let payload = match message.image {
            Some(encoded) if !encoded.is_empty() => Some(
                base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| {
                        GatewayError::Malformed(format!(
                            "image for '{}' is not valid base64: {}",
                            message.character, e
                        ))
                    })?,
            ),
            _ => None,
        };

        Ok(Self {
            label: message.character,
            payload,
        })
    }
}

/// Ordered artifacts from one conversion; immutable once received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSequence {
    items: Arc<[Artifact]>,
}

impl ArtifactSequence {
    pub fn new(items: Vec<Artifact>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn from_messages(messages: Vec<ImageMessage>) -> GatewayResult<Self> {
        let items = messages
            .into_iter()
            .map(Artifact::from_message)
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Artifact> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.items.iter()
    }

    /// Labels joined back into text, separators as spaces
    pub fn spelled(&self) -> String {
        self.items
            .iter()
            .map(|a| if a.is_separator() { " " } else { a.label.as_str() })
            .collect()
    }
}

impl Default for ArtifactSequence {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Index<usize> for ArtifactSequence {
    type Output = Artifact;

    fn index(&self, index: usize) -> &Artifact {
        &self.items[index]
    }
}
