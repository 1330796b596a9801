use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A text record whose content can be narrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Source {
    pub id: String,
    pub full_text: Option<String>,
    /// Path of the last generated audio artifact
    pub audio_file: Option<String>,
    /// Identifier of the run that produced `audio_file`
    pub audio_generation_command: Option<String>,
}

impl Source {
    pub fn new(id: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_text: Some(full_text.into()),
            audio_file: None,
            audio_generation_command: None,
        }
    }

    /// Text content, or `None` when missing or blank
    pub fn text(&self) -> Option<&str> {
        self.full_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}
