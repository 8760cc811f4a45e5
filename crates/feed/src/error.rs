// ABOUTME: Error types for podcast feed construction and serialization.
// ABOUTME: Provides ValidationError for rejected episodes and PodcastError for the public API.

use std::fmt;
use std::io;
use thiserror::Error;

/// Reasons an episode is refused by `Podcast::add_episode`.
///
/// The message text is relied upon by existing callers, keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title and Description are required")]
    MissingTitleOrDescription,

    #[error("{title}: Enclosure.URL is required")]
    MissingEnclosureUrl { title: String },

    #[error("{title}: Enclosure.Type is required")]
    MissingEnclosureType { title: String },

    #[error("{title}: Link is required when not using Enclosure")]
    MissingLink { title: String },
}

/// Errors surfaced by the podcast builder and serializer.
#[derive(Debug, Error)]
pub enum PodcastError {
    /// An episode failed validation and was not added.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Writing to the output stream failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    /// A rendering strategy failed for a reason other than I/O.
    #[error("render failed: {0}")]
    Render(String),
}

impl PodcastError {
    /// Creates a Render error from any displayable cause.
    pub fn render(err: impl fmt::Display) -> Self {
        PodcastError::Render(err.to_string())
    }

    /// Returns true when the error came from episode validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, PodcastError::Validation(_))
    }
}
