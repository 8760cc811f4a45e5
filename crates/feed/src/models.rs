// ABOUTME: Plain value types shared by the podcast and episode builders.
// ABOUTME: Author/owner, channel image, text input, atom self-link and iTunes category nodes.

use serde::{Deserialize, Serialize};

/// MIME type advertised by the atom self-link.
pub const RSS_MIME: &str = "application/rss+xml";

/// A person with a contact email. Also used for the iTunes owner block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Channel artwork as described by RSS 2.0.
///
/// Directories expect 1400x1400 to 3000x3000 pixel JPEG or PNG artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub title: String,
    pub description: String,
    pub name: String,
    pub link: String,
}

/// Atom link pointing back at the feed's own URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomLink {
    pub href: String,
    pub rel: String,
    pub mime_type: String,
}

impl AtomLink {
    pub fn self_link(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: "self".to_string(),
            mime_type: RSS_MIME.to_string(),
        }
    }
}

/// One node of the two-tier iTunes category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub text: String,
    pub children: Vec<Category>,
}

impl Category {
    /// Builds a top-level node with one child per non-empty subcategory.
    pub fn with_subcategories<S: AsRef<str>>(text: &str, subcategories: &[S]) -> Self {
        let children = subcategories
            .iter()
            .filter_map(|s| {
                let s: &str = s.as_ref();
                (!s.is_empty()).then(|| Category {
                    text: s.to_string(),
                    children: Vec::new(),
                })
            })
            .collect();
        Self {
            text: text.to_string(),
            children,
        }
    }
}
