// ABOUTME: Enclosure media-type registry and the downloadable enclosure record.
// ABOUTME: Maps EnclosureType values to the MIME strings podcast directories accept.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIME type used for anything the registry does not recognise.
pub const ENCLOSURE_DEFAULT_MIME: &str = "application/octet-stream";

/// Semantic media type of an episode enclosure.
///
/// See https://help.apple.com/itc/podcasts_connect/#/itcb54353390 for the
/// accepted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnclosureType {
    M4a,
    M4v,
    Mp4,
    Mp3,
    Mov,
    Pdf,
    Epub,
    #[default]
    Unknown,
}

impl EnclosureType {
    /// Returns the MIME string for this type, falling back to
    /// `application/octet-stream`.
    pub fn mime(&self) -> &'static str {
        match self {
            EnclosureType::M4a => "audio/x-m4a",
            EnclosureType::M4v => "video/x-m4v",
            EnclosureType::Mp4 => "video/mp4",
            EnclosureType::Mp3 => "audio/mpeg",
            EnclosureType::Mov => "video/quicktime",
            EnclosureType::Pdf => "application/pdf",
            EnclosureType::Epub => "document/x-epub",
            EnclosureType::Unknown => ENCLOSURE_DEFAULT_MIME,
        }
    }

    /// File extension used when building media URLs for this type.
    pub fn extension(&self) -> &'static str {
        match self {
            EnclosureType::M4a => "m4a",
            EnclosureType::M4v => "m4v",
            EnclosureType::Mp4 => "mp4",
            EnclosureType::Mp3 => "mp3",
            EnclosureType::Mov => "mov",
            EnclosureType::Pdf => "pdf",
            EnclosureType::Epub => "epub",
            EnclosureType::Unknown => "bin",
        }
    }

    /// True when the type resolves to the default sentinel MIME string.
    pub fn is_unresolved(&self) -> bool {
        self.mime() == ENCLOSURE_DEFAULT_MIME
    }
}

impl fmt::Display for EnclosureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

impl From<&str> for EnclosureType {
    /// Accepts a file extension (with or without the dot) or a MIME string.
    fn from(s: &str) -> Self {
        let lower = s.trim().trim_start_matches('.').to_lowercase();
        match lower.as_str() {
            "m4a" | "audio/x-m4a" => EnclosureType::M4a,
            "m4v" | "video/x-m4v" => EnclosureType::M4v,
            "mp4" | "video/mp4" => EnclosureType::Mp4,
            "mp3" | "audio/mpeg" => EnclosureType::Mp3,
            "mov" | "video/quicktime" => EnclosureType::Mov,
            "pdf" | "application/pdf" => EnclosureType::Pdf,
            "epub" | "document/x-epub" => EnclosureType::Epub,
            _ => EnclosureType::Unknown,
        }
    }
}

/// A downloadable media reference attached to an episode.
///
/// The formatted length and MIME strings are derived when the episode is
/// added to a podcast; callers only supply url, type and byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub kind: EnclosureType,
    pub length: i64,
    pub(crate) length_formatted: String,
    pub(crate) type_formatted: String,
}

impl Enclosure {
    pub fn new(url: impl Into<String>, kind: EnclosureType, length: i64) -> Self {
        Self {
            url: url.into(),
            kind,
            length,
            length_formatted: String::new(),
            type_formatted: String::new(),
        }
    }

    /// Clamps the length and resolves the MIME type into their text forms.
    pub(crate) fn finalize(&mut self) {
        if self.length < 0 {
            self.length = 0;
        }
        self.length_formatted = self.length.to_string();
        self.type_formatted = self.kind.mime().to_string();
    }

    /// Decimal byte count as written to the `length` attribute.
    pub fn length_formatted(&self) -> &str {
        &self.length_formatted
    }

    /// MIME string as written to the `type` attribute.
    pub fn type_formatted(&self) -> &str {
        &self.type_formatted
    }
}
