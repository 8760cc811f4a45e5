// ABOUTME: Episode record with the per-item RSS and iTunes fields.
// ABOUTME: Derived fields (GUID, formatted date/author, enclosure text) are filled by Podcast::add_episode.

use chrono::{DateTime, FixedOffset};

use crate::enclosure::{Enclosure, EnclosureType};
use crate::format::{format_date, format_duration, truncate_chars, SUMMARY_MAX_CHARS};
use crate::models::Author;

/// A single podcast episode.
///
/// Article episodes need a title, description and link. Media episodes need
/// a title, description and an enclosure with a url and a recognised type.
///
/// The GUID, formatted publish date, formatted author and the enclosure's
/// length/type text are recomputed when the episode is added to a Podcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: Option<Author>,
    pub category: Option<String>,
    pub comments: Option<String>,
    pub source: Option<String>,

    pub itunes_author: Option<String>,
    pub itunes_subtitle: Option<String>,
    pub itunes_explicit: Option<String>,
    pub itunes_closed_captioned: Option<String>,
    pub itunes_order: Option<String>,

    pub(crate) guid: String,
    pub(crate) pub_date: Option<DateTime<FixedOffset>>,
    pub(crate) pub_date_formatted: String,
    pub(crate) author_formatted: String,
    pub(crate) enclosure: Option<Enclosure>,
    pub(crate) itunes_summary: Option<String>,
    pub(crate) itunes_image: Option<String>,
    pub(crate) duration_seconds: Option<i64>,
    pub(crate) itunes_duration: Option<String>,
}

impl Episode {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Sets the downloadable media, replacing any previous enclosure.
    pub fn add_enclosure(&mut self, url: impl Into<String>, kind: EnclosureType, length: i64) {
        self.enclosure = Some(Enclosure::new(url, kind, length));
    }

    /// Sets the iTunes image. RSS 2.0 has no item-level image, so this only
    /// appears as `itunes:image`.
    pub fn add_image(&mut self, url: &str) {
        if !url.is_empty() {
            self.itunes_image = Some(url.to_string());
        }
    }

    /// Stores the publish timestamp and its RFC 1123Z text.
    pub fn add_pub_date(&mut self, datetime: Option<DateTime<FixedOffset>>) {
        self.pub_date_formatted = format_date(datetime.as_ref());
        self.pub_date = datetime;
    }

    /// Sets the CDATA summary, keeping at most 4000 characters.
    pub fn add_summary(&mut self, summary: &str) {
        self.itunes_summary = Some(truncate_chars(summary, SUMMARY_MAX_CHARS));
    }

    /// Sets the iTunes duration. Values <= 0 leave the field absent.
    pub fn add_duration(&mut self, seconds: i64) {
        if seconds <= 0 {
            return;
        }
        self.duration_seconds = Some(seconds);
        self.itunes_duration = Some(format_duration(seconds));
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn pub_date(&self) -> Option<&DateTime<FixedOffset>> {
        self.pub_date.as_ref()
    }

    pub fn pub_date_formatted(&self) -> &str {
        &self.pub_date_formatted
    }

    pub fn author_formatted(&self) -> &str {
        &self.author_formatted
    }

    pub fn enclosure(&self) -> Option<&Enclosure> {
        self.enclosure.as_ref()
    }

    pub fn itunes_summary(&self) -> Option<&str> {
        self.itunes_summary.as_deref()
    }

    pub fn itunes_image(&self) -> Option<&str> {
        self.itunes_image.as_deref()
    }

    pub fn itunes_duration(&self) -> Option<&str> {
        self.itunes_duration.as_deref()
    }
}
