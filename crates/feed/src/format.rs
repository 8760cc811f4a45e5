// ABOUTME: Text formatters for RSS/iTunes fields: durations, dates, authors and truncation.
// ABOUTME: Formatters bundles them as injectable strategies owned by each Podcast.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::Author;

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Maximum scalar values kept in an iTunes summary.
pub const SUMMARY_MAX_CHARS: usize = 4000;

/// Subtitles longer than this are cut and suffixed with an ellipsis.
pub const SUBTITLE_MAX_CHARS: usize = 64;

/// Formats a positive number of seconds as an iTunes duration.
///
/// Layouts:
/// - `HH:MM:SS` when hours > 9
/// - `H:MM:SS` when hours is 1..=9
/// - `MM:SS` when there are no hours and minutes > 9
/// - `M:SS` otherwise
///
/// Callers skip the field entirely for values <= 0.
pub fn format_duration(duration: i64) -> String {
    let h = duration / 3600;
    let rem = duration % 3600;
    let m = rem / 60;
    let s = rem % 60;

    if h > 9 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else if m > 9 {
        format!("{:02}:{:02}", m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Formats a timestamp in RFC 1123Z.
///
/// A missing timestamp, or the Unix epoch, is replaced with the current UTC
/// time. Never fails.
pub fn format_date(datetime: Option<&DateTime<FixedOffset>>) -> String {
    match datetime {
        Some(dt) if !is_zero(dt) => dt.format(RFC1123Z).to_string(),
        _ => Utc::now().fixed_offset().format(RFC1123Z).to_string(),
    }
}

fn is_zero(dt: &DateTime<FixedOffset>) -> bool {
    dt.timestamp() == 0 && dt.timestamp_subsec_nanos() == 0
}

/// Formats an author as `email (name)`, or just `email` without a name.
/// A missing author yields an empty string.
pub fn format_author(author: Option<&Author>) -> String {
    match author {
        None => String::new(),
        Some(a) if a.name.is_empty() => a.email.clone(),
        Some(a) => format!("{} ({})", a.email, a.name),
    }
}

/// Keeps at most `max` Unicode scalar values of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Applies the subtitle rule: more than 64 scalar values become the first
/// 61 followed by `...`.
pub fn truncate_subtitle(s: &str) -> String {
    if s.chars().count() > SUBTITLE_MAX_CHARS {
        let mut out = truncate_chars(s, SUBTITLE_MAX_CHARS - 3);
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

pub type DurationFormatFn = Arc<dyn Fn(i64) -> String + Send + Sync>;
pub type DateFormatFn = Arc<dyn Fn(Option<&DateTime<FixedOffset>>) -> String + Send + Sync>;
pub type AuthorFormatFn = Arc<dyn Fn(Option<&Author>) -> String + Send + Sync>;

/// The formatting strategies a Podcast applies when it finalizes fields.
///
/// Defaults to the functions in this module; tests swap in fixed clocks or
/// recording closures.
#[derive(Clone)]
pub struct Formatters {
    pub duration: DurationFormatFn,
    pub date: DateFormatFn,
    pub author: AuthorFormatFn,
}

impl Formatters {
    /// Replace the duration formatter.
    pub fn with_duration<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> String + Send + Sync + 'static,
    {
        self.duration = Arc::new(f);
        self
    }

    /// Replace the date formatter.
    pub fn with_date<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&DateTime<FixedOffset>>) -> String + Send + Sync + 'static,
    {
        self.date = Arc::new(f);
        self
    }

    /// Replace the author formatter.
    pub fn with_author<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Author>) -> String + Send + Sync + 'static,
    {
        self.author = Arc::new(f);
        self
    }
}

impl Default for Formatters {
    fn default() -> Self {
        Self {
            duration: Arc::new(format_duration),
            date: Arc::new(format_date),
            author: Arc::new(format_author),
        }
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatters").finish_non_exhaustive()
    }
}
