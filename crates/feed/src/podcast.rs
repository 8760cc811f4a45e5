// ABOUTME: Podcast (channel) builder: accumulates channel metadata and validated episodes.
// ABOUTME: Applies channel-to-episode inheritance on insert and serializes through the configured Renderer.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::episode::Episode;
use crate::error::{PodcastError, ValidationError};
use crate::format::{truncate_chars, truncate_subtitle, Formatters, SUMMARY_MAX_CHARS};
use crate::models::{AtomLink, Author, Category, Image, TextInput};
use crate::options::{PodcastBuilder, PodcastOptions};
use crate::render::{Renderer, RssEnvelope, XML_HEADER};

/// A podcast channel and its episodes.
///
/// Episodes are append-only and kept in insertion order. Serialization only
/// reads the accumulated state, so a Podcast can be encoded repeatedly. The
/// type is not meant for concurrent mutation; wrap it in a lock if several
/// threads add episodes.
#[derive(Debug, Clone)]
pub struct Podcast {
    pub title: String,
    pub link: String,
    pub description: String,
    pub cloud: Option<String>,
    pub copyright: Option<String>,
    pub docs: Option<String>,
    pub language: String,
    pub rating: Option<String>,
    pub skip_hours: Option<String>,
    pub skip_days: Option<String>,
    pub ttl: Option<u32>,
    pub web_master: Option<String>,
    pub text_input: Option<TextInput>,

    pub itunes_block: Option<String>,
    pub itunes_duration: Option<String>,
    pub itunes_explicit: Option<String>,
    pub itunes_complete: Option<String>,
    pub itunes_new_feed_url: Option<String>,

    category: String,
    generator: String,
    last_build_date: String,
    pub_date: String,
    managing_editor: Option<String>,
    image: Option<Image>,
    atom_link: Option<AtomLink>,
    itunes_author: Option<String>,
    itunes_subtitle: Option<String>,
    itunes_summary: Option<String>,
    itunes_image: Option<String>,
    itunes_owner: Option<Author>,
    itunes_categories: Vec<Category>,
    episodes: Vec<Episode>,

    formatters: Formatters,
    renderer: Arc<dyn Renderer>,
}

impl Podcast {
    /// Creates a podcast with the required channel fields and default options.
    ///
    /// Missing dates are filled with the current UTC time.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
        pub_date: Option<DateTime<FixedOffset>>,
        last_build_date: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self::with_options(
            title.into(),
            link.into(),
            description.into(),
            pub_date,
            last_build_date,
            PodcastOptions::default(),
        )
    }

    /// Shorthand for `PodcastBuilder::new`.
    pub fn builder(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> PodcastBuilder {
        PodcastBuilder::new(title, link, description)
    }

    pub(crate) fn with_options(
        title: String,
        link: String,
        description: String,
        pub_date: Option<DateTime<FixedOffset>>,
        last_build_date: Option<DateTime<FixedOffset>>,
        opts: PodcastOptions,
    ) -> Self {
        let formatters = opts.formatters;
        Self {
            title,
            link,
            description,
            cloud: None,
            copyright: None,
            docs: None,
            language: opts.language,
            rating: None,
            skip_hours: None,
            skip_days: None,
            ttl: None,
            web_master: None,
            text_input: None,
            itunes_block: None,
            itunes_duration: None,
            itunes_explicit: None,
            itunes_complete: None,
            itunes_new_feed_url: None,
            category: String::new(),
            generator: opts.generator,
            last_build_date: (formatters.date)(last_build_date.as_ref()),
            pub_date: (formatters.date)(pub_date.as_ref()),
            managing_editor: None,
            image: None,
            atom_link: None,
            itunes_author: None,
            itunes_subtitle: None,
            itunes_summary: None,
            itunes_image: None,
            itunes_owner: None,
            itunes_categories: Vec::new(),
            episodes: Vec::new(),
            formatters,
            renderer: opts.renderer,
        }
    }

    /// Sets the managing editor and iTunes author to `email (name)`.
    /// Ignored when the email is empty.
    pub fn add_author(&mut self, name: &str, email: &str) {
        if email.is_empty() {
            return;
        }
        let formatted = (self.formatters.author)(Some(&Author::new(name, email)));
        self.managing_editor = Some(formatted.clone());
        self.itunes_author = Some(formatted);
    }

    /// Sets the iTunes owner block. Ignored when the email is empty.
    pub fn add_owner(&mut self, name: &str, email: &str) {
        if email.is_empty() {
            return;
        }
        self.itunes_owner = Some(Author::new(name, email));
    }

    /// Adds an atom self-link to the feed's canonical URL.
    pub fn add_atom_link(&mut self, href: &str) {
        if href.is_empty() {
            return;
        }
        self.atom_link = Some(AtomLink::self_link(href));
    }

    /// Appends a category.
    ///
    /// RSS only has one flat category, so repeated calls extend a
    /// comma-joined list. Each call also appends a node to the iTunes
    /// category tree with one child per non-empty subcategory. Apple only
    /// accepts its published category names.
    pub fn add_category<S: AsRef<str>>(&mut self, category: &str, subcategories: &[S]) {
        if category.is_empty() {
            return;
        }
        if !self.category.is_empty() {
            self.category.push(',');
        }
        self.category.push_str(category);
        self.itunes_categories
            .push(Category::with_subcategories(category, subcategories));
    }

    /// Sets the channel image (title and link copied from the channel) and
    /// the iTunes image.
    pub fn add_image(&mut self, url: &str) {
        if url.is_empty() {
            return;
        }
        self.image = Some(Image {
            url: url.to_string(),
            title: self.title.clone(),
            link: self.link.clone(),
            ..Default::default()
        });
        self.itunes_image = Some(url.to_string());
    }

    /// Validates, completes and appends an episode. Returns the new episode
    /// count.
    ///
    /// Media episodes need an enclosure url and a recognised type; article
    /// episodes need a link. GUID, formatted date, formatted author and the
    /// enclosure's length/type text are always recomputed here. The episode
    /// inherits the channel author and image when it has none.
    pub fn add_episode(&mut self, mut episode: Episode) -> Result<usize, PodcastError> {
        if let Err(err) = validate(&episode) {
            debug!(title = %episode.title, error = %err, "episode rejected");
            return Err(err.into());
        }

        episode.pub_date_formatted = (self.formatters.date)(episode.pub_date.as_ref());
        episode.author_formatted = (self.formatters.author)(episode.author.as_ref());
        if let Some(seconds) = episode.duration_seconds.filter(|s| *s > 0) {
            episode.itunes_duration = Some((self.formatters.duration)(seconds));
        }

        match episode.enclosure.as_mut() {
            Some(enclosure) => {
                episode.guid = enclosure.url.clone();
                enclosure.finalize();
                if episode.link.is_empty() {
                    episode.link = enclosure.url.clone();
                }
            }
            None => episode.guid = episode.link.clone(),
        }

        if is_blank(&episode.itunes_author) {
            if let Some(author) = &episode.author {
                episode.itunes_author = Some(author.email.clone());
            } else if let Some(inherited) = [&self.itunes_author, &self.managing_editor]
                .into_iter()
                .flatten()
                .find(|s| !s.is_empty())
            {
                episode.author = Some(Author::new("", inherited.as_str()));
                episode.itunes_author = Some(inherited.clone());
            }
        }

        if episode.itunes_image.is_none() {
            if let Some(image) = &self.image {
                episode.itunes_image = Some(image.url.clone());
            }
        }

        debug!(
            title = %episode.title,
            guid = %episode.guid,
            count = self.episodes.len() + 1,
            "episode added"
        );
        self.episodes.push(episode);
        Ok(self.episodes.len())
    }

    /// Reformats and replaces the channel publish date.
    pub fn add_pub_date(&mut self, datetime: Option<DateTime<FixedOffset>>) {
        self.pub_date = (self.formatters.date)(datetime.as_ref());
    }

    /// Reformats and replaces the channel last build date.
    pub fn add_last_build_date(&mut self, datetime: Option<DateTime<FixedOffset>>) {
        self.last_build_date = (self.formatters.date)(datetime.as_ref());
    }

    /// Sets the iTunes subtitle, cut to 61 characters plus `...` when longer
    /// than 64.
    pub fn add_subtitle(&mut self, subtitle: &str) {
        if subtitle.is_empty() {
            return;
        }
        self.itunes_subtitle = Some(truncate_subtitle(subtitle));
    }

    /// Sets the CDATA summary, keeping at most 4000 characters.
    pub fn add_summary(&mut self, summary: &str) {
        if summary.is_empty() {
            return;
        }
        self.itunes_summary = Some(truncate_chars(summary, SUMMARY_MAX_CHARS));
    }

    /// Writes the XML declaration and the rendered document to `w`.
    pub fn encode(&self, w: &mut dyn Write) -> Result<(), PodcastError> {
        w.write_all(XML_HEADER.as_bytes())?;
        self.renderer.render(w, &RssEnvelope::wrap(self))
    }

    /// Renders the document to a String.
    ///
    /// On failure the returned text is the error description rather than a
    /// feed; prefer `encode` when failures must be detected.
    pub fn to_xml_string(&self) -> String {
        let mut buf = Vec::new();
        if let Err(err) = self.encode(&mut buf) {
            return format!("String: podcast.write returned the error: {err}");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Same as `to_xml_string`, as bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn pub_date(&self) -> &str {
        &self.pub_date
    }

    pub fn last_build_date(&self) -> &str {
        &self.last_build_date
    }

    pub fn managing_editor(&self) -> Option<&str> {
        self.managing_editor.as_deref()
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn atom_link(&self) -> Option<&AtomLink> {
        self.atom_link.as_ref()
    }

    pub fn itunes_author(&self) -> Option<&str> {
        self.itunes_author.as_deref()
    }

    pub fn itunes_subtitle(&self) -> Option<&str> {
        self.itunes_subtitle.as_deref()
    }

    pub fn itunes_summary(&self) -> Option<&str> {
        self.itunes_summary.as_deref()
    }

    pub fn itunes_image(&self) -> Option<&str> {
        self.itunes_image.as_deref()
    }

    pub fn itunes_owner(&self) -> Option<&Author> {
        self.itunes_owner.as_ref()
    }

    pub fn itunes_categories(&self) -> &[Category] {
        &self.itunes_categories
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }
}

fn validate(episode: &Episode) -> Result<(), ValidationError> {
    if episode.title.is_empty() || episode.description.is_empty() {
        return Err(ValidationError::MissingTitleOrDescription);
    }
    match &episode.enclosure {
        Some(enc) if enc.url.is_empty() => Err(ValidationError::MissingEnclosureUrl {
            title: episode.title.clone(),
        }),
        Some(enc) if enc.kind.is_unresolved() => Err(ValidationError::MissingEnclosureType {
            title: episode.title.clone(),
        }),
        None if episode.link.is_empty() => Err(ValidationError::MissingLink {
            title: episode.title.clone(),
        }),
        _ => Ok(()),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enclosure::EnclosureType;

    fn podcast() -> Podcast {
        Podcast::new("Show", "https://x", "About the show", None, None)
    }

    fn media_episode(title: &str, url: &str) -> Episode {
        let mut ep = Episode::new(title, "", "Episode description");
        ep.add_enclosure(url, EnclosureType::Mp3, 1024);
        ep
    }

    #[test]
    fn test_new_sets_defaults() {
        let p = podcast();
        assert_eq!(p.language, "en-us");
        assert!(p.generator().starts_with("castgen v"));
        assert!(!p.pub_date().is_empty());
        assert!(!p.last_build_date().is_empty());
        assert!(p.episodes().is_empty());
    }

    #[test]
    fn test_rejects_missing_title_or_description() {
        let mut p = podcast();
        let err = p.add_episode(Episode::new("", "https://x/a", "desc")).unwrap_err();
        assert_eq!(err.to_string(), "Title and Description are required");
        let err = p.add_episode(Episode::new("Title", "https://x/a", "")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(p.episodes().len(), 0);
    }

    #[test]
    fn test_rejects_enclosure_without_url() {
        let mut p = podcast();
        let err = p.add_episode(media_episode("Ep 1", "")).unwrap_err();
        assert_eq!(err.to_string(), "Ep 1: Enclosure.URL is required");
        assert_eq!(p.episodes().len(), 0);
    }

    #[test]
    fn test_rejects_unknown_enclosure_type() {
        let mut p = podcast();
        let mut ep = Episode::new("Ep 1", "", "desc");
        ep.add_enclosure("https://x/e1.ogg", EnclosureType::from("ogg"), 10);
        let err = p.add_episode(ep).unwrap_err();
        assert_eq!(err.to_string(), "Ep 1: Enclosure.Type is required");
        assert_eq!(p.episodes().len(), 0);
    }

    #[test]
    fn test_rejects_article_without_link() {
        let mut p = podcast();
        let err = p.add_episode(Episode::new("Ep 1", "", "desc")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ep 1: Link is required when not using Enclosure"
        );
    }

    #[test]
    fn test_guid_from_enclosure_url() {
        let mut p = podcast();
        let count = p.add_episode(media_episode("Ep 1", "https://x/e1.mp3")).unwrap();
        assert_eq!(count, 1);
        let ep = &p.episodes()[0];
        assert_eq!(ep.guid(), "https://x/e1.mp3");
        assert_eq!(ep.link, "https://x/e1.mp3");
        assert_eq!(ep.enclosure().unwrap().type_formatted(), "audio/mpeg");
        assert_eq!(ep.enclosure().unwrap().length_formatted(), "1024");
    }

    #[test]
    fn test_guid_follows_replaced_enclosure() {
        let mut a = podcast();
        a.add_episode(media_episode("Ep 1", "https://x/old.mp3")).unwrap();

        let mut copy = a.episodes()[0].clone();
        copy.add_enclosure("https://x/new.mp3", EnclosureType::Mp3, 2048);
        let mut b = podcast();
        b.add_episode(copy).unwrap();

        let ep = &b.episodes()[0];
        assert_eq!(ep.guid(), "https://x/new.mp3");
        assert_eq!(ep.enclosure().unwrap().url, "https://x/new.mp3");
        assert_eq!(ep.enclosure().unwrap().length_formatted(), "2048");
    }

    #[test]
    fn test_enclosure_keeps_explicit_link() {
        let mut p = podcast();
        let mut ep = media_episode("Ep 1", "https://x/e1.mp3");
        ep.link = "https://x/show-notes/1".to_string();
        p.add_episode(ep).unwrap();
        let ep = &p.episodes()[0];
        assert_eq!(ep.link, "https://x/show-notes/1");
        assert_eq!(ep.guid(), "https://x/e1.mp3");
    }

    #[test]
    fn test_guid_from_link_without_enclosure() {
        let mut p = podcast();
        p.add_episode(Episode::new("Article", "https://x/a1", "desc"))
            .unwrap();
        assert_eq!(p.episodes()[0].guid(), "https://x/a1");
    }

    #[test]
    fn test_negative_length_clamped() {
        let mut p = podcast();
        let mut ep = Episode::new("Ep", "", "desc");
        ep.add_enclosure("https://x/e.m4a", EnclosureType::M4a, -1);
        p.add_episode(ep).unwrap();
        let enc = p.episodes()[0].enclosure().unwrap();
        assert_eq!(enc.length, 0);
        assert_eq!(enc.length_formatted(), "0");
    }

    #[test]
    fn test_author_inherited_from_channel() {
        let mut p = podcast();
        p.add_author("Jane Doe", "jane@example.com");
        p.add_episode(media_episode("Ep 1", "https://x/e1.mp3")).unwrap();
        let ep = &p.episodes()[0];
        assert_eq!(ep.itunes_author.as_deref(), Some("jane@example.com (Jane Doe)"));
        assert_eq!(
            ep.author.as_ref().map(|a| a.email.as_str()),
            Some("jane@example.com (Jane Doe)")
        );
        // formatted before inheritance, so the item-level <author> stays empty
        assert_eq!(ep.author_formatted(), "");
    }

    #[test]
    fn test_episode_author_wins() {
        let mut p = podcast();
        p.add_author("Jane Doe", "jane@example.com");
        let mut ep = media_episode("Ep 1", "https://x/e1.mp3");
        ep.author = Some(Author::new("Guest", "guest@example.com"));
        p.add_episode(ep).unwrap();
        let ep = &p.episodes()[0];
        assert_eq!(ep.itunes_author.as_deref(), Some("guest@example.com"));
        assert_eq!(ep.author_formatted(), "guest@example.com (Guest)");
    }

    #[test]
    fn test_explicit_itunes_author_kept() {
        let mut p = podcast();
        p.add_author("Jane Doe", "jane@example.com");
        let mut ep = media_episode("Ep 1", "https://x/e1.mp3");
        ep.itunes_author = Some("Someone Else".to_string());
        p.add_episode(ep).unwrap();
        assert_eq!(
            p.episodes()[0].itunes_author.as_deref(),
            Some("Someone Else")
        );
        assert!(p.episodes()[0].author.is_none());
    }

    #[test]
    fn test_no_author_anywhere() {
        let mut p = podcast();
        p.add_episode(media_episode("Ep 1", "https://x/e1.mp3")).unwrap();
        assert!(p.episodes()[0].itunes_author.is_none());
    }

    #[test]
    fn test_image_inherited_from_channel() {
        let mut p = podcast();
        p.add_image("https://x/cover.jpg");
        p.add_episode(media_episode("Ep 1", "https://x/e1.mp3")).unwrap();

        let mut own = media_episode("Ep 2", "https://x/e2.mp3");
        own.add_image("https://x/ep2.jpg");
        p.add_episode(own).unwrap();

        assert_eq!(p.episodes()[0].itunes_image(), Some("https://x/cover.jpg"));
        assert_eq!(p.episodes()[1].itunes_image(), Some("https://x/ep2.jpg"));
    }

    #[test]
    fn test_add_image_copies_channel_fields() {
        let mut p = podcast();
        p.add_image("");
        assert!(p.image().is_none());
        p.add_image("https://x/cover.jpg");
        let image = p.image().unwrap();
        assert_eq!(image.title, "Show");
        assert_eq!(image.link, "https://x");
        assert_eq!(p.itunes_image(), Some("https://x/cover.jpg"));
    }

    #[test]
    fn test_add_author_requires_email() {
        let mut p = podcast();
        p.add_author("Jane", "");
        assert!(p.managing_editor().is_none());
        assert!(p.itunes_author().is_none());

        p.add_author("", "jane@example.com");
        assert_eq!(p.managing_editor(), Some("jane@example.com"));
        assert_eq!(p.itunes_author(), Some("jane@example.com"));
    }

    #[test]
    fn test_categories_accumulate() {
        let mut p = podcast();
        p.add_category("A", &[] as &[&str]);
        p.add_category("B", &["B1", ""]);
        p.add_category("", &["ignored"]);
        assert_eq!(p.category(), "A,B");
        assert_eq!(p.itunes_categories().len(), 2);
        assert_eq!(p.itunes_categories()[1].children.len(), 1);
    }

    #[test]
    fn test_subtitle_and_summary_rules() {
        let mut p = podcast();
        p.add_subtitle("");
        p.add_summary("");
        assert!(p.itunes_subtitle().is_none());
        assert!(p.itunes_summary().is_none());

        p.add_subtitle(&"s".repeat(100));
        let subtitle = p.itunes_subtitle().unwrap();
        assert_eq!(subtitle, format!("{}...", "s".repeat(61)));

        p.add_summary(&"m".repeat(4500));
        assert_eq!(p.itunes_summary().unwrap().chars().count(), 4000);
    }

    #[test]
    fn test_insertion_uses_injected_formatters() {
        let mut p = Podcast::builder("Show", "https://x", "About")
            .formatters(
                Formatters::default()
                    .with_date(|_| "DATE".to_string())
                    .with_author(|a| a.map(|a| a.email.to_uppercase()).unwrap_or_default())
                    .with_duration(|s| format!("{s}s")),
            )
            .build();
        let mut ep = media_episode("Ep 1", "https://x/e1.mp3");
        ep.author = Some(Author::new("n", "me@x"));
        ep.add_duration(90);
        p.add_episode(ep).unwrap();

        let ep = &p.episodes()[0];
        assert_eq!(ep.pub_date_formatted(), "DATE");
        assert_eq!(ep.author_formatted(), "ME@X");
        assert_eq!(ep.itunes_duration(), Some("90s"));
    }

    #[test]
    fn test_episodes_keep_insertion_order() {
        let mut p = podcast();
        for i in [3, 1, 2, 1] {
            p.add_episode(media_episode(&format!("Ep {i}"), &format!("https://x/{i}.mp3")))
                .unwrap();
        }
        let titles: Vec<&str> = p.episodes().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Ep 3", "Ep 1", "Ep 2", "Ep 1"]);
    }

    #[test]
    fn test_feed_dates_replaced_after_construction() {
        let mut p = podcast();
        p.add_pub_date(Some(
            DateTime::parse_from_rfc3339("2024-03-05T08:09:10+02:00").unwrap(),
        ));
        p.add_last_build_date(Some(
            DateTime::parse_from_rfc3339("2024-12-25T23:00:00-05:00").unwrap(),
        ));
        assert_eq!(p.pub_date(), "Tue, 05 Mar 2024 08:09:10 +0200");
        assert_eq!(p.last_build_date(), "Wed, 25 Dec 2024 23:00:00 -0500");

        let xml = p.to_xml_string();
        assert!(xml.contains("<pubDate>Tue, 05 Mar 2024 08:09:10 +0200</pubDate>"));
        assert!(xml.contains("<lastBuildDate>Wed, 25 Dec 2024 23:00:00 -0500</lastBuildDate>"));
    }

    #[test]
    fn test_feed_dates_default_to_now() {
        let mut p = podcast();
        p.add_pub_date(Some(
            DateTime::parse_from_rfc3339("2020-01-01T00:00:00+00:00").unwrap(),
        ));
        p.add_pub_date(None);
        p.add_last_build_date(None);

        let now = chrono::Utc::now().timestamp();
        for text in [p.pub_date(), p.last_build_date()] {
            let parsed = DateTime::parse_from_str(text, crate::format::RFC1123Z).unwrap();
            assert_eq!(parsed.offset().local_minus_utc(), 0);
            assert!((now - parsed.timestamp()).abs() < 60, "{text} is not current");
        }
    }
}
