// ABOUTME: Serialization of a Podcast into an RSS 2.0 document with iTunes extensions.
// ABOUTME: Defines the namespace envelope, the Renderer strategy trait and the default quick-xml renderer.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::episode::Episode;
use crate::error::PodcastError;
use crate::models::Category;
use crate::podcast::Podcast;

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
pub const RSS_VERSION: &str = "2.0";
pub const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// The `<rss>` root wrapped around a channel at serialization time.
#[derive(Debug, Clone, Copy)]
pub struct RssEnvelope<'a> {
    pub version: &'static str,
    /// Only declared when the channel carries an atom self-link.
    pub atom_ns: Option<&'static str>,
    pub itunes_ns: &'static str,
    pub content_ns: &'static str,
    pub channel: &'a Podcast,
}

impl<'a> RssEnvelope<'a> {
    pub fn wrap(channel: &'a Podcast) -> Self {
        Self {
            version: RSS_VERSION,
            atom_ns: channel.atom_link().map(|_| ATOM_NS),
            itunes_ns: ITUNES_NS,
            content_ns: CONTENT_NS,
            channel,
        }
    }
}

/// Turns an envelope into document text on the given stream.
///
/// Implementations must only read the podcast. Errors are handed back to the
/// caller of `Podcast::encode` untouched.
pub trait Renderer: Send + Sync + fmt::Debug {
    fn render(&self, out: &mut dyn Write, envelope: &RssEnvelope<'_>) -> Result<(), PodcastError>;
}

/// Default renderer: indented XML via quick-xml, elements in RSS 2.0 order
/// followed by the iTunes extension fields.
#[derive(Debug, Clone, Copy)]
pub struct XmlRenderer {
    indent: usize,
}

impl XmlRenderer {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }
}

impl Default for XmlRenderer {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl Renderer for XmlRenderer {
    fn render(&self, out: &mut dyn Write, envelope: &RssEnvelope<'_>) -> Result<(), PodcastError> {
        let mut writer = Writer::new_with_indent(out, b' ', self.indent);

        let mut rss = BytesStart::new("rss");
        push_attr(&mut rss, "version", envelope.version);
        if let Some(atom) = envelope.atom_ns {
            push_attr(&mut rss, "xmlns:atom", atom);
        }
        push_attr(&mut rss, "xmlns:itunes", envelope.itunes_ns);
        push_attr(&mut rss, "xmlns:content", envelope.content_ns);

        writer.write_event(Event::Start(rss))?;
        write_channel(&mut writer, envelope.channel)?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;
        Ok(())
    }
}

fn write_channel<W: Write>(w: &mut Writer<W>, p: &Podcast) -> Result<(), PodcastError> {
    w.write_event(Event::Start(BytesStart::new("channel")))?;

    text_element(w, "title", &p.title)?;
    text_element(w, "link", &p.link)?;
    text_element(w, "description", &p.description)?;
    opt_element(w, "category", Some(p.category()))?;
    opt_element(w, "cloud", p.cloud.as_deref())?;
    opt_element(w, "copyright", p.copyright.as_deref())?;
    opt_element(w, "docs", p.docs.as_deref())?;
    opt_element(w, "generator", Some(p.generator()))?;
    opt_element(w, "language", Some(p.language.as_str()))?;
    opt_element(w, "lastBuildDate", Some(p.last_build_date()))?;
    opt_element(w, "managingEditor", p.managing_editor())?;
    opt_element(w, "pubDate", Some(p.pub_date()))?;
    opt_element(w, "rating", p.rating.as_deref())?;
    opt_element(w, "skipHours", p.skip_hours.as_deref())?;
    opt_element(w, "skipDays", p.skip_days.as_deref())?;
    if let Some(ttl) = p.ttl.filter(|t| *t > 0) {
        text_element(w, "ttl", &ttl.to_string())?;
    }
    opt_element(w, "webMaster", p.web_master.as_deref())?;

    if let Some(image) = p.image() {
        w.write_event(Event::Start(BytesStart::new("image")))?;
        text_element(w, "url", &image.url)?;
        text_element(w, "title", &image.title)?;
        text_element(w, "link", &image.link)?;
        opt_element(w, "description", image.description.as_deref())?;
        if let Some(width) = image.width.filter(|v| *v > 0) {
            text_element(w, "width", &width.to_string())?;
        }
        if let Some(height) = image.height.filter(|v| *v > 0) {
            text_element(w, "height", &height.to_string())?;
        }
        w.write_event(Event::End(BytesEnd::new("image")))?;
    }

    if let Some(input) = &p.text_input {
        w.write_event(Event::Start(BytesStart::new("textInput")))?;
        text_element(w, "title", &input.title)?;
        text_element(w, "description", &input.description)?;
        text_element(w, "name", &input.name)?;
        text_element(w, "link", &input.link)?;
        w.write_event(Event::End(BytesEnd::new("textInput")))?;
    }

    if let Some(atom) = p.atom_link() {
        let mut link = BytesStart::new("atom:link");
        push_attr(&mut link, "href", atom.href.as_str());
        push_attr(&mut link, "rel", atom.rel.as_str());
        push_attr(&mut link, "type", atom.mime_type.as_str());
        w.write_event(Event::Empty(link))?;
    }

    opt_element(w, "itunes:author", p.itunes_author())?;
    opt_element(w, "itunes:subtitle", p.itunes_subtitle())?;
    if let Some(summary) = p.itunes_summary() {
        cdata_element(w, "itunes:summary", summary)?;
    }
    opt_element(w, "itunes:block", p.itunes_block.as_deref())?;
    if let Some(href) = p.itunes_image() {
        href_element(w, "itunes:image", href)?;
    }
    opt_element(w, "itunes:duration", p.itunes_duration.as_deref())?;
    opt_element(w, "itunes:explicit", p.itunes_explicit.as_deref())?;
    opt_element(w, "itunes:complete", p.itunes_complete.as_deref())?;
    opt_element(w, "itunes:new-feed-url", p.itunes_new_feed_url.as_deref())?;
    if let Some(owner) = p.itunes_owner() {
        w.write_event(Event::Start(BytesStart::new("itunes:owner")))?;
        text_element(w, "itunes:name", &owner.name)?;
        text_element(w, "itunes:email", &owner.email)?;
        w.write_event(Event::End(BytesEnd::new("itunes:owner")))?;
    }
    for category in p.itunes_categories() {
        write_category(w, category)?;
    }

    for episode in p.episodes() {
        write_episode(w, episode)?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    Ok(())
}

fn write_episode<W: Write>(w: &mut Writer<W>, e: &Episode) -> Result<(), PodcastError> {
    w.write_event(Event::Start(BytesStart::new("item")))?;

    text_element(w, "guid", e.guid())?;
    text_element(w, "title", &e.title)?;
    text_element(w, "link", &e.link)?;
    text_element(w, "description", &e.description)?;
    opt_element(w, "author", Some(e.author_formatted()))?;
    opt_element(w, "category", e.category.as_deref())?;
    opt_element(w, "comments", e.comments.as_deref())?;
    opt_element(w, "source", e.source.as_deref())?;
    opt_element(w, "pubDate", Some(e.pub_date_formatted()))?;

    if let Some(enc) = e.enclosure() {
        let mut tag = BytesStart::new("enclosure");
        push_attr(&mut tag, "url", enc.url.as_str());
        push_attr(&mut tag, "length", enc.length_formatted());
        push_attr(&mut tag, "type", enc.type_formatted());
        w.write_event(Event::Empty(tag))?;
    }

    opt_element(w, "itunes:author", e.itunes_author.as_deref())?;
    opt_element(w, "itunes:subtitle", e.itunes_subtitle.as_deref())?;
    if let Some(summary) = e.itunes_summary() {
        cdata_element(w, "itunes:summary", summary)?;
    }
    if let Some(href) = e.itunes_image() {
        href_element(w, "itunes:image", href)?;
    }
    opt_element(w, "itunes:duration", e.itunes_duration())?;
    opt_element(w, "itunes:explicit", e.itunes_explicit.as_deref())?;
    opt_element(w, "itunes:isClosedCaptioned", e.itunes_closed_captioned.as_deref())?;
    opt_element(w, "itunes:order", e.itunes_order.as_deref())?;

    w.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_category<W: Write>(w: &mut Writer<W>, category: &Category) -> Result<(), PodcastError> {
    let mut tag = BytesStart::new("itunes:category");
    push_attr(&mut tag, "text", category.text.as_str());
    if category.children.is_empty() {
        w.write_event(Event::Empty(tag))?;
        return Ok(());
    }
    w.write_event(Event::Start(tag))?;
    for child in &category.children {
        write_category(w, child)?;
    }
    w.write_event(Event::End(BytesEnd::new("itunes:category")))?;
    Ok(())
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<(), PodcastError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Writes the element only when the value is present and non-empty.
fn opt_element<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    text: Option<&str>,
) -> Result<(), PodcastError> {
    match text {
        Some(t) if !t.is_empty() => text_element(w, name, t),
        _ => Ok(()),
    }
}

fn href_element<W: Write>(w: &mut Writer<W>, name: &str, href: &str) -> Result<(), PodcastError> {
    let mut tag = BytesStart::new(name);
    push_attr(&mut tag, "href", href);
    w.write_event(Event::Empty(tag))?;
    Ok(())
}

/// Writes `<name><![CDATA[text]]></name>` on one line.
fn cdata_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<(), PodcastError> {
    let raw = cdata(text);
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Wraps text in a CDATA section, splitting any embedded `]]>`.
pub(crate) fn cdata(text: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        xml_safe(text).replace("]]>", "]]]]><![CDATA[>")
    )
}

fn push_attr(tag: &mut BytesStart<'_>, key: &str, value: &str) {
    let value = xml_safe(value);
    tag.push_attribute((key, &*value));
}

/// Replaces characters XML 1.0 does not allow with U+FFFD.
pub(crate) fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
