// ABOUTME: Builds a Podcast from plain channel and episode descriptors supplied by a metadata provider.
// ABOUTME: Maps playlist entries onto media enclosures and collects episodes that fail validation.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::enclosure::EnclosureType;
use crate::episode::Episode;
use crate::error::PodcastError;
use crate::podcast::Podcast;

/// Channel metadata as delivered by the upstream provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelDescriptor {
    pub name: String,
    pub description: String,
    pub link: String,
    pub artwork_url: Option<String>,
    pub category: Option<String>,
    pub subcategories: Vec<String>,
    pub release_date: Option<DateTime<FixedOffset>>,
}

/// One playlist entry as delivered by the upstream provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeDescriptor {
    /// Provider identifier of the underlying video or resource.
    pub id: String,
    pub title: String,
    pub description: String,
    pub position: Option<u32>,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub duration_seconds: i64,
    pub length_bytes: i64,
    pub artwork_url: Option<String>,
}

/// How descriptors are turned into feed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorOptions {
    /// Enclosure URLs are `<media_base_url>/<id>.<ext>`.
    pub media_base_url: String,
    pub enclosure_type: EnclosureType,
    pub self_link: Option<String>,
    pub author_name: String,
    pub author_email: String,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            media_base_url: String::new(),
            enclosure_type: EnclosureType::M4a,
            self_link: None,
            author_name: String::new(),
            author_email: String::new(),
        }
    }
}

impl DescriptorOptions {
    pub fn media_url(&self, id: &str) -> String {
        format!(
            "{}/{}.{}",
            self.media_base_url.trim_end_matches('/'),
            id,
            self.enclosure_type.extension()
        )
    }
}

/// Result of building a podcast from descriptors.
#[derive(Debug)]
pub struct FeedBuild {
    pub podcast: Podcast,
    /// Episodes that failed validation, with their provider id.
    pub rejected: Vec<(String, PodcastError)>,
}

/// Builds a podcast from a channel descriptor and its ordered episodes.
///
/// Episodes are inserted in the order given. An episode that fails
/// validation is logged and recorded in `rejected`; the build continues.
pub fn build_podcast(
    channel: &ChannelDescriptor,
    episodes: &[EpisodeDescriptor],
    options: &DescriptorOptions,
) -> FeedBuild {
    let mut podcast = Podcast::new(
        channel.name.as_str(),
        channel.link.as_str(),
        channel.description.as_str(),
        channel.release_date,
        None,
    );

    if let Some(url) = &channel.artwork_url {
        podcast.add_image(url);
    }
    if let Some(category) = &channel.category {
        podcast.add_category(category, &channel.subcategories);
    }
    podcast.add_author(&options.author_name, &options.author_email);
    podcast.add_owner(&options.author_name, &options.author_email);
    if let Some(href) = &options.self_link {
        podcast.add_atom_link(href);
    }
    podcast.add_summary(&channel.description);

    let mut rejected = Vec::new();
    for descriptor in episodes {
        let episode = to_episode(descriptor, options);
        if let Err(err) = podcast.add_episode(episode) {
            warn!(id = %descriptor.id, error = %err, "skipping episode");
            rejected.push((descriptor.id.clone(), err));
        }
    }

    FeedBuild { podcast, rejected }
}

fn to_episode(descriptor: &EpisodeDescriptor, options: &DescriptorOptions) -> Episode {
    let mut episode = Episode::new(
        descriptor.title.as_str(),
        "",
        descriptor.description.as_str(),
    );
    if !descriptor.id.is_empty() {
        episode.add_enclosure(
            options.media_url(&descriptor.id),
            options.enclosure_type,
            descriptor.length_bytes,
        );
    }
    episode.add_pub_date(descriptor.published_at);
    episode.add_duration(descriptor.duration_seconds);
    if !descriptor.description.is_empty() {
        episode.add_summary(&descriptor.description);
    }
    if let Some(url) = &descriptor.artwork_url {
        episode.add_image(url);
    }
    episode.itunes_order = descriptor.position.map(|p| p.to_string());
    episode
}
