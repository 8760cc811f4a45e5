// ABOUTME: Podcast feed construction and serialization library for castgen.
// ABOUTME: Builds validated RSS 2.0 + iTunes channels and renders them as XML.

pub mod descriptor;
pub mod enclosure;
pub mod episode;
pub mod error;
pub mod format;
pub mod models;
pub mod options;
pub mod podcast;
pub mod render;

pub use descriptor::{
    build_podcast, ChannelDescriptor, DescriptorOptions, EpisodeDescriptor, FeedBuild,
};
pub use enclosure::{Enclosure, EnclosureType, ENCLOSURE_DEFAULT_MIME};
pub use episode::Episode;
pub use error::{PodcastError, ValidationError};
pub use format::{format_author, format_date, format_duration, Formatters};
pub use models::{AtomLink, Author, Category, Image, TextInput};
pub use options::{PodcastBuilder, PodcastOptions};
pub use podcast::Podcast;
pub use render::{Renderer, RssEnvelope, XmlRenderer};
