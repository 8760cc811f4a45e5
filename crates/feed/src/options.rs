// ABOUTME: Configuration for constructing a Podcast: language, generator, formatters and renderer.
// ABOUTME: PodcastBuilder provides a fluent API over PodcastOptions with the required channel fields.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::format::Formatters;
use crate::podcast::Podcast;
use crate::render::{Renderer, XmlRenderer};

pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Generator string advertised in the channel, carrying the library version.
pub fn default_generator() -> String {
    format!(
        "castgen v{} (https://github.com/castgen/castgen)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Channel defaults and injected strategies.
#[derive(Debug, Clone)]
pub struct PodcastOptions {
    pub language: String,
    pub generator: String,
    pub formatters: Formatters,
    pub renderer: Arc<dyn Renderer>,
}

impl Default for PodcastOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            generator: default_generator(),
            formatters: Formatters::default(),
            renderer: Arc::new(XmlRenderer::default()),
        }
    }
}

/// Builder for a Podcast with custom defaults or strategies.
#[derive(Debug, Clone)]
pub struct PodcastBuilder {
    title: String,
    link: String,
    description: String,
    pub_date: Option<DateTime<FixedOffset>>,
    last_build_date: Option<DateTime<FixedOffset>>,
    opts: PodcastOptions,
}

impl PodcastBuilder {
    /// Start a builder with the three required channel fields.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            pub_date: None,
            last_build_date: None,
            opts: PodcastOptions::default(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: PodcastOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Channel publish date. Defaults to the time of build.
    pub fn pub_date(mut self, datetime: DateTime<FixedOffset>) -> Self {
        self.pub_date = Some(datetime);
        self
    }

    /// Channel last build date. Defaults to the time of build.
    pub fn last_build_date(mut self, datetime: DateTime<FixedOffset>) -> Self {
        self.last_build_date = Some(datetime);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.opts.language = language.into();
        self
    }

    pub fn generator(mut self, generator: impl Into<String>) -> Self {
        self.opts.generator = generator.into();
        self
    }

    /// Set the duration/date/author formatting strategies.
    pub fn formatters(mut self, formatters: Formatters) -> Self {
        self.opts.formatters = formatters;
        self
    }

    /// Set the rendering strategy used by `Podcast::encode`.
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.opts.renderer = renderer;
        self
    }

    /// Build the Podcast, formatting the channel dates immediately.
    pub fn build(self) -> Podcast {
        Podcast::with_options(
            self.title,
            self.link,
            self.description,
            self.pub_date,
            self.last_build_date,
            self.opts,
        )
    }
}
