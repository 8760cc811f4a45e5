// ABOUTME: CLI for generating podcast feeds with the castgen feed library.
// ABOUTME: Reads a channel/episode descriptor document and writes the RSS feed XML.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use castgen_feed::{
    build_podcast, ChannelDescriptor, DescriptorOptions, EnclosureType, EpisodeDescriptor,
};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Build an RSS 2.0 podcast feed from a JSON descriptor document.
#[derive(Parser, Debug)]
#[command(name = "castgen-cli")]
#[command(about = "Generate a podcast RSS feed from channel and episode descriptors", long_about = None)]
struct Args {
    /// Descriptor JSON: a local path, an http(s) URL, or "-" for stdin.
    input: String,

    /// Write the feed here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL that episode media files are served from.
    #[arg(long, env = "CASTGEN_MEDIA_BASE_URL", default_value = "")]
    media_base_url: String,

    /// Media type of the enclosures (extension or MIME type).
    #[arg(long, default_value = "m4a")]
    enclosure_type: String,

    /// Canonical URL of the generated feed, emitted as an atom self-link.
    #[arg(long, env = "CASTGEN_SELF_LINK")]
    self_link: Option<String>,

    #[arg(long, default_value = "")]
    author_name: String,

    #[arg(long, default_value = "")]
    author_email: String,

    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Input document layout.
#[derive(Debug, Deserialize)]
struct FeedDocument {
    channel: ChannelDescriptor,
    #[serde(default)]
    episodes: Vec<EpisodeDescriptor>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let kind = EnclosureType::from(args.enclosure_type.as_str());
    if kind == EnclosureType::Unknown {
        return Err(anyhow!(
            "unsupported enclosure type: {}",
            args.enclosure_type
        ));
    }

    let bytes = load_bytes(&args.input)?;
    let doc: FeedDocument = serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid descriptor document: {}", args.input))?;

    let options = DescriptorOptions {
        media_base_url: args.media_base_url,
        enclosure_type: kind,
        self_link: args.self_link,
        author_name: args.author_name,
        author_email: args.author_email,
    };
    let build = build_podcast(&doc.channel, &doc.episodes, &options);
    if !build.rejected.is_empty() {
        tracing::warn!(
            count = build.rejected.len(),
            "some episodes were skipped"
        );
    }

    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            build.podcast.encode(&mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            build.podcast.encode(&mut out)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_bytes(target: &str) -> Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        let resp = reqwest::blocking::get(target)?.error_for_status()?;
        let bytes = resp.bytes()?;
        return Ok(bytes.to_vec());
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read(path)?)
}
