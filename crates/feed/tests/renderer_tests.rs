// ABOUTME: Integration tests for the pluggable rendering strategy.
// ABOUTME: Uses spy and failing renderers plus a failing writer to check error propagation.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use castgen_feed::{Episode, Podcast, PodcastError, Renderer, RssEnvelope};

#[derive(Debug, Default)]
struct SpyRenderer {
    calls: AtomicUsize,
    seen: Mutex<Vec<(Option<&'static str>, usize)>>,
}

impl Renderer for SpyRenderer {
    fn render(&self, out: &mut dyn Write, envelope: &RssEnvelope<'_>) -> Result<(), PodcastError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((envelope.atom_ns, envelope.channel.episodes().len()));
        out.write_all(b"<spy/>")?;
        Ok(())
    }
}

#[derive(Debug)]
struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&self, _out: &mut dyn Write, _envelope: &RssEnvelope<'_>) -> Result<(), PodcastError> {
        Err(PodcastError::render("boom"))
    }
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_spy_renderer_receives_envelope() {
    let spy = Arc::new(SpyRenderer::default());
    let mut p = Podcast::builder("Show", "https://example.com", "About")
        .renderer(spy.clone())
        .build();
    p.add_atom_link("https://example.com/feed.xml");
    p.add_episode(Episode::new("A", "https://example.com/a", "desc"))
        .unwrap();

    let xml = p.to_xml_string();
    assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<spy/>");
    assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        spy.seen.lock().unwrap().as_slice(),
        &[(Some("http://www.w3.org/2005/Atom"), 1)]
    );
}

#[test]
fn test_render_failure_is_propagated() {
    let p = Podcast::builder("Show", "https://example.com", "About")
        .renderer(Arc::new(FailingRenderer))
        .build();

    let mut buf = Vec::new();
    let err = p.encode(&mut buf).unwrap_err();
    assert!(matches!(err, PodcastError::Render(ref msg) if msg == "boom"));
    // the declaration was already written before the renderer ran
    assert!(buf.starts_with(b"<?xml"));
}

#[test]
fn test_to_xml_string_masks_failure() {
    let p = Podcast::builder("Show", "https://example.com", "About")
        .renderer(Arc::new(FailingRenderer))
        .build();
    assert_eq!(
        p.to_xml_string(),
        "String: podcast.write returned the error: render failed: boom"
    );
}

#[test]
fn test_writer_failure_is_propagated() {
    let p = Podcast::new("Show", "https://example.com", "About", None, None);
    let err = p.encode(&mut BrokenPipe).unwrap_err();
    match err {
        PodcastError::Io(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_instances_do_not_share_renderers() {
    let spy = Arc::new(SpyRenderer::default());
    let spied = Podcast::builder("A", "https://a", "a")
        .renderer(spy.clone())
        .build();
    let plain = Podcast::new("B", "https://b", "b", None, None);

    assert!(plain.to_xml_string().contains("<title>B</title>"));
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    let _ = spied.to_xml_string();
    assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
}
