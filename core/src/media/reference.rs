use log::debug;
use url::Url;

use crate::block::BlockContent;
use crate::config::EmbedConfig;

/// Provider name fragments that make free text count as a media reference
const PROVIDER_MARKERS: &[&str] = &["youtube", "youtu.be", "vimeo"];
/// Generic URL scheme marker
const SCHEME_MARKER: &str = "http";

/// Where in the authored block a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `data-src` placed by the authoring tool
    ExplicitData,
    /// A link element pointing away from the current page
    LinkElement,
    /// Plain text content mentioning a media marker
    FreeText,
}

/// The single canonical media reference of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    uri: String,
    source_kind: SourceKind,
}

impl MediaReference {
    pub fn new(uri: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            uri: uri.into(),
            source_kind,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }
}

/// What the author asked for, assembled once per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFlags {
    pub autoplay_requested: bool,
    pub background_requested: bool,
}

impl RequestFlags {
    /// Derive flags from authored attributes and class markers.
    ///
    /// A structured `data-*` flag, when authored, wins over the class marker.
    /// An autoplay request also asks for background (ambient) playback.
    pub fn from_content(content: &BlockContent) -> Self {
        let autoplay_requested = content
            .data_value(|d| d.autoplay.as_ref())
            .map(is_true)
            .unwrap_or_else(|| content.has_class("autoplay"));
        let background_requested = content
            .data_value(|d| d.background.as_ref())
            .map(is_true)
            .unwrap_or_else(|| content.has_class("background"));

        Self {
            autoplay_requested,
            background_requested: background_requested || autoplay_requested,
        }
    }

    /// Whether the block asks for motion without a user gesture
    pub fn wants_motion(&self) -> bool {
        self.autoplay_requested || self.background_requested
    }
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Everything the pipeline needs from the authored block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock {
    pub reference: Option<MediaReference>,
    pub flags: RequestFlags,
    pub title: Option<String>,
}

/// Run the reference extractor and flag derivation over an authored block
pub fn extract_block(
    content: &BlockContent,
    page_url: Option<&Url>,
    config: &EmbedConfig,
) -> ExtractedBlock {
    let reference = extract(content, page_url, config);
    let flags = RequestFlags::from_content(content);
    let title = content
        .data_value(|d| d.title.as_ref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    debug!(
        "Extracted reference {:?} with flags {:?} from block {:?}",
        reference, flags, content.name
    );

    ExtractedBlock {
        reference,
        flags,
        title,
    }
}

/// Find the block's media reference; the first matching source wins
pub fn extract(
    content: &BlockContent,
    page_url: Option<&Url>,
    config: &EmbedConfig,
) -> Option<MediaReference> {
    if let Some(src) = content
        .data_value(|d| d.src.as_ref())
        .filter(|s| !s.trim().is_empty())
    {
        return Some(MediaReference::new(src, SourceKind::ExplicitData));
    }

    if let Some(href) = content.link.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        if let Some(target) = resolve_link(href, page_url) {
            return Some(MediaReference::new(target, SourceKind::LinkElement));
        }
    }

    let text = content.text.trim();
    if !text.is_empty() && has_media_marker(text, &config.extension_markers) {
        return Some(MediaReference::new(text, SourceKind::FreeText));
    }

    None
}

/// Resolve a link target, returning `None` when it points at the page itself
fn resolve_link(href: &str, page_url: Option<&Url>) -> Option<String> {
    let resolved = match page_url {
        Some(page) => page.join(href),
        None => Url::parse(href),
    };

    match resolved {
        Ok(target) if Some(&target) == page_url => {
            debug!("Ignoring link {} that targets the current page", href);
            None
        }
        Ok(target) => Some(target.to_string()),
        // kept verbatim; the decorator reports it as an invalid URL
        Err(_) => Some(href.to_string()),
    }
}

fn has_media_marker(text: &str, extension_markers: &[String]) -> bool {
    let lowered = text.to_lowercase();
    PROVIDER_MARKERS.iter().any(|m| lowered.contains(m))
        || extension_markers
            .iter()
            .any(|m| lowered.contains(&m.to_lowercase()))
        || lowered.contains(SCHEME_MARKER)
}
