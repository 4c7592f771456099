mod local;
mod vimeo;
mod youtube;

use log::debug;

use crate::config::EmbedConfig;
use crate::markup::Element;
use crate::media::{ParsedReference, Provider, ProviderKind};

pub use local::build_native;
pub use vimeo::{build_vimeo, vimeo_src};
pub use youtube::{build_youtube, youtube_src};

const IFRAME_STYLE: &str = "border: 0; top: 0; left: 0; width: 100%; height: 100%; position: absolute;";

/// Effective playback intent handed to a builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Start playing as soon as the player is ready
    pub autoplay: bool,
    /// Muted, looped, control-free ambient playback
    pub background: bool,
}

impl PlaybackOptions {
    pub fn new(autoplay: bool, background: bool) -> Self {
        Self {
            autoplay,
            background,
        }
    }

    /// Whether provider parameters need to be appended at all
    pub fn any(&self) -> bool {
        self.autoplay || self.background
    }
}

/// Event an attached embed emits once its resource starts loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessSignal {
    /// `load` on a provider iframe
    IframeLoad,
    /// `canplay` on a native video element
    CanPlay,
}

/// Media element operations deferred until the readiness signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    Mute,
    Play,
}

/// A provider's player markup, not yet attached to a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFragment {
    provider: Provider,
    root: Element,
    readiness: ReadinessSignal,
    on_ready: Vec<MediaCommand>,
}

impl EmbedFragment {
    pub fn new(provider: Provider, root: Element, readiness: ReadinessSignal) -> Self {
        Self {
            provider,
            root,
            readiness,
            on_ready: Vec::new(),
        }
    }

    pub fn with_on_ready(mut self, commands: Vec<MediaCommand>) -> Self {
        self.on_ready = commands;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn readiness(&self) -> ReadinessSignal {
        self.readiness
    }

    pub fn on_ready(&self) -> &[MediaCommand] {
        &self.on_ready
    }

    /// Split into the markup to attach and what to run once it is ready
    pub fn into_parts(self) -> (Element, ReadinessSignal, Vec<MediaCommand>) {
        (self.root, self.readiness, self.on_ready)
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }
}

/// Build the embed for a parsed reference with the builder of its provider
pub fn build_embed(
    reference: &ParsedReference,
    options: PlaybackOptions,
    title: Option<&str>,
    config: &EmbedConfig,
) -> EmbedFragment {
    debug!(
        "Building {} embed for {} with {:?}",
        reference.provider().as_str(),
        reference.uri(),
        options
    );
    match reference.kind() {
        ProviderKind::YouTube { video_id } => build_youtube(video_id, options, title, config),
        ProviderKind::Vimeo { video_id } => build_vimeo(video_id, options, title, config),
        ProviderKind::NativeFile { extension } => {
            build_native(reference.uri(), extension, options, title)
        }
    }
}

/// Fixed-aspect wrapper around a provider iframe
fn responsive_wrapper(padding: &str, iframe: Element) -> Element {
    Element::new("div")
        .attr(
            "style",
            format!("left: 0; width: 100%; height: 0; position: relative; padding-bottom: {padding};"),
        )
        .child(iframe)
}

fn param(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}
