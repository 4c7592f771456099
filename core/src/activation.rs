//! Deferred loading of embeds.
//!
//! A decorated block starts `Idle`, is `Armed` once it waits for either the
//! visibility trigger or the user trigger, and becomes `Loaded` when the
//! fragment is attached. `Loaded` is terminal. The block's `embed-loaded`
//! flag flips separately, when the attached player reports readiness.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::block::Block;
use crate::config::EmbedConfig;
use crate::embed::{MediaCommand, PlaybackOptions, ReadinessSignal, build_embed};
use crate::media::{ParsedReference, RequestFlags};
use crate::placeholder;

/// Environment variable consulted by [`EnvMotionPreference`]
pub const REDUCED_MOTION_ENV: &str = "PREFERS_REDUCED_MOTION";

/// Read-only access to the user's reduced-motion accessibility setting
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

/// A fixed preference, mostly useful for hosts that already know the answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticMotionPreference(pub bool);

impl MotionPreference for StaticMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

/// Reads [`REDUCED_MOTION_ENV`]; `1`, `true` and `reduce` mean reduced motion
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMotionPreference;

impl MotionPreference for EnvMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(REDUCED_MOTION_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "reduce"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Nothing attached and nothing armed
    Idle,
    /// Waiting for the visibility or user trigger
    Armed,
    /// Fragment attached
    Loaded,
}

impl ActivationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationState::Idle => "idle",
            ActivationState::Armed => "armed",
            ActivationState::Loaded => "loaded",
        }
    }
}

/// What caused an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The block scrolled into the viewport
    Visibility,
    /// The user clicked the play affordance
    User,
}

/// One intersection observer record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn visible() -> Self {
        Self {
            is_intersecting: true,
        }
    }

    pub fn hidden() -> Self {
        Self {
            is_intersecting: false,
        }
    }
}

/// One-shot visibility observer for a single block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityObserver {
    connected: bool,
}

impl VisibilityObserver {
    pub fn observe() -> Self {
        Self { connected: true }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Feed a batch of entries; fires at most once, disconnecting on fire
    pub fn notify(&mut self, entries: &[IntersectionEntry]) -> bool {
        if !self.connected {
            return false;
        }
        if entries.iter().any(|entry| entry.is_intersecting) {
            self.disconnect();
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReadiness {
    signal: ReadinessSignal,
    delivered: bool,
}

/// Per-block activation state machine
#[derive(Debug, Clone)]
pub struct ActivationController {
    state: ActivationState,
    reference: ParsedReference,
    flags: RequestFlags,
    title: Option<String>,
    reduced_motion: bool,
    config: Arc<EmbedConfig>,
    observer: Option<VisibilityObserver>,
    click_armed: bool,
    pending: Option<PendingReadiness>,
    on_ready: Vec<MediaCommand>,
}

impl ActivationController {
    pub fn new(
        reference: ParsedReference,
        flags: RequestFlags,
        title: Option<String>,
        reduced_motion: bool,
        config: Arc<EmbedConfig>,
    ) -> Self {
        Self {
            state: ActivationState::Idle,
            reference,
            flags,
            title,
            reduced_motion,
            config,
            observer: None,
            click_armed: false,
            pending: None,
            on_ready: Vec::new(),
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn reference(&self) -> &ParsedReference {
        &self.reference
    }

    pub fn flags(&self) -> RequestFlags {
        self.flags
    }

    /// Whether a visibility observer is still connected
    pub fn is_observing(&self) -> bool {
        self.observer.as_ref().is_some_and(VisibilityObserver::is_connected)
    }

    /// Whether a click on the play affordance would activate
    pub fn awaits_click(&self) -> bool {
        self.click_armed
    }

    /// Readiness signal the attached fragment has yet to deliver
    pub fn awaited_signal(&self) -> Option<ReadinessSignal> {
        self.pending.filter(|p| !p.delivered).map(|p| p.signal)
    }

    /// Move from `Idle` to `Armed`.
    ///
    /// Visibility is observed when there is no preview or autoplay was
    /// requested; otherwise only the user trigger is armed.
    pub fn arm(&mut self, has_preview: bool) {
        if self.state != ActivationState::Idle {
            debug!("Ignoring arm request in state {:?}", self.state);
            return;
        }

        if !has_preview || self.flags.autoplay_requested {
            self.observer = Some(VisibilityObserver::observe());
            debug!("Armed visibility trigger for {}", self.reference.uri());
        } else {
            self.click_armed = true;
            debug!("Armed user trigger for {}", self.reference.uri());
        }
        self.state = ActivationState::Armed;
    }

    /// Effective playback intent for a trigger.
    ///
    /// Reduced motion suppresses the play-immediately intent on every path,
    /// a click included. Background parameters are left alone.
    pub fn options_for(&self, trigger: Trigger) -> PlaybackOptions {
        let autoplay = match trigger {
            Trigger::Visibility => self.flags.wants_motion() && !self.reduced_motion,
            Trigger::User => !self.reduced_motion,
        };
        PlaybackOptions {
            autoplay,
            background: self.flags.background_requested,
        }
    }

    /// Visibility trigger: activates on the first intersecting entry
    pub fn on_intersection(&mut self, block: &mut Block, entries: &[IntersectionEntry]) -> bool {
        let fired = match self.observer.as_mut() {
            Some(observer) => observer.notify(entries),
            None => false,
        };
        if !fired {
            return false;
        }
        // the observer is torn down as soon as it fires
        self.observer = None;
        self.activate(block, Trigger::Visibility)
    }

    /// User trigger: removes the preview and activates synchronously
    pub fn on_user_trigger(&mut self, block: &mut Block) -> bool {
        if !self.click_armed {
            warn!(
                "Play click on {} ignored: no play affordance is armed",
                self.reference.uri()
            );
            return false;
        }
        self.click_armed = false;
        placeholder::remove_preview(block);
        self.activate(block, Trigger::User)
    }

    /// Attach the embed. Idempotent: a block that is already loaded, or whose
    /// `embed-loaded` flag is set, is left untouched.
    pub fn activate(&mut self, block: &mut Block, trigger: Trigger) -> bool {
        if self.state == ActivationState::Loaded || block.embed_loaded() {
            debug!(
                "Activation by {:?} skipped for {}: embed already loaded",
                trigger,
                self.reference.uri()
            );
            return false;
        }

        let options = self.options_for(trigger);
        let fragment = build_embed(&self.reference, options, self.title.as_deref(), &self.config);
        let (root, signal, on_ready) = fragment.into_parts();

        // a preview still on screen (autoplay with preview) gives way to the player
        placeholder::remove_preview(block);
        block.append(root);

        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
        self.observer = None;
        self.click_armed = false;
        self.pending = Some(PendingReadiness {
            signal,
            delivered: false,
        });
        self.on_ready = on_ready;
        self.state = ActivationState::Loaded;

        info!(
            "Loaded {} embed for {} via {:?} ({:?})",
            self.reference.provider().as_str(),
            self.reference.uri(),
            trigger,
            options
        );
        true
    }

    /// Readiness signal from the attached player.
    ///
    /// Sets the block's `embed-loaded` flag once and applies the deferred
    /// media commands, returning them so the host can forward `Play`.
    pub fn on_ready(&mut self, block: &mut Block, signal: ReadinessSignal) -> Vec<MediaCommand> {
        let Some(pending) = self.pending.as_mut() else {
            debug!("Readiness {:?} before activation ignored", signal);
            return Vec::new();
        };
        if pending.delivered || block.embed_loaded() {
            return Vec::new();
        }
        if pending.signal != signal {
            debug!("Readiness {:?} ignored, waiting for {:?}", signal, pending.signal);
            return Vec::new();
        }

        pending.delivered = true;
        block.set_embed_loaded(true);

        let commands = std::mem::take(&mut self.on_ready);
        if commands.contains(&MediaCommand::Mute) {
            if let Some(video) = block.find_mut(&|el| el.tag() == "video") {
                video.set_flag("muted");
            }
        }
        if commands.contains(&MediaCommand::Play) {
            info!("Starting playback of {}", self.reference.uri());
        }
        commands
    }
}
