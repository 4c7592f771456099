//! Turns an authored block into a live one.
//!
//! Decoration is synchronous: it extracts the reference, validates it, puts
//! the initial presentation in place and arms the activation controller.
//! Everything after that is driven by [`BlockEvent`]s from the host.

use std::sync::Arc;

use log::{debug, info, warn};
use url::Url;

use crate::activation::{
    ActivationController, ActivationState, IntersectionEntry, MotionPreference, Trigger,
};
use crate::block::{Block, BlockContent};
use crate::config::EmbedConfig;
use crate::embed::{MediaCommand, ReadinessSignal};
use crate::error::EmbedError;
use crate::media::{MediaReference, RequestFlags, extract_block, parse_reference};
use crate::placeholder;

/// What the block currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// "No media configured" guidance
    NoMedia,
    /// "Invalid video URL." message
    InvalidReference,
    /// Static preview, optionally with a play button
    Preview { play_button: bool },
    /// Nothing yet; waiting for the block to become visible
    Deferred,
    /// Player markup attached
    Embedded,
}

/// Host events a decorated block reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEvent {
    Intersection(Vec<IntersectionEntry>),
    PlayClicked,
    Ready(ReadinessSignal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The embed was attached
    Activated,
    /// The `embed-loaded` flag flipped; the commands were applied
    Ready(Vec<MediaCommand>),
    Ignored,
}

/// Decorates blocks with a shared config and a motion preference read once
#[derive(Debug, Clone)]
pub struct Decorator {
    config: Arc<EmbedConfig>,
    reduced_motion: bool,
}

impl Decorator {
    pub fn new(config: EmbedConfig, motion: &dyn MotionPreference) -> Self {
        let reduced_motion = motion.prefers_reduced_motion();
        debug!("Decorator created, reduced motion: {}", reduced_motion);
        Self {
            config: Arc::new(config),
            reduced_motion,
        }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Decorate one authored block. Never fails: every problem ends up as a
    /// message inside the returned block.
    pub fn decorate(&self, content: &BlockContent) -> DecoratedBlock {
        let mut block = Block::new(content.classes.clone());
        let page_url = content.page_url.as_deref().and_then(|u| Url::parse(u).ok());
        let extracted = extract_block(content, page_url.as_ref(), &self.config);

        let Some(reference) = extracted.reference else {
            debug!("Block {:?} has no media reference", content.name);
            block.append(placeholder::no_media_message(&self.config));
            return DecoratedBlock {
                name: content.name.clone(),
                block,
                presentation: Presentation::NoMedia,
                reference: None,
                controller: None,
                error: Some(EmbedError::NoReferenceFound),
            };
        };

        let base = page_url.or_else(|| self.config.base());
        let parsed = match parse_reference(reference.uri(), base.as_ref()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Block {:?}: {}", content.name, err);
                block.append(placeholder::invalid_reference_message(&self.config));
                return DecoratedBlock {
                    name: content.name.clone(),
                    block,
                    presentation: Presentation::InvalidReference,
                    reference: Some(reference),
                    controller: None,
                    error: Some(err),
                };
            }
        };

        block.set_embed_loaded(false);
        let mut controller = ActivationController::new(
            parsed,
            extracted.flags,
            extracted.title,
            self.reduced_motion,
            Arc::clone(&self.config),
        );

        let presentation = match &content.picture {
            Some(picture) => {
                let play_button = !extracted.flags.autoplay_requested;
                placeholder::present_preview(&mut block, picture, play_button);
                controller.arm(true);
                Presentation::Preview { play_button }
            }
            None => {
                controller.arm(false);
                Presentation::Deferred
            }
        };

        info!(
            "Decorated block {:?} with {} reference {} ({:?})",
            content.name,
            controller.reference().provider().as_str(),
            reference.uri(),
            presentation
        );

        DecoratedBlock {
            name: content.name.clone(),
            block,
            presentation,
            reference: Some(reference),
            controller: Some(controller),
            error: None,
        }
    }
}

/// A block after decoration, owning its subtree and activation state
#[derive(Debug, Clone)]
pub struct DecoratedBlock {
    name: Option<String>,
    block: Block,
    presentation: Presentation,
    reference: Option<MediaReference>,
    controller: Option<ActivationController>,
    error: Option<EmbedError>,
}

impl DecoratedBlock {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn reference(&self) -> Option<&MediaReference> {
        self.reference.as_ref()
    }

    /// Why no embed will ever be attached, if that is the case
    pub fn error(&self) -> Option<&EmbedError> {
        self.error.as_ref()
    }

    pub fn flags(&self) -> RequestFlags {
        self.controller
            .as_ref()
            .map(ActivationController::flags)
            .unwrap_or_default()
    }

    /// `Idle` for blocks that never got a controller
    pub fn state(&self) -> ActivationState {
        self.controller
            .as_ref()
            .map_or(ActivationState::Idle, ActivationController::state)
    }

    pub fn is_observing(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(ActivationController::is_observing)
    }

    pub fn awaits_click(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(ActivationController::awaits_click)
    }

    /// The readiness signal the attached embed will emit, until it does
    pub fn readiness_signal(&self) -> Option<ReadinessSignal> {
        self.controller
            .as_ref()
            .and_then(ActivationController::awaited_signal)
    }

    pub fn dispatch(&mut self, event: BlockEvent) -> EventOutcome {
        let Some(controller) = self.controller.as_mut() else {
            debug!("Event {:?} ignored: block {:?} is not armed", event, self.name);
            return EventOutcome::Ignored;
        };

        match event {
            BlockEvent::Intersection(entries) => {
                if controller.on_intersection(&mut self.block, &entries) {
                    self.presentation = Presentation::Embedded;
                    EventOutcome::Activated
                } else {
                    EventOutcome::Ignored
                }
            }
            BlockEvent::PlayClicked => {
                if controller.on_user_trigger(&mut self.block) {
                    self.presentation = Presentation::Embedded;
                    EventOutcome::Activated
                } else {
                    EventOutcome::Ignored
                }
            }
            BlockEvent::Ready(signal) => {
                let was_loaded = self.block.embed_loaded();
                let commands = controller.on_ready(&mut self.block, signal);
                if !was_loaded && self.block.embed_loaded() {
                    EventOutcome::Ready(commands)
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    /// The block scrolled fully into view
    pub fn intersect(&mut self) -> EventOutcome {
        self.dispatch(BlockEvent::Intersection(vec![IntersectionEntry::visible()]))
    }

    pub fn click_play(&mut self) -> EventOutcome {
        self.dispatch(BlockEvent::PlayClicked)
    }

    /// Deliver the readiness signal the attached embed is waiting for
    pub fn ready(&mut self) -> EventOutcome {
        match self.readiness_signal() {
            Some(signal) => self.dispatch(BlockEvent::Ready(signal)),
            None => EventOutcome::Ignored,
        }
    }

    /// Attach the embed right away, bypassing the armed trigger
    pub fn load_now(&mut self) -> EventOutcome {
        let Some(controller) = self.controller.as_mut() else {
            return EventOutcome::Ignored;
        };
        if controller.activate(&mut self.block, Trigger::Visibility) {
            self.presentation = Presentation::Embedded;
            EventOutcome::Activated
        } else {
            EventOutcome::Ignored
        }
    }

    pub fn to_html(&self) -> String {
        self.block.to_html()
    }
}

#[cfg(test)]
mod tests;
