pub mod activation;
pub mod block;
pub mod config;
pub mod decorate;
pub mod embed;
pub mod error;
pub mod markup;
pub mod media;
pub mod placeholder;

// Re-exports
pub use activation::{
    ActivationController, ActivationState, EnvMotionPreference, IntersectionEntry,
    MotionPreference, StaticMotionPreference, Trigger,
};
pub use block::{Block, BlockContent, DataAttributes, Picture};
pub use config::EmbedConfig;
pub use decorate::{BlockEvent, DecoratedBlock, Decorator, EventOutcome, Presentation};
pub use embed::{EmbedFragment, MediaCommand, PlaybackOptions, ReadinessSignal, build_embed};
pub use error::{EmbedError, Result};
pub use media::{MediaReference, ParsedReference, Provider, RequestFlags, classify, parse_reference};
