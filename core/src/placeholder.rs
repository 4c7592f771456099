//! Static previews and informational messages shown in place of an embed.

use log::debug;

use crate::block::{Block, Picture};
use crate::config::EmbedConfig;
use crate::markup::Element;

pub const PLACEHOLDER_CLASS: &str = "video-placeholder";
pub const PLAY_CLASS: &str = "video-placeholder-play";
pub const TEXT_CLASS: &str = "video-placeholder-text";
pub const ERROR_CLASS: &str = "video-error";
/// Block class marking that a preview is on screen
pub const BLOCK_PLACEHOLDER_CLASS: &str = "placeholder";

/// Guidance for a block that references no media
pub fn no_media_message(config: &EmbedConfig) -> Element {
    Element::new("div")
        .attr("class", TEXT_CLASS)
        .text(config.no_media_message.clone())
        .child(Element::new("br"))
        .child(Element::new("small").text(config.no_media_hint.clone()))
}

pub fn invalid_reference_message(config: &EmbedConfig) -> Element {
    Element::new("div")
        .attr("class", format!("{TEXT_CLASS} {ERROR_CLASS}"))
        .text(config.invalid_url_message.clone())
}

/// Render the authored picture as a preview, with a play button overlaid
/// inside the preview when the user is expected to start playback.
pub fn present_preview(block: &mut Block, picture: &Picture, show_play: bool) {
    let mut wrapper = Element::new("div")
        .attr("class", PLACEHOLDER_CLASS)
        .child(picture.to_element());

    if show_play {
        wrapper.push(
            Element::new("div").attr("class", PLAY_CLASS).child(
                Element::new("button")
                    .attr("type", "button")
                    .attr("title", "Play"),
            ),
        );
    }

    block.append(wrapper);
    block.add_class(BLOCK_PLACEHOLDER_CLASS);
}

/// Take the preview, play button included, off the block; returns whether a
/// preview was present
pub fn remove_preview(block: &mut Block) -> bool {
    let removed = block.remove_children_with_class(PLACEHOLDER_CLASS);
    block.remove_class(BLOCK_PLACEHOLDER_CLASS);
    if removed > 0 {
        debug!("Removed {} preview element(s)", removed);
    }
    removed > 0
}
