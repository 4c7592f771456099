use super::{EmbedFragment, MediaCommand, PlaybackOptions, ReadinessSignal};
use crate::markup::Element;
use crate::media::Provider;

/// Native `<video>` element for a directly referenced file.
///
/// Background playback drops the controls and loops inline. Muting (and the
/// explicit play that must follow it) is deferred to the `canplay` signal so
/// browsers accept the autoplay.
pub fn build_native(
    source: &str,
    extension: &str,
    options: PlaybackOptions,
    title: Option<&str>,
) -> EmbedFragment {
    let mut video = Element::new("video").flag("controls");
    if options.autoplay {
        video.set_flag("autoplay");
    }

    let mut on_ready = Vec::new();
    if options.background {
        video.set_flag("loop");
        video.set_flag("playsinline");
        video.remove_attr("controls");
        on_ready.push(MediaCommand::Mute);
        if options.autoplay {
            on_ready.push(MediaCommand::Play);
        }
    }

    if let Some(title) = title {
        video.set_attr("aria-label", title);
    }

    video.push(
        Element::new("source")
            .attr("src", source)
            .attr("type", format!("video/{extension}")),
    );

    EmbedFragment::new(Provider::NativeFile, video, ReadinessSignal::CanPlay).with_on_ready(on_ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file() {
        let fragment = build_native("clip.mp4", "mp4", PlaybackOptions::default(), None);
        assert_eq!(
            fragment.to_html(),
            r#"<video controls><source src="clip.mp4" type="video/mp4"></video>"#
        );
        assert_eq!(fragment.readiness(), ReadinessSignal::CanPlay);
        assert!(fragment.on_ready().is_empty());
    }

    #[test]
    fn test_autoplay_keeps_controls() {
        let fragment = build_native("clip.webm", "webm", PlaybackOptions::new(true, false), None);
        let video = fragment.root();
        assert!(video.has_attr("controls"));
        assert!(video.has_attr("autoplay"));
        assert!(!video.has_attr("muted"));
        assert!(fragment.on_ready().is_empty());
    }

    #[test]
    fn test_background_defers_mute_and_play() {
        let fragment = build_native("loop.mp4", "mp4", PlaybackOptions::new(true, true), None);
        let video = fragment.root();
        assert!(!video.has_attr("controls"));
        assert!(video.has_attr("loop"));
        assert!(video.has_attr("playsinline"));
        // never muted at construction
        assert!(!video.has_attr("muted"));
        assert_eq!(fragment.on_ready(), &[MediaCommand::Mute, MediaCommand::Play]);

        let fragment = build_native("loop.mp4", "mp4", PlaybackOptions::new(false, true), None);
        assert_eq!(fragment.on_ready(), &[MediaCommand::Mute]);
    }

    #[test]
    fn test_title_becomes_label() {
        let fragment = build_native("a.mov", "mov", PlaybackOptions::default(), Some("Demo"));
        assert_eq!(fragment.root().attr_value("aria-label"), Some("Demo"));
    }
}
