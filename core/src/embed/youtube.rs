use url::form_urlencoded;

use super::{EmbedFragment, IFRAME_STYLE, PlaybackOptions, ReadinessSignal, param, responsive_wrapper};
use crate::config::EmbedConfig;
use crate::markup::Element;
use crate::media::Provider;

const ALLOW: &str =
    "autoplay; fullscreen; picture-in-picture; encrypted-media; accelerometer; gyroscope";

/// Player URL for a YouTube video id.
///
/// Always targets `/embed/<id>`. The six playback parameters are appended as
/// one block when either flag is set, and not at all otherwise.
pub fn youtube_src(video_id: &str, options: PlaybackOptions, origin: &str) -> String {
    let mut src = format!(
        "{}/embed/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(video_id)
    );

    if options.any() {
        let background = options.background;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("autoplay", param(options.autoplay))
            .append_pair("mute", param(background))
            .append_pair("controls", param(!background))
            .append_pair("disablekb", param(background))
            .append_pair("loop", param(background))
            .append_pair("playsinline", param(background))
            .finish();
        src.push('?');
        src.push_str(&query);
    }

    src
}

/// Responsive YouTube iframe embed
pub fn build_youtube(
    video_id: &str,
    options: PlaybackOptions,
    title: Option<&str>,
    config: &EmbedConfig,
) -> EmbedFragment {
    let iframe = Element::new("iframe")
        .attr("src", youtube_src(video_id, options, &config.youtube_origin))
        .attr("style", IFRAME_STYLE)
        .attr("allow", ALLOW)
        .flag("allowfullscreen")
        .attr("scrolling", "no")
        .attr("title", title.unwrap_or(config.youtube_title.as_str()))
        .attr("loading", "lazy");

    EmbedFragment::new(
        Provider::YouTube,
        responsive_wrapper(&config.aspect_ratio_padding, iframe),
        ReadinessSignal::IframeLoad,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.youtube.com";

    #[test]
    fn test_plain_embed_path() {
        let src = youtube_src("abc123", PlaybackOptions::default(), ORIGIN);
        assert_eq!(src, "https://www.youtube.com/embed/abc123");
    }

    #[test]
    fn test_background_parameter_block() {
        let src = youtube_src("abc123", PlaybackOptions::new(true, true), ORIGIN);
        assert_eq!(
            src,
            "https://www.youtube.com/embed/abc123?autoplay=1&mute=1&controls=0&disablekb=1&loop=1&playsinline=1"
        );
    }

    #[test]
    fn test_autoplay_only_keeps_controls() {
        let src = youtube_src("abc123", PlaybackOptions::new(true, false), ORIGIN);
        assert_eq!(
            src,
            "https://www.youtube.com/embed/abc123?autoplay=1&mute=0&controls=1&disablekb=0&loop=0&playsinline=0"
        );
    }

    #[test]
    fn test_background_without_play_intent() {
        let src = youtube_src("abc123", PlaybackOptions::new(false, true), ORIGIN);
        assert!(src.ends_with("?autoplay=0&mute=1&controls=0&disablekb=1&loop=1&playsinline=1"));
    }

    #[test]
    fn test_id_is_encoded_and_missing_id_stays_valid() {
        let src = youtube_src("a b&c", PlaybackOptions::default(), "https://www.youtube.com/");
        assert_eq!(src, "https://www.youtube.com/embed/a%20b%26c");

        let fragment = build_youtube("", PlaybackOptions::default(), None, &EmbedConfig::default());
        let iframe = fragment.root().find(&|e| e.tag() == "iframe").unwrap();
        assert_eq!(iframe.attr_value("src"), Some("https://www.youtube.com/embed/"));
    }

    #[test]
    fn test_iframe_attributes() {
        let fragment = build_youtube(
            "abc123",
            PlaybackOptions::default(),
            Some("Launch keynote"),
            &EmbedConfig::default(),
        );
        let iframe = fragment.root().find(&|e| e.tag() == "iframe").unwrap();
        assert_eq!(iframe.attr_value("loading"), Some("lazy"));
        assert_eq!(iframe.attr_value("title"), Some("Launch keynote"));
        assert!(iframe.attr_value("allow").unwrap().contains("picture-in-picture"));
        assert!(iframe.has_attr("allowfullscreen"));
        assert!(iframe.to_string().contains(" allowfullscreen "));
        assert!(!iframe.to_string().contains("allowfullscreen=\"\""));
    }
}
