use url::form_urlencoded;

use super::{EmbedFragment, IFRAME_STYLE, PlaybackOptions, ReadinessSignal, param, responsive_wrapper};
use crate::config::EmbedConfig;
use crate::markup::Element;
use crate::media::Provider;

/// Player URL for a Vimeo video id; `autoplay` and `background` only when set
pub fn vimeo_src(video_id: &str, options: PlaybackOptions, origin: &str) -> String {
    let mut src = format!(
        "{}/video/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(video_id)
    );

    if options.any() {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("autoplay", param(options.autoplay))
            .append_pair("background", param(options.background))
            .finish();
        src.push('?');
        src.push_str(&query);
    }

    src
}

pub fn build_vimeo(
    video_id: &str,
    options: PlaybackOptions,
    title: Option<&str>,
    config: &EmbedConfig,
) -> EmbedFragment {
    let iframe = Element::new("iframe")
        .attr("src", vimeo_src(video_id, options, &config.vimeo_player_origin))
        .attr("style", IFRAME_STYLE)
        .attr("frameborder", "0")
        .attr("allow", "autoplay; fullscreen; picture-in-picture")
        .flag("allowfullscreen")
        .attr("title", title.unwrap_or(config.vimeo_title.as_str()))
        .attr("loading", "lazy");

    EmbedFragment::new(
        Provider::Vimeo,
        responsive_wrapper(&config.aspect_ratio_padding, iframe),
        ReadinessSignal::IframeLoad,
    )
}
