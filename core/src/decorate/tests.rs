use crate::activation::{ActivationState, IntersectionEntry, StaticMotionPreference};
use crate::block::{BlockContent, DataAttributes, Picture};
use crate::config::EmbedConfig;
use crate::decorate::{BlockEvent, Decorator, EventOutcome, Presentation};
use crate::embed::{MediaCommand, ReadinessSignal};
use crate::error::EmbedError;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn decorator(reduced_motion: bool) -> Decorator {
    init_logger();
    Decorator::new(EmbedConfig::default(), &StaticMotionPreference(reduced_motion))
}

fn with_src(src: &str) -> BlockContent {
    BlockContent::new().with_data(DataAttributes {
        src: Some(src.to_string()),
        ..Default::default()
    })
}

fn iframe_src(html_block: &crate::block::Block) -> String {
    html_block
        .find_tag("iframe")
        .and_then(|f| f.attr_value("src"))
        .expect("iframe with src")
        .to_string()
}

#[test]
fn test_short_link_loads_on_visibility() {
    let mut decorated = decorator(false).decorate(&BlockContent::new().with_link("https://youtu.be/abc123"));

    assert_eq!(decorated.presentation(), Presentation::Deferred);
    assert_eq!(decorated.state(), ActivationState::Armed);
    assert!(decorated.is_observing());
    assert!(decorated.block().children().is_empty());

    assert_eq!(decorated.intersect(), EventOutcome::Activated);
    assert_eq!(iframe_src(decorated.block()), "https://www.youtube.com/embed/abc123");
    assert_eq!(decorated.state(), ActivationState::Loaded);
    assert!(!decorated.is_observing());
}

#[test]
fn test_vimeo_background_parameters() {
    let content = with_src("https://vimeo.com/555").with_class("background");
    let mut decorated = decorator(false).decorate(&content);

    assert_eq!(decorated.intersect(), EventOutcome::Activated);
    assert_eq!(
        iframe_src(decorated.block()),
        "https://player.vimeo.com/video/555?autoplay=1&background=1"
    );
}

#[test]
fn test_free_text_file_becomes_native_video() {
    let mut decorated = decorator(false).decorate(&BlockContent::new().with_text("clip.mp4"));
    assert_eq!(decorated.intersect(), EventOutcome::Activated);

    assert_eq!(
        decorated.to_html(),
        r#"<div class="video" data-embed-loaded="false"><video controls><source src="clip.mp4" type="video/mp4"></video></div>"#
    );
    let video = decorated.block().find_tag("video").unwrap();
    assert!(!video.has_attr("autoplay"));
    assert_eq!(decorated.block().count_tag("source"), 1);
}

#[test]
fn test_malformed_reference_never_embeds() {
    let mut decorated = decorator(false).decorate(&with_src("https://[not-an-ip]/video.mp4"));

    assert_eq!(decorated.presentation(), Presentation::InvalidReference);
    assert!(matches!(
        decorated.error(),
        Some(EmbedError::UnparseableReference { .. })
    ));
    assert!(!decorated.is_observing());
    assert!(decorated.to_html().contains("Invalid video URL."));

    assert_eq!(decorated.intersect(), EventOutcome::Ignored);
    assert_eq!(decorated.click_play(), EventOutcome::Ignored);
    assert_eq!(decorated.load_now(), EventOutcome::Ignored);
    assert_eq!(decorated.block().count_tag("iframe"), 0);
    assert_eq!(decorated.block().count_tag("video"), 0);
    assert_eq!(decorated.block().embed_loaded_flag(), None);
}

#[test]
fn test_missing_reference_shows_guidance_only() {
    let mut decorated = decorator(false).decorate(&BlockContent::new().with_text("Coming soon"));

    assert_eq!(decorated.presentation(), Presentation::NoMedia);
    assert_eq!(decorated.error(), Some(&EmbedError::NoReferenceFound));
    assert_eq!(decorated.state(), ActivationState::Idle);
    assert!(!decorated.is_observing());
    assert_eq!(
        decorated.block().inner_html(),
        "<div class=\"video-placeholder-text\">📹 Click to add video URL<br>\
         <small>Use the properties panel (→) to add YouTube, Vimeo, or MP4 URL</small></div>"
    );
    assert_eq!(decorated.intersect(), EventOutcome::Ignored);
}

#[test]
fn test_decoration_is_repeatable() {
    let decorator = decorator(false);
    let content = with_src("https://youtu.be/abc123").with_picture(Picture::new("/poster.jpg"));

    let first = decorator.decorate(&content);
    let second = decorator.decorate(&content);
    assert_eq!(first.to_html(), second.to_html());
    assert_eq!(first.block().count_tag("picture"), 1);
}

#[test]
fn test_double_activation_attaches_once() {
    let mut decorated = decorator(false).decorate(&with_src("https://youtu.be/abc123"));

    assert_eq!(decorated.intersect(), EventOutcome::Activated);
    assert_eq!(decorated.intersect(), EventOutcome::Ignored);
    assert_eq!(decorated.load_now(), EventOutcome::Ignored);
    assert_eq!(decorated.block().count_tag("iframe"), 1);

    assert_eq!(decorated.ready(), EventOutcome::Ready(Vec::new()));
    assert_eq!(decorated.ready(), EventOutcome::Ignored);
    assert!(decorated.block().embed_loaded());
}

#[test]
fn test_hidden_entries_do_not_activate() {
    let mut decorated = decorator(false).decorate(&with_src("https://vimeo.com/1"));
    let outcome = decorated.dispatch(BlockEvent::Intersection(vec![IntersectionEntry::hidden()]));

    assert_eq!(outcome, EventOutcome::Ignored);
    assert!(decorated.is_observing());
    assert_eq!(decorated.state(), ActivationState::Armed);
}

#[test]
fn test_reduced_motion_suppresses_autoplay() {
    let content = with_src("https://www.youtube.com/watch?v=abc123").with_class("autoplay");
    let mut decorated = decorator(true).decorate(&content);

    assert_eq!(decorated.intersect(), EventOutcome::Activated);
    assert_eq!(
        iframe_src(decorated.block()),
        "https://www.youtube.com/embed/abc123?autoplay=0&mute=1&controls=0&disablekb=1&loop=1&playsinline=1"
    );
}

#[test]
fn test_reduced_motion_native_background_only_mutes() {
    let content = with_src("/media/loop.webm").with_class("background");
    let mut decorated = decorator(true).decorate(&content);
    decorated.intersect();

    let video = decorated.block().find_tag("video").unwrap();
    assert!(!video.has_attr("autoplay"));
    assert_eq!(decorated.ready(), EventOutcome::Ready(vec![MediaCommand::Mute]));
}

#[test]
fn test_click_replaces_preview_with_player() {
    let content = with_src("https://youtu.be/abc123").with_picture(Picture::new("/poster.jpg"));
    let mut decorated = decorator(false).decorate(&content);

    assert_eq!(decorated.presentation(), Presentation::Preview { play_button: true });
    assert!(decorated.block().has_class("placeholder"));
    assert!(decorated.awaits_click());
    assert!(!decorated.is_observing());

    // scrolling into view does nothing while the user trigger is armed
    assert_eq!(decorated.intersect(), EventOutcome::Ignored);

    assert_eq!(decorated.click_play(), EventOutcome::Activated);
    assert_eq!(decorated.presentation(), Presentation::Embedded);
    assert_eq!(decorated.block().count_tag("picture"), 0);
    assert_eq!(decorated.block().count_tag("button"), 0);
    assert!(!decorated.block().has_class("placeholder"));
    assert_eq!(
        iframe_src(decorated.block()),
        "https://www.youtube.com/embed/abc123?autoplay=1&mute=0&controls=1&disablekb=0&loop=0&playsinline=0"
    );

    assert_eq!(decorated.click_play(), EventOutcome::Ignored);
    assert_eq!(decorated.intersect(), EventOutcome::Ignored);
    assert_eq!(decorated.block().count_tag("iframe"), 1);
}

#[test]
fn test_reduced_motion_click_does_not_autoplay() {
    let content = with_src("https://youtu.be/abc123").with_picture(Picture::new("/poster.jpg"));
    let mut decorated = decorator(true).decorate(&content);
    assert!(decorated.awaits_click());

    assert_eq!(decorated.click_play(), EventOutcome::Activated);
    let src = iframe_src(decorated.block());
    assert!(!src.contains("autoplay=1"));
    assert_eq!(src, "https://www.youtube.com/embed/abc123");

    let content = with_src("https://vimeo.com/42")
        .with_class("background")
        .with_picture(Picture::new("/poster.jpg"));
    let mut decorated = decorator(true).decorate(&content);
    decorated.click_play();
    assert_eq!(
        iframe_src(decorated.block()),
        "https://player.vimeo.com/video/42?autoplay=0&background=1"
    );
}

#[test]
fn test_autoplay_with_preview_waits_for_visibility() {
    let content = with_src("https://vimeo.com/42")
        .with_class("autoplay")
        .with_picture(Picture::new("/poster.jpg"));
    let mut decorated = decorator(false).decorate(&content);

    assert_eq!(decorated.presentation(), Presentation::Preview { play_button: false });
    assert!(decorated.is_observing());
    assert!(!decorated.awaits_click());
    assert_eq!(decorated.click_play(), EventOutcome::Ignored);

    assert_eq!(decorated.intersect(), EventOutcome::Activated);
    assert_eq!(decorated.block().count_tag("picture"), 0);
    assert_eq!(
        iframe_src(decorated.block()),
        "https://player.vimeo.com/video/42?autoplay=1&background=1"
    );
}

#[test]
fn test_readiness_must_match_fragment() {
    let mut decorated = decorator(false).decorate(&with_src("https://youtu.be/abc123"));
    assert_eq!(
        decorated.dispatch(BlockEvent::Ready(ReadinessSignal::IframeLoad)),
        EventOutcome::Ignored
    );

    decorated.intersect();
    assert_eq!(decorated.readiness_signal(), Some(ReadinessSignal::IframeLoad));
    assert_eq!(
        decorated.dispatch(BlockEvent::Ready(ReadinessSignal::CanPlay)),
        EventOutcome::Ignored
    );
    assert_eq!(decorated.block().embed_loaded_flag(), Some(false));

    assert_eq!(
        decorated.dispatch(BlockEvent::Ready(ReadinessSignal::IframeLoad)),
        EventOutcome::Ready(Vec::new())
    );
    assert_eq!(decorated.block().embed_loaded_flag(), Some(true));
    assert_eq!(decorated.readiness_signal(), None);
}

#[test]
fn test_native_background_mutes_then_plays() {
    let content = with_src("https://cdn.example.com/hero.MOV").with_class("autoplay");
    let mut decorated = decorator(false).decorate(&content);
    decorated.intersect();

    let video = decorated.block().find_tag("video").unwrap();
    assert!(video.has_attr("autoplay"));
    assert!(!video.has_attr("muted"));
    assert_eq!(
        decorated.block().find_tag("source").and_then(|s| s.attr_value("type")),
        Some("video/mov")
    );

    assert_eq!(
        decorated.ready(),
        EventOutcome::Ready(vec![MediaCommand::Mute, MediaCommand::Play])
    );
    assert!(decorated.block().find_tag("video").unwrap().has_attr("muted"));
}

#[test]
fn test_title_override_reaches_iframe() {
    let content = BlockContent::new().with_data(DataAttributes {
        src: Some("https://vimeo.com/7".into()),
        title: Some("Release trailer".into()),
        ..Default::default()
    });
    let mut decorated = decorator(false).decorate(&content);
    decorated.intersect();

    let iframe = decorated.block().find_tag("iframe").unwrap();
    assert_eq!(iframe.attr_value("title"), Some("Release trailer"));
}

#[test]
fn test_relative_link_uses_page_url() {
    let content = BlockContent::new()
        .with_link("/assets/intro.webm")
        .with_page_url("https://example.com/docs/page");
    let mut decorated = decorator(false).decorate(&content);
    decorated.intersect();

    let source = decorated.block().find_tag("source").unwrap();
    assert_eq!(source.attr_value("src"), Some("https://example.com/assets/intro.webm"));
    assert_eq!(source.attr_value("type"), Some("video/webm"));
}

#[test]
fn test_page_of_blocks_from_json() {
    let json = r#"[
        { "name": "hero", "classes": ["video", "autoplay"], "dataset": { "src": "https://youtu.be/hero" } },
        { "name": "teaser", "link": "https://vimeo.com/555", "picture": { "src": "/teaser.jpg", "alt": "Teaser" } },
        { "name": "empty", "text": "TBD" }
    ]"#;
    let blocks: Vec<BlockContent> = serde_json::from_str(json).unwrap();
    let decorator = decorator(false);
    let decorated: Vec<_> = blocks.iter().map(|b| decorator.decorate(b)).collect();

    assert_eq!(decorated[0].name(), Some("hero"));
    assert_eq!(decorated[0].presentation(), Presentation::Deferred);
    assert!(decorated[0].flags().autoplay_requested);

    assert_eq!(decorated[1].presentation(), Presentation::Preview { play_button: true });
    let img = decorated[1].block().find_tag("img").unwrap();
    assert_eq!(img.attr_value("alt"), Some("Teaser"));

    assert_eq!(decorated[2].presentation(), Presentation::NoMedia);
}
