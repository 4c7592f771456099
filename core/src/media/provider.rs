use std::borrow::Cow;

use log::debug;
use url::{ParseError, Url};

use crate::error::{EmbedError, Result};

/// Which player a reference is embedded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    YouTube,
    Vimeo,
    /// Anything else is handed to the browser's native video element
    NativeFile,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Vimeo => "vimeo",
            Provider::NativeFile => "native",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchScope {
    /// Registrable-domain match against the parsed host
    Host,
    /// Case-insensitive substring of the whole reference
    Anywhere,
}

struct ProviderRule {
    marker: &'static str,
    scope: MatchScope,
    provider: Provider,
}

impl ProviderRule {
    const fn new(marker: &'static str, scope: MatchScope, provider: Provider) -> Self {
        Self {
            marker,
            scope,
            provider,
        }
    }

    fn matches(&self, lowered: &str, host: Option<&str>) -> bool {
        match self.scope {
            MatchScope::Host => host.is_some_and(|host| {
                host == self.marker
                    || host
                        .strip_suffix(self.marker)
                        .is_some_and(|rest| rest.ends_with('.'))
            }),
            MatchScope::Anywhere => lowered.contains(self.marker),
        }
    }
}

/// Evaluated top to bottom; the first matching rule decides
const PROVIDER_RULES: &[ProviderRule] = &[
    ProviderRule::new("youtube.com", MatchScope::Host, Provider::YouTube),
    ProviderRule::new("youtube-nocookie.com", MatchScope::Host, Provider::YouTube),
    ProviderRule::new("youtu.be", MatchScope::Host, Provider::YouTube),
    ProviderRule::new("vimeo.com", MatchScope::Host, Provider::Vimeo),
    ProviderRule::new("youtube", MatchScope::Anywhere, Provider::YouTube),
    ProviderRule::new("youtu.be", MatchScope::Anywhere, Provider::YouTube),
    ProviderRule::new("vimeo", MatchScope::Anywhere, Provider::Vimeo),
];

/// Classify a reference. Total: unknown references are native files.
pub fn classify(uri: &str) -> Provider {
    let lowered = uri.to_lowercase();
    let host = Url::parse(uri)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase));

    PROVIDER_RULES
        .iter()
        .find(|rule| rule.matches(&lowered, host.as_deref()))
        .map_or(Provider::NativeFile, |rule| rule.provider)
}

/// A classified reference together with its provider-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    YouTube { video_id: String },
    Vimeo { video_id: String },
    NativeFile { extension: String },
}

impl ProviderKind {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderKind::YouTube { .. } => Provider::YouTube,
            ProviderKind::Vimeo { .. } => Provider::Vimeo,
            ProviderKind::NativeFile { .. } => Provider::NativeFile,
        }
    }
}

/// A syntactically valid reference, ready for an embed builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    uri: String,
    url: Url,
    kind: ProviderKind,
}

impl ParsedReference {
    /// The reference as authored
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The reference resolved to an absolute URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    pub fn provider(&self) -> Provider {
        self.kind.provider()
    }
}

/// Validate a reference and extract what its builder needs.
///
/// Relative references resolve against `base`; anything that still fails URL
/// parsing is an [`EmbedError::UnparseableReference`].
pub fn parse_reference(uri: &str, base: Option<&Url>) -> Result<ParsedReference> {
    let unparseable = |source: ParseError| EmbedError::UnparseableReference {
        reference: uri.to_string(),
        source,
    };

    let url = match (Url::parse(uri), base) {
        (Ok(url), _) => url,
        (Err(ParseError::RelativeUrlWithoutBase), Some(base)) => {
            base.join(uri).map_err(unparseable)?
        }
        (Err(source), _) => return Err(unparseable(source)),
    };

    let kind = match classify(uri) {
        Provider::YouTube => ProviderKind::YouTube {
            video_id: youtube_video_id(&url),
        },
        Provider::Vimeo => ProviderKind::Vimeo {
            video_id: vimeo_video_id(&url),
        },
        Provider::NativeFile => ProviderKind::NativeFile {
            extension: file_extension(&url),
        },
    };
    debug!("Parsed reference {} as {:?}", uri, kind);

    Ok(ParsedReference {
        uri: uri.to_string(),
        url,
        kind,
    })
}

fn host_is(url: &Url, domain: &str) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .unwrap_or(Cow::Borrowed(segment))
        .into_owned()
}

/// Segments of the path, skipping the empty one a trailing slash leaves
fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Video id of a YouTube reference; empty when none can be found
pub fn youtube_video_id(url: &Url) -> String {
    // short links carry the id as the first path segment
    if host_is(url, "youtu.be") {
        return url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(decode_segment)
            .unwrap_or_default();
    }

    if let Some((_, id)) = url.query_pairs().find(|(key, value)| key == "v" && !value.is_empty()) {
        return id.into_owned();
    }

    match path_segments(url).as_slice() {
        ["embed" | "shorts" | "live" | "v", id, ..] => decode_segment(id),
        _ => String::new(),
    }
}

/// Video id of a Vimeo reference: the first path segment after the host
pub fn vimeo_video_id(url: &Url) -> String {
    let segments = path_segments(url);
    let on_player_host = host_is(url, "player.vimeo.com");
    match segments.as_slice() {
        ["video", id, ..] if on_player_host => decode_segment(id),
        [first, ..] => decode_segment(first),
        [] => String::new(),
    }
}

/// Lowercased extension of the trailing filename segment, `mp4` when absent
pub fn file_extension(url: &Url) -> String {
    path_segments(url)
        .last()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "mp4".to_string())
}
