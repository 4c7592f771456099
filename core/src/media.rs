mod provider;
mod reference;

pub use provider::{
    ParsedReference, Provider, ProviderKind, classify, file_extension, parse_reference,
    vimeo_video_id, youtube_video_id,
};
pub use reference::{
    ExtractedBlock, MediaReference, RequestFlags, SourceKind, extract, extract_block,
};
