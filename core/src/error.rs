use thiserror::Error;

/// Failures while resolving a block's media reference.
///
/// None of these are fatal: the decorator turns each one into a presentational
/// state confined to the block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    #[error("no media reference found in block")]
    NoReferenceFound,

    #[error("invalid video URL `{reference}`: {source}")]
    UnparseableReference {
        reference: String,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, EmbedError>;
