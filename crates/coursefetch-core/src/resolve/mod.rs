//! Resolution of downloadable URLs from player pages and document viewers.

pub mod document;
pub mod segment;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no media segment request was observed")]
    NoSegment,

    #[error("document viewer exposed no source")]
    NoDocumentSource,

    #[error("unparseable url {0:?}")]
    BadUrl(String),
}
