// src/error.rs

use thiserror::Error;

/// Errors surfaced by the screening pipeline.
///
/// Zero-result cases (no hits, no predicted-bound hits, a primer3 report
/// declaring zero pairs) are valid outcomes and never produce an error.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Filtering or aggregating hits before the annotator has run. This is
    /// a caller bug, distinct from "zero hits matched".
    #[error("hits are missing annotation columns; run `add_annotations` first")]
    MissingAnnotations,

    /// A hit table row does not have the expected shape.
    #[error("malformed hit table: {0}")]
    DataShape(String),

    /// A primer3 report is missing the returned-pair marker, or is missing
    /// or garbling a key for a declared pair index.
    #[error("malformed primer3 report: {0}")]
    Primer3Format(String),

    /// A caller-supplied value outside its allowed domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
