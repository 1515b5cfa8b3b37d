use std::{io, path::PathBuf};

use thiserror::Error;

use crate::utils::Rect;

/// Everything that can go wrong while turning a layered document into a strip.  None of these
/// are recoverable: the export is a single attempt, and the first failure aborts it.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("input file {path:?} does not exist")]
    InputNotFound { path: PathBuf },
    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {path:?} as a layered document")]
    Decode {
        path: PathBuf,
        #[source]
        source: psd::PsdError,
    },
    /// The document has no layers, so there is nothing to build a union box from
    #[error("document contains no layers")]
    EmptyDocument,
    #[error("a strip of {frames} frames covering {union_box:?} is too large")]
    CanvasTooLarge { union_box: Rect<i32>, frames: usize },
    #[error("{path:?} has no file name to name the strip after")]
    MissingFileName { path: PathBuf },
    #[error("output directory {dir:?} does not exist or is not a directory")]
    OutputPath {
        dir: PathBuf,
        #[source]
        source: Option<io::Error>,
    },
    #[error("failed to write strip to {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;
