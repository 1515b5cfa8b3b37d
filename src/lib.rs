//! Converts layered image documents into vertical sprite-sheet strips, one animation frame per
//! layer.

pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod strip;
pub mod utils;

pub use config::ExportOptions;
pub use document::{Document, FrameIdx, Layer};
pub use error::{ExportError, ExportResult};
pub use strip::{export, export_document, Strip};
