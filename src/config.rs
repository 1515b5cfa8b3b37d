use std::path::{Path, PathBuf};

/// Where the strip sprite sheets end up, relative to the directory the tool is run from
pub const DEFAULT_OUTPUT_DIR: &str = "../Assets/Sprites/game";

/// Settings for a single [`export`](crate::strip::export)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// The directory the strip PNG is written into
    pub output_dir: PathBuf,
    /// If `true`, a missing `output_dir` (and any missing parents) is created instead of being
    /// reported as an [`ExportError::OutputPath`](crate::ExportError::OutputPath)
    pub create_output_dir: bool,
}

impl ExportOptions {
    pub fn with_output_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_owned(),
            ..Self::default()
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            create_output_dir: false,
        }
    }
}
