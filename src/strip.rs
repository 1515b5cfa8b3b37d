//! Compositing a [`Document`]'s layers into a vertical animation strip.

use std::path::{Path, PathBuf};

use cgmath::Vector2;
use image::{imageops, GenericImageView, ImageFormat, RgbaImage};
use log::{debug, info};

use crate::{
    config::ExportOptions,
    document::{Document, FrameIdx},
    error::{ExportError, ExportResult},
    naming,
    utils::Rect,
};

/// A sprite sheet made by stacking every layer of a [`Document`] vertically, one frame per layer.
/// Every frame has the size of the document's union box, and each layer keeps its position
/// relative to that box within its frame.
#[derive(Debug, Clone)]
pub struct Strip {
    image: RgbaImage,
    union_box: Rect<i32>,
    frame_count: usize,
}

impl Strip {
    /// Pastes every layer of `doc` into a new, fully transparent strip.  Frame `i` comes from
    /// layer `i`.
    pub fn assemble(doc: &Document) -> ExportResult<Self> {
        let union_box = doc.union_box().ok_or(ExportError::EmptyDocument)?;
        let frame_count = doc.frame_count();
        let too_large = || ExportError::CanvasTooLarge {
            union_box,
            frames: frame_count,
        };
        let frame_size = union_box.pixel_size().ok_or_else(too_large)?;
        let strip_height = u32::try_from(frame_count)
            .ok()
            .and_then(|n| n.checked_mul(frame_size.y))
            .ok_or_else(too_large)?;
        // The pixel buffer's length (4 bytes per pixel) must fit in a `usize` too
        u64::from(frame_size.x)
            .checked_mul(u64::from(strip_height))
            .and_then(|pixels| pixels.checked_mul(4))
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(too_large)?;
        debug!(
            "Union box is {:?}; making a {}x{} strip of {} frames",
            union_box, frame_size.x, strip_height, frame_count
        );

        // `RgbaImage::new` zero-fills, so the canvas starts out fully transparent
        let mut image = RgbaImage::new(frame_size.x, strip_height);
        for (idx, layer) in doc.layers().iter_enumerated() {
            let offset = paste_offset(layer.rect(), union_box, idx, frame_size.y);
            debug!("Pasting layer {:?} at {:?}", layer.name(), offset);
            // Each frame's slot only ever receives one layer, so replacing is the same as
            // compositing over the transparent background
            imageops::replace(&mut image, &**layer.image(), offset.x, offset.y);
        }

        Ok(Self {
            image,
            union_box,
            frame_count,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The document-space rectangle which every frame covers
    pub fn union_box(&self) -> Rect<i32> {
        self.union_box
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn frame_size(&self) -> Vector2<u32> {
        Vector2::new(self.image.width(), self.union_box.height() as u32)
    }

    /// Copies frame `idx` back out of the strip, or returns `None` if there's no such frame
    pub fn frame(&self, idx: FrameIdx) -> Option<RgbaImage> {
        if idx.index() >= self.frame_count {
            return None;
        }
        let size = self.frame_size();
        let top = idx.index() as u32 * size.y;
        Some(self.image.view(0, top, size.x, size.y).to_image())
    }

    /// Writes the strip as a PNG into `options.output_dir`, named after `stem` and the frame
    /// count.  Returns the path of the new file.
    pub fn save(&self, stem: &str, options: &ExportOptions) -> ExportResult<PathBuf> {
        prepare_output_dir(options)?;
        let path = options
            .output_dir
            .join(naming::strip_file_name(stem, self.frame_count));
        self.image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| ExportError::Encode {
                path: path.clone(),
                source,
            })?;
        info!(
            "Wrote {}x{} strip of {} frames to {:?}",
            self.image.width(),
            self.image.height(),
            self.frame_count,
            path
        );
        Ok(path)
    }
}

/// Where the top-left corner of a layer at `rect` lands in the strip, if it's frame number `idx`
fn paste_offset(
    rect: Rect<i32>,
    union_box: Rect<i32>,
    idx: FrameIdx,
    frame_height: u32,
) -> Vector2<u32> {
    // `union_box` contains `rect`, and its size didn't overflow, so neither of these can be
    // negative or overflow
    debug_assert!(union_box.contains(&rect));
    let within_frame = rect.min() - union_box.min();
    Vector2::new(
        within_frame.x as u32,
        within_frame.y as u32 + idx.index() as u32 * frame_height,
    )
}

fn prepare_output_dir(options: &ExportOptions) -> ExportResult<()> {
    let dir = &options.output_dir;
    if dir.is_dir() {
        return Ok(());
    }
    if options.create_output_dir && !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::OutputPath {
            dir: dir.clone(),
            source: Some(source),
        })?;
        info!("Created output directory {:?}", dir);
        return Ok(());
    }
    Err(ExportError::OutputPath {
        dir: dir.clone(),
        source: None,
    })
}

/// Turns the layered document at `path` into a strip, and saves it into `options.output_dir`.
/// Returns the path of the new file.
pub fn export(path: impl AsRef<Path>, options: &ExportOptions) -> ExportResult<PathBuf> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .ok_or_else(|| ExportError::MissingFileName {
            path: path.to_owned(),
        })?
        .to_string_lossy();
    let doc = Document::from_file(path)?;
    export_document(&doc, &stem, options)
}

/// Like [`export`], but for a [`Document`] which is already in memory.  `stem` is the base name
/// of the output file.
pub fn export_document(
    doc: &Document,
    stem: &str,
    options: &ExportOptions,
) -> ExportResult<PathBuf> {
    Strip::assemble(doc)?.save(stem, options)
}
