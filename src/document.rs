//! The layered source document, decoded into a flat sequence of [`Layer`]s.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    io,
    ops::Deref,
    path::Path,
};

use cgmath::{Point2, Vector2};
use image::{imageops, Rgba, RgbaImage};
use index_vec::IndexVec;
use log::{debug, info, warn};
use psd::{PsdGroup, PsdLayer};

use crate::{
    error::{ExportError, ExportResult},
    utils::Rect,
};

index_vec::define_index_type! {
    /// Position of a [`Layer`] in its [`Document`], which is also its frame number in the strip
    pub struct FrameIdx = usize;
}

/// A layered image, as loaded from disk.  Layers run from the top of Photoshop's layers panel
/// to the bottom, and that order is the animation's frame order.  Only top-level layers are
/// frames: a top-level group becomes a single frame made by compositing everything inside it.
#[derive(Debug, Clone)]
pub struct Document {
    size: Vector2<u32>,
    layers: IndexVec<FrameIdx, Layer>,
}

impl Document {
    pub fn new(size: Vector2<u32>, layers: impl IntoIterator<Item = Layer>) -> Self {
        Self {
            size,
            layers: layers.into_iter().collect(),
        }
    }

    /// Reads and decodes the PSD file at `path`
    pub fn from_file(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ExportError::InputNotFound {
                path: path.to_owned(),
            },
            _ => ExportError::Read {
                path: path.to_owned(),
                source,
            },
        })?;
        let doc = Self::from_psd_bytes(&bytes).map_err(|source| ExportError::Decode {
            path: path.to_owned(),
            source,
        })?;
        info!(
            "Loaded {:?}: {} frames, {}x{} canvas",
            path,
            doc.layers.len(),
            doc.size.x,
            doc.size.y
        );
        Ok(doc)
    }

    /// Decodes a PSD file which has already been read into memory
    pub fn from_psd_bytes(bytes: &[u8]) -> Result<Self, psd::PsdError> {
        let psd = psd::Psd::from_bytes(bytes)?;
        let size = Vector2::new(psd.width(), psd.height());
        let groups = psd.groups();

        for id in psd.group_ids_in_order() {
            let is_empty = psd.get_group_sub_layers(id).map_or(true, <[_]>::is_empty);
            if let Some(group) = groups.get(id).filter(|g| g.parent_id().is_none() && is_empty) {
                warn!("Group {:?} has no layers, so it won't be a frame", group.name());
            }
        }

        let mut layers = Vec::new();
        let mut last_group = None;
        for psd_layer in psd.layers() {
            match top_level_group(groups, psd_layer.parent_id()) {
                None => layers.push(Layer::from_psd_layer(psd_layer, size)),
                // A group's layers are contiguous, so it becomes a frame the first time one of
                // them turns up
                Some(group_id) if last_group != Some(group_id) => {
                    last_group = Some(group_id);
                    let group = groups.get(&group_id);
                    let members = psd.get_group_sub_layers(&group_id);
                    if let (Some(group), Some(members)) = (group, members) {
                        layers.extend(Layer::from_psd_group(group, members, size));
                    }
                }
                Some(_) => {}
            }
        }
        Ok(Self::new(size, layers))
    }

    /// The size of the document's own canvas.  Layers are free to extend past this.
    pub fn size(&self) -> Vector2<u32> {
        self.size
    }

    pub fn layers(&self) -> &IndexVec<FrameIdx, Layer> {
        &self.layers
    }

    pub fn frame_count(&self) -> usize {
        self.layers.len()
    }

    /// The smallest [`Rect`] containing every layer's rectangle, or `None` if there are no
    /// layers.  Since [`Rect::union`] is associative and commutative, the layer order doesn't
    /// affect the result.
    pub fn union_box(&self) -> Option<Rect<i32>> {
        self.layers.iter().map(|layer| layer.rect).reduce(Rect::union)
    }
}

/// Follows the chain of parent groups up to the one sitting at the top level
fn top_level_group(groups: &HashMap<u32, PsdGroup>, mut parent: Option<u32>) -> Option<u32> {
    let mut top = None;
    while let Some(id) = parent {
        top = Some(id);
        parent = groups.get(&id).and_then(|group| group.parent_id());
    }
    top
}

/// One layer of a [`Document`], i.e. one frame of the animation.  The pixel buffer always has
/// exactly the dimensions of the layer's rectangle.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    rect: Rect<i32>,
    image: DebuggableImage,
}

impl Layer {
    /// Creates a `Layer` whose top-left corner sits at `origin` in document space
    pub fn new(name: impl Into<String>, origin: Point2<i32>, image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        Self {
            name: name.into(),
            rect: Rect::from_min_size(origin, Vector2::new(w as i32, h as i32)),
            image: DebuggableImage(image),
        }
    }

    /// Flattens `children` (listed top-most first) into one layer covering all of them, blending
    /// each one over the ones below it.  Returns `None` if there are no children.
    pub fn composite(name: impl Into<String>, children: &[Layer]) -> Option<Self> {
        let name = name.into();
        let rect = children.iter().map(|child| child.rect).reduce(Rect::union)?;
        let size = match rect.pixel_size() {
            Some(size) => size,
            None => {
                warn!(
                    "Group {:?} covers {:?}, which is too large; treating it as empty",
                    name, rect
                );
                return Some(Self::empty_at(name, rect.min()));
            }
        };

        let mut image = RgbaImage::new(size.x, size.y);
        for child in children.iter().rev() {
            // `rect` contains every child, so these offsets are non-negative and in range
            let offset = child.rect.min() - rect.min();
            imageops::overlay(&mut image, &*child.image, offset.x as u32, offset.y as u32);
        }
        debug!("Composited {} layers into {:?} ({:?})", children.len(), name, rect);
        Some(Self {
            name,
            rect,
            image: DebuggableImage(image),
        })
    }

    fn empty_at(name: String, origin: Point2<i32>) -> Self {
        Self::new(name, origin, RgbaImage::new(0, 0))
    }

    fn from_psd_layer(layer: &PsdLayer, doc_size: Vector2<u32>) -> Self {
        let rgba = layer.rgba();
        let origin_alpha = rgba.get(3).copied().unwrap_or(0);
        let rect = psd_layer_rect(
            layer.layer_left(),
            layer.layer_top(),
            layer.layer_right(),
            layer.layer_bottom(),
            origin_alpha,
        );
        let rect = match rect.pixel_size() {
            Some(_) => rect,
            None => {
                warn!(
                    "Layer {:?} has nonsensical bounds {:?}; treating it as empty",
                    layer.name(),
                    rect
                );
                Rect::from_ltrb(rect.left(), rect.top(), rect.left(), rect.top())
            }
        };
        Self {
            name: layer.name().to_owned(),
            rect,
            image: DebuggableImage(crop_layer(layer.name(), rect, doc_size, &rgba)),
        }
    }

    /// Builds the single frame for a top-level group out of every layer nested inside it
    fn from_psd_group(
        group: &PsdGroup,
        members: &[PsdLayer],
        doc_size: Vector2<u32>,
    ) -> Option<Self> {
        let children = members
            .iter()
            .map(|layer| Self::from_psd_layer(layer, doc_size))
            .collect::<Vec<_>>();
        Self::composite(group.name(), &children)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this layer sits in document space
    pub fn rect(&self) -> Rect<i32> {
        self.rect
    }

    pub fn image(&self) -> &DebuggableImage {
        &self.image
    }
}

/// Converts the edges reported by the PSD decoder into a [`Rect`].  The decoder makes `right` and
/// `bottom` inclusive by subtracting one from them, except when they're zero, which is how layers
/// without any pixels are stored.  A layer whose (exclusive) right and bottom edges are both 1 is
/// therefore reported the same way as an empty layer, which is only ambiguous when it sits at the
/// origin; there, the pixel at `(0, 0)` decides.
fn psd_layer_rect(left: i32, top: i32, right: i32, bottom: i32, origin_alpha: u8) -> Rect<i32> {
    let collapsed = right == 0 && bottom == 0 && left >= 0 && top >= 0;
    let origin_pixel = left == 0 && top == 0 && origin_alpha > 0;
    if collapsed && !origin_pixel {
        return Rect::from_ltrb(left, top, left, top);
    }
    Rect::from_ltrb(left, top, right.saturating_add(1), bottom.saturating_add(1))
}

/// Cuts a layer's pixels out of a document-sized RGBA buffer.  PSD decoders only store the parts
/// of a layer which overlap the document canvas, so any part of `rect` outside it comes out
/// transparent.
fn crop_layer(name: &str, rect: Rect<i32>, doc_size: Vector2<u32>, rgba: &[u8]) -> RgbaImage {
    // Callers make sure that `rect`'s size fits in a `u32`
    let mut image = RgbaImage::new(rect.width() as u32, rect.height() as u32);
    if rect.is_empty() {
        warn!("Layer {:?} is empty", name);
        return image;
    }

    let doc_rect = Rect::from_origin(doc_size.x as i32, doc_size.y as i32);
    let visible = rect.intersection(doc_rect);
    if visible != rect {
        warn!(
            "Layer {:?} ({:?}) extends outside the {}x{} document; the overflow will be transparent",
            name, rect, doc_size.x, doc_size.y
        );
    }

    let row_len = doc_size.x as usize;
    for y in visible.top()..visible.bottom() {
        for x in visible.left()..visible.right() {
            let idx = (y as usize * row_len + x as usize) * 4;
            if let Some(&[r, g, b, a]) = rgba.get(idx..idx + 4) {
                let (lx, ly) = ((x - rect.left()) as u32, (y - rect.top()) as u32);
                image.put_pixel(lx, ly, Rgba([r, g, b, a]));
            }
        }
    }
    image
}

/// Wrapper of [`image::RgbaImage`] with a human-friendly [`Debug`] impl.
#[derive(Clone, PartialEq)]
#[repr(transparent)]
pub struct DebuggableImage(RgbaImage);

impl Deref for DebuggableImage {
    type Target = RgbaImage;

    fn deref(&self) -> &RgbaImage {
        &self.0
    }
}

impl Debug for DebuggableImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.0.dimensions();
        write!(f, "RgbaImage({}x{})", w, h)
    }
}
