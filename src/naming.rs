//! The strip naming convention.  A strip's file name carries its frame count after a `#` (e.g.
//! `idle#4.png`), so the sprite importer can slice it into frames without knowing anything else
//! about it.

use crate::utils::Rect;

/// The separator between a strip's base name and its frame count
pub const FRAME_COUNT_SEPARATOR: char = '#';

/// The file name of a strip with `frame_count` frames, made from the source file's `stem` (its
/// name without the extension).  `stem` is used verbatim, even if it already contains `#`s.
pub fn strip_file_name(stem: &str, frame_count: usize) -> String {
    format!("{}{}{}.png", stem, FRAME_COUNT_SEPARATOR, frame_count)
}

/// Splits a strip's file stem into its base name and frame count.  This is how the importer
/// reads names: everything after the first `#` must be a decimal frame count, and the base name
/// can't be empty.  Returns `None` for anything which isn't a strip (which the importer treats as
/// a single sprite).
pub fn parse_strip_name(stem: &str) -> Option<(&str, usize)> {
    let hash_idx = stem.find(FRAME_COUNT_SEPARATOR)?;
    if hash_idx == 0 {
        return None;
    }
    let count = stem[hash_idx + FRAME_COUNT_SEPARATOR.len_utf8()..]
        .parse()
        .ok()?;
    Some((&stem[..hash_idx], count))
}

/// The name the importer gives to frame `idx` of the strip called `base`
pub fn frame_name(base: &str, idx: usize) -> String {
    format!("{}_frame{}", base, idx)
}

/// Slices a `width`x`height` strip into `frame_count` equal frames, top to bottom.  Any rows left
/// over when `height` isn't a multiple of `frame_count` are ignored.
pub fn frame_rects(width: u32, height: u32, frame_count: usize) -> Vec<Rect<u32>> {
    if frame_count == 0 {
        return Vec::new();
    }
    let frame_height = height / frame_count as u32;
    (0..frame_count as u32)
        .map(|i| Rect::from_ltrb(0, i * frame_height, width, (i + 1) * frame_height))
        .collect()
}
