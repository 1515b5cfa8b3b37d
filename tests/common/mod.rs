//! Builds small, uncompressed 8-bit RGB PSD files in memory.

#![allow(dead_code)]

/// One entry in the layers panel
enum Entry {
    Layer {
        name: String,
        // Exclusive edges, as stored in the file
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        colour: [u8; 4],
    },
    GroupStart(String),
    GroupEnd,
}

/// A PSD file, described top to bottom the way Photoshop's layers panel shows it
pub struct PsdBuilder {
    width: u32,
    height: u32,
    entries: Vec<Entry>,
}

impl PsdBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            entries: Vec::new(),
        }
    }

    /// Adds a layer filled with `colour`, covering `(left, top)` up to (but not including)
    /// `(right, bottom)`.  `(0, 0, 0, 0)` makes a layer without any pixels.
    pub fn layer(
        mut self,
        name: &str,
        (left, top, right, bottom): (i32, i32, i32, i32),
        colour: [u8; 4],
    ) -> Self {
        self.entries.push(Entry::Layer {
            name: name.to_owned(),
            left,
            top,
            right,
            bottom,
            colour,
        });
        self
    }

    /// Opens a group; every entry up to the matching [`Self::end_group`] goes inside it
    pub fn group(mut self, name: &str) -> Self {
        self.entries.push(Entry::GroupStart(name.to_owned()));
        self
    }

    pub fn end_group(mut self) -> Self {
        self.entries.push(Entry::GroupEnd);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        // File header
        out.extend_from_slice(b"8BPS");
        put_u16(&mut out, 1); // version
        out.extend_from_slice(&[0; 6]);
        put_u16(&mut out, 3); // channels
        put_u32(&mut out, self.height);
        put_u32(&mut out, self.width);
        put_u16(&mut out, 8); // depth
        put_u16(&mut out, 3); // RGB

        put_u32(&mut out, 0); // colour mode data
        put_u32(&mut out, 0); // image resources

        let layer_info = self.layer_info();
        put_u32(&mut out, layer_info.len() as u32 + 4);
        put_u32(&mut out, layer_info.len() as u32);
        out.extend_from_slice(&layer_info);

        // Merged image data: raw, all zeros
        put_u16(&mut out, 0);
        out.extend(std::iter::repeat(0).take(3 * (self.width * self.height) as usize));
        out
    }

    fn layer_info(&self) -> Vec<u8> {
        // The file stores the panel bottom to top, with a group's closing marker below its
        // contents and the folder record above them
        let mut records = Vec::new();
        let mut channel_data = Vec::new();
        for entry in self.entries.iter().rev() {
            let (name, rect, colour, divider) = match entry {
                Entry::Layer {
                    name,
                    left,
                    top,
                    right,
                    bottom,
                    colour,
                } => (name.as_str(), (*left, *top, *right, *bottom), *colour, None),
                Entry::GroupStart(name) => (name.as_str(), (0, 0, 0, 0), [0; 4], Some(1)),
                Entry::GroupEnd => ("</Layer group>", (0, 0, 0, 0), [0; 4], Some(3)),
            };
            let (left, top, right, bottom) = rect;
            let pixels = ((right - left) * (bottom - top)) as usize;

            put_i32(&mut records, top);
            put_i32(&mut records, left);
            put_i32(&mut records, bottom);
            put_i32(&mut records, right);
            put_u16(&mut records, 4);
            // Red, green, blue, then transparency
            for (id, value) in [0i16, 1, 2, -1].into_iter().zip(colour) {
                records.extend_from_slice(&id.to_be_bytes());
                put_u32(&mut records, 2 + pixels as u32);

                put_u16(&mut channel_data, 0); // raw
                channel_data.extend(std::iter::repeat(value).take(pixels));
            }
            records.extend_from_slice(b"8BIMnorm");
            records.extend_from_slice(&[255, 0, 0, 0]); // opacity, clipping, flags, filler

            let mut extra = Vec::new();
            put_u32(&mut extra, 0); // layer mask
            put_u32(&mut extra, 0); // blending ranges
            extra.push(name.len() as u8);
            extra.extend_from_slice(name.as_bytes());
            while extra.len() % 4 != 0 {
                extra.push(0);
            }
            if let Some(divider) = divider {
                extra.extend_from_slice(b"8BIMlsct");
                put_u32(&mut extra, 4);
                put_i32(&mut extra, divider);
            }
            put_u32(&mut records, extra.len() as u32);
            records.extend_from_slice(&extra);
        }

        let mut info = Vec::new();
        put_u16(&mut info, self.entries.len() as u16);
        info.extend_from_slice(&records);
        info.extend_from_slice(&channel_data);
        info
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}
