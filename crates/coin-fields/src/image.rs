//! Raster image value for `SFImage`.

use coin_common::ReadError;

use crate::input::Input;
use crate::output::Output;
use crate::value::FieldValue;

const COMPONENT: &str = "SFImage";
const PIXELS_PER_LINE: usize = 8;

/// Uncompressed image with one to four 8-bit components per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: u32,
    height: u32,
    components: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Image of the given size. Returns `None` if `pixels` does not hold
    /// exactly `width * height * components` bytes or `components > 4`.
    pub fn new(width: u32, height: u32, components: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(components as usize))?;
        (components <= 4 && pixels.len() == expected).then_some(Self {
            width,
            height,
            components,
            pixels,
        })
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Components per pixel.
    pub const fn components(&self) -> u32 {
        self.components
    }

    /// Pixel bytes, row by row from the bottom.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True for the empty `0 0 0` image.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl FieldValue for Image {
    const TYPE_NAME: &'static str = "Image";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let mut spec = [0_i32; 3];
        for v in &mut spec {
            let value = input.read_i32();
            *v = input.require(value, COMPONENT, "image size")?;
        }
        let [w, h, nc] = spec;

        let buffer_size = if w < 0 || h < 0 || !(0..=4).contains(&nc) {
            None
        } else {
            // Byte count must fit the signed 32-bit size the file format uses.
            w.checked_mul(h).and_then(|n| n.checked_mul(nc)).map(|n| n as usize)
        };
        let buffer_size = match buffer_size {
            Some(0) if w != 0 || h != 0 || nc != 0 => None,
            size => size,
        };
        let Some(buffer_size) = buffer_size else {
            return Err(input.post_error(COMPONENT, format!("Invalid image specification {w}x{h}x{nc}")));
        };

        let (width, height, components) = (w as u32, h as u32, nc as u32);
        let pixels = if input.is_binary() {
            let bytes = input.read_padded_bytes(buffer_size);
            input.require(bytes, COMPONENT, "image data")?
        } else {
            // Grown pixel by pixel; the header alone does not size the buffer.
            let nc = components as usize;
            let mut pixels = Vec::new();
            for _ in 0..buffer_size / nc.max(1) {
                let packed = input.read_u32();
                let packed = input.require(packed, COMPONENT, "pixel value")?;
                for c in 0..nc {
                    pixels.push(((packed >> (8 * (nc - c - 1))) & 0xff) as u8);
                }
            }
            pixels
        };

        Ok(Self {
            width,
            height,
            components,
            pixels,
        })
    }

    /// Text form: `w h nc`, then one packed hex number per pixel, eight per
    /// line. Binary form: the size words and the raw bytes padded to four.
    fn write(&self, out: &mut Output) {
        out.write_i32(self.width as i32);
        if !out.is_binary() {
            out.write_char(' ');
        }
        out.write_i32(self.height as i32);
        if !out.is_binary() {
            out.write_char(' ');
        }
        out.write_i32(self.components as i32);

        if out.is_binary() {
            out.write_padded_bytes(&self.pixels);
            return;
        }

        let count = self.pixel_count();
        if count == 0 || self.components == 0 {
            return;
        }
        out.write_char('\n');
        out.indent();
        for (i, pixel) in self.pixels.chunks(self.components as usize).enumerate() {
            let packed = pixel.iter().fold(0_u32, |acc, &b| (acc << 8) | u32::from(b));
            out.write_u32(packed);
            if i + 1 == count {
                break;
            }
            if (i + 1) % PIXELS_PER_LINE == 0 {
                out.write_char('\n');
                out.indent();
            } else {
                out.write_char(' ');
            }
        }
    }
}
