//! Serializing and deserializing blocks of pixels.
//!
//! This module's `Pixels` type represents a rectangular block of pixels in
//! memory (up to three dimensions), with an associated OpenGL format and pixel
//! type. It can either borrow or own the pixels.
//!
//! A `Pixels` value can be serialized and deserialized using the `var` module's
//! traits. Its serialized form is `PixelsForm`.

use crate::enums;
use crate::rle;
use crate::var::{self, DeserializeError};

use gleam::gl::GLenum;
use image::png::PNGEncoder;
use image::ColorType;
use std::borrow::Cow;
use std::{fs, io, path};

/// A block of pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Pixels<'a> {
    /// Width of block, in pixels.
    pub width: usize,

    /// Height of the block, in pixels.
    pub height: usize,

    /// Depth of the block, in pixels. Always 1 for 2D textures.
    pub depth: usize,

    /// The format of the pixel data, as passed to `glTexImage2D`.
    pub format: GLenum,

    /// The type of the data, as passed to `glTexImage2D`.
    pub pixel_type: GLenum,

    /// The actual pixel content, as bytes.
    pub bytes: Cow<'a, [u8]>,
}

/// Return the size of one pixel of the given format and type, or `None` if
/// we don't support the combination.
///
/// Fixed-function programs of the era we care about upload luminance and
/// RGBA textures as unsigned bytes, and nothing else.
pub fn bytes_per_pixel(format: GLenum, pixel_type: GLenum) -> Option<usize> {
    match (format, pixel_type) {
        (enums::LUMINANCE, enums::UNSIGNED_BYTE) => Some(1),
        (enums::RGBA, enums::UNSIGNED_BYTE) => Some(4),
        _ => None,
    }
}

/// Return the number of bytes in a `width` by `height` image of the given
/// format and type.
///
/// Panic if the format and type aren't supported.
pub fn image_len(width: usize, height: usize, format: GLenum, pixel_type: GLenum) -> usize {
    let bytes_per_pixel = bytes_per_pixel(format, pixel_type).unwrap_or_else(|| {
        panic!(
            "gl-snapshot: unsupported pixel format/type combination: {}, {}",
            enums::display(format),
            enums::display(pixel_type)
        )
    });
    width * height * bytes_per_pixel
}

impl<'a> Pixels<'a> {
    /// Make a two-dimensional block of pixels.
    pub fn new(
        width: usize,
        height: usize,
        format: GLenum,
        pixel_type: GLenum,
        bytes: impl Into<Cow<'a, [u8]>>,
    ) -> Pixels<'a> {
        let bytes = bytes.into();
        assert_eq!(
            image_len(width, height, format, pixel_type),
            bytes.len(),
            "gl-snapshot: pixel data doesn't match its dimensions"
        );
        Pixels {
            width,
            height,
            depth: 1,
            format,
            pixel_type,
            bytes,
        }
    }

    pub fn into_owned(self) -> Pixels<'static> {
        Pixels {
            bytes: Cow::Owned(self.bytes.into_owned()),
            ..self
        }
    }

    /// Write these pixels to `path` as a PNG image.
    pub fn write_image<P: AsRef<path::Path>>(&self, path: P) -> image::ImageResult<()> {
        let color_type = match (self.format, self.pixel_type) {
            (enums::LUMINANCE, enums::UNSIGNED_BYTE) => ColorType::L8,
            (enums::RGBA, enums::UNSIGNED_BYTE) => ColorType::Rgba8,
            _ => panic!(
                "gl-snapshot: Pixels::write_image: \
                 unsupported format/pixel type combination: 0x{:x}, 0x{:x}",
                self.format, self.pixel_type
            ),
        };

        let file = fs::File::create(path)?;
        let encoder = PNGEncoder::new(io::BufWriter::new(file));
        encoder.encode(
            self.bytes.as_ref(),
            self.width as u32,
            (self.height * self.depth) as u32,
            color_type,
        )
    }
}

/// The serialization form for `Pixels`.
///
/// The serialized form starts with `width`, `height`, `depth`, `format`,
/// `pixel_type`, and the length of the compressed pixel data in bytes, all as
/// unsigned LEB128 numbers, in that order. This is followed by the pixel data
/// itself, compressed as by `rle::write_texels` with one pixel per texel.
pub struct PixelsForm;

impl var::Serialize for Pixels<'_> {
    type Form = PixelsForm;
    fn serialize<S: var::MarkedWrite>(&self, stream: &mut S) -> io::Result<usize> {
        let mark = stream.mark();
        leb128::write::unsigned(stream, self.width as u64)?;
        leb128::write::unsigned(stream, self.height as u64)?;
        leb128::write::unsigned(stream, self.depth as u64)?;
        leb128::write::unsigned(stream, self.format as u64)?;
        leb128::write::unsigned(stream, self.pixel_type as u64)?;

        let texel_size = image_len(1, 1, self.format, self.pixel_type);
        assert_eq!(
            texel_size * self.width * self.height * self.depth,
            self.bytes.len()
        );

        let mut compressed: Vec<u8> = Vec::new();
        rle::write_texels(&mut compressed, &self.bytes, texel_size)?;

        leb128::write::unsigned(stream, compressed.len() as u64)?;
        stream.write_all(&compressed)?;

        Ok(mark)
    }
}

impl<'b> var::DeserializeAs<'b, Pixels<'static>> for PixelsForm {
    fn deserialize(buf: &mut &'b [u8]) -> Result<Pixels<'static>, DeserializeError> {
        let width = read_usize(buf)?;
        let height = read_usize(buf)?;
        let depth = read_usize(buf)?;
        let format = leb128::read::unsigned(buf)? as GLenum;
        let pixel_type = leb128::read::unsigned(buf)? as GLenum;
        let compressed_length = read_usize(buf)?;

        let texel_size = bytes_per_pixel(format, pixel_type)
            .ok_or(DeserializeError::UnsupportedFormat { format, pixel_type })?;
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(depth))
            .and_then(|n| n.checked_mul(texel_size))
            .ok_or(DeserializeError::Overflow)?;

        let compressed = var::take(buf, compressed_length)?;
        let bytes = rle::read_texels(compressed, texel_size, expected)?;
        if bytes.len() != expected {
            return Err(DeserializeError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Pixels {
            width,
            height,
            depth,
            format,
            pixel_type,
            bytes: bytes.into(),
        })
    }
}

fn read_usize(buf: &mut &[u8]) -> Result<usize, DeserializeError> {
    let value = leb128::read::unsigned(buf)?;
    usize::try_from(value).map_err(|_| DeserializeError::Overflow)
}

#[test]
fn test_serialize_luminance() {
    let mut bytes = vec![0x80; 64 * 64];
    bytes[100] = 0;
    let pixels = Pixels::new(64, 64, enums::LUMINANCE, enums::UNSIGNED_BYTE, &bytes[..]);

    let mut stream = vec![];
    let var = var::put(&mut stream, &pixels).unwrap();

    // One long run, a one-byte literal, and another long run should compress
    // well below the raw size.
    assert!(stream.len() < 32);

    let back: Pixels = var::get(var, &stream).unwrap();
    assert_eq!(back, pixels);
}

#[test]
fn test_deserialize_truncated() {
    let bytes: Vec<u8> = (0..16).collect();
    let pixels = Pixels::new(2, 2, enums::RGBA, enums::UNSIGNED_BYTE, bytes);

    let mut stream = vec![];
    let var = var::put(&mut stream, &pixels).unwrap();
    stream.pop();

    assert!(matches!(
        var::get::<PixelsForm, Pixels>(var, &stream),
        Err(DeserializeError::UnexpectedEof)
    ));
}

#[test]
fn test_write_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lum.png");
    let pixels = Pixels::new(4, 2, enums::LUMINANCE, enums::UNSIGNED_BYTE, vec![7; 8]);
    pixels.write_image(&path).unwrap();

    let png = fs::read(&path).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}
