//! Texture contents uploaded by the captured program, keyed by its names.

use crate::pixels::Pixels;

use gleam::gl::{GLint, GLuint};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureDimensionality {
    One,
    Two,
    Three,
}

/// One uploaded mip level.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureMip {
    pub internal_format: GLint,
    pub pixels: Pixels<'static>,
}

/// Everything we know about one texture name.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRecord {
    pub border: GLint,
    pub internal_format: GLint,
    pub dimensionality: TextureDimensionality,

    /// Indexed by mip level. Levels the program never uploaded are `None`.
    pub mips: Vec<Option<TextureMip>>,
}

impl TextureRecord {
    pub fn new(
        border: GLint,
        internal_format: GLint,
        dimensionality: TextureDimensionality,
    ) -> TextureRecord {
        TextureRecord {
            border,
            internal_format,
            dimensionality,
            mips: Vec::new(),
        }
    }

    pub fn has_level(&self, level: usize) -> bool {
        matches!(self.mips.get(level), Some(Some(_)))
    }

    /// Store the image for `level`, growing the mip list as needed. Return
    /// true if the level already held an image.
    pub fn upload(&mut self, level: usize, mip: TextureMip) -> bool {
        if self.mips.len() <= level {
            self.mips.resize(level + 1, None);
        }
        self.mips[level].replace(mip).is_some()
    }

    /// The levels that hold images, with their level numbers.
    pub fn levels(&self) -> impl Iterator<Item = (usize, &TextureMip)> {
        self.mips
            .iter()
            .enumerate()
            .filter_map(|(level, mip)| mip.as_ref().map(|mip| (level, mip)))
    }
}

/// The latest known contents of every live texture name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceTable {
    textures: BTreeMap<GLuint, TextureRecord>,
}

impl ResourceTable {
    pub fn new() -> ResourceTable {
        ResourceTable::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn contains(&self, texture: GLuint) -> bool {
        self.textures.contains_key(&texture)
    }

    pub fn get(&self, texture: GLuint) -> Option<&TextureRecord> {
        self.textures.get(&texture)
    }

    /// Return the record for `texture`, creating it with `make` if needed.
    pub fn get_or_insert_with<F>(&mut self, texture: GLuint, make: F) -> &mut TextureRecord
    where
        F: FnOnce() -> TextureRecord,
    {
        self.textures.entry(texture).or_insert_with(make)
    }

    pub fn remove(&mut self, texture: GLuint) -> Option<TextureRecord> {
        self.textures.remove(&texture)
    }

    /// All textures, in order of name.
    pub fn iter(&self) -> impl Iterator<Item = (GLuint, &TextureRecord)> {
        self.textures.iter().map(|(name, record)| (*name, record))
    }
}

#[test]
fn test_mip_growth() {
    use crate::enums;

    let mip = |value| TextureMip {
        internal_format: 1,
        pixels: Pixels::new(1, 1, enums::LUMINANCE, enums::UNSIGNED_BYTE, vec![value]),
    };

    let mut record = TextureRecord::new(0, 1, TextureDimensionality::Two);
    assert!(!record.upload(2, mip(2)));
    assert_eq!(record.mips.len(), 3);
    assert!(!record.has_level(0));

    // Re-uploading a lower level must not truncate the list.
    assert!(!record.upload(0, mip(0)));
    assert!(record.upload(0, mip(9)));
    assert_eq!(record.mips.len(), 3);

    let levels: Vec<_> = record.levels().map(|(level, mip)| (level, mip.pixels.bytes[0])).collect();
    assert_eq!(levels, [(0, 9), (2, 2)]);
}
