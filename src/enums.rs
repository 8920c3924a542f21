//! OpenGL enum values used by fixed-function programs.
//!
//! `gleam` generates its constants from the core profile registry, so it has
//! `BLEND` and `LEQUAL` but not `ALPHA_TEST` or `MODULATE`. This module
//! re-exports the core values we need and adds the compatibility-profile ones
//! by hand, so the rest of the crate can say `enums::MODULATE` without caring
//! which registry a name came from.

use gleam::gl::{GLbitfield, GLenum};

pub use gleam::gl::{
    ALWAYS, BACK, BLEND, CCW, CLAMP_TO_EDGE, COLOR_BUFFER_BIT, CULL_FACE, CW, DEPTH_BUFFER_BIT,
    DEPTH_TEST, DST_COLOR, EQUAL, FRONT, FRONT_AND_BACK, GEQUAL, GREATER, LEQUAL, LESS, LINEAR,
    LINEAR_MIPMAP_LINEAR, LINEAR_MIPMAP_NEAREST, NEAREST, NEAREST_MIPMAP_LINEAR,
    NEAREST_MIPMAP_NEAREST, NEVER, NOTEQUAL, ONE, ONE_MINUS_DST_COLOR, ONE_MINUS_SRC_ALPHA,
    ONE_MINUS_SRC_COLOR, REPEAT, REPLACE, RGBA, SCISSOR_TEST, SRC_ALPHA, SRC_COLOR,
    STENCIL_BUFFER_BIT, TEXTURE_2D, TEXTURE_BASE_LEVEL, TEXTURE_MAG_FILTER, TEXTURE_MAX_LEVEL,
    TEXTURE_MAX_LOD, TEXTURE_MIN_FILTER, TEXTURE_MIN_LOD, TEXTURE_WRAP_R, TEXTURE_WRAP_S,
    TEXTURE_WRAP_T, TRIANGLES, TRIANGLE_FAN, TRIANGLE_STRIP, UNSIGNED_BYTE, ZERO,
};

// Compatibility-profile values, from the OpenGL 1.x headers.
pub const QUADS: GLenum = 0x0007;
pub const QUAD_STRIP: GLenum = 0x0008;
pub const POLYGON: GLenum = 0x0009;
pub const ALPHA_TEST: GLenum = 0x0BC0;
pub const FLAT: GLenum = 0x1D00;
pub const SMOOTH: GLenum = 0x1D01;
pub const MODELVIEW: GLenum = 0x1700;
pub const PROJECTION: GLenum = 0x1701;
pub const TEXTURE: GLenum = 0x1702;
pub const LUMINANCE: GLenum = 0x1909;
pub const MODULATE: GLenum = 0x2100;
pub const DECAL: GLenum = 0x2101;
pub const TEXTURE_ENV_MODE: GLenum = 0x2200;
pub const TEXTURE_ENV: GLenum = 0x2300;
pub const CLAMP: GLenum = 0x2900;

/// Return the `GL_`-prefixed name of `value`, if we know it.
///
/// Several GL enums share a value; zero and one come back as `GL_ZERO` and
/// `GL_ONE`, since blend factors are where they matter to us.
pub fn name(value: GLenum) -> Option<&'static str> {
    Some(match value {
        ZERO => "GL_ZERO",
        ONE => "GL_ONE",
        TRIANGLES => "GL_TRIANGLES",
        TRIANGLE_STRIP => "GL_TRIANGLE_STRIP",
        TRIANGLE_FAN => "GL_TRIANGLE_FAN",
        QUADS => "GL_QUADS",
        QUAD_STRIP => "GL_QUAD_STRIP",
        POLYGON => "GL_POLYGON",
        NEVER => "GL_NEVER",
        LESS => "GL_LESS",
        EQUAL => "GL_EQUAL",
        LEQUAL => "GL_LEQUAL",
        GREATER => "GL_GREATER",
        NOTEQUAL => "GL_NOTEQUAL",
        GEQUAL => "GL_GEQUAL",
        ALWAYS => "GL_ALWAYS",
        SRC_COLOR => "GL_SRC_COLOR",
        ONE_MINUS_SRC_COLOR => "GL_ONE_MINUS_SRC_COLOR",
        SRC_ALPHA => "GL_SRC_ALPHA",
        ONE_MINUS_SRC_ALPHA => "GL_ONE_MINUS_SRC_ALPHA",
        DST_COLOR => "GL_DST_COLOR",
        ONE_MINUS_DST_COLOR => "GL_ONE_MINUS_DST_COLOR",
        FRONT => "GL_FRONT",
        BACK => "GL_BACK",
        FRONT_AND_BACK => "GL_FRONT_AND_BACK",
        CW => "GL_CW",
        CCW => "GL_CCW",
        CULL_FACE => "GL_CULL_FACE",
        ALPHA_TEST => "GL_ALPHA_TEST",
        DEPTH_TEST => "GL_DEPTH_TEST",
        BLEND => "GL_BLEND",
        SCISSOR_TEST => "GL_SCISSOR_TEST",
        TEXTURE_2D => "GL_TEXTURE_2D",
        FLAT => "GL_FLAT",
        SMOOTH => "GL_SMOOTH",
        MODELVIEW => "GL_MODELVIEW",
        PROJECTION => "GL_PROJECTION",
        TEXTURE => "GL_TEXTURE",
        UNSIGNED_BYTE => "GL_UNSIGNED_BYTE",
        LUMINANCE => "GL_LUMINANCE",
        RGBA => "GL_RGBA",
        REPLACE => "GL_REPLACE",
        MODULATE => "GL_MODULATE",
        DECAL => "GL_DECAL",
        TEXTURE_ENV_MODE => "GL_TEXTURE_ENV_MODE",
        TEXTURE_ENV => "GL_TEXTURE_ENV",
        NEAREST => "GL_NEAREST",
        LINEAR => "GL_LINEAR",
        NEAREST_MIPMAP_NEAREST => "GL_NEAREST_MIPMAP_NEAREST",
        LINEAR_MIPMAP_NEAREST => "GL_LINEAR_MIPMAP_NEAREST",
        NEAREST_MIPMAP_LINEAR => "GL_NEAREST_MIPMAP_LINEAR",
        LINEAR_MIPMAP_LINEAR => "GL_LINEAR_MIPMAP_LINEAR",
        TEXTURE_MAG_FILTER => "GL_TEXTURE_MAG_FILTER",
        TEXTURE_MIN_FILTER => "GL_TEXTURE_MIN_FILTER",
        TEXTURE_WRAP_S => "GL_TEXTURE_WRAP_S",
        TEXTURE_WRAP_T => "GL_TEXTURE_WRAP_T",
        TEXTURE_WRAP_R => "GL_TEXTURE_WRAP_R",
        TEXTURE_MIN_LOD => "GL_TEXTURE_MIN_LOD",
        TEXTURE_MAX_LOD => "GL_TEXTURE_MAX_LOD",
        TEXTURE_BASE_LEVEL => "GL_TEXTURE_BASE_LEVEL",
        TEXTURE_MAX_LEVEL => "GL_TEXTURE_MAX_LEVEL",
        REPEAT => "GL_REPEAT",
        CLAMP => "GL_CLAMP",
        CLAMP_TO_EDGE => "GL_CLAMP_TO_EDGE",
        _ => return None,
    })
}

/// Format `value` by name if possible, or in hex otherwise.
pub fn display(value: GLenum) -> String {
    match name(value) {
        Some(name) => name.to_string(),
        None => format!("0x{:04x}", value),
    }
}

/// Format a `glClear`-style mask as `GL_COLOR_BUFFER_BIT | ...`.
pub fn display_bitfield(mask: GLbitfield) -> String {
    const BITS: [(GLbitfield, &str); 3] = [
        (COLOR_BUFFER_BIT, "GL_COLOR_BUFFER_BIT"),
        (DEPTH_BUFFER_BIT, "GL_DEPTH_BUFFER_BIT"),
        (STENCIL_BUFFER_BIT, "GL_STENCIL_BUFFER_BIT"),
    ];

    let mut names: Vec<String> = BITS
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, name)| name.to_string())
        .collect();

    let unknown = BITS.iter().fold(mask, |rest, (bit, _)| rest & !bit);
    if unknown != 0 || names.is_empty() {
        names.push(format!("0x{:x}", unknown));
    }

    names.join(" | ")
}

#[test]
fn test_display() {
    assert_eq!(display(MODULATE), "GL_MODULATE");
    assert_eq!(display(0x8d40), "0x8d40");
    assert_eq!(
        display_bitfield(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT),
        "GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT"
    );
    assert_eq!(display_bitfield(0), "0x0");
}
