//! Mirrors of the pieces of OpenGL context state that matter for replay.
//!
//! The capturer keeps a `ContextState` up to date as calls go by, and clones
//! it at the start of each frame; the clone is the frame's start state. The
//! player pushes a start state back into a live context before replaying.

use crate::enums;

use gleam::gl::{GLenum, GLfloat, GLint, GLsizei, GLuint};
use glam::{DMat4, DVec3, DVec4};
use std::collections::HashMap;
use tracing::debug;

/// Per-texture sampling parameters, as set by `glTexParameter*`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureParamState {
    pub base_level: GLint,
    pub mag_filter: GLenum,
    pub max_level: GLint,
    pub max_lod: GLfloat,
    pub min_filter: GLenum,
    pub min_lod: GLfloat,
    pub wrap_s: GLenum,
    pub wrap_t: GLenum,
    pub wrap_r: GLenum,
}

impl Default for TextureParamState {
    fn default() -> Self {
        TextureParamState {
            base_level: 0,
            mag_filter: enums::LINEAR,
            max_level: 1000,
            max_lod: 1000.0,
            min_filter: enums::NEAREST_MIPMAP_LINEAR,
            min_lod: -1000.0,
            wrap_s: enums::REPEAT,
            wrap_t: enums::REPEAT,
            wrap_r: enums::REPEAT,
        }
    }
}

impl TextureParamState {
    /// Apply `glTexParameterf(target, pname, value)`. Unknown parameters are
    /// ignored.
    pub fn set(&mut self, pname: GLenum, value: GLfloat) {
        match pname {
            enums::TEXTURE_BASE_LEVEL => self.base_level = value as GLint,
            enums::TEXTURE_MAG_FILTER => self.mag_filter = value as GLenum,
            enums::TEXTURE_MAX_LEVEL => self.max_level = value as GLint,
            enums::TEXTURE_MAX_LOD => self.max_lod = value,
            enums::TEXTURE_MIN_FILTER => self.min_filter = value as GLenum,
            enums::TEXTURE_MIN_LOD => self.min_lod = value,
            enums::TEXTURE_WRAP_S => self.wrap_s = value as GLenum,
            enums::TEXTURE_WRAP_T => self.wrap_t = value as GLenum,
            enums::TEXTURE_WRAP_R => self.wrap_r = value as GLenum,
            _ => debug!("ignoring texture parameter {}", enums::display(pname)),
        }
    }

    /// The value `glGetTexParameterfv` would report for `pname`, if we track
    /// it.
    pub fn get(&self, pname: GLenum) -> Option<GLfloat> {
        self.params()
            .iter()
            .find(|&&(tracked, _)| tracked == pname)
            .map(|&(_, value)| value)
    }

    /// All parameters as `(pname, value)` pairs, in the order the player
    /// applies them.
    pub fn params(&self) -> [(GLenum, GLfloat); 9] {
        [
            (enums::TEXTURE_BASE_LEVEL, self.base_level as GLfloat),
            (enums::TEXTURE_MAG_FILTER, self.mag_filter as GLfloat),
            (enums::TEXTURE_MAX_LEVEL, self.max_level as GLfloat),
            (enums::TEXTURE_MAX_LOD, self.max_lod),
            (enums::TEXTURE_MIN_FILTER, self.min_filter as GLfloat),
            (enums::TEXTURE_MIN_LOD, self.min_lod),
            (enums::TEXTURE_WRAP_S, self.wrap_s as GLfloat),
            (enums::TEXTURE_WRAP_T, self.wrap_t as GLfloat),
            (enums::TEXTURE_WRAP_R, self.wrap_r as GLfloat),
        ]
    }
}

/// The capabilities we track for `glEnable`/`glDisable`.
pub const CAPABILITIES: [GLenum; 6] = [
    enums::ALPHA_TEST,
    enums::BLEND,
    enums::CULL_FACE,
    enums::DEPTH_TEST,
    enums::SCISSOR_TEST,
    enums::TEXTURE_2D,
];

/// A snapshot of the context state a frame depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextState {
    pub alpha_test: bool,
    pub blend: bool,
    pub cull_face: bool,
    pub depth_test: bool,
    pub scissor_test: bool,
    pub texture_2d: bool,

    pub alpha_func: GLenum,
    pub alpha_ref: GLfloat,
    pub blend_sfactor: GLenum,
    pub blend_dfactor: GLenum,
    pub clear_color: [GLfloat; 4],
    pub clear_depth: f64,
    pub cull_face_mode: GLenum,
    pub depth_func: GLenum,
    pub depth_mask: bool,
    pub depth_range: [f64; 2],
    pub draw_buffer: GLenum,
    pub front_face: GLenum,
    pub shade_model: GLenum,
    pub texture_env_mode: GLenum,
    pub matrix_mode: GLenum,

    /// `x`, `y`, `width`, `height`.
    pub viewport: [GLint; 4],

    /// Column-major, as `glLoadMatrixd` takes them.
    pub modelview_matrix: [f64; 16],
    pub projection_matrix: [f64; 16],

    /// The captured name of the texture bound to `GL_TEXTURE_2D`.
    pub bound_2d_texture: GLuint,

    /// Sampling parameters for every texture name the program has uploaded
    /// an image for.
    pub texture_params: HashMap<GLuint, TextureParamState>,
}

impl ContextState {
    /// The state of a fresh context whose window is `window_extents` pixels.
    pub fn new(window_extents: [u32; 2]) -> ContextState {
        let identity = DMat4::IDENTITY.to_cols_array();
        ContextState {
            alpha_test: false,
            blend: false,
            cull_face: false,
            depth_test: false,
            scissor_test: false,
            texture_2d: false,

            alpha_func: enums::ALWAYS,
            alpha_ref: 0.0,
            blend_sfactor: enums::ONE,
            blend_dfactor: enums::ZERO,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            cull_face_mode: enums::BACK,
            depth_func: enums::LESS,
            depth_mask: true,
            depth_range: [0.0, 1.0],
            draw_buffer: enums::BACK,
            front_face: enums::CCW,
            shade_model: enums::SMOOTH,
            texture_env_mode: enums::MODULATE,
            matrix_mode: enums::MODELVIEW,
            viewport: [
                0,
                0,
                window_extents[0] as GLsizei,
                window_extents[1] as GLsizei,
            ],
            modelview_matrix: identity,
            projection_matrix: identity,
            bound_2d_texture: 0,
            texture_params: HashMap::new(),
        }
    }

    /// Return the flag for `cap`, or `None` if we don't track it.
    pub fn capability(&self, cap: GLenum) -> Option<bool> {
        Some(match cap {
            enums::ALPHA_TEST => self.alpha_test,
            enums::BLEND => self.blend,
            enums::CULL_FACE => self.cull_face,
            enums::DEPTH_TEST => self.depth_test,
            enums::SCISSOR_TEST => self.scissor_test,
            enums::TEXTURE_2D => self.texture_2d,
            _ => return None,
        })
    }

    /// Apply `glEnable(cap)` or `glDisable(cap)`.
    ///
    /// Programs that touch capabilities we don't mirror can't be replayed
    /// faithfully, so that's fatal.
    pub fn set_capability(&mut self, cap: GLenum, enabled: bool) {
        let flag = match cap {
            enums::ALPHA_TEST => &mut self.alpha_test,
            enums::BLEND => &mut self.blend,
            enums::CULL_FACE => &mut self.cull_face,
            enums::DEPTH_TEST => &mut self.depth_test,
            enums::SCISSOR_TEST => &mut self.scissor_test,
            enums::TEXTURE_2D => &mut self.texture_2d,
            _ => panic!(
                "gl-snapshot: unsupported capability {}",
                enums::display(cap)
            ),
        };
        *flag = enabled;
    }
}

/// The modelview, projection, and texture matrix stacks.
///
/// OpenGL 1.x programs build their transforms with `glTranslatef` and
/// friends, so a frame's start state can only carry the current matrices if
/// we do the same arithmetic as we go.
#[derive(Clone, Debug)]
pub struct MatrixStacks {
    mode: GLenum,
    modelview: Vec<DMat4>,
    projection: Vec<DMat4>,
    texture: Vec<DMat4>,
}

impl Default for MatrixStacks {
    fn default() -> Self {
        MatrixStacks {
            mode: enums::MODELVIEW,
            modelview: vec![DMat4::IDENTITY],
            projection: vec![DMat4::IDENTITY],
            texture: vec![DMat4::IDENTITY],
        }
    }
}

impl MatrixStacks {
    pub fn mode(&self) -> GLenum {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GLenum) {
        match mode {
            enums::MODELVIEW | enums::PROJECTION | enums::TEXTURE => self.mode = mode,
            _ => panic!("gl-snapshot: bad matrix mode {}", enums::display(mode)),
        }
    }

    /// The top of the stack for `mode`.
    pub fn top(&self, mode: GLenum) -> DMat4 {
        let stack = match mode {
            enums::PROJECTION => &self.projection,
            enums::TEXTURE => &self.texture,
            _ => &self.modelview,
        };
        stack.last().copied().unwrap_or(DMat4::IDENTITY)
    }

    fn stack_mut(&mut self) -> &mut Vec<DMat4> {
        match self.mode {
            enums::PROJECTION => &mut self.projection,
            enums::TEXTURE => &mut self.texture,
            _ => &mut self.modelview,
        }
    }

    fn current_mut(&mut self) -> &mut DMat4 {
        let stack = self.stack_mut();
        if stack.is_empty() {
            stack.push(DMat4::IDENTITY);
        }
        let last = stack.len() - 1;
        &mut stack[last]
    }

    pub fn push(&mut self) {
        let top = *self.current_mut();
        self.stack_mut().push(top);
    }

    pub fn pop(&mut self) {
        let stack = self.stack_mut();
        assert!(stack.len() > 1, "gl-snapshot: matrix stack underflow");
        stack.pop();
    }

    pub fn load_identity(&mut self) {
        *self.current_mut() = DMat4::IDENTITY;
    }

    pub fn load(&mut self, matrix: &[f64; 16]) {
        *self.current_mut() = DMat4::from_cols_array(matrix);
    }

    /// Post-multiply the current matrix by `matrix`, as OpenGL does.
    pub fn multiply(&mut self, matrix: DMat4) {
        let current = self.current_mut();
        *current = *current * matrix;
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.multiply(DMat4::from_translation(DVec3::new(x, y, z)));
    }

    /// `angle` is in degrees. A zero axis leaves the matrix alone.
    pub fn rotate(&mut self, angle: f64, x: f64, y: f64, z: f64) {
        let axis = DVec3::new(x, y, z);
        if axis.length_squared() == 0.0 {
            return;
        }
        self.multiply(DMat4::from_axis_angle(axis.normalize(), angle.to_radians()));
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.multiply(DMat4::from_scale(DVec3::new(x, y, z)));
    }

    pub fn frustum(&mut self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        let (w, h, d) = (right - left, top - bottom, far - near);
        self.multiply(DMat4::from_cols(
            DVec4::new(2.0 * near / w, 0.0, 0.0, 0.0),
            DVec4::new(0.0, 2.0 * near / h, 0.0, 0.0),
            DVec4::new((right + left) / w, (top + bottom) / h, -(far + near) / d, -1.0),
            DVec4::new(0.0, 0.0, -2.0 * far * near / d, 0.0),
        ));
    }

    pub fn ortho(&mut self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        let (w, h, d) = (right - left, top - bottom, far - near);
        self.multiply(DMat4::from_cols(
            DVec4::new(2.0 / w, 0.0, 0.0, 0.0),
            DVec4::new(0.0, 2.0 / h, 0.0, 0.0),
            DVec4::new(0.0, 0.0, -2.0 / d, 0.0),
            DVec4::new(-(right + left) / w, -(top + bottom) / h, -(far + near) / d, 1.0),
        ));
    }

    /// Copy the current modelview and projection matrices into `state`.
    pub fn store(&self, state: &mut ContextState) {
        state.matrix_mode = self.mode;
        state.modelview_matrix = self.top(enums::MODELVIEW).to_cols_array();
        state.projection_matrix = self.top(enums::PROJECTION).to_cols_array();
    }
}

#[test]
fn test_defaults() {
    let state = ContextState::new([640, 480]);
    assert_eq!(state.viewport, [0, 0, 640, 480]);
    assert_eq!(state.depth_func, enums::LESS);
    assert_eq!(state.texture_env_mode, enums::MODULATE);
    assert_eq!(state.capability(enums::BLEND), Some(false));
    assert_eq!(state.capability(0x0B50), None);

    let params = TextureParamState::default();
    assert_eq!(params.min_filter, enums::NEAREST_MIPMAP_LINEAR);
    assert_eq!(params.params()[5], (enums::TEXTURE_MIN_LOD, -1000.0));
    assert_eq!(params.get(enums::TEXTURE_WRAP_T), Some(enums::REPEAT as GLfloat));
    assert_eq!(params.get(enums::TEXTURE_ENV_MODE), None);
}

#[test]
#[should_panic(expected = "unsupported capability")]
fn test_unknown_capability() {
    ContextState::new([640, 480]).set_capability(0x0B50, true);
}

#[test]
fn test_matrix_stacks() {
    let mut stacks = MatrixStacks::default();
    let mut state = ContextState::new([640, 480]);

    stacks.translate(1.0, 2.0, 3.0);
    stacks.push();
    stacks.scale(2.0, 2.0, 2.0);
    stacks.store(&mut state);
    assert_eq!(&state.modelview_matrix[12..], &[1.0, 2.0, 3.0, 1.0]);
    assert_eq!(state.modelview_matrix[0], 2.0);

    stacks.pop();
    stacks.rotate(90.0, 0.0, 0.0, 1.0);
    stacks.store(&mut state);
    // The x axis now points along y.
    assert!((state.modelview_matrix[1] - 1.0).abs() < 1e-12);
    assert!(state.modelview_matrix[0].abs() < 1e-12);

    stacks.set_mode(enums::PROJECTION);
    stacks.ortho(0.0, 640.0, 480.0, 0.0, -1.0, 1.0);
    stacks.store(&mut state);
    assert_eq!(state.matrix_mode, enums::PROJECTION);
    assert_eq!(state.projection_matrix[0], 2.0 / 640.0);
    assert_eq!(state.projection_matrix[5], -2.0 / 480.0);
    assert_eq!(state.projection_matrix[12], -1.0);
    assert_eq!(state.projection_matrix[13], 1.0);
}
