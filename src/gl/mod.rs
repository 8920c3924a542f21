//! The OpenGL entry points the player drives.
//!
//! `gleam::Gl` only covers the core and ES profiles, and has no `glBegin`,
//! `glLoadMatrixd`, or `glTexEnvf`. `LegacyGl` is the fixed-function subset
//! replay needs, in the same style: `&self` methods taking Rust types.
//!
//! There are two implementations: `GlFns` calls into a real driver through
//! loaded function pointers, and `TraceGl` just writes down what it's asked
//! to do.

mod fns;
mod trace;

pub use fns::{GlFns, LoadError};
pub use trace::TraceGl;

use gleam::gl::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};

pub trait LegacyGl {
    fn gen_textures(&self, n: GLsizei) -> Vec<GLuint>;
    fn delete_textures(&self, textures: &[GLuint]);
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        ty: GLenum,
        pixels: Option<&[u8]>,
    );
    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat);
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_env_f(&self, target: GLenum, pname: GLenum, param: GLfloat);

    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn alpha_func(&self, func: GLenum, reference: GLfloat);
    fn blend_func(&self, sfactor: GLenum, dfactor: GLenum);
    fn clear(&self, mask: GLbitfield);
    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn clear_depth(&self, depth: f64);
    fn cull_face(&self, mode: GLenum);
    fn depth_func(&self, func: GLenum);
    fn depth_mask(&self, flag: bool);
    fn depth_range(&self, near: f64, far: f64);
    fn draw_buffer(&self, mode: GLenum);
    fn front_face(&self, mode: GLenum);
    fn shade_model(&self, mode: GLenum);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    fn matrix_mode(&self, mode: GLenum);
    fn load_identity(&self);
    fn load_matrix_d(&self, m: &[f64; 16]);
    fn push_matrix(&self);
    fn pop_matrix(&self);
    fn translate_f(&self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn rotate_f(&self, angle: GLfloat, x: GLfloat, y: GLfloat, z: GLfloat);
    fn scale_f(&self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn frustum(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64);
    fn ortho(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64);

    fn begin(&self, mode: GLenum);
    fn end(&self);
    fn color_3f(&self, r: GLfloat, g: GLfloat, b: GLfloat);
    fn color_3ub(&self, r: u8, g: u8, b: u8);
    fn color_4f(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn color_4ub(&self, r: u8, g: u8, b: u8, a: u8);
    fn tex_coord_2f(&self, s: GLfloat, t: GLfloat);
    fn vertex_2f(&self, x: GLfloat, y: GLfloat);
    fn vertex_3f(&self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn vertex_4f(&self, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat);
}
