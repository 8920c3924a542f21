//! A `LegacyGl` that records calls instead of making them.

use super::LegacyGl;
use crate::call::{ApiArgument, ApiCommand, ApiFunction, GlRawPtr};
use crate::command_log::CommandLog;
use crate::pixels::{self, Pixels};

use gleam::gl::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};
use std::cell::{Cell, Ref, RefCell};

use ApiArgument::*;

/// Records every call made on it as an `ApiCommand`, in the same form the
/// capturer logs them: texture images and matrices go to the side stream,
/// and out-pointers are logged as null.
///
/// Texture names come from a counter starting at 1. The names generated and
/// deleted are kept separately, since the log doesn't carry them.
#[derive(Default)]
pub struct TraceGl {
    log: RefCell<CommandLog>,
    next_texture: Cell<GLuint>,
    generated: RefCell<Vec<GLuint>>,
    deleted: RefCell<Vec<GLuint>>,
}

impl TraceGl {
    pub fn new() -> TraceGl {
        TraceGl::default()
    }

    pub fn log(&self) -> Ref<'_, CommandLog> {
        self.log.borrow()
    }

    pub fn into_log(self) -> CommandLog {
        self.log.into_inner()
    }

    /// The functions called so far, in order.
    pub fn functions(&self) -> Vec<ApiFunction> {
        self.log.borrow().iter().map(ApiCommand::function).collect()
    }

    /// How many times `function` has been called.
    pub fn count(&self, function: ApiFunction) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|command| command.function() == function)
            .count()
    }

    pub fn generated_textures(&self) -> Vec<GLuint> {
        self.generated.borrow().clone()
    }

    pub fn deleted_textures(&self) -> Vec<GLuint> {
        self.deleted.borrow().clone()
    }

    /// Forget everything recorded so far. Texture names keep counting.
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn push(&self, function: ApiFunction, args: &[ApiArgument]) {
        self.log.borrow_mut().push(function, args);
    }
}

impl LegacyGl for TraceGl {
    fn gen_textures(&self, n: GLsizei) -> Vec<GLuint> {
        let names: Vec<GLuint> = (0..n.max(0))
            .map(|_| {
                let name = self.next_texture.get() + 1;
                self.next_texture.set(name);
                name
            })
            .collect();
        self.generated.borrow_mut().extend_from_slice(&names);
        self.push(ApiFunction::GenTextures, &[I32(n), Pointer(GlRawPtr::null())]);
        names
    }

    fn delete_textures(&self, textures: &[GLuint]) {
        self.deleted.borrow_mut().extend_from_slice(textures);
        self.push(
            ApiFunction::DeleteTextures,
            &[I32(textures.len() as GLsizei), Pointer(GlRawPtr::null())],
        );
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.push(ApiFunction::BindTexture, &[U32(target), U32(texture)]);
    }

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
        data: Option<&[u8]>,
    ) {
        let mut log = self.log.borrow_mut();
        let source = match data {
            Some(bytes) => {
                let len = pixels::image_len(width as usize, height as usize, format, ty);
                let pixels = Pixels::new(width as usize, height as usize, format, ty, &bytes[..len]);
                ApiArgument::Pixels(log.put_pixels(&pixels))
            }
            None => Pointer(GlRawPtr::null()),
        };
        log.push(
            ApiFunction::TexImage2D,
            &[
                U32(target),
                I32(level),
                I32(internal_format),
                I32(width),
                I32(height),
                I32(border),
                U32(format),
                U32(ty),
                source,
            ],
        );
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        self.push(ApiFunction::TexParameterf, &[U32(target), U32(pname), F32(param)]);
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        self.push(ApiFunction::TexParameteri, &[U32(target), U32(pname), I32(param)]);
    }

    fn tex_env_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        self.push(ApiFunction::TexEnvf, &[U32(target), U32(pname), F32(param)]);
    }

    fn enable(&self, cap: GLenum) {
        self.push(ApiFunction::Enable, &[U32(cap)]);
    }

    fn disable(&self, cap: GLenum) {
        self.push(ApiFunction::Disable, &[U32(cap)]);
    }

    fn alpha_func(&self, func: GLenum, reference: GLfloat) {
        self.push(ApiFunction::AlphaFunc, &[U32(func), F32(reference)]);
    }

    fn blend_func(&self, sfactor: GLenum, dfactor: GLenum) {
        self.push(ApiFunction::BlendFunc, &[U32(sfactor), U32(dfactor)]);
    }

    fn clear(&self, mask: GLbitfield) {
        self.push(ApiFunction::Clear, &[U32(mask)]);
    }

    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        self.push(ApiFunction::ClearColor, &[F32(r), F32(g), F32(b), F32(a)]);
    }

    fn clear_depth(&self, depth: f64) {
        self.push(ApiFunction::ClearDepth, &[F64(depth)]);
    }

    fn cull_face(&self, mode: GLenum) {
        self.push(ApiFunction::CullFace, &[U32(mode)]);
    }

    fn depth_func(&self, func: GLenum) {
        self.push(ApiFunction::DepthFunc, &[U32(func)]);
    }

    fn depth_mask(&self, flag: bool) {
        self.push(ApiFunction::DepthMask, &[U8(flag as u8)]);
    }

    fn depth_range(&self, near: f64, far: f64) {
        self.push(ApiFunction::DepthRange, &[F64(near), F64(far)]);
    }

    fn draw_buffer(&self, mode: GLenum) {
        self.push(ApiFunction::DrawBuffer, &[U32(mode)]);
    }

    fn front_face(&self, mode: GLenum) {
        self.push(ApiFunction::FrontFace, &[U32(mode)]);
    }

    fn shade_model(&self, mode: GLenum) {
        self.push(ApiFunction::ShadeModel, &[U32(mode)]);
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.push(ApiFunction::Viewport, &[I32(x), I32(y), I32(width), I32(height)]);
    }

    fn matrix_mode(&self, mode: GLenum) {
        self.push(ApiFunction::MatrixMode, &[U32(mode)]);
    }

    fn load_identity(&self) {
        self.push(ApiFunction::LoadIdentity, &[]);
    }

    fn load_matrix_d(&self, m: &[f64; 16]) {
        let mut log = self.log.borrow_mut();
        let var = log.put_matrix(m);
        log.push(ApiFunction::LoadMatrixd, &[Matrix(var)]);
    }

    fn push_matrix(&self) {
        self.push(ApiFunction::PushMatrix, &[]);
    }

    fn pop_matrix(&self) {
        self.push(ApiFunction::PopMatrix, &[]);
    }

    fn translate_f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.push(ApiFunction::Translatef, &[F32(x), F32(y), F32(z)]);
    }

    fn rotate_f(&self, angle: GLfloat, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.push(ApiFunction::Rotatef, &[F32(angle), F32(x), F32(y), F32(z)]);
    }

    fn scale_f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.push(ApiFunction::Scalef, &[F32(x), F32(y), F32(z)]);
    }

    fn frustum(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        self.push(
            ApiFunction::Frustum,
            &[F64(left), F64(right), F64(bottom), F64(top), F64(near), F64(far)],
        );
    }

    fn ortho(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        self.push(
            ApiFunction::Ortho,
            &[F64(left), F64(right), F64(bottom), F64(top), F64(near), F64(far)],
        );
    }

    fn begin(&self, mode: GLenum) {
        self.push(ApiFunction::Begin, &[U32(mode)]);
    }

    fn end(&self) {
        self.push(ApiFunction::End, &[]);
    }

    fn color_3f(&self, r: GLfloat, g: GLfloat, b: GLfloat) {
        self.push(ApiFunction::Color3f, &[F32(r), F32(g), F32(b)]);
    }

    fn color_3ub(&self, r: u8, g: u8, b: u8) {
        self.push(ApiFunction::Color3ub, &[U8(r), U8(g), U8(b)]);
    }

    fn color_4f(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        self.push(ApiFunction::Color4f, &[F32(r), F32(g), F32(b), F32(a)]);
    }

    fn color_4ub(&self, r: u8, g: u8, b: u8, a: u8) {
        self.push(ApiFunction::Color4ub, &[U8(r), U8(g), U8(b), U8(a)]);
    }

    fn tex_coord_2f(&self, s: GLfloat, t: GLfloat) {
        self.push(ApiFunction::TexCoord2f, &[F32(s), F32(t)]);
    }

    fn vertex_2f(&self, x: GLfloat, y: GLfloat) {
        self.push(ApiFunction::Vertex2f, &[F32(x), F32(y)]);
    }

    fn vertex_3f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.push(ApiFunction::Vertex3f, &[F32(x), F32(y), F32(z)]);
    }

    fn vertex_4f(&self, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) {
        self.push(ApiFunction::Vertex4f, &[F32(x), F32(y), F32(z), F32(w)]);
    }
}

#[test]
fn test_trace() {
    use crate::enums;

    let gl = TraceGl::new();
    assert_eq!(gl.gen_textures(2), [1, 2]);
    assert_eq!(gl.gen_textures(1), [3]);
    gl.bind_texture(enums::TEXTURE_2D, 2);
    gl.tex_image_2d(
        enums::TEXTURE_2D,
        0,
        4,
        1,
        1,
        0,
        enums::RGBA,
        enums::UNSIGNED_BYTE,
        Some(&[1u8, 2, 3, 4][..]),
    );
    gl.delete_textures(&[1, 3]);

    assert_eq!(gl.count(ApiFunction::GenTextures), 2);
    assert_eq!(gl.deleted_textures(), [1, 3]);

    let log = gl.into_log();
    let upload = log.get(3).unwrap();
    assert_eq!(upload.function(), ApiFunction::TexImage2D);
    assert_eq!(&*log.pixels(upload.arg(8).as_pixels()).bytes, &[1, 2, 3, 4]);
}
