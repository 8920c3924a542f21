//! Calling a real OpenGL driver through loaded function pointers.

use super::LegacyGl;

use gleam::gl::{GLbitfield, GLboolean, GLenum, GLfloat, GLint, GLsizei, GLuint, GLvoid};
use std::os::raw::c_void;
use std::{mem, ptr};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("OpenGL entry point {0} not found")]
    Missing(&'static str),
}

macro_rules! gl_functions {
    ( $( $field:ident = $name:literal fn( $( $arg:ty ),* ); )* ) => {
        /// OpenGL 1.x entry points, loaded from the driver.
        pub struct GlFns {
            $( $field: unsafe extern "system" fn( $( $arg ),* ), )*
        }

        impl GlFns {
            /// Look up every entry point we need with `load`, which takes a
            /// C name like `"glBegin"`.
            ///
            /// # Safety
            ///
            /// `load` must return either null or a pointer to the named
            /// function, which must stay valid for as long as the `GlFns`
            /// does, and every call through the result must happen on a
            /// thread where the right context is current.
            pub unsafe fn load_with<F>(mut load: F) -> Result<GlFns, LoadError>
            where
                F: FnMut(&'static str) -> *const c_void,
            {
                Ok(GlFns {
                    $(
                        $field: {
                            let proc = load($name);
                            if proc.is_null() {
                                return Err(LoadError::Missing($name));
                            }
                            mem::transmute::<*const c_void, unsafe extern "system" fn( $( $arg ),* )>(proc)
                        },
                    )*
                })
            }
        }
    }
}

#[rustfmt::skip]
gl_functions! {
    gen_textures = "glGenTextures" fn(GLsizei, *mut GLuint);
    delete_textures = "glDeleteTextures" fn(GLsizei, *const GLuint);
    bind_texture = "glBindTexture" fn(GLenum, GLuint);
    tex_image_2d = "glTexImage2D" fn(GLenum, GLint, GLint, GLsizei, GLsizei, GLint, GLenum, GLenum, *const GLvoid);
    tex_parameter_f = "glTexParameterf" fn(GLenum, GLenum, GLfloat);
    tex_parameter_i = "glTexParameteri" fn(GLenum, GLenum, GLint);
    tex_env_f = "glTexEnvf" fn(GLenum, GLenum, GLfloat);
    enable = "glEnable" fn(GLenum);
    disable = "glDisable" fn(GLenum);
    alpha_func = "glAlphaFunc" fn(GLenum, GLfloat);
    blend_func = "glBlendFunc" fn(GLenum, GLenum);
    clear = "glClear" fn(GLbitfield);
    clear_color = "glClearColor" fn(GLfloat, GLfloat, GLfloat, GLfloat);
    clear_depth = "glClearDepth" fn(f64);
    cull_face = "glCullFace" fn(GLenum);
    depth_func = "glDepthFunc" fn(GLenum);
    depth_mask = "glDepthMask" fn(GLboolean);
    depth_range = "glDepthRange" fn(f64, f64);
    draw_buffer = "glDrawBuffer" fn(GLenum);
    front_face = "glFrontFace" fn(GLenum);
    shade_model = "glShadeModel" fn(GLenum);
    viewport = "glViewport" fn(GLint, GLint, GLsizei, GLsizei);
    matrix_mode = "glMatrixMode" fn(GLenum);
    load_identity = "glLoadIdentity" fn();
    load_matrix_d = "glLoadMatrixd" fn(*const f64);
    push_matrix = "glPushMatrix" fn();
    pop_matrix = "glPopMatrix" fn();
    translate_f = "glTranslatef" fn(GLfloat, GLfloat, GLfloat);
    rotate_f = "glRotatef" fn(GLfloat, GLfloat, GLfloat, GLfloat);
    scale_f = "glScalef" fn(GLfloat, GLfloat, GLfloat);
    frustum = "glFrustum" fn(f64, f64, f64, f64, f64, f64);
    ortho = "glOrtho" fn(f64, f64, f64, f64, f64, f64);
    begin = "glBegin" fn(GLenum);
    end = "glEnd" fn();
    color_3f = "glColor3f" fn(GLfloat, GLfloat, GLfloat);
    color_3ub = "glColor3ub" fn(u8, u8, u8);
    color_4f = "glColor4f" fn(GLfloat, GLfloat, GLfloat, GLfloat);
    color_4ub = "glColor4ub" fn(u8, u8, u8, u8);
    tex_coord_2f = "glTexCoord2f" fn(GLfloat, GLfloat);
    vertex_2f = "glVertex2f" fn(GLfloat, GLfloat);
    vertex_3f = "glVertex3f" fn(GLfloat, GLfloat, GLfloat);
    vertex_4f = "glVertex4f" fn(GLfloat, GLfloat, GLfloat, GLfloat);
}

// All the calls below are safe given the contract on `load_with`.
impl LegacyGl for GlFns {
    fn gen_textures(&self, n: GLsizei) -> Vec<GLuint> {
        let mut names = vec![0; n.max(0) as usize];
        unsafe { (self.gen_textures)(names.len() as GLsizei, names.as_mut_ptr()) };
        names
    }

    fn delete_textures(&self, textures: &[GLuint]) {
        unsafe { (self.delete_textures)(textures.len() as GLsizei, textures.as_ptr()) }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { (self.bind_texture)(target, texture) }
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
        pixels: Option<&[u8]>,
    ) {
        let data = pixels.map_or(ptr::null(), |bytes| bytes.as_ptr() as *const GLvoid);
        unsafe {
            (self.tex_image_2d)(
                target,
                level,
                internal_format,
                width,
                height,
                border,
                format,
                ty,
                data,
            )
        }
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        unsafe { (self.tex_parameter_f)(target, pname, param) }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { (self.tex_parameter_i)(target, pname, param) }
    }

    fn tex_env_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        unsafe { (self.tex_env_f)(target, pname, param) }
    }

    fn enable(&self, cap: GLenum) {
        unsafe { (self.enable)(cap) }
    }

    fn disable(&self, cap: GLenum) {
        unsafe { (self.disable)(cap) }
    }

    fn alpha_func(&self, func: GLenum, reference: GLfloat) {
        unsafe { (self.alpha_func)(func, reference) }
    }

    fn blend_func(&self, sfactor: GLenum, dfactor: GLenum) {
        unsafe { (self.blend_func)(sfactor, dfactor) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { (self.clear)(mask) }
    }

    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        unsafe { (self.clear_color)(r, g, b, a) }
    }

    fn clear_depth(&self, depth: f64) {
        unsafe { (self.clear_depth)(depth) }
    }

    fn cull_face(&self, mode: GLenum) {
        unsafe { (self.cull_face)(mode) }
    }

    fn depth_func(&self, func: GLenum) {
        unsafe { (self.depth_func)(func) }
    }

    fn depth_mask(&self, flag: bool) {
        unsafe { (self.depth_mask)(flag as GLboolean) }
    }

    fn depth_range(&self, near: f64, far: f64) {
        unsafe { (self.depth_range)(near, far) }
    }

    fn draw_buffer(&self, mode: GLenum) {
        unsafe { (self.draw_buffer)(mode) }
    }

    fn front_face(&self, mode: GLenum) {
        unsafe { (self.front_face)(mode) }
    }

    fn shade_model(&self, mode: GLenum) {
        unsafe { (self.shade_model)(mode) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { (self.viewport)(x, y, width, height) }
    }

    fn matrix_mode(&self, mode: GLenum) {
        unsafe { (self.matrix_mode)(mode) }
    }

    fn load_identity(&self) {
        unsafe { (self.load_identity)() }
    }

    fn load_matrix_d(&self, m: &[f64; 16]) {
        unsafe { (self.load_matrix_d)(m.as_ptr()) }
    }

    fn push_matrix(&self) {
        unsafe { (self.push_matrix)() }
    }

    fn pop_matrix(&self) {
        unsafe { (self.pop_matrix)() }
    }

    fn translate_f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        unsafe { (self.translate_f)(x, y, z) }
    }

    fn rotate_f(&self, angle: GLfloat, x: GLfloat, y: GLfloat, z: GLfloat) {
        unsafe { (self.rotate_f)(angle, x, y, z) }
    }

    fn scale_f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        unsafe { (self.scale_f)(x, y, z) }
    }

    fn frustum(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        unsafe { (self.frustum)(left, right, bottom, top, near, far) }
    }

    fn ortho(&self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        unsafe { (self.ortho)(left, right, bottom, top, near, far) }
    }

    fn begin(&self, mode: GLenum) {
        unsafe { (self.begin)(mode) }
    }

    fn end(&self) {
        unsafe { (self.end)() }
    }

    fn color_3f(&self, r: GLfloat, g: GLfloat, b: GLfloat) {
        unsafe { (self.color_3f)(r, g, b) }
    }

    fn color_3ub(&self, r: u8, g: u8, b: u8) {
        unsafe { (self.color_3ub)(r, g, b) }
    }

    fn color_4f(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        unsafe { (self.color_4f)(r, g, b, a) }
    }

    fn color_4ub(&self, r: u8, g: u8, b: u8, a: u8) {
        unsafe { (self.color_4ub)(r, g, b, a) }
    }

    fn tex_coord_2f(&self, s: GLfloat, t: GLfloat) {
        unsafe { (self.tex_coord_2f)(s, t) }
    }

    fn vertex_2f(&self, x: GLfloat, y: GLfloat) {
        unsafe { (self.vertex_2f)(x, y) }
    }

    fn vertex_3f(&self, x: GLfloat, y: GLfloat, z: GLfloat) {
        unsafe { (self.vertex_3f)(x, y, z) }
    }

    fn vertex_4f(&self, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) {
        unsafe { (self.vertex_4f)(x, y, z, w) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static CLEARED: AtomicU32 = AtomicU32::new(0);

    extern "system" fn fake_clear(mask: GLbitfield) {
        CLEARED.store(mask, Ordering::SeqCst);
    }

    extern "system" fn fake_noop() {}

    #[test]
    fn missing_entry_point() {
        let result = unsafe { GlFns::load_with(|_| ptr::null()) };
        assert!(matches!(result, Err(LoadError::Missing("glGenTextures"))));
    }

    #[test]
    fn calls_through_pointers() {
        // Point everything at a no-op, except glClear. Nothing but `clear`
        // gets called, so the mismatched signatures are never used.
        let gl = unsafe {
            GlFns::load_with(|name| {
                if name == "glClear" {
                    fake_clear as *const c_void
                } else {
                    fake_noop as *const c_void
                }
            })
        }
        .unwrap();
        gl.clear(0x4100);
        assert_eq!(CLEARED.load(Ordering::SeqCst), 0x4100);
    }
}
