//! Issuing logged commands against a live context.

use crate::call::{ApiArgument, ApiCommand, ApiFunction};
use crate::command_log::CommandLog;
use crate::gl::LegacyGl;

use gleam::gl::GLuint;
use std::collections::HashMap;

/// Everything `replay_one` needs besides the command itself.
pub struct Locals<'a> {
    pub gl: &'a dyn LegacyGl,

    /// The log the command came from, for its side stream.
    pub log: &'a CommandLog,

    /// Captured texture names to the live names standing in for them.
    pub textures: &'a HashMap<GLuint, GLuint>,

    /// The command's index in the log. For error messages.
    pub serial: usize,
}

/// Translate a captured texture name to its live counterpart. Zero, and
/// names with no live counterpart, become zero.
pub fn live_texture(textures: &HashMap<GLuint, GLuint>, captured: GLuint) -> GLuint {
    if captured == 0 {
        return 0;
    }
    textures.get(&captured).copied().unwrap_or(0)
}

/// Issue one logged command.
pub fn replay_one(locals: &Locals, command: &ApiCommand) {
    let gl = locals.gl;
    let a = |n: usize| command.arg(n);
    let f = |n: usize| command.arg(n).as_f32();
    let d = |n: usize| command.arg(n).as_f64();

    use ApiFunction::*;
    match command.function() {
        AlphaFunc => gl.alpha_func(a(0).as_u32(), f(1)),
        Begin => gl.begin(a(0).as_u32()),
        BindTexture => gl.bind_texture(a(0).as_u32(), live_texture(locals.textures, a(1).as_u32())),
        BlendFunc => gl.blend_func(a(0).as_u32(), a(1).as_u32()),
        Clear => gl.clear(a(0).as_u32()),
        ClearColor => gl.clear_color(f(0), f(1), f(2), f(3)),
        ClearDepth => gl.clear_depth(d(0)),
        Color3f => gl.color_3f(f(0), f(1), f(2)),
        Color3ub => gl.color_3ub(a(0).as_u8(), a(1).as_u8(), a(2).as_u8()),
        Color4f => gl.color_4f(f(0), f(1), f(2), f(3)),
        Color4ub => gl.color_4ub(a(0).as_u8(), a(1).as_u8(), a(2).as_u8(), a(3).as_u8()),
        CullFace => gl.cull_face(a(0).as_u32()),
        DepthFunc => gl.depth_func(a(0).as_u32()),
        DepthMask => gl.depth_mask(a(0).as_u8() != 0),
        DepthRange => gl.depth_range(d(0), d(1)),
        Disable => gl.disable(a(0).as_u32()),
        DrawBuffer => gl.draw_buffer(a(0).as_u32()),
        Enable => gl.enable(a(0).as_u32()),
        End => gl.end(),
        FrontFace => gl.front_face(a(0).as_u32()),
        Frustum => gl.frustum(d(0), d(1), d(2), d(3), d(4), d(5)),
        LoadIdentity => gl.load_identity(),
        LoadMatrixd => gl.load_matrix_d(&locals.log.matrix(a(0).as_matrix())),
        MatrixMode => gl.matrix_mode(a(0).as_u32()),
        Ortho => gl.ortho(d(0), d(1), d(2), d(3), d(4), d(5)),
        PopMatrix => gl.pop_matrix(),
        PushMatrix => gl.push_matrix(),
        Rotatef => gl.rotate_f(f(0), f(1), f(2), f(3)),
        Scalef => gl.scale_f(f(0), f(1), f(2)),
        ShadeModel => gl.shade_model(a(0).as_u32()),
        TexCoord2f => gl.tex_coord_2f(f(0), f(1)),
        TexEnvf => gl.tex_env_f(a(0).as_u32(), a(1).as_u32(), f(2)),
        TexImage2D => {
            let pixels = match a(8) {
                ApiArgument::Pixels(var) => Some(locals.log.pixels(var)),
                _ => None,
            };
            gl.tex_image_2d(
                a(0).as_u32(),
                a(1).as_i32(),
                a(2).as_i32(),
                a(3).as_i32(),
                a(4).as_i32(),
                a(5).as_i32(),
                a(6).as_u32(),
                a(7).as_u32(),
                pixels.as_ref().map(|pixels| &*pixels.bytes),
            )
        }
        TexParameterf => gl.tex_parameter_f(a(0).as_u32(), a(1).as_u32(), f(2)),
        TexParameteri => gl.tex_parameter_i(a(0).as_u32(), a(1).as_u32(), a(2).as_i32()),
        Translatef => gl.translate_f(f(0), f(1), f(2)),
        Vertex2f => gl.vertex_2f(f(0), f(1)),
        Vertex3f => gl.vertex_3f(f(0), f(1), f(2)),
        Vertex4f => gl.vertex_4f(f(0), f(1), f(2), f(3)),
        Viewport => gl.viewport(a(0).as_i32(), a(1).as_i32(), a(2).as_i32(), a(3).as_i32()),

        // Synchronization and readback have nothing to show on replay.
        Finish | Flush | ReadPixels => {}

        // The capturer never logs these.
        GenTextures | DeleteTextures | SwapBuffers | Color3fv | Color3ubv | Color4fv
        | Color4ubv | TexCoord2fv | Vertex2fv | Vertex3fv => panic!(
            "gl-snapshot: command {} is {}, which can't be replayed",
            locals.serial,
            command.function().name()
        ),
    }
}

#[test]
fn test_replay_one() {
    use crate::enums;
    use crate::gl::TraceGl;

    let mut log = CommandLog::new();
    log.push(ApiFunction::BindTexture, &[ApiArgument::U32(enums::TEXTURE_2D), ApiArgument::U32(5)]);
    log.push(ApiFunction::BindTexture, &[ApiArgument::U32(enums::TEXTURE_2D), ApiArgument::U32(6)]);
    log.push(ApiFunction::Finish, &[]);
    log.push(ApiFunction::DepthMask, &[ApiArgument::U8(0)]);

    let textures: HashMap<GLuint, GLuint> = [(5, 50)].into_iter().collect();
    let gl = TraceGl::new();
    for (serial, command) in log.iter().enumerate() {
        let locals = Locals {
            gl: &gl,
            log: &log,
            textures: &textures,
            serial,
        };
        replay_one(&locals, command);
    }

    let trace = gl.into_log();
    let bound: Vec<u32> = trace
        .iter()
        .filter(|c| c.function() == ApiFunction::BindTexture)
        .map(|c| c.arg(1).as_u32())
        .collect();
    // 6 was never materialized.
    assert_eq!(bound, [50, 0]);
    // glFinish never reaches the context.
    assert_eq!(trace.len(), 3);
    assert!(trace.iter().all(|c| c.function() != ApiFunction::Finish));
    assert_eq!(trace.get(2).unwrap().args(), &[ApiArgument::U8(0)]);
}
