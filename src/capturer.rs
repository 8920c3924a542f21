//! Watching a live program's calls and capturing frames.
//!
//! An interception layer calls `Capturer::on_call` once for each OpenGL
//! call the program makes, and once for `SwapBuffers`. The capturer mirrors
//! the state it cares about, logs the calls that need replaying, and at each
//! frame boundary either hands the frame off or throws it away.
//!
//! Not every call is logged. Calls whose only effect is on state the start
//! snapshot already records (first uploads of a texture level) are folded
//! into the mirror instead, so replaying the log on top of the start state
//! doesn't apply them twice. Sampling parameter calls that change nothing
//! are dropped the same way.

use crate::call::{ApiArgument, ApiFunction, ArgKind, GlRawPtr};
use crate::command_log::CommandLog;
use crate::enums;
use crate::pixels::{self, Pixels};
use crate::resources::{ResourceTable, TextureDimensionality, TextureMip, TextureRecord};
use crate::snapshot::{HandOff, Snapshot};
use crate::state::{ContextState, MatrixStacks};

use gleam::gl::{GLenum, GLuint};
use std::collections::HashMap;
use std::mem;
use tracing::{debug, info};

pub struct Capturer {
    hand_off: HandOff,

    /// The live state mirror.
    current: ContextState,
    matrices: MatrixStacks,

    /// Texture names bound to each target.
    bound_textures: HashMap<GLenum, GLuint>,

    /// Latest contents of every texture the program has uploaded.
    resources: ResourceTable,

    /// The state at the start of the frame in progress, once its first call
    /// has arrived.
    start_state: Option<ContextState>,
    recording: CommandLog,
    frames: u64,
}

impl Capturer {
    /// Make a capturer for a program whose window is `window_extents` pixels.
    pub fn new(window_extents: [u32; 2]) -> Capturer {
        Capturer::with_hand_off(window_extents, HandOff::new())
    }

    /// Make a capturer that publishes to an existing hand-off slot.
    pub fn with_hand_off(window_extents: [u32; 2], hand_off: HandOff) -> Capturer {
        Capturer {
            hand_off,
            current: ContextState::new(window_extents),
            matrices: MatrixStacks::default(),
            bound_textures: HashMap::new(),
            resources: ResourceTable::new(),
            start_state: None,
            recording: CommandLog::new(),
            frames: 0,
        }
    }

    /// The functions the interception layer should report to `on_call`.
    pub fn registered_functions() -> impl Iterator<Item = ApiFunction> {
        ApiFunction::ALL.iter().copied()
    }

    /// Another handle on the slot this capturer publishes snapshots to.
    pub fn hand_off(&self) -> HandOff {
        self.hand_off.clone()
    }

    /// Ask for the next completed frame to be captured.
    pub fn request_capture(&self) {
        self.hand_off.request_capture();
    }

    /// Take the most recently captured snapshot, if any.
    pub fn pop_snapshot(&self) -> Option<Snapshot> {
        self.hand_off.pop_snapshot()
    }

    /// The live state mirror.
    pub fn current_state(&self) -> &ContextState {
        &self.current
    }

    /// The commands logged so far in the frame in progress.
    pub fn recording(&self) -> &CommandLog {
        &self.recording
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Observe one intercepted call.
    ///
    /// Pointer arguments are read before this returns, and never after.
    pub fn on_call(&mut self, function: ApiFunction, args: &[ApiArgument]) {
        check_signature(function, args);

        if self.start_state.is_none() {
            self.start_state = Some(self.current.clone());
        }

        if function == ApiFunction::SwapBuffers {
            self.end_frame();
            return;
        }

        if let Some((scalar, kind, len)) = function.scalar_form() {
            let args = read_vector(args[0].as_pointer(), kind, len);
            self.on_gl_call(scalar, &args);
        } else {
            self.on_gl_call(function, args);
        }
    }

    fn on_gl_call(&mut self, function: ApiFunction, args: &[ApiArgument]) {
        use ApiFunction::*;
        match function {
            Enable | Disable => {
                self.current
                    .set_capability(args[0].as_u32(), function == Enable);
            }
            AlphaFunc => {
                self.current.alpha_func = args[0].as_u32();
                self.current.alpha_ref = args[1].as_f32();
            }
            BlendFunc => {
                self.current.blend_sfactor = args[0].as_u32();
                self.current.blend_dfactor = args[1].as_u32();
            }
            ClearColor => {
                for (channel, arg) in self.current.clear_color.iter_mut().zip(args) {
                    *channel = arg.as_f32();
                }
            }
            ClearDepth => self.current.clear_depth = args[0].as_f64(),
            CullFace => self.current.cull_face_mode = args[0].as_u32(),
            DepthFunc => self.current.depth_func = args[0].as_u32(),
            DepthMask => self.current.depth_mask = args[0].as_u8() != 0,
            DepthRange => self.current.depth_range = [args[0].as_f64(), args[1].as_f64()],
            DrawBuffer => self.current.draw_buffer = args[0].as_u32(),
            FrontFace => self.current.front_face = args[0].as_u32(),
            ShadeModel => self.current.shade_model = args[0].as_u32(),
            Viewport => {
                for (field, arg) in self.current.viewport.iter_mut().zip(args) {
                    *field = arg.as_i32();
                }
            }
            TexEnvf => {
                if args[0].as_u32() == enums::TEXTURE_ENV
                    && args[1].as_u32() == enums::TEXTURE_ENV_MODE
                {
                    self.current.texture_env_mode = args[2].as_f32() as GLenum;
                }
            }

            MatrixMode => self.matrices.set_mode(args[0].as_u32()),
            LoadIdentity => self.matrices.load_identity(),
            PushMatrix => self.matrices.push(),
            PopMatrix => self.matrices.pop(),
            Translatef => self
                .matrices
                .translate(f(args[0]), f(args[1]), f(args[2])),
            Rotatef => self
                .matrices
                .rotate(f(args[0]), f(args[1]), f(args[2]), f(args[3])),
            Scalef => self.matrices.scale(f(args[0]), f(args[1]), f(args[2])),
            Frustum | Ortho => {
                let a: Vec<f64> = args.iter().map(|arg| arg.as_f64()).collect();
                if function == Frustum {
                    self.matrices.frustum(a[0], a[1], a[2], a[3], a[4], a[5]);
                } else {
                    self.matrices.ortho(a[0], a[1], a[2], a[3], a[4], a[5]);
                }
            }
            LoadMatrixd => {
                let values: Vec<f64> = args[0].as_pointer().read_vec(16);
                let mut matrix = [0.0; 16];
                matrix.copy_from_slice(&values);
                self.matrices.load(&matrix);
                self.matrices.store(&mut self.current);
                let var = self.recording.put_matrix(&matrix);
                self.recording.push(LoadMatrixd, &[ApiArgument::Matrix(var)]);
                return;
            }

            BindTexture => {
                let (target, texture) = (args[0].as_u32(), args[1].as_u32());
                self.bound_textures.insert(target, texture);
                if target == enums::TEXTURE_2D {
                    self.current.bound_2d_texture = texture;
                }
            }
            GenTextures => {
                // Names only matter once something is uploaded to them.
                debug!("not logging {}", function.name());
                return;
            }
            DeleteTextures => {
                self.delete_textures(args);
                return;
            }
            TexImage2D => {
                self.tex_image_2d(args);
                return;
            }
            TexParameterf | TexParameteri => {
                if self.tex_parameter(args) {
                    return;
                }
            }
            _ => {}
        }

        if matches!(
            function,
            MatrixMode
                | LoadIdentity
                | PushMatrix
                | PopMatrix
                | Translatef
                | Rotatef
                | Scalef
                | Frustum
                | Ortho
        ) {
            self.matrices.store(&mut self.current);
        }

        self.recording.push(function, args);
    }

    fn delete_textures(&mut self, args: &[ApiArgument]) {
        let n = args[0].as_i32();
        assert!(n >= 0, "gl-snapshot: glDeleteTextures: negative count {}", n);
        let names: Vec<GLuint> = args[1].as_pointer().read_vec(n as usize);
        for name in names {
            if name == 0 {
                continue;
            }
            // Deleting a bound texture reverts the binding to zero.
            for bound in self.bound_textures.values_mut() {
                if *bound == name {
                    *bound = 0;
                }
            }
            if self.current.bound_2d_texture == name {
                self.current.bound_2d_texture = 0;
            }
            let known_params = self.current.texture_params.remove(&name).is_some();
            let known_contents = self.resources.remove(name).is_some();
            assert!(
                known_params || known_contents,
                "gl-snapshot: glDeleteTextures: unknown texture {}",
                name
            );
            debug!(texture = name, "deleted texture");
        }
    }

    /// Mirror a `glTexParameter*` call on a bound texture. Returns true if
    /// the call left the texture as it was, so it needn't be logged.
    ///
    /// Any real change has to be logged: it happened after the frame's start
    /// state was taken, and replay must make it at the same point in the
    /// stream.
    fn tex_parameter(&mut self, args: &[ApiArgument]) -> bool {
        let texture = match self.bound_textures.get(&args[0].as_u32()) {
            Some(&texture) if texture != 0 => texture,
            _ => return false,
        };
        let pname = args[1].as_u32();
        let value = match args[2] {
            ApiArgument::I32(value) => value as f32,
            other => other.as_f32(),
        };
        let params = self.current.texture_params.entry(texture).or_default();
        let before = params.get(pname);
        params.set(pname, value);
        before.is_some() && params.get(pname) == before
    }

    fn tex_image_2d(&mut self, args: &[ApiArgument]) {
        let target = args[0].as_u32();
        let level = args[1].as_i32();
        let internal_format = args[2].as_i32();
        let (width, height) = (args[3].as_i32(), args[4].as_i32());
        let border = args[5].as_i32();
        let (format, pixel_type) = (args[6].as_u32(), args[7].as_u32());

        let texture = match self.bound_textures.get(&target) {
            Some(&texture) if texture != 0 => texture,
            _ => panic!(
                "gl-snapshot: glTexImage2D with no texture bound to {}",
                enums::display(target)
            ),
        };
        assert!(
            level >= 0 && width >= 0 && height >= 0,
            "gl-snapshot: glTexImage2D: bad level or size"
        );
        assert!(
            format == enums::LUMINANCE || format == enums::RGBA,
            "gl-snapshot: glTexImage2D: unsupported format {}",
            enums::display(format)
        );
        assert!(
            pixel_type == enums::UNSIGNED_BYTE,
            "gl-snapshot: glTexImage2D: unsupported type {}",
            enums::display(pixel_type)
        );

        let (width, height) = (width as usize, height as usize);
        let len = pixels::image_len(width, height, format, pixel_type);
        let source = args[8].as_pointer();
        let bytes = if source.is_null() {
            vec![0; len]
        } else {
            source.read_vec::<u8>(len)
        };
        let pixels = Pixels::new(width, height, format, pixel_type, bytes);

        let record = self.resources.get_or_insert_with(texture, || {
            TextureRecord::new(border, internal_format, TextureDimensionality::Two)
        });
        let reupload = record.has_level(level as usize);

        // A re-upload during the frame is part of what the frame draws, so
        // it has to be replayed in order.
        if reupload {
            let var = self.recording.put_pixels(&pixels);
            let mut logged = [ApiArgument::U32(0); 9];
            logged[..8].copy_from_slice(&args[..8]);
            logged[8] = ApiArgument::Pixels(var);
            self.recording.push(ApiFunction::TexImage2D, &logged);
        }

        record.upload(
            level as usize,
            TextureMip {
                internal_format,
                pixels,
            },
        );
        self.current.texture_params.entry(texture).or_default();
    }

    fn end_frame(&mut self) {
        let start_state = self
            .start_state
            .take()
            .unwrap_or_else(|| self.current.clone());
        let log = mem::take(&mut self.recording);
        self.frames += 1;

        let (frame, commands, textures) = (self.frames, log.len(), self.resources.len());
        let resources = &self.resources;
        let kept = self.hand_off.publish_if_wanted(|| Snapshot {
            log,
            start_state,
            resources: resources.clone(),
        });
        if kept {
            info!(frame, commands, textures, "captured frame");
        } else {
            debug!(frame, commands, "discarded frame");
        }
    }
}

fn f(arg: ApiArgument) -> f64 {
    arg.as_f32() as f64
}

/// Panic if `args` don't match what `function` takes.
fn check_signature(function: ApiFunction, args: &[ApiArgument]) {
    let signature = function.signature();
    let ok = args.len() == signature.len()
        && signature.iter().zip(args).all(|(kind, arg)| kind.accepts(arg));
    if !ok {
        panic!(
            "gl-snapshot: {} called with {:?}, expected {:?}",
            function.name(),
            args,
            signature
        );
    }
}

/// Read the vector a `glColor3fv`-style call points to, as scalar arguments.
fn read_vector(source: GlRawPtr, kind: ArgKind, len: usize) -> Vec<ApiArgument> {
    match kind {
        ArgKind::Float => source
            .read_vec::<f32>(len)
            .into_iter()
            .map(ApiArgument::F32)
            .collect(),
        ArgKind::UByte => source
            .read_vec::<u8>(len)
            .into_iter()
            .map(ApiArgument::U8)
            .collect(),
        _ => unreachable!("gl-snapshot: no vector form takes {:?}", kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::ApiCommand;
    use crate::gl::TraceGl;
    use crate::mask::CommandMask;
    use crate::player::Player;
    use crate::ui::UiToggles;
    use gleam::gl::GLvoid;
    use ApiArgument::*;
    use ApiFunction::*;

    fn ptr<T>(data: &[T]) -> ApiArgument {
        Pointer(unsafe { GlRawPtr::new_unchecked(data.as_ptr() as *const GLvoid) })
    }

    fn upload(capturer: &mut Capturer, texture: GLuint, level: i32, texels: &[u8]) {
        capturer.on_call(BindTexture, &[U32(enums::TEXTURE_2D), U32(texture)]);
        capturer.on_call(
            TexImage2D,
            &[
                U32(enums::TEXTURE_2D),
                I32(level),
                I32(1),
                I32(texels.len() as i32),
                I32(1),
                I32(0),
                U32(enums::LUMINANCE),
                U32(enums::UNSIGNED_BYTE),
                ptr(texels),
            ],
        );
    }

    fn functions(log: &CommandLog) -> Vec<ApiFunction> {
        log.iter().map(ApiCommand::function).collect()
    }

    fn swap(capturer: &mut Capturer) {
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
    }

    /// Play `snapshot` once, with nothing masked or filtered.
    fn replay(snapshot: Snapshot) -> (TraceGl, Player) {
        let gl = TraceGl::new();
        let mask = CommandMask::new();
        mask.reset(snapshot.log.len());
        let mut player = Player::new([640, 480]);
        player.load_snapshot(&gl, snapshot);
        player.play_snapshot(&gl, &mask, &UiToggles::new());
        (gl, player)
    }

    #[test]
    fn frames_without_request_are_discarded() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.on_call(Enable, &[U32(enums::BLEND)]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
        assert!(capturer.pop_snapshot().is_none());
        assert!(capturer.recording().is_empty());

        // The mirror carries over, though.
        assert!(capturer.current_state().blend);
    }

    #[test]
    fn start_state_is_seeded_at_first_call() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.on_call(ClearColor, &[F32(0.5), F32(0.0), F32(0.0), F32(1.0)]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);

        capturer.request_capture();
        capturer.on_call(DepthFunc, &[U32(enums::LEQUAL)]);
        capturer.on_call(Clear, &[U32(enums::COLOR_BUFFER_BIT)]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);

        let snapshot = capturer.pop_snapshot().expect("frame should be captured");
        assert_eq!(snapshot.start_state.clear_color, [0.5, 0.0, 0.0, 1.0]);
        assert_eq!(snapshot.start_state.depth_func, enums::LESS);
        assert_eq!(functions(&snapshot.log), [DepthFunc, Clear]);
        assert!(capturer.pop_snapshot().is_none());
    }

    #[test]
    fn unconsumed_capture_is_replaced() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.request_capture();
        capturer.on_call(Flush, &[]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
        capturer.on_call(Finish, &[]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);

        let snapshot = capturer.pop_snapshot().unwrap();
        assert_eq!(functions(&snapshot.log), [Finish]);
        assert!(capturer.pop_snapshot().is_none());

        // With the slot empty and no request, frames are dropped again.
        capturer.on_call(Flush, &[]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
        assert!(capturer.pop_snapshot().is_none());
    }

    #[test]
    fn texture_uploads() {
        let mut capturer = Capturer::new([640, 480]);
        upload(&mut capturer, 7, 0, &[1, 2, 3, 4]);
        upload(&mut capturer, 7, 1, &[5, 6]);
        capturer.on_call(
            TexParameterf,
            &[U32(enums::TEXTURE_2D), U32(enums::TEXTURE_MAG_FILTER), F32(enums::NEAREST as f32)],
        );
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);

        capturer.request_capture();
        upload(&mut capturer, 7, 0, &[9, 9, 9, 9]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);

        let snapshot = capturer.pop_snapshot().unwrap();
        // Only the re-upload is logged.
        assert_eq!(functions(&snapshot.log), [BindTexture, TexImage2D]);
        let logged = snapshot.log.get(1).unwrap().arg(8).as_pixels();
        assert_eq!(&*snapshot.log.pixels(logged).bytes, &[9, 9, 9, 9]);

        let record = snapshot.resources.get(7).unwrap();
        assert_eq!(record.mips.len(), 2);
        assert_eq!(&*record.mips[0].as_ref().unwrap().pixels.bytes, &[9, 9, 9, 9]);
        assert_eq!(
            snapshot.start_state.texture_params[&7].mag_filter,
            enums::NEAREST
        );
        assert_eq!(snapshot.start_state.bound_2d_texture, 7);
    }

    #[test]
    fn tex_parameter_without_binding_is_logged() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.on_call(
            TexParameteri,
            &[U32(enums::TEXTURE_2D), U32(enums::TEXTURE_WRAP_S), I32(enums::CLAMP as i32)],
        );
        assert_eq!(functions(capturer.recording()), [TexParameteri]);
    }

    #[test]
    fn delete_textures() {
        let mut capturer = Capturer::new([640, 480]);
        upload(&mut capturer, 3, 0, &[0]);
        let names = [3u32];
        capturer.on_call(DeleteTextures, &[I32(1), ptr(&names)]);
        assert!(capturer.resources().is_empty());
        assert!(!capturer.current_state().texture_params.contains_key(&3));
        assert_eq!(functions(capturer.recording()), [BindTexture]);
    }

    #[test]
    #[should_panic(expected = "unknown texture 12")]
    fn delete_unknown_texture() {
        let mut capturer = Capturer::new([640, 480]);
        let names = [12u32];
        capturer.on_call(DeleteTextures, &[I32(1), ptr(&names)]);
    }

    #[test]
    fn tex_parameter_during_frame_is_replayed() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.request_capture();
        capturer.on_call(BindTexture, &[U32(enums::TEXTURE_2D), U32(5)]);
        upload(&mut capturer, 5, 0, &[1, 2]);
        capturer.on_call(
            TexParameterf,
            &[U32(enums::TEXTURE_2D), U32(enums::TEXTURE_MAG_FILTER), F32(enums::NEAREST as f32)],
        );
        // Setting it again changes nothing, so isn't logged.
        capturer.on_call(
            TexParameteri,
            &[U32(enums::TEXTURE_2D), U32(enums::TEXTURE_MAG_FILTER), I32(enums::NEAREST as i32)],
        );
        capturer.on_call(Begin, &[U32(enums::TRIANGLES)]);
        capturer.on_call(End, &[]);
        swap(&mut capturer);

        let snapshot = capturer.pop_snapshot().unwrap();
        assert_eq!(
            functions(&snapshot.log),
            [BindTexture, BindTexture, TexParameterf, Begin, End]
        );
        assert!(!snapshot.start_state.texture_params.contains_key(&5));
        assert_eq!(
            capturer.current_state().texture_params[&5].mag_filter,
            enums::NEAREST
        );

        let (gl, player) = replay(snapshot);
        let live = player.live_texture(5).unwrap();
        let trace = gl.log();
        let commands: Vec<&ApiCommand> = trace.iter().collect();
        let set = commands
            .iter()
            .position(|c| {
                c.function() == TexParameterf
                    && c.arg(1).as_u32() == enums::TEXTURE_MAG_FILTER
                    && c.arg(2).as_f32() == enums::NEAREST as f32
            })
            .expect("the filter change should be replayed");
        let bound = commands[..set]
            .iter()
            .rev()
            .find(|c| c.function() == BindTexture)
            .unwrap();
        assert_eq!(bound.arg(1).as_u32(), live);
    }

    #[test]
    fn deleted_texture_is_unbound_on_replay() {
        let mut capturer = Capturer::new([640, 480]);
        upload(&mut capturer, 7, 0, &[1, 2, 3]);
        swap(&mut capturer);

        capturer.request_capture();
        capturer.on_call(BindTexture, &[U32(enums::TEXTURE_2D), U32(7)]);
        let names = [7u32];
        capturer.on_call(DeleteTextures, &[I32(1), ptr(&names)]);
        capturer.on_call(Begin, &[U32(enums::TRIANGLES)]);
        capturer.on_call(Vertex2f, &[F32(0.0), F32(0.0)]);
        capturer.on_call(End, &[]);
        swap(&mut capturer);
        assert_eq!(capturer.current_state().bound_2d_texture, 0);

        let snapshot = capturer.pop_snapshot().unwrap();
        assert!(snapshot.resources.get(7).is_none());
        assert_eq!(snapshot.start_state.bound_2d_texture, 7);
        assert_eq!(functions(&snapshot.log), [BindTexture, Begin, Vertex2f, End]);

        let (gl, player) = replay(snapshot);
        assert_eq!(player.live_texture(7), None);
        assert!(gl.generated_textures().is_empty());
        let bound: Vec<u32> = gl
            .log()
            .iter()
            .filter(|c| c.function() == BindTexture)
            .map(|c| c.arg(1).as_u32())
            .collect();
        // One from restoring the start state, one from the log.
        assert_eq!(bound, [0, 0]);
        assert_eq!(gl.count(Vertex2f), 1);
    }

    #[test]
    fn vector_forms_are_normalized() {
        let mut capturer = Capturer::new([640, 480]);
        let color = [0.25f32, 0.5, 0.75];
        let rgba = [1u8, 2, 3, 4];
        capturer.on_call(Color3fv, &[ptr(&color)]);
        capturer.on_call(Color4ubv, &[ptr(&rgba)]);

        let log = capturer.recording();
        assert_eq!(functions(log), [Color3f, Color4ub]);
        assert_eq!(log.get(0).unwrap().args(), &[F32(0.25), F32(0.5), F32(0.75)]);
        assert_eq!(log.get(1).unwrap().args(), &[U8(1), U8(2), U8(3), U8(4)]);
    }

    #[test]
    fn matrices_are_mirrored() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.on_call(MatrixMode, &[U32(enums::PROJECTION)]);
        capturer.on_call(LoadIdentity, &[]);
        capturer.on_call(
            Ortho,
            &[F64(0.0), F64(640.0), F64(480.0), F64(0.0), F64(-1.0), F64(1.0)],
        );
        capturer.on_call(MatrixMode, &[U32(enums::MODELVIEW)]);
        let mut m = [0.0f64; 16];
        m[0] = 3.0;
        capturer.on_call(LoadMatrixd, &[ptr(&m)]);

        let state = capturer.current_state();
        assert_eq!(state.matrix_mode, enums::MODELVIEW);
        assert_eq!(state.projection_matrix[0], 2.0 / 640.0);
        assert_eq!(state.modelview_matrix, m);

        let log = capturer.recording();
        let logged = log.get(4).unwrap();
        assert_eq!(logged.function(), LoadMatrixd);
        assert_eq!(log.matrix(logged.arg(0).as_matrix()), m);
    }

    #[test]
    #[should_panic(expected = "expected")]
    fn signature_mismatch() {
        let mut capturer = Capturer::new([640, 480]);
        capturer.on_call(BlendFunc, &[U32(enums::ONE)]);
    }
}
