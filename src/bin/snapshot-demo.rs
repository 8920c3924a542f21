use docopt::Docopt;
use gleam::gl::GLvoid;
use serde::Deserialize;

use gl_snapshot::call::{ApiArgument::*, ApiFunction::*};
use gl_snapshot::enums;
use gl_snapshot::gl::TraceGl;
use gl_snapshot::{
    ApiArgument, ApiFunction, Capturer, CommandMask, DumpError, GlRawPtr, Player, SnapshotDumper,
    UiToggles,
};

static USAGE: &str = "
Capture and replay a scripted frame.

Feed a Quake-style frame (world, lightmaps, models, view weapon, 2D overlay)
through the capturer, write the captured snapshot to <dir>, and replay it with
each combination of pass filters, reporting how many calls each replay made.

Usage:
  snapshot-demo [options] <dir>

Options:
  --width=<px>    Window width [default: 640].
  --height=<px>   Window height [default: 480].
  --textures      Also write every texture level as a PNG.
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_dir: String,
    flag_width: u32,
    flag_height: u32,
    flag_textures: bool,
}

fn ptr<T>(data: &[T]) -> ApiArgument {
    Pointer(unsafe { GlRawPtr::new_unchecked(data.as_ptr() as *const GLvoid) })
}

/// A 4x4 texture of alternating `a` and `b` RGBA texels.
fn checkerboard(a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    (0..16)
        .flat_map(|i| if (i + i / 4) % 2 == 0 { a } else { b })
        .collect()
}

/// Drives a `Capturer` the way an interception layer would.
struct Script<'a> {
    capturer: &'a mut Capturer,
    width: u32,
    height: u32,
}

impl Script<'_> {
    fn call(&mut self, function: ApiFunction, args: &[ApiArgument]) {
        self.capturer.on_call(function, args);
    }

    fn upload(&mut self, texture: u32, format: u32, texels: &[u8]) {
        self.call(BindTexture, &[U32(enums::TEXTURE_2D), U32(texture)]);
        self.call(
            TexImage2D,
            &[
                U32(enums::TEXTURE_2D),
                I32(0),
                I32(if format == enums::RGBA { 4 } else { 1 }),
                I32(4),
                I32(4),
                I32(0),
                U32(format),
                U32(enums::UNSIGNED_BYTE),
                ptr(texels),
            ],
        );
    }

    fn quad(&mut self, mode: u32, z: f32) {
        self.call(Begin, &[U32(mode)]);
        for &(s, t) in &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            self.call(TexCoord2f, &[F32(s), F32(t)]);
            self.call(Vertex3f, &[F32(s * 64.0), F32(t * 64.0), F32(z)]);
        }
        self.call(End, &[]);
    }

    fn tex_env(&mut self, mode: u32) {
        self.call(
            TexEnvf,
            &[U32(enums::TEXTURE_ENV), U32(enums::TEXTURE_ENV_MODE), F32(mode as f32)],
        );
    }

    fn swap(&mut self) {
        self.call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
    }

    /// Level load: upload everything the frame will use.
    fn load_textures(&mut self) {
        self.upload(1, enums::RGBA, &checkerboard([120, 90, 60, 255], [100, 70, 40, 255]));
        self.call(
            TexParameteri,
            &[U32(enums::TEXTURE_2D), U32(enums::TEXTURE_MAG_FILTER), I32(enums::NEAREST as i32)],
        );
        self.upload(2, enums::RGBA, &checkerboard([200, 200, 200, 255], [0, 0, 0, 0]));
        self.upload(3, enums::LUMINANCE, &[64; 16]);
        self.upload(4, enums::RGBA, &checkerboard([160, 40, 40, 255], [120, 20, 20, 255]));
        self.upload(5, enums::RGBA, &checkerboard([90, 90, 110, 255], [60, 60, 80, 255]));
        self.swap();
    }

    fn frame(&mut self) {
        let (width, height) = (self.width, self.height);
        self.call(Viewport, &[I32(0), I32(0), I32(width as i32), I32(height as i32)]);
        self.call(MatrixMode, &[U32(enums::PROJECTION)]);
        self.call(LoadIdentity, &[]);
        self.call(Frustum, &[F64(-4.0), F64(4.0), F64(-3.0), F64(3.0), F64(4.0), F64(4096.0)]);
        self.call(MatrixMode, &[U32(enums::MODELVIEW)]);
        self.call(LoadIdentity, &[]);
        self.call(Rotatef, &[F32(-90.0), F32(1.0), F32(0.0), F32(0.0)]);
        self.call(Translatef, &[F32(-32.0), F32(-32.0), F32(-128.0)]);
        self.call(Enable, &[U32(enums::DEPTH_TEST)]);
        self.call(Enable, &[U32(enums::TEXTURE_2D)]);
        self.call(DepthFunc, &[U32(enums::LEQUAL)]);
        self.call(Clear, &[U32(enums::COLOR_BUFFER_BIT | enums::DEPTH_BUFFER_BIT)]);

        // World.
        self.tex_env(enums::REPLACE);
        self.call(BindTexture, &[U32(enums::TEXTURE_2D), U32(1)]);
        self.quad(enums::POLYGON, 0.0);
        self.quad(enums::POLYGON, 64.0);

        // Lightmaps, with one updated for a flickering light.
        self.call(BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]);
        self.call(Enable, &[U32(enums::BLEND)]);
        self.call(DepthMask, &[U8(0)]);
        self.upload(3, enums::LUMINANCE, &[96; 16]);
        self.quad(enums::POLYGON, 0.0);
        self.quad(enums::POLYGON, 64.0);
        self.call(DepthMask, &[U8(1)]);
        self.call(Disable, &[U32(enums::BLEND)]);

        // Models.
        self.tex_env(enums::MODULATE);
        self.call(ShadeModel, &[U32(enums::SMOOTH)]);
        self.call(BindTexture, &[U32(enums::TEXTURE_2D), U32(4)]);
        self.call(PushMatrix, &[]);
        self.call(Translatef, &[F32(16.0), F32(16.0), F32(8.0)]);
        self.call(Color3f, &[F32(0.8), F32(0.8), F32(0.8)]);
        self.quad(enums::TRIANGLE_FAN, 0.0);
        self.call(PopMatrix, &[]);
        self.call(ShadeModel, &[U32(enums::FLAT)]);
        self.tex_env(enums::REPLACE);

        // View weapon, squeezed into the front of the depth range.
        self.call(DepthRange, &[F64(0.0), F64(0.3)]);
        self.tex_env(enums::MODULATE);
        self.call(BindTexture, &[U32(enums::TEXTURE_2D), U32(5)]);
        self.quad(enums::TRIANGLE_STRIP, 4.0);
        self.quad(enums::TRIANGLE_STRIP, 5.0);
        self.call(DepthRange, &[F64(0.0), F64(1.0)]);
        self.tex_env(enums::REPLACE);

        // 2D overlay.
        self.call(MatrixMode, &[U32(enums::PROJECTION)]);
        self.call(LoadIdentity, &[]);
        self.call(
            Ortho,
            &[F64(0.0), F64(width as f64), F64(height as f64), F64(0.0), F64(-99999.0), F64(99999.0)],
        );
        self.call(MatrixMode, &[U32(enums::MODELVIEW)]);
        self.call(LoadIdentity, &[]);
        self.call(Disable, &[U32(enums::DEPTH_TEST)]);
        self.call(Enable, &[U32(enums::ALPHA_TEST)]);
        let white = [1.0_f32, 1.0, 1.0, 1.0];
        self.call(Color4fv, &[ptr(&white)]);
        self.call(BindTexture, &[U32(enums::TEXTURE_2D), U32(2)]);
        self.quad(enums::QUADS, 0.0);
        self.call(Finish, &[]);
        self.swap();
    }
}

fn main() -> Result<(), DumpError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let extents = [args.flag_width, args.flag_height];

    let mut capturer = Capturer::new(extents);
    let mut script = Script {
        capturer: &mut capturer,
        width: args.flag_width,
        height: args.flag_height,
    };
    script.load_textures();
    script.capturer.request_capture();
    script.frame();

    let snapshot = match capturer.pop_snapshot() {
        Some(snapshot) => snapshot,
        None => {
            eprintln!("snapshot-demo: the scripted frame wasn't captured");
            std::process::exit(1);
        }
    };

    let path = SnapshotDumper::new(&args.arg_dir, args.flag_textures).dump(&snapshot)?;
    println!(
        "captured {} calls and {} textures; wrote {}",
        snapshot.log.len(),
        snapshot.resources.len(),
        path.display()
    );

    let gl = TraceGl::new();
    let mut player = Player::new(extents);
    let mask = CommandMask::new();
    mask.reset(snapshot.log.len());
    player.load_snapshot(&gl, snapshot);

    if let Some(passes) = player.passes() {
        for range in &passes.ao {
            println!("lightmap pass: {}..={}", range.first, range.last);
        }
        match passes.weapon {
            Some(range) => println!("weapon pass: {}..={}", range.first, range.last),
            None => println!("weapon pass: none"),
        }
        match passes.screen_space {
            Some(range) => println!("screen-space pass: {}..={}", range.first, range.last),
            None => println!("screen-space pass: none"),
        }
    }

    let ui = UiToggles::new();
    let combinations = [
        ("everything", false, true, true),
        ("no lightmaps", true, true, true),
        ("no weapon", false, false, true),
        ("no 2D overlay", false, true, false),
        ("world only", true, false, false),
    ];
    for &(label, disable_lightmaps, draw_weapon, draw_screenspace) in &combinations {
        ui.set_disable_lightmaps(disable_lightmaps);
        ui.set_draw_weapon(draw_weapon);
        ui.set_draw_screenspace_geometry(draw_screenspace);

        gl.clear_log();
        let stats = player.play_snapshot(&gl, &mask, &ui);
        println!(
            "{:>14}: replayed {}, filtered {}, {} GL calls",
            label,
            stats.replayed,
            stats.filtered,
            gl.log().len()
        );
    }

    Ok(())
}
