//! Replaying captured frames.
//!
//! A `Player` holds at most one snapshot. Loading one analyzes it; the first
//! play after loading creates live copies of its textures. Every play after
//! that restores the start state and reissues the logged commands, minus
//! whatever the command mask and viewer settings filter out.

use crate::analyzer::{self, PassRanges};
use crate::call::ApiFunction;
use crate::enums;
use crate::gl::LegacyGl;
use crate::mask::CommandMask;
use crate::replay::{self, Locals};
use crate::snapshot::Snapshot;
use crate::state::{ContextState, CAPABILITIES};
use crate::ui::UiSettings;

use gleam::gl::{GLsizei, GLuint};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Unloaded,
    NotMaterialized,
    Materialized,
}

struct Loaded {
    snapshot: Snapshot,
    passes: PassRanges,
    materialized: bool,
}

pub struct Player {
    window_extents: [u32; 2],
    loaded: Option<Loaded>,

    /// Captured texture names to the live names created for them.
    live_textures: HashMap<GLuint, GLuint>,
}

/// Counts from one `play_snapshot`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayStats {
    pub replayed: usize,
    pub masked: usize,
    pub filtered: usize,
}

impl Player {
    pub fn new(window_extents: [u32; 2]) -> Player {
        Player {
            window_extents,
            loaded: None,
            live_textures: HashMap::new(),
        }
    }

    pub fn state(&self) -> PlayerState {
        match &self.loaded {
            None => PlayerState::Unloaded,
            Some(loaded) if loaded.materialized => PlayerState::Materialized,
            Some(_) => PlayerState::NotMaterialized,
        }
    }

    pub fn is_snapshot_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.loaded.as_ref().map(|loaded| &loaded.snapshot)
    }

    pub fn passes(&self) -> Option<&PassRanges> {
        self.loaded.as_ref().map(|loaded| &loaded.passes)
    }

    /// The live texture standing in for captured texture `captured`.
    pub fn live_texture(&self, captured: GLuint) -> Option<GLuint> {
        self.live_textures.get(&captured).copied()
    }

    /// Replace the loaded snapshot, releasing the previous one's live
    /// textures.
    pub fn load_snapshot(&mut self, gl: &dyn LegacyGl, snapshot: Snapshot) {
        self.release_textures(gl);
        let passes = analyzer::analyze(&snapshot.log, self.window_extents);
        info!(
            commands = snapshot.log.len(),
            textures = snapshot.resources.len(),
            "loaded snapshot"
        );
        self.loaded = Some(Loaded {
            snapshot,
            passes,
            materialized: false,
        });
    }

    /// Drop the loaded snapshot and its live textures.
    pub fn unload(&mut self, gl: &dyn LegacyGl) {
        self.release_textures(gl);
        self.loaded = None;
    }

    fn release_textures(&mut self, gl: &dyn LegacyGl) {
        if self.live_textures.is_empty() {
            return;
        }
        let names: Vec<GLuint> = self.live_textures.values().copied().collect();
        gl.delete_textures(&names);
        self.live_textures.clear();
    }

    /// Draw the loaded snapshot. Does nothing if none is loaded.
    pub fn play_snapshot(
        &mut self,
        gl: &dyn LegacyGl,
        mask: &CommandMask,
        ui: &dyn UiSettings,
    ) -> PlayStats {
        let loaded = match &mut self.loaded {
            Some(loaded) => loaded,
            None => return PlayStats::default(),
        };

        if !loaded.materialized {
            materialize(gl, &loaded.snapshot, &mut self.live_textures);
            loaded.materialized = true;
        }

        let snapshot = &loaded.snapshot;
        clear_for_frame(gl, snapshot);
        restore_state(gl, &snapshot.start_state, &self.live_textures);
        replay_commands(gl, snapshot, &loaded.passes, &self.live_textures, mask, ui)
    }
}

/// Create a live texture for every captured one, and upload its images.
fn materialize(gl: &dyn LegacyGl, snapshot: &Snapshot, live_textures: &mut HashMap<GLuint, GLuint>) {
    for (captured, record) in snapshot.resources.iter() {
        let live = match gl.gen_textures(1).first() {
            Some(&live) => live,
            None => panic!("gl-snapshot: glGenTextures returned no names"),
        };
        gl.bind_texture(enums::TEXTURE_2D, live);
        for (level, mip) in record.levels() {
            let pixels = &mip.pixels;
            gl.tex_image_2d(
                enums::TEXTURE_2D,
                level as i32,
                mip.internal_format,
                pixels.width as GLsizei,
                pixels.height as GLsizei,
                record.border,
                pixels.format,
                pixels.pixel_type,
                Some(&*pixels.bytes),
            );
        }
        live_textures.insert(captured, live);
    }
    debug!(textures = live_textures.len(), "materialized textures");
}

/// Clear color and depth, so that the frame's first depth test passes
/// everywhere.
fn clear_for_frame(gl: &dyn LegacyGl, snapshot: &Snapshot) {
    let depth_func = snapshot
        .log
        .find(ApiFunction::DepthFunc)
        .map_or(enums::LEQUAL, |(_, command)| command.arg(0).as_u32());
    let depth = if depth_func == enums::LEQUAL { 1.0 } else { 0.0 };
    gl.clear_depth(depth);
    gl.clear(enums::COLOR_BUFFER_BIT | enums::DEPTH_BUFFER_BIT);
}

/// Push the snapshot's start state into the context.
fn restore_state(gl: &dyn LegacyGl, state: &ContextState, live_textures: &HashMap<GLuint, GLuint>) {
    for cap in CAPABILITIES {
        if state.capability(cap) == Some(true) {
            gl.enable(cap);
        } else {
            gl.disable(cap);
        }
    }

    gl.alpha_func(state.alpha_func, state.alpha_ref);
    gl.blend_func(state.blend_sfactor, state.blend_dfactor);
    let [r, g, b, a] = state.clear_color;
    gl.clear_color(r, g, b, a);
    gl.clear_depth(state.clear_depth);
    gl.cull_face(state.cull_face_mode);
    gl.depth_func(state.depth_func);
    gl.depth_mask(state.depth_mask);
    gl.depth_range(state.depth_range[0], state.depth_range[1]);
    gl.draw_buffer(state.draw_buffer);
    gl.front_face(state.front_face);
    gl.shade_model(state.shade_model);
    gl.tex_env_f(
        enums::TEXTURE_ENV,
        enums::TEXTURE_ENV_MODE,
        state.texture_env_mode as f32,
    );
    let [x, y, width, height] = state.viewport;
    gl.viewport(x, y, width, height);

    gl.matrix_mode(enums::MODELVIEW);
    gl.load_matrix_d(&state.modelview_matrix);
    gl.matrix_mode(enums::PROJECTION);
    gl.load_matrix_d(&state.projection_matrix);
    gl.matrix_mode(state.matrix_mode);

    // Sorted, so replays are repeatable.
    let mut textures: Vec<_> = state.texture_params.iter().collect();
    textures.sort_by_key(|(captured, _)| **captured);
    for (captured, params) in textures {
        let live = replay::live_texture(live_textures, *captured);
        if live == 0 {
            warn!(texture = *captured, "no live texture for captured parameters");
            continue;
        }
        gl.bind_texture(enums::TEXTURE_2D, live);
        for (pname, value) in params.params() {
            gl.tex_parameter_f(enums::TEXTURE_2D, pname, value);
        }
    }

    let bound = replay::live_texture(live_textures, state.bound_2d_texture);
    if bound == 0 && state.bound_2d_texture != 0 {
        warn!(
            texture = state.bound_2d_texture,
            "bound texture has no live counterpart; unbinding"
        );
    }
    gl.bind_texture(enums::TEXTURE_2D, bound);
}

fn replay_commands(
    gl: &dyn LegacyGl,
    snapshot: &Snapshot,
    passes: &PassRanges,
    live_textures: &HashMap<GLuint, GLuint>,
    mask: &CommandMask,
    ui: &dyn UiSettings,
) -> PlayStats {
    let mask = mask.read();
    let mut stats = PlayStats::default();
    let mut begin_active = false;

    for (serial, command) in snapshot.log.iter().enumerate() {
        if !mask.is_enabled(serial) {
            stats.masked += 1;
            continue;
        }
        if (ui.should_disable_lightmaps() && passes.in_ao(serial))
            || (!ui.should_draw_screenspace_geometry() && passes.in_screen_space(serial))
            || (!ui.should_draw_weapon() && passes.in_weapon(serial))
        {
            stats.filtered += 1;
            continue;
        }

        // Filtering can split a glBegin/glEnd pair, so keep them balanced.
        match command.function() {
            ApiFunction::Begin => {
                if begin_active {
                    gl.end();
                }
                begin_active = true;
            }
            ApiFunction::End => {
                if !begin_active {
                    continue;
                }
                begin_active = false;
            }
            _ => {}
        }

        let locals = Locals {
            gl,
            log: &snapshot.log,
            textures: live_textures,
            serial,
        };
        replay::replay_one(&locals, command);
        stats.replayed += 1;
    }

    if begin_active {
        gl.end();
    }

    debug!(
        replayed = stats.replayed,
        masked = stats.masked,
        filtered = stats.filtered,
        "replayed snapshot"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{ApiArgument::*, ApiCommand};
    use crate::command_log::CommandLog;
    use crate::gl::TraceGl;
    use crate::pixels::Pixels;
    use crate::resources::{ResourceTable, TextureDimensionality, TextureMip, TextureRecord};
    use crate::ui::UiToggles;
    use ApiFunction::*;

    fn snapshot(log: CommandLog) -> Snapshot {
        let mut resources = ResourceTable::new();
        let record = resources.get_or_insert_with(7, || {
            TextureRecord::new(0, 1, TextureDimensionality::Two)
        });
        for level in [0, 2] {
            record.upload(
                level,
                TextureMip {
                    internal_format: 1,
                    pixels: Pixels::new(1, 1, enums::LUMINANCE, enums::UNSIGNED_BYTE, vec![9]),
                },
            );
        }
        let mut start_state = ContextState::new([640, 480]);
        start_state.texture_params.insert(7, Default::default());
        start_state.bound_2d_texture = 7;
        Snapshot {
            log,
            start_state,
            resources,
        }
    }

    fn triangle_log() -> CommandLog {
        let mut log = CommandLog::new();
        log.push(BindTexture, &[U32(enums::TEXTURE_2D), U32(7)]);
        log.push(Begin, &[U32(enums::TRIANGLES)]);
        log.push(Vertex2f, &[F32(0.0), F32(0.0)]);
        log.push(Vertex2f, &[F32(1.0), F32(0.0)]);
        log.push(Vertex2f, &[F32(0.0), F32(1.0)]);
        log.push(End, &[]);
        log
    }

    /// The commands a play issued after restoring state: everything after
    /// the final `glBindTexture` of `restore_state`.
    fn replayed(gl: &TraceGl, prologue: usize) -> Vec<ApiCommand> {
        gl.log().commands()[prologue..].to_vec()
    }

    /// Count the calls `play_snapshot` makes before replaying the log.
    fn prologue_len(gl: &TraceGl) -> usize {
        let commands = gl.log();
        let last_bind = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| c.function() == BindTexture)
            .map(|(i, _)| i)
            .nth(2)
            .unwrap();
        last_bind + 1
    }

    #[test]
    fn replays_every_command() {
        let log = triangle_log();
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let mask = CommandMask::new();
        mask.reset(log.len());

        assert_eq!(player.state(), PlayerState::Unloaded);
        player.load_snapshot(&gl, snapshot(log.clone()));
        assert_eq!(player.state(), PlayerState::NotMaterialized);

        let stats = player.play_snapshot(&gl, &mask, &UiToggles::new());
        assert_eq!(player.state(), PlayerState::Materialized);
        assert_eq!(stats.replayed, log.len());

        // Materialization: one texture, two levels.
        assert_eq!(gl.count(GenTextures), 1);
        assert_eq!(gl.count(TexImage2D), 2);

        // The replayed tail matches the log, with texture names translated.
        let prologue = prologue_len(&gl);
        let tail = replayed(&gl, prologue);
        assert_eq!(tail.len(), log.len());
        let live = player.live_texture(7).unwrap();
        assert_eq!(tail[0].args(), &[U32(enums::TEXTURE_2D), U32(live)]);
        for (played, logged) in tail[1..].iter().zip(&log.commands()[1..]) {
            assert_eq!(played, logged);
        }
    }

    #[test]
    fn materializes_once() {
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let mask = CommandMask::new();
        player.load_snapshot(&gl, snapshot(triangle_log()));
        player.play_snapshot(&gl, &mask, &UiToggles::new());
        player.play_snapshot(&gl, &mask, &UiToggles::new());
        assert_eq!(gl.count(GenTextures), 1);
        assert_eq!(gl.count(TexImage2D), 2);

        // Loading another snapshot releases the old textures.
        let first = player.live_texture(7).unwrap();
        player.load_snapshot(&gl, snapshot(triangle_log()));
        assert_eq!(gl.deleted_textures(), [first]);
        assert_eq!(player.live_texture(7), None);
    }

    #[test]
    fn restores_start_state() {
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let mut snap = snapshot(CommandLog::new());
        snap.start_state.blend = true;
        snap.start_state.viewport = [0, 0, 320, 200];
        player.load_snapshot(&gl, snap);
        player.play_snapshot(&gl, &CommandMask::new(), &UiToggles::new());

        let log = gl.log();
        let find = |function: ApiFunction| log.find(function).map(|(_, c)| *c).unwrap();
        assert_eq!(find(Enable).args(), &[U32(enums::BLEND)]);
        assert_eq!(find(Viewport).args(), &[I32(0), I32(0), I32(320), I32(200)]);
        assert_eq!(log.iter().filter(|c| c.function() == TexParameterf).count(), 9);
        assert_eq!(log.iter().filter(|c| c.function() == LoadMatrixd).count(), 2);
        // The bound texture is restored last.
        let live = player.live_texture(7).unwrap();
        assert_eq!(log.commands().last().unwrap().args(), &[U32(enums::TEXTURE_2D), U32(live)]);
    }

    #[test]
    fn depth_clear_follows_first_depth_func() {
        for (func, expected) in [(Some(enums::GEQUAL), 0.0), (Some(enums::LEQUAL), 1.0), (None, 1.0)] {
            let mut log = CommandLog::new();
            if let Some(func) = func {
                log.push(DepthFunc, &[U32(func)]);
            }
            let mut player = Player::new([640, 480]);
            let gl = TraceGl::new();
            player.load_snapshot(&gl, snapshot(log));
            player.play_snapshot(&gl, &CommandMask::new(), &UiToggles::new());

            let log = gl.log();
            let (index, clear_depth) = log.find(ClearDepth).unwrap();
            assert_eq!(clear_depth.args(), &[F64(expected)]);
            assert_eq!(
                log.get(index + 1).unwrap().args(),
                &[U32(enums::COLOR_BUFFER_BIT | enums::DEPTH_BUFFER_BIT)]
            );
        }
    }

    #[test]
    fn masked_commands_are_skipped() {
        let log = triangle_log();
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let mask = CommandMask::new();
        mask.reset(log.len());
        mask.set_enabled(3, false);
        player.load_snapshot(&gl, snapshot(log));

        let stats = player.play_snapshot(&gl, &mask, &UiToggles::new());
        assert_eq!(stats.masked, 1);
        assert_eq!(stats.replayed, 5);
        assert_eq!(gl.count(Vertex2f), 2);
    }

    #[test]
    fn masked_end_is_balanced() {
        let log = triangle_log();
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let mask = CommandMask::new();
        mask.reset(log.len());
        mask.set_enabled(5, false);
        player.load_snapshot(&gl, snapshot(log));
        player.play_snapshot(&gl, &mask, &UiToggles::new());

        assert_eq!(gl.count(Begin), 1);
        assert_eq!(gl.count(End), 1);
        assert_eq!(gl.functions().last(), Some(&End));
    }

    #[test]
    fn passes_are_filtered() {
        let mut log = CommandLog::new();
        log.push(BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]);
        log.push(Enable, &[U32(enums::BLEND)]);
        log.push(Begin, &[U32(enums::QUADS)]);
        log.push(End, &[]);
        log.push(Disable, &[U32(enums::BLEND)]);
        log.push(Ortho, &[F64(0.0), F64(640.0), F64(480.0), F64(0.0), F64(-1.0), F64(1.0)]);
        log.push(Begin, &[U32(enums::QUADS)]);
        log.push(End, &[]);

        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let ui = UiToggles::new();
        ui.set_disable_lightmaps(true);
        ui.set_draw_screenspace_geometry(false);
        player.load_snapshot(&gl, snapshot(log));

        let stats = player.play_snapshot(&gl, &CommandMask::new(), &ui);
        assert_eq!(stats.filtered, 8);
        assert_eq!(stats.replayed, 0);
        assert_eq!(gl.count(Begin), 0);

        gl.clear_log();
        ui.set_disable_lightmaps(false);
        let stats = player.play_snapshot(&gl, &CommandMask::new(), &ui);
        assert_eq!(stats.filtered, 3);
        assert_eq!(gl.count(Begin), 1);
    }

    #[test]
    fn unmapped_texture_binds_zero() {
        let mut log = CommandLog::new();
        log.push(BindTexture, &[U32(enums::TEXTURE_2D), U32(99)]);
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        player.load_snapshot(&gl, snapshot(log));
        player.play_snapshot(&gl, &CommandMask::new(), &UiToggles::new());

        assert_eq!(
            gl.log().commands().last().unwrap().args(),
            &[U32(enums::TEXTURE_2D), U32(0)]
        );
    }

    #[test]
    fn nothing_loaded() {
        let mut player = Player::new([640, 480]);
        let gl = TraceGl::new();
        let stats = player.play_snapshot(&gl, &CommandMask::new(), &UiToggles::new());
        assert_eq!(stats, PlayStats::default());
        assert!(gl.functions().is_empty());
    }
}
