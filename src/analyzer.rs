//! Finding the rendering passes in a captured frame.
//!
//! A Quake-style renderer draws its frame in a fixed order: world surfaces,
//! then lightmaps blended over them, then models, the view weapon, and
//! finally 2D overlays under an orthographic projection. None of that is
//! marked in the command stream, but each pass leaves recognizable traces in
//! the state changes around it. This module looks for those traces and
//! reports the command ranges it finds.

use crate::call::ApiFunction;
use crate::command_log::CommandLog;
use crate::enums;

use gleam::gl::GLenum;
use tracing::debug;

/// An inclusive range of command indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PassRange {
    pub first: usize,
    pub last: usize,
}

impl PassRange {
    pub fn new(first: usize, last: usize) -> PassRange {
        PassRange { first, last }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.first <= index && index <= self.last
    }
}

/// The passes found in one frame. Passes that weren't found are `None` or
/// empty, and never match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassRanges {
    /// Lightmap ("ambient occlusion") blending passes, in order.
    pub ao: Vec<PassRange>,

    /// The view weapon.
    pub weapon: Option<PassRange>,

    /// 2D overlays, from the switch to a window-sized orthographic
    /// projection to the end of the frame.
    pub screen_space: Option<PassRange>,
}

impl PassRanges {
    pub fn in_ao(&self, index: usize) -> bool {
        self.ao.iter().any(|range| range.contains(index))
    }

    pub fn in_weapon(&self, index: usize) -> bool {
        self.weapon.map_or(false, |range| range.contains(index))
    }

    pub fn in_screen_space(&self, index: usize) -> bool {
        self.screen_space.map_or(false, |range| range.contains(index))
    }
}

/// Scan `log` for rendering passes. `window_extents` is the size of the
/// program's window, which a full-screen orthographic projection matches.
pub fn analyze(log: &CommandLog, window_extents: [u32; 2]) -> PassRanges {
    let mut passes = PassRanges::default();
    let commands = log.commands();

    let mut blending = false;
    let mut modulate_active = false;
    let mut modulate_start: Option<usize> = None;
    let mut modulate_ranges: Vec<PassRange> = Vec::new();
    let mut pending_draw: Option<usize> = None;
    let mut draws: Vec<PassRange> = Vec::new();
    let mut pending_ao: Option<usize> = None;
    let mut last_scanned = 0;

    for (i, command) in commands.iter().enumerate() {
        last_scanned = i;
        match command.function() {
            ApiFunction::TexEnvf => {
                let mode = command.arg(2).as_f32() as GLenum;
                if mode == enums::MODULATE {
                    if modulate_start.is_none() {
                        modulate_start = Some(i);
                    }
                } else if let Some(start) = modulate_start.take() {
                    if i > start {
                        modulate_ranges.push(PassRange::new(start, i - 1));
                    }
                }
                modulate_active = !blending && mode == enums::MODULATE;
            }
            ApiFunction::Begin if modulate_active => {
                assert!(
                    pending_draw.is_none(),
                    "gl-snapshot: glBegin at command {} inside another glBegin",
                    i
                );
                pending_draw = Some(i);
            }
            ApiFunction::End if modulate_active => match pending_draw.take() {
                Some(start) => draws.push(PassRange::new(start, i)),
                None => panic!("gl-snapshot: glEnd at command {} without glBegin", i),
            },
            ApiFunction::BlendFunc => {
                let lightmap_blend = command.arg(0).as_u32() == enums::ZERO
                    && command.arg(1).as_u32() == enums::ONE_MINUS_SRC_COLOR;
                let enables_next = commands
                    .get(i + 1)
                    .map_or(false, |next| next.function() == ApiFunction::Enable);
                if lightmap_blend && enables_next {
                    assert!(
                        pending_ao.is_none(),
                        "gl-snapshot: lightmap pass at command {} starts inside another",
                        i
                    );
                    pending_ao = Some(i);
                }
            }
            ApiFunction::Enable if command.arg(0).as_u32() == enums::BLEND => {
                blending = true;
            }
            ApiFunction::Disable if command.arg(0).as_u32() == enums::BLEND => {
                blending = false;
                if let Some(start) = pending_ao.take() {
                    passes.ao.push(PassRange::new(start, i));
                }
            }
            ApiFunction::Ortho => {
                // Compared as integers, in argument order.
                let edge = |n: usize| command.arg(n).as_f64() as i64;
                let (left, right, bottom, top) = (edge(0), edge(1), edge(2), edge(3));
                if left == 0
                    && top == 0
                    && right == window_extents[0] as i64
                    && bottom == window_extents[1] as i64
                {
                    check_lightmap_closed(pending_ao);
                    passes.screen_space = Some(PassRange::new(i, commands.len() - 1));
                    break;
                }
            }
            _ => {}
        }
    }

    check_lightmap_closed(pending_ao);

    // A MODULATE range still open when the scan ends runs to its last
    // command.
    if let Some(start) = modulate_start {
        if !commands.is_empty() {
            modulate_ranges.push(PassRange::new(start, last_scanned));
        }
    }

    // The weapon is drawn last among the modulated passes.
    if let Some(last_modulate) = modulate_ranges.last() {
        passes.weapon = draws
            .iter()
            .find(|draw| draw.first >= last_modulate.first && draw.first <= last_modulate.last)
            .map(|draw| PassRange::new(draw.first, last_modulate.last));
    }

    debug!(
        ao = passes.ao.len(),
        weapon = ?passes.weapon,
        screen_space = ?passes.screen_space,
        "analyzed {} commands",
        commands.len()
    );
    passes
}

fn check_lightmap_closed(pending_ao: Option<usize>) {
    if let Some(start) = pending_ao {
        panic!(
            "gl-snapshot: lightmap pass starting at command {} never ends",
            start
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::ApiArgument::{self, *};
    use ApiFunction::*;

    /// Build a log of `len` `glFlush` calls, then overwrite the given slots.
    fn log_with(len: usize, calls: &[(usize, ApiFunction, &[ApiArgument])]) -> CommandLog {
        let mut slots: Vec<(ApiFunction, Vec<ApiArgument>)> = vec![(Flush, vec![]); len];
        for (index, function, args) in calls {
            slots[*index] = (*function, args.to_vec());
        }
        let mut log = CommandLog::new();
        for (function, args) in slots {
            log.push(function, &args);
        }
        log
    }

    fn tex_env(mode: GLenum) -> Vec<ApiArgument> {
        vec![
            U32(enums::TEXTURE_ENV),
            U32(enums::TEXTURE_ENV_MODE),
            F32(mode as f32),
        ]
    }

    #[test]
    fn lightmap_pass() {
        let log = log_with(
            20,
            &[
                (10, BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]),
                (11, Enable, &[U32(enums::BLEND)]),
                (15, Disable, &[U32(enums::BLEND)]),
            ],
        );
        let passes = analyze(&log, [640, 480]);
        assert_eq!(passes.ao, [PassRange::new(10, 15)]);
        assert!(passes.in_ao(12));
        assert!(!passes.in_ao(16));
        assert_eq!(passes.weapon, None);
        assert_eq!(passes.screen_space, None);
    }

    #[test]
    fn blend_func_without_enable_is_not_a_lightmap_pass() {
        let log = log_with(
            5,
            &[
                (1, BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]),
                (3, Disable, &[U32(enums::BLEND)]),
            ],
        );
        assert!(analyze(&log, [640, 480]).ao.is_empty());
    }

    #[test]
    fn weapon_pass() {
        let modulate = tex_env(enums::MODULATE);
        let replace = tex_env(enums::REPLACE);
        let quads = [U32(enums::QUADS)];
        let log = log_with(
            60,
            &[
                // A model drawn earlier with MODULATE.
                (20, TexEnvf, &modulate[..]),
                (21, Begin, &quads),
                (23, End, &[]),
                (25, TexEnvf, &replace[..]),
                // The weapon.
                (39, TexEnvf, &modulate[..]),
                (40, Begin, &quads),
                (44, End, &[]),
                (46, Begin, &quads),
                (48, End, &[]),
                (51, TexEnvf, &replace[..]),
            ],
        );
        let passes = analyze(&log, [640, 480]);
        assert_eq!(passes.weapon, Some(PassRange::new(40, 50)));
        assert!(passes.in_weapon(45));
        assert!(!passes.in_weapon(39));
    }

    #[test]
    fn weapon_pass_open_at_end() {
        let log = log_with(
            10,
            &[
                (2, TexEnvf, &tex_env(enums::MODULATE)[..]),
                (3, Begin, &[U32(enums::TRIANGLES)]),
                (6, End, &[]),
            ],
        );
        assert_eq!(analyze(&log, [640, 480]).weapon, Some(PassRange::new(3, 9)));
    }

    #[test]
    fn modulate_while_blending_records_no_draws() {
        let log = log_with(
            10,
            &[
                (1, Enable, &[U32(enums::BLEND)]),
                (2, TexEnvf, &tex_env(enums::MODULATE)[..]),
                (3, Begin, &[U32(enums::TRIANGLES)]),
                (6, End, &[]),
            ],
        );
        assert_eq!(analyze(&log, [640, 480]).weapon, None);
    }

    #[test]
    fn screen_space_pass() {
        let log = log_with(
            100,
            &[
                // Wrong size: ignored.
                (30, Ortho, &[F64(0.0), F64(320.0), F64(240.0), F64(0.0), F64(-1.0), F64(1.0)]),
                (80, Ortho, &[F64(0.0), F64(640.0), F64(480.0), F64(0.0), F64(-99999.0), F64(99999.0)]),
            ],
        );
        let passes = analyze(&log, [640, 480]);
        assert_eq!(passes.screen_space, Some(PassRange::new(80, 99)));
        assert!(passes.in_screen_space(99));
        assert!(!passes.in_screen_space(79));
    }

    #[test]
    fn empty_log() {
        assert_eq!(analyze(&CommandLog::new(), [640, 480]), PassRanges::default());
    }

    #[test]
    #[should_panic(expected = "starts inside another")]
    fn nested_lightmap_pass() {
        let blend = [U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)];
        let log = log_with(
            10,
            &[
                (1, BlendFunc, &blend),
                (2, Enable, &[U32(enums::BLEND)]),
                (3, BlendFunc, &blend),
                (4, Enable, &[U32(enums::BLEND)]),
            ],
        );
        analyze(&log, [640, 480]);
    }

    #[test]
    #[should_panic(expected = "lightmap pass starting at command 0 never ends")]
    fn unterminated_lightmap_pass() {
        let log = log_with(
            4,
            &[
                (0, BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]),
                (1, Enable, &[U32(enums::BLEND)]),
                (2, Begin, &[U32(enums::QUADS)]),
                (3, End, &[]),
            ],
        );
        analyze(&log, [640, 480]);
    }

    #[test]
    #[should_panic(expected = "lightmap pass starting at command 2 never ends")]
    fn lightmap_pass_open_at_screen_space() {
        let log = log_with(
            10,
            &[
                (2, BlendFunc, &[U32(enums::ZERO), U32(enums::ONE_MINUS_SRC_COLOR)]),
                (3, Enable, &[U32(enums::BLEND)]),
                (6, Ortho, &[F64(0.0), F64(640.0), F64(480.0), F64(0.0), F64(-1.0), F64(1.0)]),
                (8, Disable, &[U32(enums::BLEND)]),
            ],
        );
        analyze(&log, [640, 480]);
    }
}
