//! Frame capture and replay for fixed-function OpenGL programs.
//!
//! Hook a program's GL calls up to a `Capturer`, and it will keep a mirror of
//! the context's state and the textures the program has uploaded. When a
//! capture is requested, the next complete frame becomes a `Snapshot`: the
//! commands it issued, the state the context was in when it started, and the
//! textures it could have used.
//!
//! A `Player` takes a snapshot and draws it again, as often as you like, on a
//! context of its own. Replays can skip individual commands through a
//! `CommandMask`, or whole rendering passes (lightmaps, the view weapon, 2D
//! overlays) that `analyzer::analyze` finds by pattern-matching the command
//! stream. The `Presenter` runs a player on its own thread, picking up each
//! new snapshot as the capturer publishes it.
//!
//! Replay goes through the `gl::LegacyGl` trait, which covers the
//! fixed-function entry points `gleam::Gl` leaves out. `gl::GlFns` calls a
//! real driver; `gl::TraceGl` records what it's asked to do.

pub mod analyzer;
pub mod call;
pub mod capturer;
pub mod command_log;
pub mod config;
pub mod dump;
pub mod enums;
pub mod gl;
pub mod mask;
pub mod pixels;
pub mod player;
pub mod presenter;
pub mod replay;
pub mod resources;
pub mod rle;
pub mod snapshot;
pub mod state;
pub mod ui;
pub mod var;

pub use analyzer::{PassRange, PassRanges};
pub use call::{ApiArgument, ApiCommand, ApiFunction, GlRawPtr};
pub use capturer::Capturer;
pub use command_log::CommandLog;
pub use config::ReplayerConfig;
pub use dump::{DumpError, SnapshotDumper};
pub use mask::CommandMask;
pub use pixels::Pixels;
pub use player::{PlayStats, Player, PlayerState};
pub use presenter::{Presenter, Surface};
pub use resources::{ResourceTable, TextureRecord};
pub use snapshot::{HandOff, Snapshot};
pub use state::ContextState;
pub use ui::{UiSettings, UiToggles};
