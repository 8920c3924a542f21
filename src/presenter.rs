//! The thread that shows captured frames.
//!
//! A GL context belongs to the thread that made it current, so the player
//! gets a thread of its own. It creates its surface there, then loops:
//! pick up any new snapshot, replay the current one, swap, and wait for the
//! next refresh. Dropping the `Presenter` ends the loop and joins the
//! thread.

use crate::config::ReplayerConfig;
use crate::dump::SnapshotDumper;
use crate::enums;
use crate::gl::LegacyGl;
use crate::mask::CommandMask;
use crate::player::Player;
use crate::snapshot::HandOff;
use crate::ui::UiSettings;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A window, or anything else with a GL context that can be presented.
pub trait Surface {
    fn gl(&self) -> &dyn LegacyGl;
    fn swap_buffers(&mut self);
}

enum Message {
    Refresh,
}

/// Handle to a running presentation thread.
pub struct Presenter {
    /// `None` once we've started shutting down.
    tx: Option<Sender<Message>>,
    handle: Option<JoinHandle<()>>,
    mask: Arc<CommandMask>,
    loaded: Arc<AtomicUsize>,
}

impl Presenter {
    /// Start a thread presenting the snapshots published to `hand_off`.
    /// `make_surface` runs on the new thread.
    pub fn spawn<S, F>(
        config: &ReplayerConfig,
        hand_off: HandOff,
        ui: Arc<dyn UiSettings + Send + Sync>,
        make_surface: F,
    ) -> io::Result<Presenter>
    where
        S: Surface,
        F: FnOnce() -> S + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let mask = Arc::new(CommandMask::new());
        let loaded = Arc::new(AtomicUsize::new(0));
        let interval = config.refresh_interval();

        let mut presentation = Presentation {
            player: Player::new(config.window_extents),
            hand_off,
            mask: mask.clone(),
            ui,
            dumper: config
                .dump_dir
                .as_ref()
                .map(|dir| SnapshotDumper::new(dir, config.export_textures)),
            loaded: loaded.clone(),
        };

        let handle = thread::Builder::new()
            .name("gl-snapshot-presenter".into())
            .spawn(move || {
                let mut surface = make_surface();
                debug!("presentation thread started");
                loop {
                    presentation.tick(surface.gl());
                    surface.swap_buffers();
                    match rx.recv_timeout(interval) {
                        Ok(Message::Refresh) | Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                presentation.player.unload(surface.gl());
                debug!("presentation thread finished");
            })?;

        Ok(Presenter {
            tx: Some(tx),
            handle: Some(handle),
            mask,
            loaded,
        })
    }

    /// Present a frame now rather than at the next interval.
    pub fn refresh(&self) {
        if let Some(tx) = &self.tx {
            // A send only fails if the thread is gone, and then there's
            // nothing to refresh.
            let _ = tx.send(Message::Refresh);
        }
    }

    /// The enable bits for the loaded snapshot's commands. Reset to all
    /// enabled each time a new snapshot arrives.
    pub fn mask(&self) -> &Arc<CommandMask> {
        &self.mask
    }

    /// How many snapshots the thread has picked up so far.
    pub fn snapshots_loaded(&self) -> usize {
        self.loaded.load(Ordering::Acquire)
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        // Hanging up the channel is what stops the loop, so this must come
        // before the join.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("presentation thread panicked");
            }
        }
    }
}

/// The presentation thread's state, apart from its surface.
struct Presentation {
    player: Player,
    hand_off: HandOff,
    mask: Arc<CommandMask>,
    ui: Arc<dyn UiSettings + Send + Sync>,
    dumper: Option<SnapshotDumper>,
    loaded: Arc<AtomicUsize>,
}

impl Presentation {
    /// Draw one frame on `gl`, switching to a new snapshot first if one has
    /// been published.
    fn tick(&mut self, gl: &dyn LegacyGl) {
        if let Some(snapshot) = self.hand_off.pop_snapshot() {
            self.mask.reset(snapshot.log.len());
            if let Some(dumper) = &mut self.dumper {
                if let Err(err) = dumper.dump(&snapshot) {
                    warn!("{}", err);
                }
            }
            self.player.load_snapshot(gl, snapshot);
            self.loaded.fetch_add(1, Ordering::Release);
        }

        if self.player.is_snapshot_loaded() {
            let stats = self.player.play_snapshot(gl, &self.mask, &*self.ui);
            debug!(?stats, "presented snapshot");
        } else {
            gl.clear(enums::COLOR_BUFFER_BIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{ApiArgument::*, ApiFunction::*, GlRawPtr};
    use crate::capturer::Capturer;
    use crate::gl::TraceGl;
    use crate::ui::UiToggles;
    use std::time::{Duration, Instant};

    /// Poll `done` until it holds, for at most `limit`.
    fn wait_for(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while !done() {
            if start.elapsed() > limit {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }

    fn capture_frame(capturer: &mut Capturer) {
        capturer.request_capture();
        capturer.on_call(Enable, &[U32(enums::DEPTH_TEST)]);
        capturer.on_call(Clear, &[U32(enums::COLOR_BUFFER_BIT)]);
        capturer.on_call(Begin, &[U32(enums::TRIANGLES)]);
        capturer.on_call(Vertex2f, &[F32(0.0), F32(0.0)]);
        capturer.on_call(End, &[]);
        capturer.on_call(SwapBuffers, &[Pointer(GlRawPtr::null())]);
    }

    fn presentation(hand_off: HandOff, dumper: Option<SnapshotDumper>) -> Presentation {
        Presentation {
            player: Player::new([640, 480]),
            hand_off,
            mask: Arc::new(CommandMask::new()),
            ui: Arc::new(UiToggles::new()),
            dumper,
            loaded: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[test]
    fn tick_without_snapshot_clears() {
        let gl = TraceGl::new();
        let mut presentation = presentation(HandOff::new(), None);
        presentation.tick(&gl);
        assert_eq!(gl.functions(), [Clear]);
        assert_eq!(gl.log().get(0).unwrap().arg(0).as_u32(), enums::COLOR_BUFFER_BIT);
    }

    #[test]
    fn tick_loads_dumps_and_plays() {
        let dir = tempfile::tempdir().unwrap();
        let mut capturer = Capturer::new([640, 480]);
        let mut presentation = presentation(
            capturer.hand_off(),
            Some(SnapshotDumper::new(dir.path(), false)),
        );
        capture_frame(&mut capturer);

        let gl = TraceGl::new();
        presentation.mask.reset(2);
        presentation.mask.set_enabled(0, false);
        presentation.tick(&gl);
        assert_eq!(presentation.loaded.load(Ordering::Acquire), 1);
        // A new snapshot brings a fresh mask.
        assert_eq!(presentation.mask.len(), 5);
        assert!(presentation.mask.is_enabled(0));
        assert!(dir.path().join("snapshot0.log").exists());
        assert_eq!(gl.count(Vertex2f), 1);

        // The next tick replays the same snapshot without reloading it.
        gl.clear_log();
        presentation.tick(&gl);
        assert_eq!(presentation.loaded.load(Ordering::Acquire), 1);
        assert_eq!(gl.count(Vertex2f), 1);
        assert!(!dir.path().join("snapshot1.log").exists());
    }

    struct CountingSurface {
        gl: TraceGl,
        swaps: Arc<AtomicUsize>,
    }

    impl Surface for CountingSurface {
        fn gl(&self) -> &dyn LegacyGl {
            &self.gl
        }

        fn swap_buffers(&mut self) {
            self.swaps.fetch_add(1, Ordering::Release);
        }
    }

    #[test]
    fn presenter_thread() {
        let config = ReplayerConfig {
            refresh_interval_ms: 10,
            ..ReplayerConfig::default()
        };
        let mut capturer = Capturer::new(config.window_extents);
        let swaps = Arc::new(AtomicUsize::new(0));
        let surface_swaps = swaps.clone();

        let presenter = Presenter::spawn(
            &config,
            capturer.hand_off(),
            Arc::new(UiToggles::new()),
            move || CountingSurface {
                gl: TraceGl::new(),
                swaps: surface_swaps,
            },
        )
        .unwrap();

        capture_frame(&mut capturer);
        presenter.refresh();
        assert!(wait_for(Duration::from_secs(5), || presenter.snapshots_loaded() == 1));
        assert_eq!(presenter.mask().len(), 5);
        assert!(capturer.pop_snapshot().is_none());

        drop(presenter);
        let after_drop = swaps.load(Ordering::Acquire);
        assert!(after_drop >= 1);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(swaps.load(Ordering::Acquire), after_drop);
    }
}
