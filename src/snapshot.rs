//! Captured frames, and the slot that carries them between threads.

use crate::command_log::CommandLog;
use crate::resources::ResourceTable;
use crate::state::ContextState;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything needed to reproduce one frame: the commands it issued, the
/// context state when it began, and the textures it could sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub log: CommandLog,
    pub start_state: ContextState,
    pub resources: ResourceTable,
}

/// A single-slot mailbox between the thread being captured and whoever
/// consumes its snapshots.
///
/// Cloning a `HandOff` gives another handle to the same slot.
#[derive(Clone, Default)]
pub struct HandOff {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    requested: AtomicBool,
    slot: Mutex<Option<Snapshot>>,
}

impl HandOff {
    pub fn new() -> HandOff {
        HandOff::default()
    }

    /// Ask for the next completed frame to be captured.
    pub fn request_capture(&self) {
        self.shared.requested.store(true, Ordering::Release);
    }

    pub fn is_capture_requested(&self) -> bool {
        self.shared.requested.load(Ordering::Acquire)
    }

    /// Take the captured snapshot, if there is one.
    pub fn pop_snapshot(&self) -> Option<Snapshot> {
        self.lock_slot().take()
    }

    /// Store the frame that just ended if it's wanted: either a capture was
    /// requested, or the last capture hasn't been consumed yet, in which case
    /// the newer frame replaces it. `make` only runs if the frame is kept.
    ///
    /// The check and the store happen under one lock, so a consumer can't
    /// empty the slot in between. Returns true if the frame was kept.
    pub(crate) fn publish_if_wanted(&self, make: impl FnOnce() -> Snapshot) -> bool {
        let mut slot = self.lock_slot();
        let requested = self.shared.requested.swap(false, Ordering::AcqRel);
        if !requested && slot.is_none() {
            return false;
        }
        *slot = Some(make());
        true
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.shared.slot.lock().unwrap()
    }
}

#[test]
fn test_hand_off() {
    let hand_off = HandOff::new();
    let other = hand_off.clone();
    let snapshot = Snapshot {
        log: CommandLog::new(),
        start_state: ContextState::new([640, 480]),
        resources: ResourceTable::new(),
    };

    let mut made = 0;
    assert!(!hand_off.publish_if_wanted(|| {
        made += 1;
        snapshot.clone()
    }));
    assert_eq!(made, 0);
    assert_eq!(other.pop_snapshot(), None);

    other.request_capture();
    assert!(hand_off.publish_if_wanted(|| snapshot.clone()));
    assert!(!other.is_capture_requested());

    // Still wanted: the slot is occupied, and the newer frame replaces it.
    let mut newer = snapshot.clone();
    newer.start_state.depth_mask = false;
    assert!(hand_off.publish_if_wanted(|| newer.clone()));

    assert_eq!(other.pop_snapshot(), Some(newer));
    assert_eq!(other.pop_snapshot(), None);
    assert!(!hand_off.publish_if_wanted(|| snapshot.clone()));
}
