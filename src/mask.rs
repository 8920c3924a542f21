//! Per-command on/off switches for replay.
//!
//! A user interface flips these while the presentation thread is replaying,
//! so they're atomics. The player takes a read guard once per replay and
//! checks each command's flag as it goes; only resizing for a new snapshot
//! takes the write lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

#[derive(Debug, Default)]
pub struct CommandMask {
    flags: RwLock<Vec<AtomicBool>>,
}

impl CommandMask {
    pub fn new() -> CommandMask {
        CommandMask::default()
    }

    /// Make the mask `len` entries long, with everything enabled.
    pub fn reset(&self, len: usize) {
        let mut flags = self.flags.write().unwrap();
        flags.clear();
        flags.resize_with(len, || AtomicBool::new(true));
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enable or disable command `index`. Out-of-range indices are ignored.
    pub fn set_enabled(&self, index: usize, enabled: bool) {
        if let Some(flag) = self.read().flags.get(index) {
            flag.store(enabled, Ordering::Relaxed);
        }
    }

    /// Flip command `index`, and return its new setting.
    pub fn toggle(&self, index: usize) -> Option<bool> {
        self.read()
            .flags
            .get(index)
            .map(|flag| !flag.fetch_xor(true, Ordering::Relaxed))
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.read().is_enabled(index)
    }

    /// Hold the mask's size steady while checking many entries.
    pub fn read(&self) -> MaskGuard<'_> {
        MaskGuard {
            flags: self.flags.read().unwrap(),
        }
    }
}

pub struct MaskGuard<'a> {
    flags: RwLockReadGuard<'a, Vec<AtomicBool>>,
}

impl MaskGuard<'_> {
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Commands past the end of the mask count as enabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .map_or(true, |flag| flag.load(Ordering::Relaxed))
    }
}

#[test]
fn test_mask() {
    let mask = CommandMask::new();
    assert!(mask.is_empty());
    assert!(mask.is_enabled(3));

    mask.reset(4);
    assert_eq!(mask.len(), 4);
    mask.set_enabled(1, false);
    assert_eq!(mask.toggle(2), Some(false));
    assert_eq!(mask.toggle(9), None);
    {
        let guard = mask.read();
        let enabled: Vec<bool> = (0..4).map(|i| guard.is_enabled(i)).collect();
        assert_eq!(enabled, [true, false, false, true]);
    }

    mask.reset(2);
    assert!(mask.is_enabled(1));
}
