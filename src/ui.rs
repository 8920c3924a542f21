//! Viewer settings that filter whole rendering passes out of a replay.

use std::sync::atomic::{AtomicBool, Ordering};

/// What the player asks about before each command.
pub trait UiSettings {
    /// Skip the lightmap passes.
    fn should_disable_lightmaps(&self) -> bool;
    /// Draw 2D overlays.
    fn should_draw_screenspace_geometry(&self) -> bool;
    /// Draw the view weapon.
    fn should_draw_weapon(&self) -> bool;
    /// Draw models and the weapon shaded. Currently unused by the player.
    fn should_shade_3d_models(&self) -> bool;
}

/// `UiSettings` that another thread can change while replay runs.
#[derive(Debug)]
pub struct UiToggles {
    disable_lightmaps: AtomicBool,
    draw_screenspace_geometry: AtomicBool,
    draw_weapon: AtomicBool,
    shade_3d_models: AtomicBool,
}

impl Default for UiToggles {
    fn default() -> Self {
        UiToggles {
            disable_lightmaps: AtomicBool::new(false),
            draw_screenspace_geometry: AtomicBool::new(true),
            draw_weapon: AtomicBool::new(true),
            shade_3d_models: AtomicBool::new(true),
        }
    }
}

impl UiToggles {
    pub fn new() -> UiToggles {
        UiToggles::default()
    }

    pub fn set_disable_lightmaps(&self, value: bool) {
        self.disable_lightmaps.store(value, Ordering::Relaxed);
    }

    pub fn set_draw_screenspace_geometry(&self, value: bool) {
        self.draw_screenspace_geometry.store(value, Ordering::Relaxed);
    }

    pub fn set_draw_weapon(&self, value: bool) {
        self.draw_weapon.store(value, Ordering::Relaxed);
    }

    pub fn set_shade_3d_models(&self, value: bool) {
        self.shade_3d_models.store(value, Ordering::Relaxed);
    }
}

impl UiSettings for UiToggles {
    fn should_disable_lightmaps(&self) -> bool {
        self.disable_lightmaps.load(Ordering::Relaxed)
    }

    fn should_draw_screenspace_geometry(&self) -> bool {
        self.draw_screenspace_geometry.load(Ordering::Relaxed)
    }

    fn should_draw_weapon(&self) -> bool {
        self.draw_weapon.load(Ordering::Relaxed)
    }

    fn should_shade_3d_models(&self) -> bool {
        self.shade_3d_models.load(Ordering::Relaxed)
    }
}

#[test]
fn test_toggles() {
    let toggles = UiToggles::new();
    assert!(!toggles.should_disable_lightmaps());
    assert!(toggles.should_draw_screenspace_geometry());
    assert!(toggles.should_draw_weapon());
    assert!(toggles.should_shade_3d_models());

    toggles.set_disable_lightmaps(true);
    toggles.set_draw_weapon(false);
    let settings: &dyn UiSettings = &toggles;
    assert!(settings.should_disable_lightmaps());
    assert!(!settings.should_draw_weapon());
    assert!(settings.should_draw_screenspace_geometry());
}
