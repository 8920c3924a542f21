//! Settings for the replaying side.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// How the presentation thread should run. Missing fields take their
/// defaults, so hosts can deserialize partial settings from any serde
/// format.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReplayerConfig {
    /// Size of the captured program's window, in pixels.
    pub window_extents: [u32; 2],

    /// Directory to write a text dump of every snapshot to.
    pub dump_dir: Option<PathBuf>,

    /// When dumping, also write each texture level as a PNG.
    pub export_textures: bool,

    /// Longest the presentation thread waits between frames.
    pub refresh_interval_ms: u64,
}

impl Default for ReplayerConfig {
    fn default() -> Self {
        ReplayerConfig {
            window_extents: [640, 480],
            dump_dir: None,
            export_textures: false,
            refresh_interval_ms: 500,
        }
    }
}

impl ReplayerConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

#[test]
fn test_partial_config() {
    use serde::de::value::{Error, MapDeserializer};

    let fields = vec![("refresh_interval_ms", 20_u64)];
    let config =
        ReplayerConfig::deserialize(MapDeserializer::<_, Error>::new(fields.into_iter())).unwrap();
    assert_eq!(config.refresh_interval(), Duration::from_millis(20));
    assert_eq!(config.window_extents, [640, 480]);
    assert_eq!(config.dump_dir, None);
    assert!(!config.export_textures);
}
