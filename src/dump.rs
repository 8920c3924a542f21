//! Writing snapshots out for people to read.
//!
//! Each dumped snapshot becomes a text file listing its start state, its
//! textures, and its commands, and optionally a PNG per texture level.

use crate::enums;
use crate::resources::TextureDimensionality;
use crate::snapshot::Snapshot;
use crate::state::CAPABILITIES;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("error writing snapshot dump {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("error exporting texture image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Formats a whole snapshot as the text of a dump file.
pub struct SnapshotReport<'a>(pub &'a Snapshot);

impl fmt::Display for SnapshotReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let snapshot = self.0;
        let state = &snapshot.start_state;

        writeln!(f, "-- Start frame state --")?;
        for cap in CAPABILITIES {
            writeln!(
                f,
                "{}: {}",
                enums::display(cap),
                state.capability(cap).unwrap_or(false)
            )?;
        }
        writeln!(
            f,
            "alpha func: {}, {:?}",
            enums::display(state.alpha_func),
            state.alpha_ref
        )?;
        writeln!(
            f,
            "blend func: {}, {}",
            enums::display(state.blend_sfactor),
            enums::display(state.blend_dfactor)
        )?;
        writeln!(f, "clear color: {:?}", state.clear_color)?;
        writeln!(f, "clear depth: {:?}", state.clear_depth)?;
        writeln!(f, "cull face: {}", enums::display(state.cull_face_mode))?;
        writeln!(f, "depth func: {}", enums::display(state.depth_func))?;
        writeln!(f, "depth mask: {}", state.depth_mask)?;
        writeln!(f, "depth range: {:?}", state.depth_range)?;
        writeln!(f, "draw buffer: {}", enums::display(state.draw_buffer))?;
        writeln!(f, "front face: {}", enums::display(state.front_face))?;
        writeln!(f, "shade model: {}", enums::display(state.shade_model))?;
        writeln!(
            f,
            "texture env mode: {}",
            enums::display(state.texture_env_mode)
        )?;
        writeln!(f, "matrix mode: {}", enums::display(state.matrix_mode))?;
        writeln!(f, "viewport: {:?}", state.viewport)?;
        writeln!(f, "modelview matrix: {:?}", state.modelview_matrix)?;
        writeln!(f, "projection matrix: {:?}", state.projection_matrix)?;
        writeln!(f, "bound 2D texture: {}", state.bound_2d_texture)?;

        let mut params: Vec<_> = state.texture_params.iter().collect();
        params.sort_by_key(|(name, _)| **name);
        for (name, params) in params {
            write!(f, "texture {} parameters:", name)?;
            for (pname, value) in params.params() {
                write!(f, " {}={:?}", enums::display(pname), value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "-- Textures --")?;
        for (name, record) in snapshot.resources.iter() {
            let dimensionality = match record.dimensionality {
                TextureDimensionality::One => "1D",
                TextureDimensionality::Two => "2D",
                TextureDimensionality::Three => "3D",
            };
            writeln!(
                f,
                "texture {}: {}, border {}, internal format {}",
                name, dimensionality, record.border, record.internal_format
            )?;
            for (level, mip) in record.levels() {
                writeln!(
                    f,
                    "  level {}: {}x{} {}",
                    level,
                    mip.pixels.width,
                    mip.pixels.height,
                    enums::display(mip.pixels.format)
                )?;
            }
        }

        writeln!(f, "-- API calls --")?;
        for (i, command) in snapshot.log.iter().enumerate() {
            writeln!(f, "#{}: {}", i, command)?;
        }
        writeln!(f, "<-- end of transmission")
    }
}

/// Writes each snapshot it's given to a numbered file in a directory.
pub struct SnapshotDumper {
    dir: PathBuf,
    export_textures: bool,
    n_dumped: usize,
}

impl SnapshotDumper {
    pub fn new<P: AsRef<Path>>(dir: P, export_textures: bool) -> SnapshotDumper {
        SnapshotDumper {
            dir: dir.as_ref().to_owned(),
            export_textures,
            n_dumped: 0,
        }
    }

    pub fn n_dumped(&self) -> usize {
        self.n_dumped
    }

    /// Write `snapshot` to `snapshot<N>.log`, and return the file's path.
    pub fn dump(&mut self, snapshot: &Snapshot) -> Result<PathBuf, DumpError> {
        let n = self.n_dumped;
        let path = self.dir.join(format!("snapshot{}.log", n));
        let io_error = |source| DumpError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;
        let mut file = io::BufWriter::new(fs::File::create(&path).map_err(io_error)?);
        write!(file, "{}", SnapshotReport(snapshot)).map_err(io_error)?;
        file.flush().map_err(io_error)?;

        if self.export_textures {
            for (name, record) in snapshot.resources.iter() {
                for (level, mip) in record.levels() {
                    let image_path = self
                        .dir
                        .join(format!("snapshot{}-tex{}-mip{}.png", n, name, level));
                    mip.pixels
                        .write_image(&image_path)
                        .map_err(|source| DumpError::Image {
                            path: image_path.clone(),
                            source,
                        })?;
                }
            }
        }

        self.n_dumped += 1;
        info!("wrote snapshot dump {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{ApiArgument::*, ApiFunction};
    use crate::command_log::CommandLog;
    use crate::pixels::Pixels;
    use crate::resources::{ResourceTable, TextureMip, TextureRecord};
    use crate::state::ContextState;

    fn sample() -> Snapshot {
        let mut log = CommandLog::new();
        log.push(ApiFunction::Enable, &[U32(enums::TEXTURE_2D)]);
        log.push(ApiFunction::Clear, &[U32(enums::COLOR_BUFFER_BIT)]);

        let mut resources = ResourceTable::new();
        resources
            .get_or_insert_with(4, || TextureRecord::new(0, 4, TextureDimensionality::Two))
            .upload(
                1,
                TextureMip {
                    internal_format: 4,
                    pixels: Pixels::new(2, 2, enums::RGBA, enums::UNSIGNED_BYTE, vec![255; 16]),
                },
            );

        Snapshot {
            log,
            start_state: ContextState::new([640, 480]),
            resources,
        }
    }

    #[test]
    fn report_sections() {
        let text = SnapshotReport(&sample()).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-- Start frame state --");
        assert!(lines.contains(&"GL_BLEND: false"));
        assert!(lines.contains(&"depth func: GL_LESS"));
        assert!(lines.contains(&"texture 4: 2D, border 0, internal format 4"));
        assert!(lines.contains(&"  level 1: 2x2 GL_RGBA"));

        let calls = lines.iter().position(|l| *l == "-- API calls --").unwrap();
        assert_eq!(
            &lines[calls + 1..],
            &[
                "#0: glEnable(GL_TEXTURE_2D)",
                "#1: glClear(GL_COLOR_BUFFER_BIT)",
                "<-- end of transmission",
            ]
        );
    }

    #[test]
    fn dump_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut dumper = SnapshotDumper::new(dir.path(), true);
        let snapshot = sample();

        let first = dumper.dump(&snapshot).unwrap();
        let second = dumper.dump(&snapshot).unwrap();
        assert_eq!(first, dir.path().join("snapshot0.log"));
        assert_eq!(second, dir.path().join("snapshot1.log"));
        assert_eq!(dumper.n_dumped(), 2);

        let text = fs::read_to_string(&first).unwrap();
        assert!(text.ends_with("<-- end of transmission\n"));
        assert!(dir.path().join("snapshot1-tex4-mip1.png").exists());
    }
}
