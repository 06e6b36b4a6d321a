//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Assembly of tiles into one image

pub mod canvas;

#[cfg(test)]
mod stitcher_test;

pub use self::canvas::{Canvas, BACKGROUND};

use crate::cache::Filecache;
use crate::core::{StitchConfig, StitchError, TileError};
use image::io::Reader;
use image::RgbImage;
use pbr::ProgressBar;
use std::fmt;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use tile_grid::TileRange;
use uuid::Uuid;

/// Outcome of a stitch run
#[derive(Debug)]
pub struct StitchResult {
    /// File actually written
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub tiles_used: usize,
    /// Absent tiles and tiles which could not be decoded
    pub tiles_missing: usize,
    pub failed: Vec<TileError>,
}

impl fmt::Display for StitchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} x {} image written to {} ({} tiles used, {} missing)",
            self.width,
            self.height,
            self.output.display(),
            self.tiles_used,
            self.tiles_missing
        )
    }
}

pub struct Stitcher {
    config: StitchConfig,
    cache: Filecache,
}

impl Stitcher {
    pub fn new(config: &StitchConfig) -> Stitcher {
        Stitcher {
            config: config.clone(),
            cache: Filecache::new(&config.location),
        }
    }
    /// Assemble all tiles of the range and write the result as JPEG.
    ///
    /// Missing or broken tiles leave a black region. An image is written
    /// even if no tile is found at all.
    pub fn stitch(&self) -> Result<StitchResult, StitchError> {
        self.config.validate()?;
        let (width, height) = self.config.canvas_size()?;

        let mut canvas = Canvas::new(width, height);
        let mut tiles_used = 0;
        let mut tiles_missing = 0;
        let mut failed = Vec::new();
        let mut pb = self.progress_bar();
        let range = &self.config.range;
        for (x, y) in range.cells() {
            let filename = self.config.pattern.filename(self.config.zoom, x, y);
            let path = self.cache.path(&filename);
            if !path.exists() {
                info!("File [MISSING]: {}", path.display());
                tiles_missing += 1;
            } else {
                info!("File [EXISTS]: {}", path.display());
                let (originx, originy) = range.offset(self.config.tile_size, x, y);
                match self
                    .load_tile(&path)
                    .and_then(|tile| place_tile(&mut canvas, &tile, &path, originx, originy))
                {
                    Ok(()) => tiles_used += 1,
                    Err(e) => {
                        error!("{}", e);
                        tiles_missing += 1;
                        failed.push(e);
                    }
                }
            }
            if let Some(pb) = pb.as_mut() {
                pb.inc();
            }
        }
        if let Some(pb) = pb.as_mut() {
            pb.finish_println("");
        }

        let output = unique_output_path(&self.output_path());
        info!("Saving file as \"{}\"...", output.display());
        canvas.save_jpeg(&output)?;
        info!("Done.");

        Ok(StitchResult {
            output,
            width,
            height,
            tiles_used,
            tiles_missing,
            failed,
        })
    }
    /// Configured output file or name derived from the tile range
    pub fn output_path(&self) -> PathBuf {
        match self.config.output.as_ref() {
            Some(output) => output.clone(),
            None => default_output_path(&self.config.location, &self.config.range),
        }
    }
    fn load_tile(&self, path: &Path) -> Result<RgbImage, TileError> {
        // Format is detected from the content, the file name may not match it
        let tile = Reader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| TileError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|e| TileError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgb8();
        let tile_size = self.config.tile_size;
        if tile.width() != tile_size || tile.height() != tile_size {
            return Err(TileError::Decode {
                path: path.to_path_buf(),
                reason: format!(
                    "size {} x {} does not match tile size {}",
                    tile.width(),
                    tile.height(),
                    tile_size
                ),
            });
        }
        Ok(tile)
    }
    fn progress_bar(&self) -> Option<ProgressBar<Stdout>> {
        if !self.config.progress {
            return None;
        }
        let mut pb = ProgressBar::new(self.config.range.len());
        pb.message("Stitch: ");
        pb.show_speed = false;
        pb.show_percent = false;
        pb.show_time_left = false;
        Some(pb)
    }
}

fn place_tile(
    canvas: &mut Canvas,
    tile: &RgbImage,
    path: &Path,
    x: u32,
    y: u32,
) -> Result<(), TileError> {
    canvas
        .place(tile, x, y)
        .map_err(|e| TileError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// `stitched_{xmin}-{ymin}_to_{xmax}-{ymax}.jpg` in the tile directory
pub fn default_output_path(location: &Path, range: &TileRange) -> PathBuf {
    location.join(format!("stitched_{}.jpg", range))
}

/// `path` if it does not exist, otherwise `path` with a random suffix
/// inserted before the extension.
pub fn unique_output_path(path: &Path) -> PathBuf {
    let mut candidate = path.to_path_buf();
    while candidate.exists() {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = Uuid::new_v4().to_string();
        let filename = match path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}_{}", stem, suffix),
        };
        candidate = path.with_file_name(filename);
        warn!(
            "Output file {} exists, using {}",
            path.display(),
            candidate.display()
        );
    }
    candidate
}
