//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile grid ranges

use crate::grid_iterator::GridIterator;
use std::convert::TryFrom;
use std::fmt;

/// Inclusive min and max grid cell numbers
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TileRange {
    pub xmin: u32,
    pub xmax: u32,
    pub ymin: u32,
    pub ymax: u32,
}

impl TileRange {
    /// Range of cells `xmin..=xmax` × `ymin..=ymax`.
    /// Fails if a minimum is larger than its maximum.
    pub fn new(xmin: u32, xmax: u32, ymin: u32, ymax: u32) -> Result<TileRange, String> {
        if xmin > xmax {
            return Err(format!("Xmin ({}) is larger than Xmax ({})", xmin, xmax));
        }
        if ymin > ymax {
            return Err(format!("Ymin ({}) is larger than Ymax ({})", ymin, ymax));
        }
        Ok(TileRange {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }
    /// Number of tile columns
    pub fn columns(&self) -> u64 {
        (self.xmax as u64 + 1).saturating_sub(self.xmin as u64)
    }
    /// Number of tile rows
    pub fn rows(&self) -> u64 {
        (self.ymax as u64 + 1).saturating_sub(self.ymin as u64)
    }
    /// Number of cells in range
    pub fn len(&self) -> u64 {
        self.columns() * self.rows()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
    /// Pixel width and height of a canvas covering all cells.
    /// `None` if it does not fit into `u32`.
    pub fn canvas_size(&self, tile_size: u32) -> Option<(u32, u32)> {
        let width = self.columns().checked_mul(tile_size as u64)?;
        let height = self.rows().checked_mul(tile_size as u64)?;
        Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
    }
    /// Pixel position of the top-left corner of cell `(x, y)` on the canvas.
    /// The cell must be inside the range.
    pub fn offset(&self, tile_size: u32, x: u32, y: u32) -> (u32, u32) {
        debug_assert!(self.contains(x, y));
        (tile_size * (x - self.xmin), tile_size * (y - self.ymin))
    }
    /// Iterate over all cells, x outer, y inner
    pub fn cells(&self) -> GridIterator {
        GridIterator::new(*self)
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}_to_{}-{}",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}
