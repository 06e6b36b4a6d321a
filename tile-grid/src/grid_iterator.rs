//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Grid iterators

use crate::range::TileRange;

/// Column-by-column iterator over all cells of a range
pub struct GridIterator {
    x: u32,
    y: u32,
    range: TileRange,
    finished: bool,
}

impl GridIterator {
    pub fn new(range: TileRange) -> GridIterator {
        if range.xmin <= range.xmax && range.ymin <= range.ymax {
            GridIterator {
                x: range.xmin,
                y: range.ymin,
                range,
                finished: false,
            }
        } else {
            // Return "empty" iterator for invalid ranges
            GridIterator {
                x: 0,
                y: 0,
                range,
                finished: true,
            }
        }
    }
}

impl Iterator for GridIterator {
    /// Current cell index `(x, y)`
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let current = (self.x, self.y);
        if self.y < self.range.ymax {
            self.y += 1;
        } else if self.x < self.range.xmax {
            self.x += 1;
            self.y = self.range.ymin;
        } else {
            self.finished = true;
        }
        Some(current)
    }
}

#[test]
fn test_cell_order() {
    let range = TileRange::new(0, 1, 0, 2).unwrap();
    let cells = GridIterator::new(range).collect::<Vec<_>>();
    assert_eq!(
        cells,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );

    let range = TileRange::new(5, 5, 7, 7).unwrap();
    let cells = GridIterator::new(range).collect::<Vec<_>>();
    assert_eq!(cells, vec![(5, 7)]);
}

#[test]
fn test_range_edges() {
    // No overflow at the end of the u32 domain
    let range = TileRange::new(u32::MAX - 1, u32::MAX, u32::MAX, u32::MAX).unwrap();
    let cells = GridIterator::new(range).collect::<Vec<_>>();
    assert_eq!(cells, vec![(u32::MAX - 1, u32::MAX), (u32::MAX, u32::MAX)]);
}

#[test]
fn test_bad_params() {
    // xmin > xmax
    let range = TileRange {
        xmin: 3,
        xmax: 2,
        ymin: 0,
        ymax: 0,
    };
    let cells = GridIterator::new(range).collect::<Vec<_>>();
    assert_eq!(cells, vec![]);

    // ymin > ymax
    let range = TileRange {
        xmin: 0,
        xmax: 0,
        ymin: 1,
        ymax: 0,
    };
    let cells = GridIterator::new(range).collect::<Vec<_>>();
    assert_eq!(cells, vec![]);
}
