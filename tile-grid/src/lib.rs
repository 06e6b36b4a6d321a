//! A library for tile grid cell calculations
//!
//! ## Grid ranges
//!
//! ```rust
//! use tile_grid::TileRange;
//!
//! let range = TileRange::new(2, 4, 1, 2).unwrap();
//! assert_eq!(range.canvas_size(256), Some((768, 512)));
//! assert_eq!(range.offset(256, 3, 2), (256, 256));
//! ```
//!
//! ## Grid iterators
//!
//! ```rust
//! use tile_grid::TileRange;
//!
//! let range = TileRange::new(0, 1, 0, 1).unwrap();
//! for (x, y) in range.cells() {
//!     println!("Tile {}/{}", x, y);
//! }
//! ```
//!
//! ## Tile file names
//!
//! ```rust
//! use tile_grid::TilePattern;
//!
//! let pattern = TilePattern::new("Z_X_Y.jpg");
//! assert_eq!(pattern.filename(5, 3, 7), "5_3_7.jpg");
//! ```

mod grid_iterator;
mod pattern;
mod range;

pub use grid_iterator::GridIterator;
pub use pattern::TilePattern;
pub use range::TileRange;
