//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::cache::filecache::write_atomic;
use crate::core::StitchError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, GenericImage, ImageError, ImageResult, Rgb, RgbImage};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Fill colour of regions without tile
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

pub const JPEG_QUALITY: u8 = 100;

/// Output raster assembled from tiles
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Canvas filled with [`BACKGROUND`]
    pub fn new(width: u32, height: u32) -> Canvas {
        Canvas {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }
    pub fn width(&self) -> u32 {
        self.image.width()
    }
    pub fn height(&self) -> u32 {
        self.image.height()
    }
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
    /// Copy all tile pixels with the top-left corner at `(x, y)`
    pub fn place(&mut self, tile: &RgbImage, x: u32, y: u32) -> ImageResult<()> {
        self.image.copy_from(tile, x, y)
    }
    /// Encode as JPEG into `path`. Nothing is left behind on failure.
    pub fn save_jpeg(&self, path: &Path) -> Result<(), StitchError> {
        let mut encode_error = None;
        write_atomic(path, |f| {
            let mut writer = BufWriter::new(f);
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .encode(
                    self.image.as_raw(),
                    self.image.width(),
                    self.image.height(),
                    ColorType::Rgb8,
                )
                .map_err(|e| match e {
                    ImageError::IoError(e) => e,
                    e => {
                        encode_error = Some(e);
                        io::Error::new(io::ErrorKind::Other, "JPEG encoding failed")
                    }
                })?;
            writer.flush()
        })
        .map_err(|source| match encode_error.take() {
            Some(source) => StitchError::Encode {
                path: path.to_path_buf(),
                source,
            },
            None => StitchError::Output {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

#[test]
fn test_background() {
    let canvas = Canvas::new(4, 3);
    assert_eq!(canvas.width(), 4);
    assert_eq!(canvas.height(), 3);
    assert!(canvas.image().pixels().all(|p| *p == BACKGROUND));
}

#[test]
fn test_place() {
    let mut canvas = Canvas::new(4, 4);
    let tile = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
    canvas.place(&tile, 2, 0).unwrap();
    assert_eq!(*canvas.image().get_pixel(2, 0), Rgb([255, 0, 0]));
    assert_eq!(*canvas.image().get_pixel(3, 1), Rgb([255, 0, 0]));
    assert_eq!(*canvas.image().get_pixel(1, 0), BACKGROUND);
    assert_eq!(*canvas.image().get_pixel(2, 2), BACKGROUND);

    // Tile exceeding the canvas is rejected
    assert!(canvas.place(&tile, 3, 3).is_err());
}
