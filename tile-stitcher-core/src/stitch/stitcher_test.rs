//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::cache::filecache_test::part_files;
use crate::core::{StitchConfig, StitchError, TileError};
use crate::stitch::{default_output_path, unique_output_path, Stitcher};
use image::{ImageFormat, Rgb, RgbImage};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tile_grid::{TilePattern, TileRange};

const TILE_SIZE: u32 = 16;
const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn scratch_dir(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push(format!("tile_stitcher_test_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &Path, range: TileRange) -> StitchConfig {
    let mut config = StitchConfig::new(4, TILE_SIZE, range, &dir.to_string_lossy());
    config.pattern = TilePattern::new("Z_X_Y.png");
    config
}

fn write_tile(dir: &Path, x: u32, y: u32, color: [u8; 3]) {
    RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgb(color))
        .save(dir.join(format!("4_{}_{}.png", x, y)))
        .unwrap();
}

/// Colour at the centre of tile `(col, row)` of the output, compared with JPEG tolerance
fn assert_block(image: &RgbImage, col: u32, row: u32, expected: [u8; 3]) {
    let pixel = image.get_pixel(
        col * TILE_SIZE + TILE_SIZE / 2,
        row * TILE_SIZE + TILE_SIZE / 2,
    );
    for (channel, value) in pixel.0.iter().enumerate() {
        let diff = (*value as i16 - expected[channel] as i16).abs();
        assert!(
            diff <= 8,
            "block {}/{}: {:?} != {:?}",
            col,
            row,
            pixel.0,
            expected
        );
    }
}

#[test]
fn test_quadrants() {
    let dir = scratch_dir("quadrants");
    write_tile(&dir, 0, 0, RED);
    write_tile(&dir, 1, 0, GREEN);
    write_tile(&dir, 0, 1, BLUE);
    write_tile(&dir, 1, 1, WHITE);

    let result = Stitcher::new(&config(&dir, TileRange::new(0, 1, 0, 1).unwrap()))
        .stitch()
        .unwrap();
    assert_eq!(result.width, 2 * TILE_SIZE);
    assert_eq!(result.height, 2 * TILE_SIZE);
    assert_eq!(result.tiles_used, 4);
    assert_eq!(result.tiles_missing, 0);
    assert!(result.failed.is_empty());
    assert_eq!(result.output, dir.join("stitched_0-0_to_1-1.jpg"));

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (2 * TILE_SIZE, 2 * TILE_SIZE));
    assert_block(&image, 0, 0, RED);
    assert_block(&image, 1, 0, GREEN);
    assert_block(&image, 0, 1, BLUE);
    assert_block(&image, 1, 1, WHITE);
    assert!(part_files(&dir).is_empty());
}

#[test]
fn test_offset_range() {
    let dir = scratch_dir("offset_range");
    write_tile(&dir, 5, 2, GREEN);
    write_tile(&dir, 7, 3, BLUE);

    let result = Stitcher::new(&config(&dir, TileRange::new(5, 7, 2, 3).unwrap()))
        .stitch()
        .unwrap();
    assert_eq!((result.width, result.height), (3 * TILE_SIZE, 2 * TILE_SIZE));
    assert_eq!(result.tiles_used, 2);
    assert_eq!(result.tiles_missing, 4);

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (3 * TILE_SIZE, 2 * TILE_SIZE));
    assert_block(&image, 0, 0, GREEN);
    assert_block(&image, 2, 1, BLUE);
    assert_block(&image, 1, 0, BLACK);
    assert_block(&image, 0, 1, BLACK);
}

#[test]
fn test_missing_tile() {
    let dir = scratch_dir("missing_tile");
    write_tile(&dir, 0, 0, WHITE);
    write_tile(&dir, 1, 0, WHITE);
    write_tile(&dir, 0, 1, WHITE);

    let result = Stitcher::new(&config(&dir, TileRange::new(0, 1, 0, 1).unwrap()))
        .stitch()
        .unwrap();
    assert_eq!(result.tiles_used, 3);
    assert_eq!(result.tiles_missing, 1);
    assert!(result.failed.is_empty());

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (2 * TILE_SIZE, 2 * TILE_SIZE));
    assert_block(&image, 1, 1, BLACK);
    assert_block(&image, 0, 1, WHITE);
}

#[test]
fn test_all_missing() {
    let dir = scratch_dir("all_missing");

    let result = Stitcher::new(&config(&dir, TileRange::new(0, 2, 0, 0).unwrap()))
        .stitch()
        .unwrap();
    assert_eq!(result.tiles_used, 0);
    assert_eq!(result.tiles_missing, 3);
    assert!(result.output.exists());

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (3 * TILE_SIZE, TILE_SIZE));
    assert!(image.pixels().all(|p| p.0.iter().all(|v| *v <= 8)));
}

#[test]
fn test_format_from_content() {
    // Server delivered PNG data for a .jpg pattern
    let dir = scratch_dir("format_from_content");
    RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgb(RED))
        .save_with_format(dir.join("4_0_0.jpg"), ImageFormat::Png)
        .unwrap();
    let mut config = config(&dir, TileRange::new(0, 0, 0, 0).unwrap());
    config.pattern = TilePattern::new("Z_X_Y.jpg");

    let result = Stitcher::new(&config).stitch().unwrap();
    assert_eq!((result.tiles_used, result.tiles_missing), (1, 0));
    assert!(result.failed.is_empty());
    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_block(&image, 0, 0, RED);
}

#[test]
fn test_pattern_without_extension() {
    let dir = scratch_dir("pattern_without_extension");
    RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgb(BLUE))
        .save_with_format(dir.join("4_0_0"), ImageFormat::Png)
        .unwrap();
    let mut config = config(&dir, TileRange::new(0, 0, 0, 0).unwrap());
    config.pattern = TilePattern::new("Z_X_Y");

    let result = Stitcher::new(&config).stitch().unwrap();
    assert_eq!((result.tiles_used, result.tiles_missing), (1, 0));
    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_block(&image, 0, 0, BLUE);
}

#[test]
fn test_broken_tiles() {
    let dir = scratch_dir("broken_tiles");
    write_tile(&dir, 0, 0, RED);
    // Wrong tile size
    RgbImage::from_pixel(TILE_SIZE / 2, TILE_SIZE, Rgb(WHITE))
        .save(dir.join("4_1_0.png"))
        .unwrap();
    // Not an image
    fs::write(dir.join("4_2_0.png"), "no png").unwrap();

    let result = Stitcher::new(&config(&dir, TileRange::new(0, 2, 0, 0).unwrap()))
        .stitch()
        .unwrap();
    assert_eq!(result.tiles_used, 1);
    assert_eq!(result.tiles_missing, 2);
    assert_eq!(result.failed.len(), 2);
    assert!(result
        .failed
        .iter()
        .all(|e| matches!(e, TileError::Decode { .. })));
    assert!(result.failed[0].to_string().contains("does not match tile size"));

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_block(&image, 0, 0, RED);
    assert_block(&image, 1, 0, BLACK);
    assert_block(&image, 2, 0, BLACK);
}

#[test]
fn test_output_collision() {
    let dir = scratch_dir("output_collision");
    write_tile(&dir, 0, 0, RED);
    let range = TileRange::new(0, 0, 0, 0).unwrap();
    let existing = default_output_path(&dir, &range);
    fs::write(&existing, "keep me").unwrap();

    let result = Stitcher::new(&config(&dir, range)).stitch().unwrap();
    assert_ne!(result.output, existing);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
    let filename = result.output.file_name().unwrap().to_string_lossy();
    assert!(filename.starts_with("stitched_0-0_to_0-0_"));
    assert!(filename.ends_with(".jpg"));
    assert_eq!(result.output.parent(), existing.parent());

    let image = image::open(&result.output).unwrap().to_rgb8();
    assert_block(&image, 0, 0, RED);
}

#[test]
fn test_explicit_output() {
    let dir = scratch_dir("explicit_output");
    write_tile(&dir, 0, 0, BLUE);
    let mut config = config(&dir, TileRange::new(0, 0, 0, 0).unwrap());
    let output = dir.join("result.jpg");
    config.output = Some(output.clone());

    let result = Stitcher::new(&config).stitch().unwrap();
    assert_eq!(result.output, output);
    assert!(output.exists());
    assert!(!default_output_path(&dir, &config.range).exists());
}

#[test]
fn test_unwritable_output() {
    let dir = scratch_dir("unwritable_output");
    let mut config = config(&dir, TileRange::new(0, 0, 0, 0).unwrap());
    let output = dir.join("no_such_dir").join("result.jpg");
    config.output = Some(output.clone());

    match Stitcher::new(&config).stitch() {
        Err(StitchError::Output { path, .. }) => assert_eq!(path, output),
        r => panic!("unexpected result {:?}", r),
    }
    assert!(!output.exists());
    assert!(part_files(&dir).is_empty());
}

#[test]
fn test_invalid_config() {
    let dir = scratch_dir("invalid_config");
    let mut config = config(&dir, TileRange::new(0, 0, 0, 0).unwrap());
    config.tile_size = 0;
    assert!(matches!(
        Stitcher::new(&config).stitch(),
        Err(StitchError::Config(_))
    ));
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn test_unique_output_path() {
    let dir = scratch_dir("unique_output_path");
    let path = dir.join("out.jpg");
    assert_eq!(unique_output_path(&path), path);

    fs::write(&path, "x").unwrap();
    let unique = unique_output_path(&path);
    assert_ne!(unique, path);
    assert!(!unique.exists());
    let other = unique_output_path(&path);
    assert_ne!(unique, other);

    let path = dir.join("noext");
    fs::write(&path, "x").unwrap();
    let unique = unique_output_path(&path);
    assert!(unique
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("noext_"));
    assert!(unique.extension().is_none());
}
