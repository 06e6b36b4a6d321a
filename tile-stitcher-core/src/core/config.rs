//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use serde::Deserialize;
use std::cmp;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::path::{PathBuf, MAIN_SEPARATOR};
use std::time::Duration;
use tera::{Context, Tera};
use tile_grid::{TilePattern, TileRange};
use toml::Value;

use crate::core::error::StitchError;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ApplicationCfg {
    #[serde(default)]
    pub grid: GridCfg,
    #[serde(default)]
    pub tiles: TilesCfg,
    #[serde(default)]
    pub download: DownloadCfg,
    #[serde(default)]
    pub output: OutputCfg,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct GridCfg {
    /// Zoom level substituted for `Z` in the tile pattern
    pub zoom: Option<u8>,
    /// Width and height of every tile, in pixels
    pub tile_size: Option<u32>,
    /// First column, beginning with 0
    pub xmin: Option<u32>,
    /// Last column (inclusive)
    pub xmax: Option<u32>,
    /// First row, beginning with 0
    pub ymin: Option<u32>,
    /// Last row (inclusive)
    pub ymax: Option<u32>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct TilesCfg {
    /// Tile directory (Default: current directory)
    pub location: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DownloadCfg {
    /// URL prefix, the tile file name is appended
    pub root: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
    /// Maximal number of parallel downloads
    pub threads: Option<usize>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct OutputCfg {
    pub file: Option<String>,
}

pub const DEFAULT_TIMEOUT: u64 = 30;

/// Largest image side a JPEG file can store
pub const MAX_JPEG_DIMENSION: u32 = 65_535;

pub const DEFAULT_CONFIG: &'static str = r#"
[grid]
zoom = 0
tile_size = 256
xmin = 0
xmax = 0
ymin = 0
ymax = 0

[tiles]
#location = "/data/tiles"
pattern = "Z_X_Y.jpg"

#[download]
#root = "https://tiles.example.com/"
#timeout = 30
#threads = 8

#[output]
#file = "/data/stitched.jpg"
"#;

/// Validated settings for tile retrieval and stitching
#[derive(Clone, Debug)]
pub struct StitchConfig {
    pub zoom: u8,
    pub tile_size: u32,
    pub range: TileRange,
    pub pattern: TilePattern,
    /// Tile directory, always ending with a path separator
    pub location: PathBuf,
    pub download_root: Option<String>,
    /// Explicit output file, auto-generated name if `None`
    pub output: Option<PathBuf>,
    /// Skip confirmation prompts
    pub force: bool,
    /// Show progress bars
    pub progress: bool,
    pub timeout: Duration,
    pub threads: usize,
}

impl StitchConfig {
    pub fn new(zoom: u8, tile_size: u32, range: TileRange, location: &str) -> StitchConfig {
        StitchConfig {
            zoom,
            tile_size,
            range,
            pattern: TilePattern::default(),
            location: normalize_location(location),
            download_root: None,
            output: None,
            force: false,
            progress: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            threads: default_threads(),
        }
    }
    /// Pixel size of the stitched image
    pub fn canvas_size(&self) -> Result<(u32, u32), StitchError> {
        match self.range.canvas_size(self.tile_size) {
            Some((width, height))
                if width <= MAX_JPEG_DIMENSION && height <= MAX_JPEG_DIMENSION =>
            {
                Ok((width, height))
            }
            _ => Err(StitchError::Config(format!(
                "Image of {} x {} tiles with {} pixels is too large (max. {} x {} pixels)",
                self.range.columns(),
                self.range.rows(),
                self.tile_size,
                MAX_JPEG_DIMENSION,
                MAX_JPEG_DIMENSION
            ))),
        }
    }
    /// Check values which may have been changed after construction
    pub fn validate(&self) -> Result<(), StitchError> {
        if self.tile_size == 0 {
            return Err(StitchError::Config(
                "TileSize must be larger than 0".to_string(),
            ));
        }
        TileRange::new(
            self.range.xmin,
            self.range.xmax,
            self.range.ymin,
            self.range.ymax,
        )
        .map_err(StitchError::Config)?;
        self.canvas_size()?;
        Ok(())
    }
    /// Download root without surrounding whitespace, `None` if empty
    pub fn download_root(&self) -> Option<&str> {
        self.download_root
            .as_ref()
            .map(|root| root.trim())
            .filter(|root| !root.is_empty())
    }
}

/// Trim, remove quotes and append a trailing path separator
pub fn normalize_location(location: &str) -> PathBuf {
    let mut location = location.replace('"', "").trim().to_string();
    if !location.ends_with(MAIN_SEPARATOR) && !location.ends_with('/') {
        location.push(MAIN_SEPARATOR);
    }
    PathBuf::from(location)
}

pub fn default_threads() -> usize {
    cmp::min(num_cpus::get() * 2, 64)
}

fn required<T: Copy>(value: Option<T>, name: &str) -> Result<T, String> {
    value.ok_or(format!("Missing required option '{}'", name))
}

impl<'a> Config<'a, ApplicationCfg> for StitchConfig {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let grid = &config.grid;
        let zoom = required(grid.zoom, "ZoomLevel")?;
        let tile_size = required(grid.tile_size, "TileSize")?;
        let range = TileRange::new(
            grid.xmin.unwrap_or(0),
            required(grid.xmax, "Xmax")?,
            grid.ymin.unwrap_or(0),
            required(grid.ymax, "Ymax")?,
        )?;

        let location = match config.tiles.location.as_ref() {
            Some(location) if !location.trim().is_empty() => location.clone(),
            _ => env::current_dir()
                .map_err(|e| format!("Current directory not accessible: {}", e))?
                .to_string_lossy()
                .into_owned(),
        };
        let mut stitch_config = StitchConfig::new(zoom, tile_size, range, &location);

        if let Some(pattern) = config.tiles.pattern.as_ref() {
            stitch_config.pattern = TilePattern::new(pattern);
        }
        let missing = stitch_config.pattern.missing_tokens();
        if !missing.is_empty() {
            warn!(
                "Pattern '{}' does not contain {:?}",
                stitch_config.pattern.as_str(),
                missing
            );
        }
        stitch_config.download_root = config
            .download
            .root
            .as_ref()
            .map(|root| root.trim().to_string())
            .filter(|root| !root.is_empty());
        if let Some(timeout) = config.download.timeout {
            stitch_config.timeout = Duration::from_secs(timeout);
        }
        if let Some(threads) = config.download.threads {
            if threads == 0 {
                return Err("Download threads must be larger than 0".to_string());
            }
            stitch_config.threads = threads;
        }
        stitch_config.output = config
            .output
            .file
            .as_ref()
            .map(|file| file.replace('"', "").trim().to_string())
            .filter(|file| !file.is_empty())
            .map(PathBuf::from);

        stitch_config.validate().map_err(|e| match e {
            StitchError::Config(msg) => msg,
            e => e.to_string(),
        })?;
        Ok(stitch_config)
    }
    fn gen_config() -> String {
        DEFAULT_CONFIG.to_string()
    }
}

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let mut env = HashMap::new();
    for (key, value) in env::vars() {
        env.insert(key, value);
    }
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| {
        format!(
            "Template error: {}",
            e.source().map(|s| s.to_string()).unwrap_or(e.to_string())
        )
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
