//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors terminating a run
#[derive(Error, Debug)]
pub enum StitchError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Error initializing downloader: {0}")]
    Runtime(String),
    #[error("Error writing output file {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error encoding output file {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors of a single grid cell. Collected, never fatal.
#[derive(Error, Debug)]
pub enum TileError {
    #[error("Error downloading {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("Error writing tile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error decoding tile {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Download task failed: {0}")]
    Task(String),
}
