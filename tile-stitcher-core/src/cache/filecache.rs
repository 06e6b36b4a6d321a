//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const PART_EXTENSION: &str = "part";

/// Flat directory of tile files
#[derive(Clone, Debug)]
pub struct Filecache {
    pub basepath: PathBuf,
}

impl Filecache {
    pub fn new<P: Into<PathBuf>>(basepath: P) -> Filecache {
        Filecache {
            basepath: basepath.into(),
        }
    }
    pub fn path(&self, name: &str) -> PathBuf {
        self.basepath.join(name)
    }
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
    /// Store a tile. The file appears under its final name only when complete.
    pub fn write(&self, name: &str, obj: &[u8]) -> Result<(), io::Error> {
        let fullpath = self.path(name);
        debug!("Filecache.write {}", fullpath.display());
        if let Some(parent) = fullpath.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&fullpath, |f| f.write_all(obj))
    }
}

/// Hidden temporary file `.<name>.<uuid>.part` next to `path`.
/// Every call returns a new name, so concurrent writers never share one.
pub fn part_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.{}.{}",
        name,
        Uuid::new_v4(),
        PART_EXTENSION
    ))
}

/// Write into a private part file and rename it to `path` on success.
/// On failure the part file is removed.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), io::Error>
where
    F: FnOnce(&mut File) -> Result<(), io::Error>,
{
    let partpath = part_path(path);
    let result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&partpath)
        .and_then(|mut f| {
            write(&mut f)?;
            f.sync_all()
        })
        .and_then(|_| fs::rename(&partpath, path));
    if result.is_err() {
        let _ = fs::remove_file(&partpath);
    }
    result
}
