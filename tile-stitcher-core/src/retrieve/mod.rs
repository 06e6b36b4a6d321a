//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Download of missing tiles

use crate::cache::Filecache;
use crate::core::{StitchConfig, StitchError, TileError};
use pbr::ProgressBar;
use std::cmp;
use std::fmt;
use std::io::Stdout;
use tokio::task::{self, JoinError};


/// Outcome of a retrieval pass
#[derive(Debug, Default)]
pub struct RetrievalReport {
    /// Tiles downloaded
    pub fetched: usize,
    /// Tiles already present locally
    pub skipped: usize,
    pub failed: Vec<TileError>,
}

impl RetrievalReport {
    fn record(&mut self, outcome: Result<Result<(), TileError>, JoinError>) {
        match outcome {
            Ok(Ok(())) => self.fetched += 1,
            Ok(Err(e)) => {
                error!("{}", e);
                self.failed.push(e);
            }
            Err(e) => {
                error!("Download task failed: {}", e);
                self.failed.push(TileError::Task(e.to_string()));
            }
        }
    }
}

impl fmt::Display for RetrievalReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} tiles downloaded, {} already present, {} failed",
            self.fetched,
            self.skipped,
            self.failed.len()
        )
    }
}

/// Fetches tiles from `download_root + filename` into the tile directory
pub struct Retriever {
    config: StitchConfig,
    cache: Filecache,
}

impl Retriever {
    pub fn new(config: &StitchConfig) -> Retriever {
        Retriever {
            config: config.clone(),
            cache: Filecache::new(&config.location),
        }
    }
    /// Download all tiles of the range which are not present locally.
    ///
    /// Failing tiles are collected in the report and do not stop the others.
    pub fn retrieve(&self) -> Result<RetrievalReport, StitchError> {
        self.config.validate()?;
        let mut report = RetrievalReport::default();
        let root = match self.config.download_root() {
            Some(root) => root,
            None => {
                warn!("No download root given, skipping download");
                return Ok(report);
            }
        };
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| StitchError::Runtime(e.to_string()))?;
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| StitchError::Runtime(format!("Couldn't initialize tokio runtime: {}", e)))?;
        rt.block_on(self.retrieve_tiles(&client, root, &mut report));
        if self.config.progress {
            println!("");
        }
        Ok(report)
    }
    async fn retrieve_tiles(
        &self,
        client: &reqwest::Client,
        root: &str,
        report: &mut RetrievalReport,
    ) {
        // Keep a queue of downloads waiting for parallel async execution
        let task_queue_size = cmp::max(self.config.threads, 1);
        let mut tasks = Vec::with_capacity(task_queue_size);
        let mut pb = self.progress_bar();
        for (x, y) in self.config.range.cells() {
            let filename = self.config.pattern.filename(self.config.zoom, x, y);
            if self.cache.exists(&filename) {
                debug!("File [EXISTS]: {}", self.cache.path(&filename).display());
                report.skipped += 1;
            } else {
                let url = format!("{}{}", root, filename);
                let client = client.clone();
                let cache = self.cache.clone();
                tasks.push(task::spawn(fetch_tile(client, cache, url, filename)));
                if tasks.len() >= task_queue_size {
                    let (outcome, _index, remaining) =
                        futures_util::future::select_all(tasks).await;
                    report.record(outcome);
                    tasks = remaining;
                }
            }
            if let Some(pb) = pb.as_mut() {
                pb.inc();
            }
        }
        // Finish remaining downloads
        for outcome in futures_util::future::join_all(tasks).await {
            report.record(outcome);
        }
        if let Some(pb) = pb.as_mut() {
            pb.finish();
        }
    }
    fn progress_bar(&self) -> Option<ProgressBar<Stdout>> {
        if !self.config.progress {
            return None;
        }
        let mut pb = ProgressBar::new(self.config.range.len());
        pb.message("Download: ");
        pb.show_speed = false;
        pb.show_percent = false;
        pb.show_time_left = false;
        Some(pb)
    }
}

async fn fetch_tile(
    client: reqwest::Client,
    cache: Filecache,
    url: String,
    filename: String,
) -> Result<(), TileError> {
    info!("Downloading {}", url);
    let network_error = |e: reqwest::Error| TileError::Network {
        url: url.clone(),
        reason: e.to_string(),
    };
    let body = client
        .get(&url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(network_error)?
        .bytes()
        .await
        .map_err(network_error)?;
    cache
        .write(&filename, &body)
        .map_err(|source| TileError::Io {
            path: cache.path(&filename),
            source,
        })?;
    debug!("Downloading {} done.", url);
    Ok(())
}
