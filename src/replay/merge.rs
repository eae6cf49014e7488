//! k-way time-ordered merge across tick-file readers (C8).
//!
//! A linear scan for the minimum pending timestamp, not a heap — the
//! number of open files is small enough (one per subsource) that the
//! simpler structure wins.

use std::path::PathBuf;

use crate::error::Result;
use crate::replay::tickfile::{Tick, TickFileReader};

/// Merges `N` tick-file readers into a single stream non-decreasing in
/// `receiveTime`, ties broken by the lowest file index.
pub struct MergeEngine {
    readers: Vec<TickFileReader<tokio::fs::File>>,
    paths: Vec<PathBuf>,
    pending: Vec<Option<Tick>>,
    delete_when_done: bool,
}

impl MergeEngine {
    /// Open every path and prime one pending tick per file.
    pub async fn new(paths: Vec<PathBuf>, delete_when_done: bool) -> Result<Self> {
        let mut readers = Vec::with_capacity(paths.len());
        let mut pending = Vec::with_capacity(paths.len());

        for path in &paths {
            let file = tokio::fs::File::open(path).await?;
            let mut reader = TickFileReader::new(file);
            let first = reader.next_tick().await?;
            readers.push(reader);
            pending.push(first);
        }

        Ok(Self { readers, paths, pending, delete_when_done })
    }

    /// Yield the next tick in timestamp order, refilling its source file.
    /// Returns `Ok(None)` once every file is exhausted; deletes the backing
    /// files first if `delete_when_done` was set.
    pub async fn next(&mut self) -> Result<Option<Tick>> {
        let mut min_idx: Option<usize> = None;
        for (i, slot) in self.pending.iter().enumerate() {
            let Some(tick) = slot else { continue };
            let replace = match min_idx {
                None => true,
                Some(j) => tick.receive_time < self.pending[j].as_ref().unwrap().receive_time,
            };
            if replace {
                min_idx = Some(i);
            }
        }

        let Some(k) = min_idx else {
            self.cleanup().await;
            return Ok(None);
        };

        let tick = self.pending[k].take().expect("min_idx only points at an occupied slot");
        self.pending[k] = self.readers[k].next_tick().await?;
        Ok(Some(tick))
    }

    async fn cleanup(&self) {
        if !self.delete_when_done {
            return;
        }
        for path in &self.paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(error = %e, path = ?path, "failed to delete replay tick file");
            }
        }
    }
}
