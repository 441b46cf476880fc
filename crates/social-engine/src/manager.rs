//! Per-community engine registry and maintenance plumbing.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use dashmap::DashMap;
use futures::future::join_all;
use tracing::{info, warn};

use crate::engine::SocialGraph;

const DEFAULT_DATA_DIR: &str = "data/graphs";

/// Holds one lock-guarded engine per community.
///
/// Engines are fully independent: distinct communities can be mutated in
/// parallel, while all operations on one community serialize on its mutex
/// (queries included, since they may register users lazily).
pub struct GraphManager {
    data_dir: PathBuf,
    graphs: DashMap<u64, Arc<Mutex<SocialGraph>>>,
}

impl GraphManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            graphs: DashMap::new(),
        }
    }

    /// Storage path from `GRAPH_STORAGE_PATH`, falling back to
    /// `data/graphs`.
    pub fn from_env() -> Self {
        let data_dir =
            std::env::var("GRAPH_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(data_dir)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn community_ids(&self) -> Vec<u64> {
        self.graphs.iter().map(|entry| *entry.key()).collect()
    }

    fn base_path(&self, community_id: u64) -> PathBuf {
        self.data_dir.join(community_id.to_string())
    }

    /// The engine for `community_id`, created empty on first access.
    pub fn graph(&self, community_id: u64) -> Arc<Mutex<SocialGraph>> {
        self.graphs
            .entry(community_id)
            .or_insert_with(|| Arc::new(Mutex::new(SocialGraph::new(self.base_path(community_id)))))
            .clone()
    }

    /// Loads every persisted community found in the data directory.
    /// Community ids are parsed from artifact file stems. Returns how many
    /// engines were restored.
    pub fn load_all(&self) -> Result<usize> {
        if !self.data_dir.exists() {
            return Ok(0);
        }

        let mut ids: BTreeSet<u64> = BTreeSet::new();
        let entries = fs::read_dir(&self.data_dir)
            .with_context(|| format!("reading graph directory {}", self.data_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.split('.').next()) else {
                continue;
            };
            if let Ok(id) = stem.parse::<u64>() {
                ids.insert(id);
            }
        }

        for &id in &ids {
            let graph = SocialGraph::load(self.base_path(id))
                .with_context(|| format!("loading community {id}"))?;
            self.graphs.insert(id, Arc::new(Mutex::new(graph)));
        }

        info!(communities = ids.len(), "social graphs loaded");
        Ok(ids.len())
    }

    /// Persists every tracked community.
    pub fn save_all(&self) -> Result<()> {
        for entry in self.graphs.iter() {
            let mut graph = entry.value().lock().unwrap();
            graph
                .save()
                .with_context(|| format!("saving community {}", entry.key()))?;
        }
        info!(communities = self.graphs.len(), "social graphs saved");
        Ok(())
    }

    /// Recomputes every community on the blocking pool, concurrently. The
    /// per-engine dirty check makes this cheap for idle communities.
    pub async fn update_all(&self) {
        let mut jobs = Vec::with_capacity(self.graphs.len());
        for entry in self.graphs.iter() {
            let graph = Arc::clone(entry.value());
            jobs.push(tokio::task::spawn_blocking(move || {
                graph.lock().unwrap().update();
            }));
        }
        for joined in join_all(jobs).await {
            if let Err(error) = joined {
                warn!(%error, "community update task failed");
            }
        }
    }

    /// Spawns the periodic maintenance loop: an update pass every
    /// `period`, and a save pass every `save_every` updates (0 disables
    /// periodic saves). Shutdown still calls [`Self::save_all`] itself.
    pub fn spawn_maintenance(
        self: &Arc<Self>,
        period: Duration,
        save_every: u32,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;
            loop {
                ticker.tick().await;
                manager.update_all().await;
                ticks = ticks.wrapping_add(1);
                if save_every > 0 && ticks % save_every == 0 {
                    let saver = Arc::clone(&manager);
                    let saved = tokio::task::spawn_blocking(move || saver.save_all()).await;
                    match saved {
                        Ok(Ok(())) => {}
                        Ok(Err(error)) => warn!(%error, "periodic save failed"),
                        Err(error) => warn!(%error, "periodic save task failed"),
                    }
                }
            }
        })
    }
}
