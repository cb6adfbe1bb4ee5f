//! Destinations for computed index rasters
//!
//! The asset store stands in for object storage and the catalog: it accepts
//! a raster under a key and answers with the URL the result can be fetched
//! from.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::io::write_index_raster;
use crate::raster::IndexRaster;

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist `raster` under `key`, returning its URL.
    async fn put_raster(&self, key: &str, index_name: &str, raster: &IndexRaster)
        -> Result<String>;
}

/// Keeps rasters in memory; URLs use the `memory://` scheme.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: Mutex<HashMap<String, IndexRaster>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<IndexRaster> {
        self.assets.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.assets.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.lock().is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn put_raster(
        &self,
        key: &str,
        _index_name: &str,
        raster: &IndexRaster,
    ) -> Result<String> {
        self.assets.lock().insert(key.to_string(), raster.clone());
        Ok(format!("memory://{key}"))
    }
}

/// Writes each raster as `<root>/<key>.json`.
pub struct DirectoryAssetStore {
    root: PathBuf,
}

impl DirectoryAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetStore for DirectoryAssetStore {
    async fn put_raster(
        &self,
        key: &str,
        index_name: &str,
        raster: &IndexRaster,
    ) -> Result<String> {
        let path = self.root.join(format!("{key}.json"));
        let url = path.display().to_string();
        let index_name = index_name.to_string();
        let raster = raster.clone();

        tokio::task::spawn_blocking(move || write_index_raster(&path, &index_name, &raster))
            .await
            .map_err(|e| Error::Storage(format!("Asset writer task failed: {e}")))?
            .map_err(|e| Error::Storage(format!("{e:#}")))?;
        Ok(url)
    }
}
