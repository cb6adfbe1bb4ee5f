// src/io/writer.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::IndexRasterFile;
use crate::raster::IndexRaster;

/// Written in place of NaN and infinite pixels
pub const NODATA_VALUE: f64 = -9999.0;

pub fn write_index_raster(path: &Path, index_name: &str, raster: &IndexRaster) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let values = raster
        .values()
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|&v| if v.is_finite() { v } else { NODATA_VALUE })
                .collect()
        })
        .collect();

    let file = IndexRasterFile {
        index: index_name.to_string(),
        nodata: NODATA_VALUE,
        y: raster.y().to_vec(),
        x: raster.x().to_vec(),
        values,
    };

    let content = serde_json::to_string(&file)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
