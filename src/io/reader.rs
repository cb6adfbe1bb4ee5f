// src/io/reader.rs
use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4};
use std::fs;
use std::path::Path;

use super::{IndexRasterFile, SpectralRasterFile};
use crate::raster::{IndexRaster, SpectralRaster};

pub fn read_spectral_raster(path: &Path) -> Result<SpectralRaster> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read spectral raster {}", path.display()))?;
    let file: SpectralRasterFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid spectral raster document {}", path.display()))?;

    let shape = (file.bands.len(), file.y.len(), file.x.len(), file.times.len());
    let values = file
        .values
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let data = Array4::from_shape_vec(shape, values)
        .with_context(|| format!("Value count doesn't match labels in {}", path.display()))?;

    Ok(SpectralRaster::new(data, file.bands, file.y, file.x, file.times)?)
}

/// Read an index raster, turning nodata pixels back into NaN.
pub fn read_index_raster(path: &Path) -> Result<(String, IndexRaster)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read index raster {}", path.display()))?;
    let file: IndexRasterFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid index raster document {}", path.display()))?;

    let rows = file.values.len();
    let cols = file.x.len();
    if let Some((i, row)) = file.values.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(anyhow!(
            "Row {i} has {} values, expected {cols} in {}",
            row.len(),
            path.display()
        ));
    }
    let values: Vec<f64> = file
        .values
        .into_iter()
        .flatten()
        .map(|v| if v == file.nodata { f64::NAN } else { v })
        .collect();
    let values = Array2::from_shape_vec((rows, cols), values)
        .with_context(|| format!("Row count doesn't match labels in {}", path.display()))?;

    Ok((file.index, IndexRaster::new(values, file.y, file.x)?))
}
