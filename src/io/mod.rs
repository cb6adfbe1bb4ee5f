// src/io/mod.rs
pub mod reader;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use reader::{read_index_raster, read_spectral_raster};
pub use writer::{write_index_raster, NODATA_VALUE};

/// On-disk layout of a spectral raster: flat values in `(band, y, x, time)`
/// order, `null` for missing samples.
#[derive(Deserialize, Serialize, Debug)]
pub struct SpectralRasterFile {
    pub bands: Vec<String>,
    pub y: Vec<f64>,
    pub x: Vec<f64>,
    pub times: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// On-disk layout of an index raster: one array per row
#[derive(Deserialize, Serialize, Debug)]
pub struct IndexRasterFile {
    pub index: String,
    pub nodata: f64,
    pub y: Vec<f64>,
    pub x: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}
