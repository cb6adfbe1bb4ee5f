// src/config.rs
use serde::{Deserialize, Serialize};

use crate::processing::BandMapping;

/// Settings shared by every severity analysis
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AnalysisSettings {
    #[serde(default = "default_indices")]
    pub indices: Vec<String>,
    #[serde(default = "default_band_mapping")]
    pub band_mapping: BandMapping,
    /// Upper bounds of the unburned, low and moderate classes
    #[serde(default = "default_severity_breaks")]
    pub severity_breaks: Vec<f64>,
    #[serde(default = "default_classification_index")]
    pub classification_index: String,
    #[serde(default = "default_pixel_area_ha")]
    pub pixel_area_ha: f64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            indices: default_indices(),
            band_mapping: default_band_mapping(),
            severity_breaks: default_severity_breaks(),
            classification_index: default_classification_index(),
            pixel_area_ha: default_pixel_area_ha(),
            workers: default_workers(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_indices() -> Vec<String> {
    ["nbr", "dnbr", "rdnbr", "rbr"]
        .into_iter()
        .map(String::from)
        .collect()
}

// Sentinel-2 L2A asset names
fn default_band_mapping() -> BandMapping {
    BandMapping::new("nir", "swir22")
}

fn default_severity_breaks() -> Vec<f64> {
    vec![0.1, 0.27, 0.66]
}

fn default_classification_index() -> String {
    "dnbr".to_string()
}

// 30 m pixels
fn default_pixel_area_ha() -> f64 {
    0.09
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_poll_interval_ms() -> u64 {
    250
}
