//! Discrete burn severity classes
//!
//! A continuous severity index (typically dNBR) is split into four classes
//! by three upper bounds:
//!
//! | class    | range        |
//! |----------|--------------|
//! | unburned | `[-1, b0)`   |
//! | low      | `[b0, b1)`   |
//! | moderate | `[b1, b2)`   |
//! | high     | `>= b2`      |
//!
//! NaN pixels and values below -1 are left unclassified.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::IndexRaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityClass {
    Unburned,
    Low,
    Moderate,
    High,
}

impl SeverityClass {
    pub const ALL: [SeverityClass; 4] = [
        SeverityClass::Unburned,
        SeverityClass::Low,
        SeverityClass::Moderate,
        SeverityClass::High,
    ];
}

/// Upper bounds of the unburned, low and moderate classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeverityBreaks {
    pub unburned: f64,
    pub low: f64,
    pub moderate: f64,
}

impl SeverityBreaks {
    pub fn new(unburned: f64, low: f64, moderate: f64) -> Result<Self> {
        let breaks = [unburned, low, moderate];
        if breaks.iter().any(|b| !b.is_finite()) || breaks.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidArgument(format!(
                "severity breaks must be finite and non-decreasing, got {breaks:?}"
            )));
        }
        Ok(Self {
            unburned,
            low,
            moderate,
        })
    }

    /// Build from the first three values of `breaks`.
    pub fn from_slice(breaks: &[f64]) -> Result<Self> {
        match breaks {
            [unburned, low, moderate, ..] => Self::new(*unburned, *low, *moderate),
            _ => Err(Error::InvalidArgument(format!(
                "at least three severity breaks are required, got {}",
                breaks.len()
            ))),
        }
    }

    pub fn classify(&self, value: f64) -> Option<SeverityClass> {
        if value.is_nan() || value < -1.0 {
            None
        } else if value < self.unburned {
            Some(SeverityClass::Unburned)
        } else if value < self.low {
            Some(SeverityClass::Low)
        } else if value < self.moderate {
            Some(SeverityClass::Moderate)
        } else {
            Some(SeverityClass::High)
        }
    }
}

/// Pixel statistics for one severity class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    pub class: SeverityClass,
    pub pixel_count: usize,
    pub hectares: f64,
    /// NaN when the class is empty
    pub mean: f64,
}

/// Per-class breakdown of a severity raster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeveritySummary {
    pub index_name: String,
    pub breaks: SeverityBreaks,
    pub classes: Vec<ClassStats>,
    pub unclassified: usize,
}

impl SeveritySummary {
    pub fn from_raster(
        index_name: &str,
        raster: &IndexRaster,
        breaks: SeverityBreaks,
        pixel_area_ha: f64,
    ) -> Self {
        let mut counts = [0usize; 4];
        let mut sums = [0.0f64; 4];
        let mut unclassified = 0;

        for &value in raster.values().iter() {
            match breaks.classify(value) {
                Some(class) => {
                    let slot = class as usize;
                    counts[slot] += 1;
                    sums[slot] += value;
                }
                None => unclassified += 1,
            }
        }

        let classes = SeverityClass::ALL
            .iter()
            .map(|&class| {
                let slot = class as usize;
                let pixel_count = counts[slot];
                ClassStats {
                    class,
                    pixel_count,
                    hectares: pixel_count as f64 * pixel_area_ha,
                    mean: if pixel_count > 0 {
                        sums[slot] / pixel_count as f64
                    } else {
                        f64::NAN
                    },
                }
            })
            .collect();

        Self {
            index_name: index_name.to_string(),
            breaks,
            classes,
            unclassified,
        }
    }

    pub fn class(&self, class: SeverityClass) -> Option<&ClassStats> {
        self.classes.iter().find(|stats| stats.class == class)
    }
}
