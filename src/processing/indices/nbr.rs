// src/processing/indices/nbr.rs
use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::processing::calculator::{CalculationContext, IndexCalculator, NIR, SWIR};
use crate::raster::{IndexRaster, SpectralRaster};

/// Normalized Burn Ratio (NBR) calculator
///
/// `NBR = (NIR - SWIR) / (NIR + SWIR)` over exactly one period. Each band is
/// reduced to its per-pixel temporal median first. The division is not
/// guarded: a pixel with `NIR + SWIR == 0` comes out non-finite.
#[derive(Debug, Default)]
pub struct NbrCalculator;

impl NbrCalculator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IndexCalculator for NbrCalculator {
    fn index_name(&self) -> &str {
        "nbr"
    }

    fn requires_pre_and_post(&self) -> bool {
        false
    }

    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    async fn calculate(
        &self,
        prefire: Option<&SpectralRaster>,
        postfire: Option<&SpectralRaster>,
        context: &CalculationContext,
    ) -> Result<IndexRaster> {
        let data = match (prefire, postfire) {
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "NBR calculation requires either prefire or postfire data".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(
                    "NBR calculation should receive only one period of data, not both".into(),
                ))
            }
            (Some(data), None) | (None, Some(data)) => data,
        };

        let band_mapping = context.band_mapping()?;
        let nir_band = band_mapping.require(NIR)?;
        let swir_band = band_mapping.require(SWIR)?;

        let nir = data.median_over_time(nir_band)?;
        let swir = data.median_over_time(swir_band)?;
        debug!(nir_band, swir_band, shape = ?nir.shape(), "computing NBR");

        Ok(nir.zip_with(&swir, |n, s| (n - s) / (n + s)))
    }
}
