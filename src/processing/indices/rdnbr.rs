// src/processing/indices/rdnbr.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::processing::calculator::{require_both, CalculationContext, IndexCalculator};
use crate::processing::indices::{DnbrCalculator, NbrCalculator};
use crate::raster::{IndexRaster, SpectralRaster};

/// Substituted for a zero `sqrt(|NBR(prefire)|)` denominator
pub const RDNBR_ZERO_DIVISOR: f64 = 0.001;

/// Relativized dNBR (RdNBR) calculator
///
/// `RdNBR = dNBR / sqrt(|NBR(prefire)|)`
pub struct RdnbrCalculator {
    nbr: Arc<NbrCalculator>,
    dnbr: Arc<DnbrCalculator>,
}

impl RdnbrCalculator {
    pub fn new(nbr: Arc<NbrCalculator>, dnbr: Arc<DnbrCalculator>) -> Self {
        Self { nbr, dnbr }
    }

    pub fn nbr(&self) -> &Arc<NbrCalculator> {
        &self.nbr
    }

    pub fn dnbr(&self) -> &Arc<DnbrCalculator> {
        &self.dnbr
    }
}

#[async_trait]
impl IndexCalculator for RdnbrCalculator {
    fn index_name(&self) -> &str {
        "rdnbr"
    }

    fn requires_pre_and_post(&self) -> bool {
        true
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["nbr".into(), "dnbr".into()]
    }

    async fn calculate(
        &self,
        prefire: Option<&SpectralRaster>,
        postfire: Option<&SpectralRaster>,
        context: &CalculationContext,
    ) -> Result<IndexRaster> {
        let (prefire, postfire) = require_both("RdNBR", prefire, postfire)?;

        let prefire_nbr = self.nbr.calculate(Some(prefire), None, context).await?;
        let dnbr = self
            .dnbr
            .calculate(Some(prefire), Some(postfire), context)
            .await?;

        Ok(rdnbr(&dnbr, &prefire_nbr))
    }
}

/// RdNBR from already computed dNBR and prefire NBR rasters.
///
/// Only an exactly zero root is replaced; NaN passes through unchanged.
pub fn rdnbr(dnbr: &IndexRaster, prefire_nbr: &IndexRaster) -> IndexRaster {
    let divisor = prefire_nbr.map(|pre| {
        let root = pre.abs().sqrt();
        if root == 0.0 {
            RDNBR_ZERO_DIVISOR
        } else {
            root
        }
    });
    dnbr.zip_with(&divisor, |d, div| d / div)
}
