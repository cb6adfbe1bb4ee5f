// src/processing/indices/rbr.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::processing::calculator::{require_both, CalculationContext, IndexCalculator};
use crate::processing::indices::{DnbrCalculator, NbrCalculator};
use crate::raster::{IndexRaster, SpectralRaster};

/// Offset keeping the RBR denominator positive for NBR in [-1, 1]
pub const RBR_OFFSET: f64 = 1.001;

/// Relativized Burn Ratio (RBR) calculator
///
/// `RBR = dNBR / (NBR(prefire) + 1.001)`
pub struct RbrCalculator {
    nbr: Arc<NbrCalculator>,
    dnbr: Arc<DnbrCalculator>,
}

impl RbrCalculator {
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
impl IndexCalculator for RbrCalculator {
    fn index_name(&self) -> &str {
        "rbr"
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
        let (prefire, postfire) = require_both("RBR", prefire, postfire)?;

        let prefire_nbr = self.nbr.calculate(Some(prefire), None, context).await?;
        let dnbr = self
            .dnbr
            .calculate(Some(prefire), Some(postfire), context)
            .await?;

        Ok(rbr(&dnbr, &prefire_nbr))
    }
}

/// RBR from already computed dNBR and prefire NBR rasters.
pub fn rbr(dnbr: &IndexRaster, prefire_nbr: &IndexRaster) -> IndexRaster {
    dnbr.zip_with(prefire_nbr, |d, pre| d / (pre + RBR_OFFSET))
}
