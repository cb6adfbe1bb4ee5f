// src/processing/indices/dnbr.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::processing::calculator::{require_both, CalculationContext, IndexCalculator};
use crate::processing::indices::NbrCalculator;
use crate::raster::{IndexRaster, SpectralRaster};

/// Delta NBR (dNBR) calculator
///
/// `dNBR = NBR(prefire) - NBR(postfire)`, evaluated on the spatial overlap of
/// the two periods. Positive values signal burn severity.
pub struct DnbrCalculator {
    nbr: Arc<NbrCalculator>,
}

impl DnbrCalculator {
    pub fn new(nbr: Arc<NbrCalculator>) -> Self {
        Self { nbr }
    }

    pub fn nbr(&self) -> &Arc<NbrCalculator> {
        &self.nbr
    }
}

#[async_trait]
impl IndexCalculator for DnbrCalculator {
    fn index_name(&self) -> &str {
        "dnbr"
    }

    fn requires_pre_and_post(&self) -> bool {
        true
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["nbr".into()]
    }

    async fn calculate(
        &self,
        prefire: Option<&SpectralRaster>,
        postfire: Option<&SpectralRaster>,
        context: &CalculationContext,
    ) -> Result<IndexRaster> {
        let (prefire, postfire) = require_both("dNBR", prefire, postfire)?;

        let prefire_nbr = self.nbr.calculate(Some(prefire), None, context).await?;
        let postfire_nbr = self.nbr.calculate(None, Some(postfire), context).await?;

        Ok(prefire_nbr.zip_with(&postfire_nbr, |pre, post| pre - post))
    }
}
