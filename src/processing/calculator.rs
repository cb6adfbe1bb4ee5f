// src/processing/calculator.rs
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::{IndexRaster, SpectralRaster};

/// Band role for near-infrared reflectance
pub const NIR: &str = "nir";
/// Band role for shortwave-infrared reflectance
pub const SWIR: &str = "swir";

/// Trait implemented by every spectral index.
///
/// Calculators are immutable once built; composite indices hold shared
/// handles to the calculators they depend on and call them directly.
#[async_trait]
pub trait IndexCalculator: Send + Sync {
    /// Stable identity, used as registry key and result label
    fn index_name(&self) -> &str;

    /// Whether `calculate` needs both periods at once
    fn requires_pre_and_post(&self) -> bool;

    /// Names of the indices this one invokes internally
    fn dependencies(&self) -> Vec<String>;

    async fn calculate(
        &self,
        prefire: Option<&SpectralRaster>,
        postfire: Option<&SpectralRaster>,
        context: &CalculationContext,
    ) -> Result<IndexRaster>;
}

/// Association between semantic band roles (`nir`, `swir`) and the band
/// identifiers of a given raster source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandMapping(BTreeMap<String, String>);

impl BandMapping {
    pub fn new(nir: impl Into<String>, swir: impl Into<String>) -> Self {
        let mut mapping = Self::default();
        mapping.insert(NIR, nir);
        mapping.insert(SWIR, swir);
        mapping
    }

    pub fn insert(&mut self, role: impl Into<String>, band: impl Into<String>) {
        self.0.insert(role.into(), band.into());
    }

    /// Band identifier for `role`; empty identifiers count as absent.
    pub fn get(&self, role: &str) -> Option<&str> {
        self.0
            .get(role)
            .map(String::as_str)
            .filter(|band| !band.is_empty())
    }

    /// Band identifier for `role`, or `MissingConfiguration`.
    pub fn require(&self, role: &str) -> Result<&str> {
        self.get(role).ok_or_else(|| {
            Error::MissingConfiguration(format!("Band mapping must include '{role}' band"))
        })
    }
}

impl<R: Into<String>, B: Into<String>> FromIterator<(R, B)> for BandMapping {
    fn from_iter<T: IntoIterator<Item = (R, B)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(role, band)| (role.into(), band.into()))
                .collect(),
        )
    }
}

/// Per-call context handed to every calculator
#[derive(Debug, Clone, Default)]
pub struct CalculationContext {
    band_mapping: Option<BandMapping>,
    attributes: BTreeMap<String, String>,
}

impl CalculationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_band_mapping(mut self, band_mapping: BandMapping) -> Self {
        self.band_mapping = Some(band_mapping);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn band_mapping(&self) -> Result<&BandMapping> {
        self.band_mapping
            .as_ref()
            .ok_or_else(|| Error::MissingConfiguration("Context must include 'band_mapping'".into()))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Unwrap both periods for calculators that need a prefire/postfire pair.
pub(crate) fn require_both<'a>(
    index_name: &str,
    prefire: Option<&'a SpectralRaster>,
    postfire: Option<&'a SpectralRaster>,
) -> Result<(&'a SpectralRaster, &'a SpectralRaster)> {
    let prefire = prefire.ok_or_else(|| {
        Error::InvalidArgument(format!("{index_name} calculation requires prefire data"))
    })?;
    let postfire = postfire.ok_or_else(|| {
        Error::InvalidArgument(format!("{index_name} calculation requires postfire data"))
    })?;
    Ok((prefire, postfire))
}
