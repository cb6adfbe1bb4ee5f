// src/processing/registry.rs
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::processing::calculator::IndexCalculator;
use crate::processing::indices::{DnbrCalculator, NbrCalculator, RbrCalculator, RdnbrCalculator};

/// The default calculator set, wired so that every composite shares one NBR
/// and one dNBR instance.
pub struct DefaultCalculators {
    pub nbr: Arc<NbrCalculator>,
    pub dnbr: Arc<DnbrCalculator>,
    pub rdnbr: Arc<RdnbrCalculator>,
    pub rbr: Arc<RbrCalculator>,
}

impl DefaultCalculators {
    pub fn wire() -> Self {
        let nbr = Arc::new(NbrCalculator::new());
        let dnbr = Arc::new(DnbrCalculator::new(Arc::clone(&nbr)));
        let rdnbr = Arc::new(RdnbrCalculator::new(Arc::clone(&nbr), Arc::clone(&dnbr)));
        let rbr = Arc::new(RbrCalculator::new(Arc::clone(&nbr), Arc::clone(&dnbr)));
        Self {
            nbr,
            dnbr,
            rdnbr,
            rbr,
        }
    }

    /// Registration order: nbr, dnbr, rdnbr, rbr
    fn into_calculators(self) -> Vec<Arc<dyn IndexCalculator>> {
        vec![
            self.nbr as Arc<dyn IndexCalculator>,
            self.dnbr,
            self.rdnbr,
            self.rbr,
        ]
    }
}

/// Registry of index calculators keyed by index name.
///
/// Entries keep their insertion order. Mutation takes `&mut self`; share a
/// registry across tasks only after setup is finished.
pub struct IndexRegistry {
    calculators: Vec<(String, Arc<dyn IndexCalculator>)>,
}

impl IndexRegistry {
    /// Create a registry populated with the default calculators.
    pub fn new() -> Self {
        info!("Initializing IndexRegistry");
        Self::from_wiring(DefaultCalculators::wire())
    }

    pub fn from_wiring(wiring: DefaultCalculators) -> Self {
        let mut registry = Self::empty();
        for calculator in wiring.into_calculators() {
            registry
                .calculators
                .push((calculator.index_name().to_string(), calculator));
        }
        info!(
            "Registered {} index calculators: [{}]",
            registry.calculators.len(),
            registry.calculators.iter().map(|(name, _)| name).join(", ")
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            calculators: Vec::new(),
        }
    }

    fn position(&self, index_name: &str) -> Option<usize> {
        self.calculators
            .iter()
            .position(|(name, _)| name == index_name)
    }

    /// Look up a calculator by index name. A miss is logged, not an error.
    pub fn get_calculator(&self, index_name: &str) -> Option<Arc<dyn IndexCalculator>> {
        match self.position(index_name) {
            Some(idx) => Some(Arc::clone(&self.calculators[idx].1)),
            None => {
                warn!(
                    "Calculator for index '{}' not found. Available: [{}]",
                    index_name,
                    self.get_available_indices().join(", ")
                );
                None
            }
        }
    }

    pub fn get_available_indices(&self) -> Vec<String> {
        self.calculators.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Register a new calculator. Never overwrites an existing entry.
    pub fn add_calculator(&mut self, calculator: Arc<dyn IndexCalculator>) -> Result<()> {
        let index_name = calculator.index_name().to_string();
        if self.position(&index_name).is_some() {
            return Err(Error::AlreadyExists(index_name));
        }

        info!("Added new calculator for index '{}'", index_name);
        self.calculators.push((index_name, calculator));
        Ok(())
    }

    /// Substitute the calculator registered under `index_name`, keeping its
    /// position.
    pub fn replace_calculator(
        &mut self,
        index_name: &str,
        calculator: Arc<dyn IndexCalculator>,
    ) -> Result<()> {
        if calculator.index_name() != index_name {
            return Err(Error::NameMismatch {
                expected: index_name.to_string(),
                found: calculator.index_name().to_string(),
            });
        }

        let idx = self
            .position(index_name)
            .ok_or_else(|| Error::NotFound(index_name.to_string()))?;
        self.calculators[idx].1 = calculator;
        info!("Replaced calculator for index '{}'", index_name);
        Ok(())
    }

    /// Remove a calculator; returns `false` when nothing was registered.
    pub fn remove_calculator(&mut self, index_name: &str) -> bool {
        match self.position(index_name) {
            Some(idx) => {
                self.calculators.remove(idx);
                info!("Removed calculator for index '{}'", index_name);
                true
            }
            None => {
                warn!(
                    "Calculator for index '{}' not found, nothing to remove",
                    index_name
                );
                false
            }
        }
    }

    pub fn get_calculators_requiring_both_periods(&self) -> Vec<String> {
        self.calculators
            .iter()
            .filter(|(_, calc)| calc.requires_pre_and_post())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Snapshot of the dependency graph, one entry per registered calculator.
    pub fn get_calculators_with_dependencies(&self) -> BTreeMap<String, Vec<String>> {
        self.calculators
            .iter()
            .map(|(name, calc)| (name.clone(), calc.dependencies()))
            .collect()
    }

    /// Check that every declared dependency names a registered calculator.
    ///
    /// This is a health check: an unsatisfied dependency is reported through
    /// the return value and the log, never as an error.
    pub fn validate_dependencies(&self) -> bool {
        let available: HashSet<&str> = self
            .calculators
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();

        for (name, calc) in &self.calculators {
            let missing: Vec<String> = calc
                .dependencies()
                .into_iter()
                .filter(|dep| !available.contains(dep.as_str()))
                .unique()
                .collect();

            if !missing.is_empty() {
                error!(
                    "Calculator '{}' has unsatisfied dependencies: [{}]",
                    name,
                    missing.join(", ")
                );
                return false;
            }
        }

        debug!("All calculator dependencies are satisfied");
        true
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}
