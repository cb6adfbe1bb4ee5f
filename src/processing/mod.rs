// src/processing/mod.rs
pub mod calculator;
pub mod indices;
pub mod registry;

// Re-export main components
pub use calculator::{BandMapping, CalculationContext, IndexCalculator};
pub use registry::{DefaultCalculators, IndexRegistry};
