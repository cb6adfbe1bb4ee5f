// src/lib.rs
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod jobs;
pub mod processing;
pub mod raster;
pub mod severity;

pub use error::{Error, Result};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
