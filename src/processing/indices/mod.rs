// src/processing/indices/mod.rs
pub mod nbr;
pub mod dnbr;
pub mod rbr;
pub mod rdnbr;

// Re-export indices
pub use nbr::NbrCalculator;
pub use dnbr::DnbrCalculator;
pub use rbr::RbrCalculator;
pub use rdnbr::RdnbrCalculator;
