//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod form;
pub mod fraction;
pub mod log;
pub mod money;
pub mod rateio;
pub mod session;
pub mod unit;

// Re-export main types for cleaner imports
pub use fraction::{FractionProvider, FractionRecord, FractionTable};
pub use rateio::{CalculationInput, Calculator, CalculatorState, Recalculation};
pub use unit::UnitType;
