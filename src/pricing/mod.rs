//! Monthly cost estimation for fulfillment + marketplace commission.

pub mod calculator;
pub mod discount;

pub use calculator::{CalculationResult, PricingCalculator};
