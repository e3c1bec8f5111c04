//! Reference tariff tables for marketplaces and fulfillment services.

pub mod book;
pub mod model;

pub use book::TariffBook;
pub use model::{MarketplaceTariff, RateType, ServiceTariff};

/// Read-only lookups the pricing calculator consumes.
pub trait TariffSource: Send + Sync {
    fn marketplace_tariff(&self, code: &str) -> Option<&MarketplaceTariff>;

    fn service_tariff(&self, code: &str) -> Option<&ServiceTariff>;
}
