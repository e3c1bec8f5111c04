//! PricingCalculator — itemized monthly cost for a marketplace seller.
//!
//! Pure over the injected tariff tables: no I/O, no interior state, safe to
//! share behind an `Arc` between any number of tasks.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;

use super::discount::volume_discount;
use crate::tariffs::{MarketplaceTariff, RateType, ServiceTariff, TariffSource};

/// Order value assumed by `percentage` services. Independent of the
/// marketplace's own average order value.
pub const PERCENTAGE_BASE_ORDER_VALUE: f64 = 1000.0;

/// Cost line for one selected service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCost {
    pub code: String,
    pub name: String,
    pub cost: f64,
    pub rate: f64,
    pub rate_type: RateType,
}

/// Itemized estimate. Totals are derived from the lines, never set apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub marketplace: String,
    pub orders_count: i64,
    pub volume_discount: f64,
    pub effective_commission_rate: f64,
    pub marketplace_commission: f64,
    pub services: Vec<ServiceCost>,
    pub total_service_cost: f64,
    pub total_cost: f64,
    pub cost_per_order: f64,
}

impl CalculationResult {
    #[cfg(test)]
    pub fn service(&self, code: &str) -> Option<&ServiceCost> {
        self.services.iter().find(|s| s.code == code)
    }
}

/// Fulfillment cost calculator over a tariff source.
pub struct PricingCalculator<S: TariffSource> {
    tariffs: Arc<S>,
}

impl<S: TariffSource> Clone for PricingCalculator<S> {
    fn clone(&self) -> Self {
        Self {
            tariffs: self.tariffs.clone(),
        }
    }
}

impl<S: TariffSource> PricingCalculator<S> {
    pub fn new(tariffs: Arc<S>) -> Self {
        Self { tariffs }
    }

    pub fn tariffs(&self) -> &S {
        &self.tariffs
    }

    /// Marketplace terms, or the 10% / 1000 baseline for unknown codes.
    pub fn marketplace_or_default(&self, code: &str) -> Cow<'_, MarketplaceTariff> {
        self.tariffs
            .marketplace_tariff(code)
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(MarketplaceTariff::fallback(code)))
    }

    /// Service terms, or a zero-rate per-order record for unknown codes.
    pub fn service_or_default(&self, code: &str) -> Cow<'_, ServiceTariff> {
        self.tariffs
            .service_tariff(code)
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(ServiceTariff::fallback(code)))
    }

    /// Estimate the monthly cost of selling `orders_count` orders on
    /// `marketplace` with the given services.
    ///
    /// Never fails: unknown codes price at their defaults and a non-positive
    /// order count produces a degenerate but consistent result. Repeated
    /// service codes are counted once, at their first position.
    pub fn calculate<I, T>(&self, marketplace: &str, orders_count: i64, selected_services: I) -> CalculationResult
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mp = self.marketplace_or_default(marketplace);
        let discount = volume_discount(orders_count);
        let effective_rate = mp.commission_rate * (1.0 - discount);
        let orders = orders_count as f64;
        let marketplace_commission = orders * mp.average_order_value * effective_rate;

        let mut services: Vec<ServiceCost> = Vec::new();
        for code in selected_services {
            let code = code.as_ref();
            if services.iter().any(|s| s.code == code) {
                continue;
            }
            let tariff = self.service_or_default(code);
            services.push(ServiceCost {
                code: code.to_string(),
                name: tariff.name.clone(),
                cost: service_cost(&tariff, orders_count),
                rate: tariff.rate,
                rate_type: tariff.rate_type,
            });
        }

        let total_service_cost: f64 = services.iter().map(|s| s.cost).sum();
        let total_cost = marketplace_commission + total_service_cost;
        let cost_per_order = if orders_count > 0 { total_cost / orders } else { 0.0 };

        CalculationResult {
            marketplace: marketplace.to_string(),
            orders_count,
            volume_discount: discount,
            effective_commission_rate: effective_rate,
            marketplace_commission,
            services,
            total_service_cost,
            total_cost,
            cost_per_order,
        }
    }
}

/// Monthly cost of one service at the given volume.
///
/// `per_item` has no volume rule and prices at zero, like any unsupported tag.
pub fn service_cost(tariff: &ServiceTariff, orders_count: i64) -> f64 {
    let orders = orders_count as f64;
    match tariff.rate_type {
        RateType::PerOrder => tariff.rate * orders,
        RateType::Monthly => tariff.rate,
        RateType::Percentage => tariff.rate * orders * PERCENTAGE_BASE_ORDER_VALUE,
        RateType::PerItem | RateType::Unsupported => 0.0,
    }
}
