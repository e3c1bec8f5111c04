//! In-memory tariff tables, loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{MarketplaceTariff, ServiceTariff};
use super::TariffSource;
use crate::error::{BotError, Result};

/// Tariff table compiled into the binary.
const BUNDLED_TARIFFS: &str = include_str!("../../config/tariffs.toml");

#[derive(Debug, Deserialize)]
struct TariffFile {
    #[serde(default)]
    marketplaces: Vec<MarketplaceTariff>,
    #[serde(default)]
    services: Vec<ServiceTariff>,
}

/// Immutable marketplace and service tables.
///
/// Entries keep their declaration order, which drives keyboard layout and
/// the assistant prompt. Lookups go through a code index.
#[derive(Debug, Clone, Serialize)]
pub struct TariffBook {
    marketplaces: Vec<MarketplaceTariff>,
    services: Vec<ServiceTariff>,
    #[serde(skip)]
    marketplace_index: HashMap<String, usize>,
    #[serde(skip)]
    service_index: HashMap<String, usize>,
}

impl TariffBook {
    pub fn new(marketplaces: Vec<MarketplaceTariff>, services: Vec<ServiceTariff>) -> Result<Self> {
        let marketplace_index = index_by_code(marketplaces.iter().map(|m| m.code.as_str()), "marketplace")?;
        let service_index = index_by_code(services.iter().map(|s| s.code.as_str()), "service")?;

        for mp in &marketplaces {
            if !(0.0..1.0).contains(&mp.commission_rate) {
                return Err(BotError::Tariffs(format!(
                    "marketplace {:?}: commission_rate {} outside [0, 1)",
                    mp.code, mp.commission_rate
                )));
            }
            if mp.average_order_value <= 0.0 {
                return Err(BotError::Tariffs(format!(
                    "marketplace {:?}: average_order_value must be positive",
                    mp.code
                )));
            }
        }
        for svc in &services {
            if svc.rate < 0.0 {
                return Err(BotError::Tariffs(format!(
                    "service {:?}: negative rate {}",
                    svc.code, svc.rate
                )));
            }
        }

        Ok(Self {
            marketplaces,
            services,
            marketplace_index,
            service_index,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: TariffFile = toml::from_str(s)?;
        Self::new(file.marketplaces, file.services)
    }

    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_TARIFFS)
    }

    /// Load from `path`, or fall back to the bundled table if the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let book = match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "tariff file not found, using bundled tariffs");
                Self::bundled()?
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            marketplaces = book.marketplaces.len(),
            services = book.services.len(),
            "tariff tables loaded"
        );
        Ok(book)
    }

    pub fn marketplaces(&self) -> &[MarketplaceTariff] {
        &self.marketplaces
    }

    pub fn services(&self) -> &[ServiceTariff] {
        &self.services
    }
}

impl TariffSource for TariffBook {
    fn marketplace_tariff(&self, code: &str) -> Option<&MarketplaceTariff> {
        self.marketplace_index.get(code).map(|&i| &self.marketplaces[i])
    }

    fn service_tariff(&self, code: &str) -> Option<&ServiceTariff> {
        self.service_index.get(code).map(|&i| &self.services[i])
    }
}

fn index_by_code<'a>(
    codes: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, code) in codes.enumerate() {
        if code.is_empty() {
            return Err(BotError::Tariffs(format!("{kind} #{i} has an empty code")));
        }
        if index.insert(code.to_string(), i).is_some() {
            return Err(BotError::Tariffs(format!("duplicate {kind} code {code:?}")));
        }
    }
    Ok(index)
}
