// Pricing Calculator
//
// Pure function over non-negative inputs; callers reject negative or
// missing values before invoking it.

use crate::domain::PrintMethod;
use serde::{Deserialize, Serialize};

/// Lab pricing knobs (currency units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub filament_rate_per_gram: f64,
    pub resin_rate_per_gram: f64,
    pub machine_rate_per_hour: f64,
    pub minimum_charge: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            filament_rate_per_gram: 0.10,
            resin_rate_per_gram: 0.20,
            machine_rate_per_hour: 2.00,
            minimum_charge: 3.00,
        }
    }
}

impl PricingConfig {
    fn rate_per_gram(&self, method: PrintMethod) -> f64 {
        match method {
            PrintMethod::Filament => self.filament_rate_per_gram,
            PrintMethod::Resin => self.resin_rate_per_gram,
        }
    }
}

/// Material cost plus machine-time surcharge, floored at the minimum charge.
pub fn calculate_cost(
    config: &PricingConfig,
    method: PrintMethod,
    weight_grams: f64,
    time_hours: f64,
) -> f64 {
    let cost = weight_grams * config.rate_per_gram(method) + time_hours * config.machine_rate_per_hour;
    cost.max(config.minimum_charge)
}
