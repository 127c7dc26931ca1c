//! Token count to CO₂ mass and offset-tree conversion.

use serde::Serialize;

use crate::config::EmissionsConfig;
use crate::usage::TokenCount;

const DAYS_PER_YEAR: f64 = 365.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Emissions derived from one token count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EmissionsEstimate {
    pub tokens: f64,
    pub co2_grams: f64,
    pub co2_kg: f64,
    /// Whole trees needed to absorb `co2_kg` within a year, at least 1.
    pub trees_needed: u64,
    /// Unrounded tree-years of absorption (`co2_kg / absorption`).
    pub tree_years: f64,
}

/// Converts a token count into CO₂ emissions and an offset-tree count.
///
/// The conversion is:
/// - `co2_grams = tokens * cfg.co2_per_token_g`
/// - `co2_kg = co2_grams / 1000`
/// - `trees_needed = max(1, ceil(co2_kg / cfg.tree_absorption_kg_year))`
///
/// ### Parameters
/// - `tokens` - A validated, positive token count.
/// - `cfg` - Conversion constants.
///
/// ### Returns
/// The derived [`EmissionsEstimate`].
pub fn estimate(tokens: TokenCount, cfg: &EmissionsConfig) -> EmissionsEstimate {
    let tokens = tokens.get();
    let co2_grams = tokens * cfg.co2_per_token_g;
    let co2_kg = co2_grams / 1000.0;
    let tree_years = co2_kg / cfg.tree_absorption_kg_year;

    // Float to int casts saturate, so absurd inputs cap at u64::MAX.
    let trees_needed = (tree_years.ceil() as u64).max(1);

    tracing::debug!(tokens, co2_kg, trees_needed, "estimated emissions");

    EmissionsEstimate {
        tokens,
        co2_grams,
        co2_kg,
        trees_needed,
        tree_years,
    }
}

impl EmissionsEstimate {
    /// Trees needed to absorb the emissions within one month.
    pub fn trees_per_month(&self) -> f64 {
        self.tree_years / MONTHS_PER_YEAR
    }

    /// Trees needed to absorb the emissions within one day.
    pub fn trees_per_day(&self) -> f64 {
        self.tree_years / DAYS_PER_YEAR
    }

    /// Days a single tree needs to absorb the emissions.
    pub fn tree_days(&self) -> f64 {
        self.tree_years * DAYS_PER_YEAR
    }
}

/// Energy drawn for `tokens`, in kWh.
pub fn energy_kwh(tokens: TokenCount, cfg: &EmissionsConfig) -> f64 {
    tokens.get() * cfg.energy_per_token_kwh
}

/// Energy drawn for `tokens`, in joules.
pub fn energy_joules(tokens: TokenCount, cfg: &EmissionsConfig) -> f64 {
    energy_kwh(tokens, cfg) * JOULES_PER_KWH
}
