use rand::Rng;
use serde::Serialize;

use crate::{
    config::{Config, SceneConfig},
    emissions::{EmissionsEstimate, estimate},
    scene::{SceneLayout, generate_scene},
    usage::TokenCount,
};

/// The estimate and layout computed for one submitted token count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forest {
    #[serde(skip)]
    pub tokens: TokenCount,
    pub estimate: EmissionsEstimate,
    pub layout: SceneLayout,
}

impl Forest {
    /// Runs the estimator, then lays out a forest for the resulting tree count.
    pub fn grow(tokens: TokenCount, cfg: &Config, rng: &mut impl Rng) -> Self {
        let estimate = estimate(tokens, &cfg.emissions);
        let layout = generate_scene(&estimate, &cfg.scene, rng);
        tracing::info!(
            tokens = estimate.tokens,
            trees = estimate.trees_needed,
            "grew forest"
        );
        Self {
            tokens,
            estimate,
            layout,
        }
    }

    /// Replaces the layout with a fresh one for the same estimate.
    pub fn regrow(&mut self, cfg: &SceneConfig, rng: &mut impl Rng) {
        self.layout = generate_scene(&self.estimate, cfg, rng);
    }

    /// One-line description suitable for sharing.
    pub fn summary(&self) -> String {
        let trees = self.estimate.trees_needed;
        format!(
            "My AI usage of {} tokens emitted about {:.2} kg of CO₂, which takes {} tree{} a year to absorb.",
            group_thousands(self.estimate.tokens),
            self.estimate.co2_kg,
            trees,
            if trees == 1 { "" } else { "s" },
        )
    }
}

/// Formats a token count with `,` thousands separators, e.g. `1,234,567`.
pub fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
