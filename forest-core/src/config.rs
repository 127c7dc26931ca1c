//! Tunable constants for emissions estimation, scene layout and CSV import.
//!
//! Every section deserializes with `#[serde(default)]`, so a TOML file only
//! needs to name the values it overrides:
//!
//! ```toml
//! [emissions]
//! co2_per_token_g = 0.0859
//!
//! [scene]
//! max_trees = 200
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

/// Conversion constants from tokens to CO₂ and offset trees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionsConfig {
    /// Grams of CO₂ emitted per processed token.
    pub co2_per_token_g: f64,
    /// Kilograms of CO₂ a mature tree absorbs per year.
    pub tree_absorption_kg_year: f64,
    /// Energy drawn per token, in kWh.
    pub energy_per_token_kwh: f64,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            co2_per_token_g: 0.09,
            tree_absorption_kg_year: 21.77,
            energy_per_token_kwh: 0.000187,
        }
    }
}

impl EmissionsConfig {
    /// Constants derived from a grid carbon intensity of 0.459 kg/kWh,
    /// paired with the rounded 21 kg/year absorption figure.
    pub fn grid_intensity() -> Self {
        Self {
            co2_per_token_g: 0.0859,
            tree_absorption_kg_year: 21.0,
            ..Self::default()
        }
    }
}

/// Inclusive range a per-object scale factor is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform scale in `[min, max]`.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.min < self.max {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Plot sizing and placement parameters for the scene generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Plot edge length for a single tree.
    pub base_size: f32,
    /// Growth of the plot edge per `sqrt(trees)`.
    pub density_factor: f32,
    /// Upper bound of the plot edge length.
    pub max_size: f32,
    /// Fraction of the plot edge available for placement, in `(0, 1)` so a
    /// margin always remains.
    pub usable_fraction: f32,
    /// Cap on the number of trees laid out. `None` lays out every tree up
    /// to [`crate::scene::MAX_LAID_OUT_TREES`].
    pub max_trees: Option<u64>,

    pub tree_scale: ScaleRange,
    pub flower_scale: ScaleRange,
    pub mushroom_scale: ScaleRange,
    pub log_scale: ScaleRange,
    pub plant_scale: ScaleRange,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            base_size: 4.0,
            density_factor: 2.0,
            max_size: 25.0,
            usable_fraction: 0.7,
            max_trees: Some(500),

            tree_scale: ScaleRange::new(0.8, 1.2),
            flower_scale: ScaleRange::new(0.6, 1.0),
            mushroom_scale: ScaleRange::new(0.5, 0.8),
            log_scale: ScaleRange::new(0.7, 1.1),
            plant_scale: ScaleRange::new(0.6, 1.0),
        }
    }
}

/// CSV import settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Column index summed when no header names a token column.
    pub fallback_column: usize,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self { fallback_column: 8 }
    }
}

/// Top-level configuration, one section per concern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub emissions: EmissionsConfig,
    pub scene: SceneConfig,
    pub usage: UsageConfig,
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Checks that every constant is usable by the estimator and generator.
    ///
    /// ### Returns
    /// - `Ok(())` if all values are in range.
    /// - `Err(ForestError::InvalidConfig)` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let e = &self.emissions;
        positive_f64("emissions.co2_per_token_g", e.co2_per_token_g)?;
        positive_f64("emissions.tree_absorption_kg_year", e.tree_absorption_kg_year)?;
        positive_f64("emissions.energy_per_token_kwh", e.energy_per_token_kwh)?;

        let s = &self.scene;
        positive_f32("scene.base_size", s.base_size)?;
        positive_f32("scene.density_factor", s.density_factor)?;
        positive_f32("scene.max_size", s.max_size)?;
        if s.base_size > s.max_size {
            return Err(invalid("scene.base_size", "must not exceed scene.max_size"));
        }
        if !(s.usable_fraction > 0.0 && s.usable_fraction < 1.0) {
            return Err(invalid("scene.usable_fraction", "must be in (0, 1)"));
        }
        if s.max_trees == Some(0) {
            return Err(invalid("scene.max_trees", "must be at least 1"));
        }

        for (field, range) in [
            ("scene.tree_scale", s.tree_scale),
            ("scene.flower_scale", s.flower_scale),
            ("scene.mushroom_scale", s.mushroom_scale),
            ("scene.log_scale", s.log_scale),
            ("scene.plant_scale", s.plant_scale),
        ] {
            positive_f32(field, range.min)?;
            if !range.max.is_finite() || range.min > range.max {
                return Err(invalid(field, "min must not exceed max"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ForestError {
    ForestError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

fn positive_f64(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("expected a finite positive number, got {value}")))
    }
}

fn positive_f32(field: &'static str, value: f32) -> Result<()> {
    positive_f64(field, f64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [emissions]
            co2_per_token_g = 0.0859

            [scene]
            max_trees = 120
            "#,
        )
        .unwrap();

        assert_eq!(cfg.emissions.co2_per_token_g, 0.0859);
        assert_eq!(cfg.emissions.tree_absorption_kg_year, 21.77);
        assert_eq!(cfg.scene.max_trees, Some(120));
        assert_eq!(cfg.scene.base_size, 4.0);
        assert_eq!(cfg.usage, UsageConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn zero_absorption_is_rejected() {
        let err = Config::from_toml_str("[emissions]\ntree_absorption_kg_year = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidConfig {
                field: "emissions.tree_absorption_kg_year",
                ..
            }
        ));
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let mut cfg = Config::default();
        cfg.scene.flower_scale = ScaleRange::new(1.0, 0.5);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidConfig {
                field: "scene.flower_scale",
                ..
            }
        ));
    }

    #[test]
    fn usable_fraction_outside_unit_interval_is_rejected() {
        let mut cfg = Config::default();
        cfg.scene.usable_fraction = 1.5;
        assert!(cfg.validate().is_err());
        cfg.scene.usable_fraction = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn full_plot_usable_fraction_is_rejected() {
        let err = Config::from_toml_str("[scene]\nusable_fraction = 1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidConfig {
                field: "scene.usable_fraction",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml_str("[scene\nbase_size = 4").unwrap_err();
        assert!(matches!(err, ForestError::ConfigParse(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.toml");
        std::fs::write(&path, "[usage]\nfallback_column = 3\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.usage.fallback_column, 3);
    }

    #[test]
    fn scale_range_sample_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = ScaleRange::new(0.6, 1.0);
        for _ in 0..200 {
            let s = range.sample(&mut rng);
            assert!((range.min..=range.max).contains(&s));
        }

        let fixed = ScaleRange::new(0.9, 0.9);
        assert_eq!(fixed.sample(&mut rng), 0.9);
    }

    #[test]
    fn grid_intensity_preset_uses_alternate_constants() {
        let e = EmissionsConfig::grid_intensity();
        assert_eq!(e.co2_per_token_g, 0.0859);
        assert_eq!(e.tree_absorption_kg_year, 21.0);
        assert_eq!(e.energy_per_token_kwh, EmissionsConfig::default().energy_per_token_kwh);
    }
}
