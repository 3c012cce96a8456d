//! Per-costume geometry coefficients.
//!
//! Every coefficient in the garment formulas is an empirical visual-fit
//! constant. A costume may override any of them; keys it does not declare
//! fall back to the defaults in [`crate::constants`].

use crate::constants::{
    COVERING_X_FACTOR, HAT_X_FACTOR, HAT_Y_FACTOR, MASK_X_FACTOR, MASK_Y_FACTOR, PANT_BIAS_DEGREES,
    PANT_LENGTH_FACTOR, SHIRT_WIDTH_FACTOR, SHIRT_Y_FACTOR, SLEEVE_WIDTH_FACTOR, SLEEVE_X_FACTOR,
    SLEEVE_Y_FACTOR,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved coefficients for every garment formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarmentTuning {
    /// Hat padding beyond the ears, in eye-to-ear spans
    pub hat_x_factor: f64,
    /// Hat lift above the eyes, in eye-to-nose spans
    pub hat_y_factor: f64,
    /// Mask padding beyond the ears, in eye-to-ear spans
    pub mask_x_factor: f64,
    /// Mask lift above the nose, in eye-to-nose spans
    pub mask_y_factor: f64,
    /// Shirt width multiplier on the shoulder span
    pub shirt_width_factor: f64,
    /// Shirt collar lift, as a share of the nose-to-shoulder drop
    pub shirt_y_factor: f64,
    /// Divisor of the shoulder-to-neck offset used for the sleeve's inner edge
    pub sleeve_x_factor: f64,
    /// Divisor of the shoulder-to-neck drop used for the sleeve's top edge
    pub sleeve_y_factor: f64,
    /// Multiplier on the shoulder midpoint used for sleeve width
    pub sleeve_width_factor: f64,
    /// Pant length multiplier on the hip-to-knee distance
    pub pant_length_factor: f64,
    /// Outward bias added to each pant leg, in degrees
    pub pant_bias_degrees: f64,
    /// Face covering padding beyond the ears, in eye-to-ear spans
    pub covering_x_factor: f64,
}

impl Default for GarmentTuning {
    fn default() -> Self {
        Self {
            hat_x_factor: HAT_X_FACTOR,
            hat_y_factor: HAT_Y_FACTOR,
            mask_x_factor: MASK_X_FACTOR,
            mask_y_factor: MASK_Y_FACTOR,
            shirt_width_factor: SHIRT_WIDTH_FACTOR,
            shirt_y_factor: SHIRT_Y_FACTOR,
            sleeve_x_factor: SLEEVE_X_FACTOR,
            sleeve_y_factor: SLEEVE_Y_FACTOR,
            sleeve_width_factor: SLEEVE_WIDTH_FACTOR,
            pant_length_factor: PANT_LENGTH_FACTOR,
            pant_bias_degrees: PANT_BIAS_DEGREES,
            covering_x_factor: COVERING_X_FACTOR,
        }
    }
}

/// Costume-declared overrides; `None` keeps the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hat_x_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hat_y_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_x_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_y_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shirt_width_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shirt_y_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleeve_x_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleeve_y_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleeve_width_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pant_length_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pant_bias_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covering_x_factor: Option<f64>,
}

impl GarmentTuning {
    /// Defaults with the declared override keys applied
    #[must_use]
    pub fn with_overrides(overrides: &TuningOverrides) -> Self {
        let d = Self::default();
        Self {
            hat_x_factor: overrides.hat_x_factor.unwrap_or(d.hat_x_factor),
            hat_y_factor: overrides.hat_y_factor.unwrap_or(d.hat_y_factor),
            mask_x_factor: overrides.mask_x_factor.unwrap_or(d.mask_x_factor),
            mask_y_factor: overrides.mask_y_factor.unwrap_or(d.mask_y_factor),
            shirt_width_factor: overrides.shirt_width_factor.unwrap_or(d.shirt_width_factor),
            shirt_y_factor: overrides.shirt_y_factor.unwrap_or(d.shirt_y_factor),
            sleeve_x_factor: overrides.sleeve_x_factor.unwrap_or(d.sleeve_x_factor),
            sleeve_y_factor: overrides.sleeve_y_factor.unwrap_or(d.sleeve_y_factor),
            sleeve_width_factor: overrides.sleeve_width_factor.unwrap_or(d.sleeve_width_factor),
            pant_length_factor: overrides.pant_length_factor.unwrap_or(d.pant_length_factor),
            pant_bias_degrees: overrides.pant_bias_degrees.unwrap_or(d.pant_bias_degrees),
            covering_x_factor: overrides.covering_x_factor.unwrap_or(d.covering_x_factor),
        }
    }

    /// Check that every coefficient is usable
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for non-finite coefficients or zero divisors.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("hat_x_factor", self.hat_x_factor),
            ("hat_y_factor", self.hat_y_factor),
            ("mask_x_factor", self.mask_x_factor),
            ("mask_y_factor", self.mask_y_factor),
            ("shirt_width_factor", self.shirt_width_factor),
            ("shirt_y_factor", self.shirt_y_factor),
            ("sleeve_x_factor", self.sleeve_x_factor),
            ("sleeve_y_factor", self.sleeve_y_factor),
            ("sleeve_width_factor", self.sleeve_width_factor),
            ("pant_length_factor", self.pant_length_factor),
            ("pant_bias_degrees", self.pant_bias_degrees),
            ("covering_x_factor", self.covering_x_factor),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::ConfigError(format!("Tuning value {name} must be finite")));
        }
        if self.sleeve_x_factor == 0.0 || self.sleeve_y_factor == 0.0 {
            return Err(Error::ConfigError(
                "Sleeve x/y factors are divisors and must not be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Costume id to tuning overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostumeCatalogue {
    costumes: BTreeMap<String, TuningOverrides>,
}

impl CostumeCatalogue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a costume
    pub fn insert(&mut self, id: impl Into<String>, overrides: TuningOverrides) {
        self.costumes.insert(id.into(), overrides);
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.costumes.contains_key(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costumes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.costumes.len()
    }

    /// Costume ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.costumes.keys().map(String::as_str)
    }

    /// Resolve the full tuning for a costume
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCostume` if the id is not registered.
    pub fn tuning_for(&self, id: &str) -> Result<GarmentTuning> {
        self.costumes
            .get(id)
            .map(GarmentTuning::with_overrides)
            .ok_or_else(|| Error::UnknownCostume(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let tuning = GarmentTuning::default();
        assert_eq!(tuning.hat_x_factor, 1.5);
        assert_eq!(tuning.hat_y_factor, 0.75);
        assert_eq!(tuning.mask_y_factor, 0.45);
        assert_eq!(tuning.pant_bias_degrees, 10.0);
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_only_declared_keys() {
        let overrides = TuningOverrides {
            hat_x_factor: Some(2.0),
            ..TuningOverrides::default()
        };
        let tuning = GarmentTuning::with_overrides(&overrides);
        assert_eq!(tuning.hat_x_factor, 2.0);
        assert_eq!(tuning.hat_y_factor, HAT_Y_FACTOR);
        assert_eq!(tuning.mask_x_factor, MASK_X_FACTOR);
    }

    #[test]
    fn test_switch_does_not_merge_previous_costume() {
        let mut catalogue = CostumeCatalogue::new();
        catalogue.insert(
            "wizard",
            TuningOverrides {
                hat_y_factor: Some(1.2),
                ..TuningOverrides::default()
            },
        );
        catalogue.insert(
            "pirate",
            TuningOverrides {
                hat_x_factor: Some(1.0),
                ..TuningOverrides::default()
            },
        );

        let pirate = catalogue.tuning_for("pirate").unwrap();
        assert_eq!(pirate.hat_x_factor, 1.0);
        assert_eq!(pirate.hat_y_factor, HAT_Y_FACTOR);
        assert!(matches!(catalogue.tuning_for("ghost"), Err(Error::UnknownCostume(_))));
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let tuning = GarmentTuning {
            sleeve_x_factor: 0.0,
            ..GarmentTuning::default()
        };
        assert!(tuning.validate().is_err());

        let tuning = GarmentTuning {
            hat_x_factor: f64::NAN,
            ..GarmentTuning::default()
        };
        assert!(tuning.validate().is_err());
    }
}
