use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::BillingError;
use super::money::RoundingMode;

/// Operator-facing engine settings. Every field has a default, so a partial
/// document (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rounding applied to the grand total.
    pub rounding: RoundingMode,
    /// Upper bound for any rate, in percent.
    pub max_rate: Decimal,
    /// Combined rate used when a line leaves it unset.
    pub default_combined_rate: Decimal,
    pub default_cgst_rate: Decimal,
    pub default_sgst_rate: Decimal,
    pub numbering: NumberingConfig,
}

/// Invoice number formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingConfig {
    /// Prefix for hotels registered without one.
    pub default_prefix: String,
    /// Minimum digits of the sequence segment. Longer sequences are not truncated.
    pub pad_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::HalfUp,
            max_rate: dec!(100),
            default_combined_rate: dec!(18),
            default_cgst_rate: dec!(9),
            default_sgst_rate: dec!(9),
            numbering: NumberingConfig::default(),
        }
    }
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            default_prefix: "INV".to_string(),
            pad_width: 4,
        }
    }
}

impl EngineConfig {
    /// Check that the defaults are usable by the engine.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.max_rate <= Decimal::ZERO {
            return Err(BillingError::Config("max_rate must be positive".into()));
        }
        let defaults = [
            ("default_combined_rate", self.default_combined_rate),
            ("default_cgst_rate", self.default_cgst_rate),
            ("default_sgst_rate", self.default_sgst_rate),
        ];
        for (name, rate) in defaults {
            if rate < Decimal::ZERO || rate > self.max_rate {
                return Err(BillingError::Config(format!(
                    "{name} {rate} must lie between 0 and {}",
                    self.max_rate
                )));
            }
        }
        let split = self.default_cgst_rate.checked_add(self.default_sgst_rate);
        if split != Some(self.default_combined_rate) {
            return Err(BillingError::Config(format!(
                "default_cgst_rate {} + default_sgst_rate {} must equal default_combined_rate {}",
                self.default_cgst_rate, self.default_sgst_rate, self.default_combined_rate
            )));
        }
        super::numbering::check_prefix(&self.numbering.default_prefix)
            .map_err(|e| BillingError::Config(e.to_string()))?;
        if self.numbering.pad_width == 0 || self.numbering.pad_width > 12 {
            return Err(BillingError::Config(
                "numbering.pad_width must be between 1 and 12".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, BillingError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BillingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
