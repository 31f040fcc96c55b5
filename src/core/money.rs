//! Monetary helpers: float intake and grand-total rounding.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::BillingError;

/// How the grand total is rounded to a whole currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Commercial rounding: x.5 goes up. Round-off lies in (-0.5, 0.5].
    #[default]
    HalfUp,
    /// Banker's rounding: x.5 goes to the even unit. Round-off lies in [-0.5, 0.5].
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Round to `dp` decimal places.
    pub fn round_dp(self, value: Decimal, dp: u32) -> Decimal {
        value.round_dp_with_strategy(dp, self.strategy())
    }

    /// Round to the nearest whole unit.
    pub fn round_unit(self, value: Decimal) -> Decimal {
        self.round_dp(value, 0)
    }
}

/// Convert a collaborator-supplied float into a two-place amount.
///
/// NaN and infinities are rejected. Binary noise below a paisa is rounded away.
pub fn amount_from_f64(value: f64) -> Result<Decimal, BillingError> {
    if !value.is_finite() {
        return Err(BillingError::amount("amount", format!("{value} is not finite")));
    }
    let amount = Decimal::from_f64(value)
        .ok_or_else(|| BillingError::amount("amount", format!("{value} is out of range")))?;
    Ok(RoundingMode::HalfUp.round_dp(amount, 2))
}
