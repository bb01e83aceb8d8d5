use crate::domain::errors::ConfigurationError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Cents precision of every amount the engine emits.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Clamp range as written in the configuration artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountBounds {
    pub min_amount: f64,
    pub max_amount: f64,
}

impl Default for AmountBounds {
    fn default() -> Self {
        Self {
            min_amount: 0.01,
            max_amount: 9999.99,
        }
    }
}

/// Validated clamp range plus the single rounding policy of the engine:
/// clamp, then round half away from zero to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    min: Decimal,
    max: Decimal,
}

impl Bounds {
    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    /// Bounds a raw estimate. Non-finite estimates collapse to the nearest
    /// bound (NaN to the minimum).
    pub fn apply_f64(&self, amount: f64) -> Decimal {
        if amount.is_nan() {
            return self.min;
        }
        match Decimal::from_f64(amount) {
            Some(value) => self.apply(value),
            None if amount > 0.0 => self.max,
            None => self.min,
        }
    }

    pub fn apply(&self, amount: Decimal) -> Decimal {
        let mut bounded = amount
            .clamp(self.min, self.max)
            .round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        bounded.rescale(AMOUNT_DECIMALS);
        bounded
    }
}

impl TryFrom<AmountBounds> for Bounds {
    type Error = ConfigurationError;

    fn try_from(raw: AmountBounds) -> Result<Self, Self::Error> {
        let invalid = || ConfigurationError::InvalidBounds {
            min: raw.min_amount,
            max: raw.max_amount,
        };

        let min = Decimal::from_f64(raw.min_amount).ok_or_else(invalid)?;
        let max = Decimal::from_f64(raw.max_amount).ok_or_else(invalid)?;

        // Bounds with sub-cent digits would let rounding step outside them.
        let is_cents = |d: Decimal| d.round_dp(AMOUNT_DECIMALS) == d;
        if min < Decimal::ZERO || min >= max || !is_cents(min) || !is_cents(max) {
            return Err(invalid());
        }

        Ok(Self { min, max })
    }
}
