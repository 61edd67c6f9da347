// ABOUTME: Exponential time-decay weighting for application outcomes
// ABOUTME: Older applications count less, halving in weight every half-life

use super::error::{MarketError, Result};

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayWeighting {
    half_life_days: f64,
    lambda: f64,
}

impl DecayWeighting {
    pub fn new(half_life_days: f64) -> Result<Self> {
        if !half_life_days.is_finite() || half_life_days <= 0.0 {
            return Err(MarketError::InvalidHalfLife(half_life_days));
        }

        Ok(Self {
            half_life_days,
            lambda: std::f64::consts::LN_2 / half_life_days,
        })
    }

    pub fn half_life_days(&self) -> f64 {
        self.half_life_days
    }

    /// Weight for an application `days` old
    ///
    /// Unknown age weighs nothing; future-dated applications weigh fully.
    pub fn weight(&self, days: Option<f64>) -> f64 {
        match days {
            None => 0.0,
            Some(d) if d.is_nan() => 0.0,
            Some(d) if d < 0.0 => 1.0,
            Some(d) => (-self.lambda * d).exp(),
        }
    }
}

impl Default for DecayWeighting {
    fn default() -> Self {
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            lambda: std::f64::consts::LN_2 / DEFAULT_HALF_LIFE_DAYS,
        }
    }
}
