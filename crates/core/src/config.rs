//! Configuration types

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{default_fee, is_valid_fee, serde_decimal, Amount, CoreError, CoreResult};

/// Scan configuration
///
/// Every field has a default, so a partial file or environment overlay only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Longest cycle (in swaps) the enumerator emits
    pub max_cycle_length: usize,
    /// Opportunities must earn strictly more than this, in starting-token units
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub min_profit_threshold: Amount,
    /// Golden-section stops once the bracket is this narrow
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub tolerance: Amount,
    pub max_iterations: usize,
    /// Lower end of the trade-size search interval
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub x_min: Amount,
    /// Upper end of the search interval as a share of the first hop's reserve_in
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub x_max_fraction: Amount,
    /// Fee for pool records that do not carry one
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub default_fee: Amount,
    /// Hard cap on unique cycles; hitting it marks the result truncated
    pub max_emitted_cycles: Option<usize>,
    /// Per-cycle optimization deadline
    pub cycle_timeout_ms: Option<u64>,
    /// Deduplicate on (token, pool) rotations instead of token rotations only
    pub dedup_by_pools: bool,
    /// Skip hops that trade straight back through the pool just used
    pub exclude_reciprocal: bool,
    /// Optimize cycles on the rayon pool
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_cycle_length: 3,
            min_profit_threshold: BigDecimal::new(1.into(), 6),
            tolerance: BigDecimal::new(1.into(), 6),
            max_iterations: 80,
            x_min: BigDecimal::new(1.into(), 12),
            x_max_fraction: BigDecimal::new(2.into(), 1),
            default_fee: default_fee(),
            max_emitted_cycles: None,
            cycle_timeout_ms: None,
            dedup_by_pools: false,
            exclude_reciprocal: false,
            parallel: true,
        }
    }
}

impl ScanConfig {
    pub fn with_max_cycle_length(mut self, len: usize) -> Self {
        self.max_cycle_length = len;
        self
    }

    pub fn with_min_profit_threshold(mut self, threshold: Amount) -> Self {
        self.min_profit_threshold = threshold;
        self
    }

    pub fn with_max_emitted_cycles(mut self, cap: usize) -> Self {
        self.max_emitted_cycles = Some(cap);
        self
    }

    pub fn with_cycle_timeout(mut self, timeout: Duration) -> Self {
        self.cycle_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let zero = BigDecimal::zero();

        if self.max_cycle_length < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "max_cycle_length must be at least 2, got {}",
                self.max_cycle_length
            )));
        }
        if self.tolerance <= zero {
            return Err(CoreError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.x_min < zero {
            return Err(CoreError::InvalidConfig(format!(
                "x_min must not be negative, got {}",
                self.x_min
            )));
        }
        if self.x_max_fraction <= zero || self.x_max_fraction > BigDecimal::one() {
            return Err(CoreError::InvalidConfig(format!(
                "x_max_fraction must be in (0, 1], got {}",
                self.x_max_fraction
            )));
        }
        if !is_valid_fee(&self.default_fee) {
            return Err(CoreError::InvalidConfig(format!(
                "default_fee must be in [0, 1), got {}",
                self.default_fee
            )));
        }
        if self.max_emitted_cycles == Some(0) {
            return Err(CoreError::InvalidConfig(
                "max_emitted_cycles must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}
