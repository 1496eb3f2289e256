//! Arbitrage opportunity types

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, Token};

/// A profitable cycle together with its best trade size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Position of the cycle in enumeration order
    pub cycle_index: usize,
    /// Starting token first and last; one more entry than `pool_ids`
    pub token_path: Vec<Token>,
    pub pool_ids: Vec<String>,
    pub best_trade_size: Amount,
    /// In units of the starting token
    pub best_profit: Amount,
}

impl Opportunity {
    pub fn hop_count(&self) -> usize {
        self.pool_ids.len()
    }

    pub fn start_token(&self) -> Option<&Token> {
        self.token_path.first()
    }
}

/// Opportunity filter criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityFilter {
    /// Profit must be strictly greater than this
    pub min_profit: Amount,
}

impl OpportunityFilter {
    pub fn new(min_profit: Amount) -> Self {
        Self { min_profit }
    }

    pub fn accepts(&self, profit: &BigDecimal) -> bool {
        *profit > self.min_profit
    }

    pub fn matches(&self, opp: &Opportunity) -> bool {
        self.accepts(&opp.best_profit)
    }
}

/// Pool left out of the graph and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedPool {
    pub pool_id: String,
    pub reason: String,
}

/// Outcome of one scan over a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Sorted by `cycle_index`
    pub opportunities: Vec<Opportunity>,
    pub cycles_found: usize,
    /// The emission cap was hit, so `cycles_found` is a partial count
    pub cycles_truncated: bool,
    pub rejected_pools: Vec<RejectedPool>,
    /// Cycles whose optimization stopped at the per-cycle deadline
    pub timed_out_cycles: usize,
    pub scanned_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl ScanReport {
    pub fn is_partial(&self) -> bool {
        self.cycles_truncated || self.timed_out_cycles > 0
    }
}
