//! Per-hop quote types

use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{Amount, Token};

/// A single simulated swap in a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopQuote {
    pub pool_id: String,
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

/// A simulated pass through a whole cycle, one quote per hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleQuote {
    pub hops: Vec<HopQuote>,
}

impl CycleQuote {
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Amount put into the first hop
    pub fn amount_in(&self) -> Amount {
        self.hops
            .first()
            .map(|hop| hop.amount_in.clone())
            .unwrap_or_else(BigDecimal::zero)
    }

    /// Amount taken out of the last hop
    pub fn amount_out(&self) -> Amount {
        self.hops
            .last()
            .map(|hop| hop.amount_out.clone())
            .unwrap_or_else(BigDecimal::zero)
    }

    /// Round-trip profit; negative when the cycle loses value
    pub fn profit(&self) -> Amount {
        self.amount_out() - self.amount_in()
    }

    pub fn is_profitable(&self) -> bool {
        self.profit() > BigDecimal::zero()
    }

    /// Get the token path
    pub fn token_path(&self) -> Vec<Token> {
        if self.hops.is_empty() {
            return vec![];
        }

        let mut path = vec![self.hops[0].token_in.clone()];
        for hop in &self.hops {
            path.push(hop.token_out.clone());
        }
        path
    }
}
