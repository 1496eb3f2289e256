//! Constant-product pool definitions

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::{is_valid_fee, serde_decimal, Amount, CoreError, CoreResult, Direction, Token};

/// Pool as it arrives from the data collector.
///
/// Decimal fields take strings or numbers, see [`serde_decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub pool_id: String,
    pub token_a: Token,
    pub token_b: Token,
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub reserve_a: Amount,
    #[serde(deserialize_with = "serde_decimal::deserialize")]
    pub reserve_b: Amount,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_decimal::option::deserialize"
    )]
    pub fee: Option<Amount>,
}

impl PoolRecord {
    pub fn new(
        pool_id: impl Into<String>,
        token_a: impl Into<Token>,
        token_b: impl Into<Token>,
        reserve_a: Amount,
        reserve_b: Amount,
    ) -> Self {
        Self {
            pool_id: pool_id.into(),
            token_a: token_a.into(),
            token_b: token_b.into(),
            reserve_a,
            reserve_b,
            fee: None,
        }
    }

    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Check the record and turn it into a [`Pool`], filling in `default_fee`
    /// when the record has no fee of its own.
    pub fn validate(&self, default_fee: &Amount) -> CoreResult<Pool> {
        let fee = self.fee.clone().unwrap_or_else(|| default_fee.clone());
        Pool::new(
            self.pool_id.clone(),
            self.token_a.clone(),
            self.token_b.clone(),
            self.reserve_a.clone(),
            self.reserve_b.clone(),
            fee,
        )
    }
}

/// Uniswap V2 style pool (constant product). Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    id: String,
    token_a: Token,
    token_b: Token,
    reserve_a: Amount,
    reserve_b: Amount,
    fee: Amount,
}

impl Pool {
    pub fn new(
        id: String,
        token_a: Token,
        token_b: Token,
        reserve_a: Amount,
        reserve_b: Amount,
        fee: Amount,
    ) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidPool {
            pool_id: id.clone(),
            reason: reason.to_string(),
        };

        if id.trim().is_empty() {
            return Err(invalid("empty pool id"));
        }
        if token_a.is_empty() || token_b.is_empty() {
            return Err(invalid("empty token identifier"));
        }
        if token_a == token_b {
            return Err(invalid("both sides hold the same token"));
        }
        if reserve_a <= BigDecimal::zero() || reserve_b <= BigDecimal::zero() {
            return Err(CoreError::NonPositiveReserve {
                pool_id: id,
                reserve_a: reserve_a.to_string(),
                reserve_b: reserve_b.to_string(),
            });
        }
        if !is_valid_fee(&fee) {
            return Err(CoreError::FeeOutOfRange {
                pool_id: id,
                fee: fee.to_string(),
            });
        }

        Ok(Self {
            id,
            token_a,
            token_b,
            reserve_a,
            reserve_b,
            fee,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token_a(&self) -> &Token {
        &self.token_a
    }

    pub fn token_b(&self) -> &Token {
        &self.token_b
    }

    pub fn fee(&self) -> &Amount {
        &self.fee
    }

    /// `(token_in, token_out)` for a swap direction
    pub fn tokens(&self, direction: Direction) -> (&Token, &Token) {
        match direction {
            Direction::AToB => (&self.token_a, &self.token_b),
            Direction::BToA => (&self.token_b, &self.token_a),
        }
    }

    /// `(reserve_in, reserve_out)` for a swap direction
    pub fn reserves(&self, direction: Direction) -> (&Amount, &Amount) {
        match direction {
            Direction::AToB => (&self.reserve_a, &self.reserve_b),
            Direction::BToA => (&self.reserve_b, &self.reserve_a),
        }
    }

    /// Output of a single swap against the pool's current reserves
    pub fn get_amount_out(&self, amount_in: &Amount, direction: Direction) -> Amount {
        let (reserve_in, reserve_out) = self.reserves(direction);
        get_amount_out(amount_in, reserve_in, reserve_out, &self.fee)
    }
}

/// Calculate output amount using the constant product formula, fee taken on input:
/// amountOut = amountIn * (1 - fee) * reserveOut / (reserveIn + amountIn * (1 - fee))
///
/// Non-positive input or reserves give zero output.
pub fn get_amount_out(
    amount_in: &Amount,
    reserve_in: &Amount,
    reserve_out: &Amount,
    fee: &Amount,
) -> Amount {
    let zero = BigDecimal::zero();
    if *amount_in <= zero || *reserve_in <= zero || *reserve_out <= zero {
        return zero;
    }

    let fee_multiplier = BigDecimal::one() - fee;
    let amount_in_with_fee = amount_in * &fee_multiplier;
    if amount_in_with_fee <= zero {
        return zero;
    }

    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in + &amount_in_with_fee;

    numerator / denominator
}
