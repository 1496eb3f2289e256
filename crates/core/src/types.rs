//! Core type definitions

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Exact decimal amount. Reserves, fees, trade sizes and profits all use it;
/// binary floating point never enters the engine.
pub type Amount = BigDecimal;

/// Significant digits kept for golden-section bracket points.
/// Division itself runs at the decimal crate's default (100 digits).
pub const SIGNIFICANT_DIGITS: u64 = 60;

/// Swap fee applied when a pool record carries none (0.3%)
pub const DEFAULT_FEE: &str = "0.003";

/// Parse a decimal literal such as `"1500"`, `"0.003"` or `"1e-6"`
pub fn parse_decimal(value: &str) -> CoreResult<Amount> {
    BigDecimal::from_str(value.trim()).map_err(|e| CoreError::InvalidDecimal {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// The default 0.3% fee as a decimal
pub fn default_fee() -> Amount {
    BigDecimal::new(3.into(), 3)
}

/// Fee rate domain is `[0, 1)`
pub fn is_valid_fee(fee: &Amount) -> bool {
    *fee >= BigDecimal::zero() && *fee < BigDecimal::one()
}

/// Round to [`SIGNIFICANT_DIGITS`]
pub fn round_significant(value: &Amount) -> Amount {
    value.with_prec(SIGNIFICANT_DIGITS)
}

/// Exact deserialization for [`Amount`] fields.
///
/// Strings are parsed as written. Numbers handed over as `f64` (JSON, TOML,
/// config floats) are read back through their shortest round-trip literal,
/// so `1000.1` is exactly `1000.1` and not the nearest binary fraction.
pub mod serde_decimal {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    use super::{parse_decimal, Amount};
    use bigdecimal::BigDecimal;

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
            parse_decimal(value).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
            if !value.is_finite() {
                return Err(E::custom(format!("{} is not a decimal", value)));
            }
            // Display prints the shortest literal that round-trips
            parse_decimal(&value.to_string()).map_err(E::custom)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    /// Same rules for `Option<Amount>`; null or absent is `None`
    pub mod option {
        use serde::de::{self, Deserializer, Visitor};
        use std::fmt;

        use crate::Amount;

        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = Option<Amount>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an optional decimal")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
                super::deserialize(deserializer).map(Some)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Amount>, D::Error> {
            deserializer.deserialize_option(OptionVisitor)
        }
    }
}

/// The direction of a swap through a two-token pool.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    /// Token A in, token B out
    AToB,
    /// Token B in, token A out
    BToA,
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AToB => write!(f, "a>b"),
            Direction::BToA => write!(f, "b>a"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
