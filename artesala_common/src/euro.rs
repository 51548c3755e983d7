use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// ISO-4217 numeric code for Euro, as Redsys expects it in `Ds_Merchant_Currency`.
pub const SETTLEMENT_CURRENCY_CODE: &str = "978";

//--------------------------------------     EuroCents       ---------------------------------------------------------
/// A monetary amount in Euro minor units (cents). All booking totals and room rates are carried in this type so that
/// amount arithmetic stays in integers.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct EuroCents(i64);

impl Add for EuroCents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for EuroCents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for EuroCents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in Euro cents: {0}")]
pub struct EuroConversionError(String);

impl From<i64> for EuroCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for EuroCents {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for EuroCents {}

impl TryFrom<u64> for EuroCents {
    type Error = EuroConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(EuroConversionError(format!("Value {} is too large to convert to EuroCents", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl FromStr for EuroCents {
    type Err = EuroConversionError;

    /// Parses an amount in minor units, the format Redsys uses for `Ds_Amount` (e.g. "3000" for €30.00).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| EuroConversionError(format!("{s}: {e}")))
    }
}

impl Display for EuroCents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}€", cents / 100, cents % 100)
    }
}

impl EuroCents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_euros(euros: i64) -> Self {
        Self(euros * 100)
    }

    /// The bare minor-unit string used on the wire ("3000" for €30.00).
    pub fn to_minor_units(&self) -> String {
        self.0.to_string()
    }
}
