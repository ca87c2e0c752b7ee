//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` so that sums of many
//! transactions never pick up binary floating-point drift. Rounding to two decimal places happens
//! only when an amount is displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Number of decimal places shown when an amount is displayed.
const DISPLAY_DP: u32 = 2;

/// Represents a currency-agnostic monetary amount.
///
/// Transactions always carry a positive amount, but totals such as savings may be negative, so
/// the type itself allows any sign.
///
/// # Examples
///
/// Parsing tolerates thousands separators and whitespace:
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str(" 1,250.5 ").unwrap();
/// assert_eq!(amount.to_string(), "1,250.50");
/// ```
///
/// Display rounds, the value does not:
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("0.005").unwrap();
/// assert_eq!(amount.to_string(), "0.01");
/// assert_eq!(amount.value().to_string(), "0.005");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The exact numerical value.
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.value() > Decimal::ZERO
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.value() < Decimal::ZERO
    }

    /// `self + rhs`, or `None` if the sum does not fit.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_add(rhs.value).map(Amount::new)
    }

    /// `self - rhs`, or `None` if the difference does not fit.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_sub(rhs.value).map(Amount::new)
    }

    /// The value rounded half away from zero to two decimal places, as shown to the user.
    pub fn rounded(&self) -> Decimal {
        self.value
            .round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Thousands separators are only a display concern
        let without_commas = s.trim().replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount { value })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        let mut num = rounded.abs();
        num.rescale(DISPLAY_DP);
        let digits = num.to_string();
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        write!(f, "{sign}{}.{cents}", group_thousands(whole))
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (ix, c) in whole.chars().enumerate() {
        if ix > 0 && (whole.len() - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The exact value, never the rounded display form
        serializer.serialize_str(&self.value.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
