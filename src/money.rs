//! An exact amount of money stored as a whole number of cents.
//!
//! Amounts travel over JSON as decimal dollars (e.g. `12.5`) and are kept in
//! SQLite as `INTEGER` cents, so sums of balances never pick up float error.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A signed amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// The reason a string could not be read as an amount of money.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoneyError {
    /// The string was empty or had characters other than a sign, digits and one decimal point.
    #[error("\"{0}\" is not a valid amount")]
    Invalid(String),

    /// The string had fractions of a cent.
    #[error("\"{0}\" has more than two decimal places")]
    TooPrecise(String),

    /// The amount does not fit in 64 bits of cents.
    #[error("\"{0}\" is too large")]
    OutOfRange(String),
}

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// The amount in dollars, for display only.
    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Round a dollar amount to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and amounts too large to hold in cents.
    pub fn from_dollars(dollars: f64) -> Option<Self> {
        let cents = (dollars * 100.0).round();

        if cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
            Some(Self(cents as i64))
        } else {
            None
        }
    }

    /// Parse a decimal dollar string such as `"12.50"`, `"-3"` or `"$1,024.05"`.
    ///
    /// # Errors
    /// Returns a [ParseMoneyError] if the string is not a number with at most
    /// two decimal places.
    pub fn parse(text: &str) -> Result<Self, ParseMoneyError> {
        let invalid = || ParseMoneyError::Invalid(text.to_owned());
        let out_of_range = || ParseMoneyError::OutOfRange(text.to_owned());

        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned).replace(',', "");

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned.as_str(), ""),
        };

        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(invalid());
        }

        if fraction.len() > 2 {
            return Err(ParseMoneyError::TooPrecise(text.to_owned()));
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let total = dollars
            .checked_mul(100)
            .and_then(|total| total.checked_add(cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl fmt::Display for Money {
    /// Writes the amount as a plain decimal, e.g. `-40.05`, the same way it is
    /// accepted by [Money::parse].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Reads JSON numbers as dollars and form fields as decimal strings.
struct MoneyVisitor;

impl de::Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an amount in dollars with at most two decimal places")
    }

    fn visit_i64<E: de::Error>(self, dollars: i64) -> Result<Money, E> {
        dollars
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("{dollars} is too large")))
    }

    fn visit_u64<E: de::Error>(self, dollars: u64) -> Result<Money, E> {
        i64::try_from(dollars)
            .map_err(|_| E::custom(format!("{dollars} is too large")))
            .and_then(|dollars| self.visit_i64(dollars))
    }

    fn visit_f64<E: de::Error>(self, dollars: f64) -> Result<Money, E> {
        Money::from_dollars(dollars)
            .ok_or_else(|| E::custom(format!("{dollars} is not a valid amount")))
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Money, E> {
        Money::parse(text).map_err(E::custom)
    }
}
