//! Money value object for TRY amounts in kurus.
//!
//! Amounts are carried as integer kurus (1/100 of a lira) end to end.
//! The gateway wire format is the kurus amount rendered as a decimal
//! string, e.g. 30.00 TRY travels as "3000".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A non-negative TRY amount in kurus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from integer kurus. Negative amounts are rejected.
    pub fn from_kurus(kurus: i64) -> Result<Self, ValidationError> {
        if kurus < 0 {
            return Err(ValidationError::out_of_range(
                "amount_kurus",
                0,
                i64::MAX,
                kurus,
            ));
        }
        Ok(Self(kurus))
    }

    /// Parses a decimal major-unit string such as "30.00" or "29.905".
    ///
    /// Parsing is digit-exact, so values like 29.905 never pass through
    /// binary floating point. Fractional digits beyond the second are
    /// rounded half-up: the result gains one kuru exactly when the third
    /// fractional digit is 5 or greater, so "29.905" parses to 2991 kurus.
    pub fn from_major_str(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::empty_field("amount"));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ValidationError::invalid_format("amount", "no digits"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                "amount",
                "must be a non-negative decimal number",
            ));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| {
                ValidationError::invalid_format("amount", "integer part too large")
            })?
        };

        let mut frac_digits = frac_part.chars();
        let tens = frac_digits.next().map(digit_value).unwrap_or(0);
        let units = frac_digits.next().map(digit_value).unwrap_or(0);
        let round_up = frac_digits.next().map(digit_value).unwrap_or(0) >= 5;

        let kurus = whole
            .checked_mul(100)
            .and_then(|k| k.checked_add(tens * 10 + units))
            .and_then(|k| k.checked_add(i64::from(round_up)))
            .ok_or_else(|| ValidationError::invalid_format("amount", "amount too large"))?;

        Ok(Self(kurus))
    }

    /// Returns the amount as integer kurus.
    pub fn kurus(&self) -> i64 {
        self.0
    }

    /// Renders the kurus amount as the gateway wire string, e.g. "3000".
    pub fn kurus_string(&self) -> String {
        self.0.to_string()
    }

    /// Renders the amount in major units with two decimals, e.g. "1500.00".
    pub fn major_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

fn digit_value(c: char) -> i64 {
    i64::from(c as u8 - b'0')
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major_string())
    }
}

/// Converts a decimal major-unit string to the gateway's kurus string.
///
/// "30.00" becomes "3000"; "29.905" rounds half-up to "2991".
pub fn to_kurus(amount: &str) -> Result<String, ValidationError> {
    Ok(Money::from_major_str(amount)?.kurus_string())
}
