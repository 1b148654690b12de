//! Comma-decimal currency handling and unit location normalization.
//!
//! Amounts use the Brazilian convention: `.` groups thousands and `,` marks
//! the decimal part (`1.234,56`). All arithmetic goes through [`Decimal`].

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use std::str::FromStr;

/// Width unit locations are left-padded to.
pub const LOCATION_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    InvalidCharacter(char),
    Negative,
    RepeatedDecimalSeparator,
    MisplacedThousandsSeparator,
    MissingIntegerPart,
    DecimalDigits,
    Overflow,
}

impl Display for MoneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoneyError::InvalidCharacter(c) => write!(f, "invalid character '{c}' in amount"),
            MoneyError::Negative => write!(f, "amount must not be negative"),
            MoneyError::RepeatedDecimalSeparator => {
                write!(f, "amount has more than one decimal comma")
            }
            MoneyError::MisplacedThousandsSeparator => {
                write!(f, "thousands separators must group exactly three digits")
            }
            MoneyError::MissingIntegerPart => write!(f, "amount has no integer part"),
            MoneyError::DecimalDigits => write!(f, "amount must have one or two decimal digits"),
            MoneyError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for MoneyError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    NoDigits,
}

impl Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::NoDigits => write!(f, "unit number must contain digits"),
        }
    }
}

impl std::error::Error for LocationError {}

/// Parses a user-entered amount such as `1.000,00` or `R$ 250,5`.
///
/// Returns `Ok(None)` when the input is blank, which callers treat as
/// "not entered yet" rather than as an error.
pub fn parse_amount(input: &str) -> Result<Option<Decimal>, MoneyError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with('-') {
        return Err(MoneyError::Negative);
    }
    if let Some(c) = trimmed
        .chars()
        .find(|c| !c.is_ascii_digit() && *c != '.' && *c != ',')
    {
        return Err(MoneyError::InvalidCharacter(c));
    }

    let mut parts = trimmed.split(',');
    let integer_part = parts.next().unwrap_or_default();
    let decimal_part = parts.next();
    if parts.next().is_some() {
        return Err(MoneyError::RepeatedDecimalSeparator);
    }

    let integer_digits = integer_digits(integer_part)?;

    let mut normalized = integer_digits;
    if let Some(decimals) = decimal_part {
        if decimals.is_empty() || decimals.len() > 2 || decimals.contains('.') {
            return Err(MoneyError::DecimalDigits);
        }
        normalized.push('.');
        normalized.push_str(decimals);
    }

    Decimal::from_str(&normalized)
        .map(Some)
        .map_err(|_| MoneyError::Overflow)
}

fn integer_digits(integer_part: &str) -> Result<String, MoneyError> {
    if integer_part.is_empty() {
        return Err(MoneyError::MissingIntegerPart);
    }
    if !integer_part.contains('.') {
        return Ok(integer_part.to_string());
    }

    let groups: Vec<&str> = integer_part.split('.').collect();
    let first = groups[0];
    if first.is_empty() || first.len() > 3 {
        return Err(MoneyError::MisplacedThousandsSeparator);
    }
    if groups[1..].iter().any(|g| g.len() != 3) {
        return Err(MoneyError::MisplacedThousandsSeparator);
    }
    Ok(groups.concat())
}

/// Rounds to cents, half away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount as `1.234,56` (no currency symbol).
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_cents(value);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (integer, decimals) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{decimals}")
}

/// Formats an amount with the `R$` symbol.
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_amount(value))
}

/// Parses a fraction coefficient written with either `.` or `,` as decimal
/// separator. Returns `None` for anything that isn't a plain number.
pub fn parse_fraction(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Formats a fraction coefficient the way the admin listing shows it.
pub fn format_fraction(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

/// Strips non-digits and left-pads to [`LOCATION_WIDTH`].
///
/// Blank input yields `Ok(None)` so that it never turns into `"00"`.
pub fn normalize_location(input: &str) -> Result<Option<String>, LocationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(LocationError::NoDigits);
    }
    Ok(Some(format!("{:0>width$}", digits, width = LOCATION_WIDTH)))
}
