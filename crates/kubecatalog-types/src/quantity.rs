//! Kubernetes resource quantities
//!
//! Quantities are fixed-point decimals written with an optional suffix
//! (`16374584Ki`, `4`, `1.5Gi`, `500m`, `1e3`). Conversion to an integer is
//! exact: anything with a fractional remainder or outside the `i64` range is
//! rejected instead of rounded.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("invalid quantity '{0}'")]
    Invalid(String),

    #[error("quantity '{0}' is not a whole number")]
    NotInteger(String),

    #[error("quantity '{0}' does not fit in a 64-bit integer")]
    Overflow(String),
}

/// A resource quantity as reported by the API server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quantity(String);

impl Quantity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact integer value of the quantity
    pub fn as_i64(&self) -> Result<i64, QuantityError> {
        let invalid = || QuantityError::Invalid(self.0.clone());
        let overflow = || QuantityError::Overflow(self.0.clone());

        let text = self.0.trim();
        let (negative, rest) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_end);
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        let (binary_shift, decimal_exponent) = parse_suffix(suffix).ok_or_else(invalid)?;
        let fraction_digits = i32::try_from(fraction.len()).map_err(|_| overflow())?;
        // Only underflows for huge negative exponents, far below any integer
        let exponent = match decimal_exponent.checked_sub(fraction_digits) {
            Some(exponent) => exponent,
            None if mantissa == 0 => return Ok(0),
            None => return Err(QuantityError::NotInteger(self.0.clone())),
        };

        let mut value = mantissa
            .checked_mul(1i128 << binary_shift)
            .ok_or_else(overflow)?;

        if exponent >= 0 {
            value = match 10i128.checked_pow(exponent.unsigned_abs()) {
                Some(factor) => value.checked_mul(factor).ok_or_else(overflow)?,
                None if value == 0 => 0,
                None => return Err(overflow()),
            };
        } else {
            value = match 10i128.checked_pow(exponent.unsigned_abs()) {
                Some(divisor) if value % divisor == 0 => value / divisor,
                None if value == 0 => 0,
                _ => return Err(QuantityError::NotInteger(self.0.clone())),
            };
        }

        if negative {
            value = -value;
        }

        i64::try_from(value).map_err(|_| overflow())
    }
}

/// Missing capacities count as zero
impl Default for Quantity {
    fn default() -> Self {
        Self("0".to_string())
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Quantity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns (binary shift, decimal exponent) for a suffix
fn parse_suffix(suffix: &str) -> Option<(u32, i32)> {
    let parsed = match suffix {
        "" => (0, 0),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        _ => {
            let exponent = suffix.strip_prefix(['e', 'E'])?;
            (0, exponent.parse::<i32>().ok()?)
        }
    };
    Some(parsed)
}
