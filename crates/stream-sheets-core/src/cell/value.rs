//! Cell value types

use std::fmt;

use chrono::{Duration, NaiveDateTime};

/// A decoded numeric value.
///
/// Integral values that fit in an `i64` are kept as integers so that `42`
/// stays `42` downstream instead of turning into `42.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integral value
    Int(i64),
    /// Any other finite or non-finite value
    Float(f64),
}

impl Number {
    /// Build a number from a float, collapsing exact integers to [`Number::Int`]
    pub fn from_f64(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        if value.is_finite()
            && value.trunc() == value
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
        {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }

    /// Parse a raw numeric attribute (e.g. `"42"`, `"3.14"`, `"1E-3"`)
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Number::Int(i));
        }
        raw.parse::<f64>().ok().map(Number::from_f64)
    }

    /// The value as a float
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Check if the value is stored as an integer
    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
    }
}

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell, or a cell whose type is void/unknown
    Empty,

    /// String value
    Text(String),

    /// Numeric value
    Number(Number),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Calendar timestamp
    Date(NaiveDateTime),

    /// Time interval
    Duration(Duration),

    /// Currency amount and ISO code, e.g. `"9.99 EUR"`
    CurrencyText(String),

    /// Percentage, stored as a plain number (50% is `0.5`)
    PercentageNumber(Number),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::PercentageNumber(n) => Some(n.as_f64()),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::CurrencyText(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a timestamp
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
            CellValue::Duration(_) => "duration",
            CellValue::CurrencyText(_) => "currency",
            CellValue::PercentageNumber(_) => "percentage",
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Text(s) | CellValue::CurrencyText(s) => write!(f, "{}", s),
            CellValue::Number(n) | CellValue::PercentageNumber(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Duration(d) => write!(f, "{}", d),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(Number::Int(n))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(Number::from_f64(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_integral_values_stay_integers() {
        assert_eq!(Number::parse("42"), Some(Number::Int(42)));
        assert_eq!(Number::parse("42.0"), Some(Number::Int(42)));
        assert_eq!(Number::parse("-7"), Some(Number::Int(-7)));
        assert_eq!(Number::parse("1E3"), Some(Number::Int(1000)));
    }

    #[test]
    fn test_number_fractional_values_are_floats() {
        assert_eq!(Number::parse("1.25"), Some(Number::Float(1.25)));
        assert_eq!(Number::parse("0.5"), Some(Number::Float(0.5)));
        assert_eq!(Number::parse("abc"), None);
        assert_eq!(Number::parse(""), None);
    }

    #[test]
    fn test_number_out_of_range_stays_float() {
        assert_eq!(Number::from_f64(1e300), Number::Float(1e300));
        assert!(!Number::from_f64(f64::NAN).is_int());
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42i64), CellValue::Number(Number::Int(42)));
        assert_eq!(CellValue::from(3.5), CellValue::Number(Number::Float(3.5)));
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));

        let s = CellValue::from("hello");
        assert_eq!(s.as_str(), Some("hello"));
        assert_eq!(s.type_name(), "text");
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(Number::Int(42)).to_string(), "42");
        assert_eq!(CellValue::Number(Number::Float(1.25)).to_string(), "1.25");
        assert_eq!(CellValue::Boolean(false).to_string(), "FALSE");
        assert_eq!(CellValue::CurrencyText("100 USD".into()).to_string(), "100 USD");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
