//! Loosely-typed numeric input.
//!
//! Clients send numbers either as JSON numbers or as strings taken straight from
//! form fields ("2", "49.99"). Parsing happens at the domain boundary so that a
//! non-numeric value becomes a validation error instead of a transport error.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Parse into a finite `f64`, naming `field` in the error.
    pub fn parse(&self, field: &str) -> DomainResult<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| DomainError::validation(format!("{field} must be numeric (got {s:?})")))?,
        };

        if !value.is_finite() {
            return Err(DomainError::validation(format!("{field} must be a finite number")));
        }
        Ok(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

/// Parse a required numeric field.
pub fn required(value: Option<&Numeric>, field: &str) -> DomainResult<f64> {
    value
        .ok_or_else(|| DomainError::validation(format!("{field} is required")))?
        .parse(field)
}

/// Parse an optional numeric field.
pub fn optional(value: Option<&Numeric>, field: &str) -> DomainResult<Option<f64>> {
    value.map(|v| v.parse(field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(Numeric::from(2.0).parse("quantity").unwrap(), 2.0);
        assert_eq!(Numeric::from(" 49.5 ").parse("unit_cost").unwrap(), 49.5);
    }

    #[test]
    fn rejects_text() {
        let err = Numeric::from("lots").parse("quantity").unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("quantity must be numeric (got \"lots\")")
        );
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Numeric::from("NaN").parse("quantity").is_err());
        assert!(Numeric::from("inf").parse("quantity").is_err());
    }

    #[test]
    fn deserializes_both_shapes() {
        let n: Numeric = serde_json::from_str("5").unwrap();
        assert_eq!(n, Numeric::Number(5.0));
        let t: Numeric = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(t, Numeric::Text("5".into()));
    }

    #[test]
    fn required_reports_missing_field() {
        let err = required(None, "unit_cost").unwrap_err();
        assert_eq!(err, DomainError::validation("unit_cost is required"));
    }
}
