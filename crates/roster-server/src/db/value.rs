//! Typed SQL values
//!
//! Parameters and decoded columns share one representation. Every variant is
//! nullable on its own so that a NULL parameter still tells PostgreSQL which
//! overload of a function to resolve.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::BigDecimal;

use super::ProcedureError;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    /// NUMERIC kept in its exact decimal text form
    Numeric(Option<String>),
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Timestamp(Option<NaiveDateTime>),
    TimestampTz(Option<DateTime<Utc>>),
    Json(Option<serde_json::Value>),
}

impl SqlValue {
    /// Text parameter that is NULL when the input is blank.
    ///
    /// Search filters arrive as empty strings from HTML forms; procedures
    /// treat NULL as "no filter".
    pub fn non_blank(value: Option<&str>) -> Self {
        SqlValue::Text(
            value
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }
}

/// Exact decimal parameter; text PostgreSQL would not accept as `numeric`
/// fails the call instead of binding NULL
pub(crate) fn parse_numeric(text: &str) -> Result<BigDecimal, ProcedureError> {
    text.trim().parse().map_err(|_| {
        ProcedureError::InvalidCall(format!("'{}' is not a valid numeric value", text))
    })
}

macro_rules! impl_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for SqlValue {
            fn from(value: $ty) -> Self {
                SqlValue::$variant(Some(value))
            }
        }

        impl From<Option<$ty>> for SqlValue {
            fn from(value: Option<$ty>) -> Self {
                SqlValue::$variant(value)
            }
        }
    };
}

impl_from!(Bool, bool);
impl_from!(Int, i32);
impl_from!(BigInt, i64);
impl_from!(Float, f64);
impl_from!(Text, String);
impl_from!(Bytes, Vec<u8>);
impl_from!(Date, NaiveDate);
impl_from!(Time, NaiveTime);
impl_from!(Timestamp, NaiveDateTime);
impl_from!(TimestampTz, DateTime<Utc>);
impl_from!(Json, serde_json::Value);

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<Option<&str>> for SqlValue {
    fn from(value: Option<&str>) -> Self {
        SqlValue::Text(value.map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_nulls() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Int(None));
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Text(None));
        assert_eq!(SqlValue::from(None::<NaiveDate>), SqlValue::Date(None));
    }

    #[test]
    fn test_parse_numeric() {
        assert!(parse_numeric(" 12.50 ").is_ok());
        assert!(parse_numeric("-3").is_ok());
        for bad in ["", "12,50", "1e", "twelve"] {
            assert!(matches!(parse_numeric(bad), Err(ProcedureError::InvalidCall(_))), "{}", bad);
        }
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(SqlValue::non_blank(Some("  ")), SqlValue::Text(None));
        assert_eq!(SqlValue::non_blank(None), SqlValue::Text(None));
        assert_eq!(
            SqlValue::non_blank(Some(" Lima ")),
            SqlValue::Text(Some("Lima".to_string()))
        );
    }
}
