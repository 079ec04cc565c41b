//! Procedure call descriptions
//!
//! A call is either entirely positional or entirely named; the enum makes a
//! mixed call unrepresentable. Rendering produces exactly one placeholder per
//! parameter, in the order supplied.

use super::value::parse_numeric;
use super::{ProcedureError, SqlValue};

/// Parameters of a single call
#[derive(Debug, Clone, PartialEq)]
pub enum ProcedureParams {
    Positional(Vec<SqlValue>),
    /// `(parameter name, value)` pairs, bound in the order given
    Named(Vec<(String, SqlValue)>),
}

/// A stored procedure invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    name: String,
    params: ProcedureParams,
}

impl ProcedureCall {
    /// Positional call: `SELECT * FROM name($1, $2, ...)`
    pub fn positional(name: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            name: name.into(),
            params: ProcedureParams::Positional(params),
        }
    }

    /// Named call: `SELECT * FROM name(p_a => $1, p_b => $2, ...)`
    pub fn named<N: Into<String>>(name: impl Into<String>, params: Vec<(N, SqlValue)>) -> Self {
        Self {
            name: name.into(),
            params: ProcedureParams::Named(
                params.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &ProcedureParams {
        &self.params
    }

    /// Number of bound parameters
    pub fn arity(&self) -> usize {
        match &self.params {
            ProcedureParams::Positional(values) => values.len(),
            ProcedureParams::Named(pairs) => pairs.len(),
        }
    }

    /// Values in binding order
    pub fn values(&self) -> Vec<SqlValue> {
        match &self.params {
            ProcedureParams::Positional(values) => values.clone(),
            ProcedureParams::Named(pairs) => pairs.iter().map(|(_, v)| v.clone()).collect(),
        }
    }

    /// Reject names that cannot be interpolated safely into the call text and
    /// values that could not be bound
    pub fn validate(&self) -> Result<(), ProcedureError> {
        if self.name.is_empty() {
            return Err(ProcedureError::InvalidCall(
                "procedure name cannot be empty".to_string(),
            ));
        }

        let qualified_ok = self.name.split('.').count() <= 2
            && self.name.split('.').all(is_identifier);
        if !qualified_ok {
            return Err(ProcedureError::InvalidCall(format!(
                "invalid procedure name '{}'",
                self.name
            )));
        }

        if let ProcedureParams::Named(pairs) = &self.params {
            for (index, (param, _)) in pairs.iter().enumerate() {
                if !is_identifier(param) {
                    return Err(ProcedureError::InvalidCall(format!(
                        "invalid parameter name '{}' for {}",
                        param, self.name
                    )));
                }
                if pairs[..index].iter().any(|(earlier, _)| earlier == param) {
                    return Err(ProcedureError::InvalidCall(format!(
                        "parameter '{}' supplied twice for {}",
                        param, self.name
                    )));
                }
            }
        }

        for value in self.values() {
            if let SqlValue::Numeric(Some(text)) = value {
                parse_numeric(&text)?;
            }
        }

        Ok(())
    }

    /// Render the call text
    pub fn to_sql(&self) -> String {
        let args = match &self.params {
            ProcedureParams::Positional(values) => (1..=values.len())
                .map(|i| format!("${}", i))
                .collect::<Vec<_>>()
                .join(", "),
            ProcedureParams::Named(pairs) => pairs
                .iter()
                .enumerate()
                .map(|(i, (param, _))| format!("{} => ${}", param, i + 1))
                .collect::<Vec<_>>()
                .join(", "),
        };

        format!("SELECT * FROM {}({})", self.name, args)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
