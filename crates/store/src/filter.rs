//! Filter predicates for `select`.
//!
//! Conditions name a field and constrain it by equality or an inclusive
//! range bound. Multiple conditions combine with logical AND.

use core::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Comparison operator for a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Exact match.
    Eq,
    /// Field value >= condition value (inclusive).
    Gte,
    /// Field value <= condition value (inclusive).
    Lte,
}

/// A single predicate on a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: JsonValue,
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: Op::Gte,
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: Op::Lte,
            value: value.into(),
        }
    }

    /// Whether a row (JSON object) satisfies this condition.
    ///
    /// A missing field never matches.
    pub fn matches(&self, row: &JsonValue) -> bool {
        let Some(actual) = row.get(&self.field) else {
            return false;
        };

        match self.op {
            Op::Eq => actual == &self.value,
            Op::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Op::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Whether a row satisfies all conditions (logical AND; empty slice matches).
pub fn matches_all(conditions: &[Condition], row: &JsonValue) -> bool {
    conditions.iter().all(|c| c.matches(row))
}

/// Order two JSON scalars for range comparison.
///
/// Numbers compare numerically. Strings that both parse as RFC3339
/// timestamps compare chronologically (plain lexicographic ordering gets
/// fractional seconds wrong); other strings compare lexicographically.
/// Mixed or non-scalar types are unordered.
fn compare_values(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            x.as_f64().and_then(|x| y.as_f64().and_then(|y| x.partial_cmp(&y)))
        }
        (JsonValue::String(x), JsonValue::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
                _ => Some(x.as_str().cmp(y.as_str())),
            }
        }
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
