//! Query predicate descriptors and in-memory evaluation.
//!
//! A [`Query`] describes a filter + ordering over the version records of
//! one model type. Stores with native query support translate it; for
//! everything else, [`Query::matches`] and [`Query::compare`] evaluate it
//! against decoded wire records in memory. The evaluation pipeline is:
//! filters → orders → offset → limit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use driftstore_types::value;

/// Default result limit when none is given.
pub const DEFAULT_LIMIT: usize = 2000;

/// A filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    /// Whether a record passes this filter.
    ///
    /// A record that lacks the field, or whose field is not comparable with
    /// the filter value, does not match.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let Some(field) = record_field(record, &self.field) else {
            return false;
        };
        let Some(ord) = value::compare(field, &self.value) else {
            return false;
        };
        match self.op {
            Op::LessThan => ord == Ordering::Less,
            Op::LessThanOrEqual => ord != Ordering::Greater,
            Op::Equal => ord == Ordering::Equal,
            Op::NotEqual => ord != Ordering::Equal,
            Op::GreaterThanOrEqual => ord != Ordering::Less,
            Op::GreaterThan => ord == Ordering::Greater,
        }
    }
}

/// A sort key: field name plus direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// A query over the stored versions of one model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The model type whose records are queried.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub keys_only: bool,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Query {
    /// A query matching every record of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            keys_only: false,
        }
    }

    /// Adds a field filter.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds an ascending sort key.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.orders.push(Order {
            field: field.into(),
            ascending: true,
        });
        self
    }

    /// Adds a descending sort key.
    #[must_use]
    pub fn order_by_descending(mut self, field: impl Into<String>) -> Self {
        self.orders.push(Order {
            field: field.into(),
            ascending: false,
        });
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Skips the first `offset` results.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Requests keys instead of full entities.
    #[must_use]
    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self
    }

    /// Whether a decoded wire record matches this query's type and filters.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        if !self.type_name.is_empty() {
            match record_field(record, "type") {
                Some(Value::String(t)) if *t == self.type_name => {}
                _ => return false,
            }
        }
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Orders two records by this query's sort keys.
    ///
    /// Records missing a sort field, or with incomparable field values,
    /// sort after comparable ones so that well-formed records come first.
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for order in &self.orders {
            let fa = record_field(a, &order.field);
            let fb = record_field(b, &order.field);
            let ord = match (fa, fb) {
                (Some(fa), Some(fb)) => value::compare(fa, fb).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = if order.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Runs the full evaluation pipeline over decoded records:
    /// filters → orders → offset → limit.
    #[must_use]
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        let mut matched: Vec<Value> = records.into_iter().filter(|r| self.matches(r)).collect();
        if !self.orders.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }
        matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

/// Resolves a field name in a wire version record.
///
/// Top-level record fields (`key`, `type`, `committed`, ...) are consulted
/// first; otherwise the name resolves to the stored value of the attribute
/// of that name.
#[must_use]
pub fn record_field<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(v) = record.get(field) {
        return Some(v);
    }
    record.get("attributes")?.get(field)?.get("value")
}
