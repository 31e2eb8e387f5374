//! Typed attribute definitions.
//!
//! Attributes define and compose a model: a model type can be seen as a
//! collection of attribute descriptors. A descriptor primarily defines a
//! name, a data type, and a bound merge strategy; it can also carry a
//! default value and a required flag.
//!
//! Values travel as [`serde_json::Value`] and are validated/coerced against
//! the descriptor's [`DataType`] on every assignment.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use serde_json::Value;

use driftstore_merge::{LatestObject, MergeStrategy};
use driftstore_types::Key;

use crate::error::{ModelResult, ValidationError};

/// The data type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// A single-line string, unless `multiline` is set.
    String { multiline: bool },
    /// A multi-line string. Stores that index should treat it as a blob.
    Text,
    /// A normalized hierarchical [`Key`], stored as its path string.
    Key,
    /// A signed 64-bit integer.
    Integer,
    /// A double-precision float.
    Float,
    /// A boolean.
    Boolean,
    /// A nanosecond timestamp, stored as an integer nanosecond count.
    Time,
    /// A calendar date-time, stored as an ISO-8601 string normalized to
    /// microsecond precision.
    DateTime,
    /// A list whose elements all coerce to the given type.
    List(Box<DataType>),
    /// A string-keyed map whose values all coerce to the given type.
    Dict(Box<DataType>),
}

impl DataType {
    fn expected(&self) -> String {
        match self {
            DataType::String { .. } => "string".to_string(),
            DataType::Text => "text".to_string(),
            DataType::Key => "key".to_string(),
            DataType::Integer => "integer".to_string(),
            DataType::Float => "float".to_string(),
            DataType::Boolean => "boolean".to_string(),
            DataType::Time => "time".to_string(),
            DataType::DateTime => "datetime".to_string(),
            DataType::List(elem) => format!("list<{}>", elem.expected()),
            DataType::Dict(elem) => format!("dict<{}>", elem.expected()),
        }
    }

    /// Whether a value counts as empty for the required-attribute check.
    ///
    /// Null is always empty; for string-like types the empty string is too.
    /// Zero, `false`, `[]` and `{}` are not empty.
    #[must_use]
    pub fn is_empty(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DataType::String { .. } | DataType::Text | DataType::Key, Value::String(s)) => {
                s.is_empty()
            }
            _ => false,
        }
    }

    fn incompatible(&self, attr: &str) -> ValidationError {
        ValidationError::IncompatibleType {
            attr: attr.to_string(),
            expected: self.expected(),
        }
    }

    /// Coerces a value into this type's stored form.
    pub fn coerce(&self, attr: &str, value: Value) -> Result<Value, ValidationError> {
        match self {
            DataType::String { multiline } => {
                let s = coerce_string(attr, self, value)?;
                if !multiline && s.contains('\n') {
                    return Err(ValidationError::Multiline {
                        attr: attr.to_string(),
                    });
                }
                Ok(Value::String(s))
            }
            DataType::Text => Ok(Value::String(coerce_string(attr, self, value)?)),
            DataType::Key => match value {
                Value::String(s) => Key::parse(&s)
                    .map(|k| Value::String(k.as_str().to_string()))
                    .map_err(|_| self.incompatible(attr)),
                _ => Err(self.incompatible(attr)),
            },
            DataType::Integer => coerce_integer(attr, self, value),
            DataType::Float => coerce_float(attr, self, value),
            DataType::Boolean => match value {
                Value::Bool(_) => Ok(value),
                _ => Err(self.incompatible(attr)),
            },
            DataType::Time => match value.as_i64() {
                Some(ns) => Ok(Value::from(ns)),
                None => Err(self.incompatible(attr)),
            },
            DataType::DateTime => match value {
                Value::String(s) => match parse_iso(&s) {
                    Some(dt) => Ok(Value::String(format_iso(&dt))),
                    None => Err(self.incompatible(attr)),
                },
                _ => Err(self.incompatible(attr)),
            },
            DataType::List(elem) => match value {
                Value::Array(items) => {
                    let coerced = items
                        .into_iter()
                        .map(|item| elem.coerce(attr, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Value::Array(coerced))
                }
                _ => Err(self.incompatible(attr)),
            },
            DataType::Dict(elem) => match value {
                Value::Object(map) => {
                    let mut coerced = serde_json::Map::new();
                    for (key, item) in map {
                        coerced.insert(key, elem.coerce(attr, item)?);
                    }
                    Ok(Value::Object(coerced))
                }
                _ => Err(self.incompatible(attr)),
            },
        }
    }
}

fn coerce_string(attr: &str, dt: &DataType, value: Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(dt.incompatible(attr)),
    }
}

fn coerce_integer(attr: &str, dt: &DataType, value: Value) -> Result<Value, ValidationError> {
    let out_of_range = || ValidationError::OutOfRange {
        attr: attr.to_string(),
    };
    match value {
        Value::Number(ref n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            if n.as_u64().is_some() {
                // a u64 that as_i64 rejected exceeds i64::MAX
                return Err(out_of_range());
            }
            let f = n.as_f64().ok_or_else(|| dt.incompatible(attr))?;
            if f.fract() != 0.0 {
                return Err(dt.incompatible(attr));
            }
            if f < i64::MIN as f64 || f > i64::MAX as f64 {
                return Err(out_of_range());
            }
            Ok(Value::from(f as i64))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| dt.incompatible(attr)),
        _ => Err(dt.incompatible(attr)),
    }
}

fn coerce_float(attr: &str, dt: &DataType, value: Value) -> Result<Value, ValidationError> {
    let f = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| dt.incompatible(attr))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| dt.incompatible(attr))?,
        _ => return Err(dt.incompatible(attr)),
    };
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| dt.incompatible(attr))
}

/// Parses an ISO-8601 date-time, tolerating a `Z` suffix, a space instead
/// of `T`, and truncated or absent fractional seconds. Fractional digits
/// beyond microseconds are dropped; shorter fractions are zero-padded to
/// microsecond precision.
fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);

    let (base, frac) = match s.rsplit_once('.') {
        Some((base, frac)) => (base, frac),
        None => (s, ""),
    };
    let mut digits: String = frac.chars().take(6).collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    while digits.len() < 6 {
        digits.push('0');
    }
    let micros: u32 = digits.parse().ok()?;

    let sep = if base.contains('T') { 'T' } else { ' ' };
    let fmt = format!("%Y-%m-%d{sep}%H:%M:%S");
    let dt = NaiveDateTime::parse_from_str(base, &fmt).ok()?;
    dt.with_nanosecond(micros * 1_000)
}

fn format_iso(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// A typed field definition: name, data type, default, required flag, and
/// bound merge strategy.
///
/// Descriptors are assembled with the shorthand constructors and builder
/// methods, then bound to a model type by [`ModelSchemaBuilder`], which
/// assigns the attribute name (if unset) and the owning type.
///
/// [`ModelSchemaBuilder`]: crate::schema::ModelSchemaBuilder
#[derive(Clone)]
pub struct AttributeDescriptor {
    name: String,
    owner: Option<String>,
    data_type: DataType,
    default: Option<Value>,
    required: bool,
    strategy: Arc<dyn MergeStrategy>,
}

impl AttributeDescriptor {
    /// A descriptor of the given data type, with the default strategy
    /// ([`LatestObject`]), no default value, not required.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            name: String::new(),
            owner: None,
            data_type,
            default: None,
            required: false,
            strategy: Arc::new(LatestObject),
        }
    }

    /// Shorthand for a single-line string attribute.
    #[must_use]
    pub fn string() -> Self {
        Self::new(DataType::String { multiline: false })
    }

    /// Shorthand for a multi-line text attribute.
    #[must_use]
    pub fn text() -> Self {
        Self::new(DataType::Text)
    }

    /// Shorthand for a key attribute.
    #[must_use]
    pub fn key() -> Self {
        Self::new(DataType::Key)
    }

    /// Shorthand for a 64-bit integer attribute.
    #[must_use]
    pub fn integer() -> Self {
        Self::new(DataType::Integer)
    }

    /// Shorthand for a float attribute.
    #[must_use]
    pub fn float() -> Self {
        Self::new(DataType::Float)
    }

    /// Shorthand for a boolean attribute.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(DataType::Boolean)
    }

    /// Shorthand for a nanosecond time attribute.
    #[must_use]
    pub fn time() -> Self {
        Self::new(DataType::Time)
    }

    /// Shorthand for an ISO-8601 date-time attribute.
    #[must_use]
    pub fn datetime() -> Self {
        Self::new(DataType::DateTime)
    }

    /// Shorthand for a list attribute with the given element type.
    #[must_use]
    pub fn list(element: DataType) -> Self {
        Self::new(DataType::List(Box::new(element)))
    }

    /// Shorthand for a string-keyed dict attribute with the given value type.
    #[must_use]
    pub fn dict(element: DataType) -> Self {
        Self::new(DataType::Dict(Box::new(element)))
    }

    /// Sets an explicit attribute name (otherwise assigned at binding).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the static default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Marks the attribute as required (empty values fail validation).
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allows embedded newlines on a string attribute.
    #[must_use]
    pub fn multiline(mut self) -> Self {
        if let DataType::String { ref mut multiline } = self.data_type {
            *multiline = true;
        }
        self
    }

    /// Binds a merge strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn MergeStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Binds a merge strategy by registry name.
    ///
    /// Fails with `InvalidStrategyType` for unknown names.
    pub fn with_strategy_named(mut self, name: &str) -> ModelResult<Self> {
        self.strategy = driftstore_merge::strategy_named(name)?;
        Ok(self)
    }

    /// Binds this descriptor to its owning model type. Called once when the
    /// model schema is built.
    pub(crate) fn configure(&mut self, type_name: &str, attr_name: &str) {
        if self.name.is_empty() {
            self.name = attr_name.to_string();
        }
        self.owner = Some(type_name.to_string());
    }

    /// The attribute name within the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning model type, once bound to a schema.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The data type.
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Whether empty values are rejected.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The bound merge strategy.
    #[must_use]
    pub fn strategy(&self) -> &Arc<dyn MergeStrategy> {
        &self.strategy
    }

    /// The static default value (not re-validated).
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Whether a value counts as empty for this attribute.
    #[must_use]
    pub fn is_empty(&self, value: &Value) -> bool {
        self.data_type.is_empty(value)
    }

    /// Validates and coerces a value into its stored form.
    ///
    /// Empty values fail when the attribute is required, and otherwise pass
    /// through untouched.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        if self.is_empty(&value) {
            if self.required {
                return Err(ValidationError::Required {
                    attr: self.name.clone(),
                });
            }
            return Ok(value);
        }
        self.data_type.coerce(&self.name, value)
    }

    /// Encodes a value into its stored form. Values coming out of
    /// [`AttributeDescriptor::validate`] are already encoded; this is the
    /// hook for callers holding decoded values.
    #[must_use]
    pub fn dumps(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Decodes a stored value.
    ///
    /// Identity for scalars; date-time strings are re-parsed tolerantly and
    /// normalized to microsecond precision (unparseable input is returned
    /// unchanged rather than lost).
    #[must_use]
    pub fn loads(&self, raw: Value) -> Value {
        match (&self.data_type, &raw) {
            (DataType::DateTime, Value::String(s)) => match parse_iso(s) {
                Some(dt) => Value::String(format_iso(&dt)),
                None => raw,
            },
            _ => raw,
        }
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("data_type", &self.data_type)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl PartialEq for AttributeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.default == other.default
            && self.required == other.required
            && self.strategy.name() == other.strategy.name()
    }
}
