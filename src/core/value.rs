//! core::value
//!
//! The value type stored in metadata records and tag maps.
//!
//! # Design
//!
//! [`MetadataValue`] is a closed enum. User tags use the plain data
//! variants; computed fields additionally use handles (type, body, record,
//! execution result). Record references compare and serialize by identity
//! summary, never by walking the parent chain.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::execution::ExecutionResultCell;
use super::metadata::record::SharedRecord;
use super::types::{BodyHandle, DescriptionArg, TypeHandle};

/// Ordered field-name to value mapping.
pub type ValueMap = IndexMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// A bare name, as produced by tag shorthand.
    Symbol(String),
    List(Vec<MetadataValue>),
    Map(ValueMap),
    Timestamp(DateTime<Utc>),
    Type(TypeHandle),
    Body(BodyHandle),
    /// Shared reference to another group's record.
    Record(SharedRecord),
    ExecutionResult(ExecutionResultCell),
}

impl MetadataValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, MetadataValue::Nil)
    }

    /// Text or symbol contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) | MetadataValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(f) => Some(*f),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MetadataValue]> {
        match self {
            MetadataValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            MetadataValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            MetadataValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeHandle> {
        match self {
            MetadataValue::Type(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_body(&self) -> Option<&BodyHandle> {
        match self {
            MetadataValue::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&SharedRecord> {
        match self {
            MetadataValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_execution_result(&self) -> Option<&ExecutionResultCell> {
        match self {
            MetadataValue::ExecutionResult(cell) => Some(cell),
            _ => None,
        }
    }

    /// Interpret a stored `description_args` element.
    ///
    /// Type handles stay type handles; every other value becomes its text.
    pub fn to_description_arg(&self) -> DescriptionArg {
        match self {
            MetadataValue::Type(handle) => DescriptionArg::Type(handle.clone()),
            other => DescriptionArg::Text(other.to_string()),
        }
    }
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        use MetadataValue::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Type(a), Type(b)) => a == b,
            (Body(a), Body(b)) => a.ptr_eq(b),
            (Record(a), Record(b)) => a.ptr_eq(b),
            (ExecutionResult(a), ExecutionResult(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Nil => Ok(()),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(x) => write!(f, "{x}"),
            MetadataValue::Text(s) | MetadataValue::Symbol(s) => f.write_str(s),
            MetadataValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            MetadataValue::Map(map) => {
                let rendered: Vec<String> =
                    map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            MetadataValue::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            MetadataValue::Type(handle) => write!(f, "{handle}"),
            MetadataValue::Body(body) => match body.source_location() {
                Some(location) => write!(f, "<body {location}>"),
                None => f.write_str("<body>"),
            },
            MetadataValue::Record(record) => f.write_str(&record.summary().full_description),
            MetadataValue::ExecutionResult(_) => f.write_str("<execution result>"),
        }
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Nil => serializer.serialize_none(),
            MetadataValue::Bool(b) => serializer.serialize_bool(*b),
            MetadataValue::Integer(i) => serializer.serialize_i64(*i),
            MetadataValue::Float(x) => serializer.serialize_f64(*x),
            MetadataValue::Text(s) | MetadataValue::Symbol(s) => serializer.serialize_str(s),
            MetadataValue::List(items) => items.serialize(serializer),
            MetadataValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            MetadataValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            MetadataValue::Type(handle) => serializer.serialize_str(handle.as_str()),
            MetadataValue::Body(body) => match body.source_location() {
                Some(location) => serializer.serialize_str(&location.to_string()),
                None => serializer.serialize_none(),
            },
            MetadataValue::Record(record) => record.summary().serialize(serializer),
            MetadataValue::ExecutionResult(cell) => cell.snapshot().serialize(serializer),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        MetadataValue::Integer(i64::from(value))
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Integer(i64::from(value))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<TypeHandle> for MetadataValue {
    fn from(value: TypeHandle) -> Self {
        MetadataValue::Type(value)
    }
}

impl From<BodyHandle> for MetadataValue {
    fn from(value: BodyHandle) -> Self {
        MetadataValue::Body(value)
    }
}

impl From<DescriptionArg> for MetadataValue {
    fn from(value: DescriptionArg) -> Self {
        match value {
            DescriptionArg::Type(handle) => MetadataValue::Type(handle),
            DescriptionArg::Text(text) => MetadataValue::Text(text),
        }
    }
}

impl From<SharedRecord> for MetadataValue {
    fn from(value: SharedRecord) -> Self {
        MetadataValue::Record(value)
    }
}

impl From<DateTime<Utc>> for MetadataValue {
    fn from(value: DateTime<Utc>) -> Self {
        MetadataValue::Timestamp(value)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetadataValue::Nil, Into::into)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(values: Vec<T>) -> Self {
        MetadataValue::List(values.into_iter().map(Into::into).collect())
    }
}
