//! compat::execution
//!
//! Legacy map view of an example's execution result.
//!
//! The eight result fields are declared attributes; any other key is kept
//! in the adapter's extras. Values written through the view are converted
//! to the field's type. A value of the wrong type is dropped with a warning
//! and nil clears the field.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{CompatHash, HashBacking};
use crate::core::deprecation::SharedSink;
use crate::core::execution::{ExecutionResult, ExecutionResultCell, ExecutionStatus};
use crate::core::value::MetadataValue;

const ATTRIBUTES: &[&str] = &[
    "status",
    "exception",
    "started_at",
    "finished_at",
    "run_time",
    "pending_message",
    "pending_exception",
    "pending_fixed",
];

/// Deprecation subject reported by [`ExecutionResultHash`] accesses.
pub const SUBJECT: &str = "Treating `execution_result` as a hash";

/// Replacement suggested alongside [`SUBJECT`].
pub const REPLACEMENT: &str = "the `ExecutionResult` fields";

/// [`HashBacking`] over an [`ExecutionResultCell`].
#[derive(Debug, Clone)]
pub struct ExecutionResultBacking(ExecutionResultCell);

impl ExecutionResultBacking {
    pub fn new(cell: ExecutionResultCell) -> Self {
        Self(cell)
    }

    pub fn cell(&self) -> &ExecutionResultCell {
        &self.0
    }
}

fn text(value: Option<&String>) -> Option<MetadataValue> {
    value.cloned().map(MetadataValue::Text)
}

fn time(value: Option<DateTime<Utc>>) -> Option<MetadataValue> {
    value.map(MetadataValue::Timestamp)
}

fn read_field(result: &ExecutionResult, key: &str) -> Option<MetadataValue> {
    match key {
        "status" => result
            .status
            .map(|status| MetadataValue::Symbol(status.as_str().to_string())),
        "exception" => text(result.exception.as_ref()),
        "started_at" => time(result.started_at),
        "finished_at" => time(result.finished_at),
        "run_time" => result.run_time.map(MetadataValue::Float),
        "pending_message" => text(result.pending_message.as_ref()),
        "pending_exception" => text(result.pending_exception.as_ref()),
        "pending_fixed" => Some(MetadataValue::Bool(result.is_pending_fixed())),
        _ => None,
    }
}

fn as_status(value: &MetadataValue) -> Option<ExecutionStatus> {
    value.as_str().and_then(ExecutionStatus::parse)
}

fn as_text(value: &MetadataValue) -> Option<String> {
    match value {
        MetadataValue::Text(s) | MetadataValue::Symbol(s) => Some(s.clone()),
        _ => None,
    }
}

/// Store `value` into the field named `key`.
///
/// Returns `false` when the value has the wrong type for the field.
fn write_field(result: &mut ExecutionResult, key: &str, value: &MetadataValue) -> bool {
    if value.is_nil() {
        clear_field(result, key);
        return true;
    }
    match key {
        "status" => as_status(value).map(|v| result.status = Some(v)).is_some(),
        "exception" => as_text(value).map(|v| result.exception = Some(v)).is_some(),
        "started_at" => value
            .as_timestamp()
            .map(|v| result.started_at = Some(*v))
            .is_some(),
        "finished_at" => value
            .as_timestamp()
            .map(|v| result.finished_at = Some(*v))
            .is_some(),
        "run_time" => value.as_float().map(|v| result.run_time = Some(v)).is_some(),
        "pending_message" => as_text(value)
            .map(|v| result.pending_message = Some(v))
            .is_some(),
        "pending_exception" => as_text(value)
            .map(|v| result.pending_exception = Some(v))
            .is_some(),
        "pending_fixed" => value
            .as_bool()
            .map(|v| result.pending_fixed = Some(v))
            .is_some(),
        _ => false,
    }
}

fn clear_field(result: &mut ExecutionResult, key: &str) {
    match key {
        "status" => result.status = None,
        "exception" => result.exception = None,
        "started_at" => result.started_at = None,
        "finished_at" => result.finished_at = None,
        "run_time" => result.run_time = None,
        "pending_message" => result.pending_message = None,
        "pending_exception" => result.pending_exception = None,
        "pending_fixed" => result.pending_fixed = None,
        _ => {}
    }
}

impl HashBacking for ExecutionResultBacking {
    fn supports(&self, key: &str) -> bool {
        ATTRIBUTES.contains(&key)
    }

    fn read(&self, key: &str) -> Option<MetadataValue> {
        read_field(&self.0.read(), key)
    }

    fn write(&self, key: &str, value: MetadataValue) {
        if !write_field(&mut self.0.write(), key, &value) {
            warn!(key, value = %value, "ignoring execution result value of the wrong type");
        }
    }

    fn clear(&self, key: &str) {
        clear_field(&mut self.0.write(), key);
    }

    fn attribute_names(&self) -> &[&'static str] {
        ATTRIBUTES
    }

    fn is_assigned(&self, key: &str) -> bool {
        match key {
            "pending_fixed" => self.0.read().pending_fixed.is_some(),
            _ => self.read(key).is_some(),
        }
    }
}

/// Legacy map view of an execution result.
pub type ExecutionResultHash = CompatHash<ExecutionResultBacking>;

impl CompatHash<ExecutionResultBacking> {
    /// View over `cell` that reports each access to `sink`.
    pub fn for_cell(cell: ExecutionResultCell, sink: SharedSink) -> Self {
        Self::new(ExecutionResultBacking::new(cell)).with_deprecations(
            sink,
            SUBJECT,
            Some(REPLACEMENT),
        )
    }

    pub fn cell(&self) -> &ExecutionResultCell {
        self.backing().cell()
    }
}
