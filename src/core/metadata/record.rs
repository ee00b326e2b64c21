//! core::metadata::record
//!
//! The metadata record of one group or example.
//!
//! # Record Design
//!
//! A record is an ordered map from field name to [`MetadataValue`]. Computed
//! fields (see [`keys`](crate::core::keys)) and user tags live side by side;
//! typed accessors read the computed ones.
//!
//! # Sharing
//!
//! Records are built once and then shared as [`SharedRecord`]. A child
//! copies its parent's entries by value; only `example_group` and
//! `parent_example_group` hold a [`SharedRecord`] pointing back up.
//!
//! # Example
//!
//! ```
//! use specmeta::core::metadata::record::{MetadataRecord, RecordKind};
//!
//! let mut record = MetadataRecord::new(RecordKind::Group);
//! record.insert("description", "Cart");
//! assert_eq!(record.description(), "Cart");
//! assert!(record.described_class().is_none());
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::execution::ExecutionResultCell;
use crate::core::keys;
use crate::core::types::{BodyHandle, DescriptionArg, TypeHandle};
use crate::core::value::{MetadataValue, ValueMap};

/// Whether a record describes a group or an example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Group,
    Example,
}

/// Metadata of one group or example.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    kind: RecordKind,
    entries: ValueMap,
}

impl MetadataRecord {
    /// An empty record.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            entries: ValueMap::new(),
        }
    }

    /// A record of `kind` holding a value copy of `source`'s entries.
    pub fn copied_from(kind: RecordKind, source: &MetadataRecord) -> Self {
        Self {
            kind,
            entries: source.entries.clone(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as a plain map.
    pub fn entries(&self) -> &ValueMap {
        &self.entries
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn description(&self) -> &str {
        self.text(keys::DESCRIPTION).unwrap_or("")
    }

    pub fn full_description(&self) -> &str {
        self.text(keys::FULL_DESCRIPTION).unwrap_or("")
    }

    /// The stored description arguments, in declaration order.
    pub fn description_args(&self) -> Vec<DescriptionArg> {
        self.get(keys::DESCRIPTION_ARGS)
            .and_then(MetadataValue::as_list)
            .map(|items| items.iter().map(MetadataValue::to_description_arg).collect())
            .unwrap_or_default()
    }

    pub fn described_class(&self) -> Option<&TypeHandle> {
        self.get(keys::DESCRIBED_CLASS).and_then(MetadataValue::as_type)
    }

    pub fn file_path(&self) -> Option<&str> {
        self.text(keys::FILE_PATH)
    }

    pub fn absolute_file_path(&self) -> Option<&str> {
        self.text(keys::ABSOLUTE_FILE_PATH)
    }

    pub fn rerun_file_path(&self) -> Option<&str> {
        self.text(keys::RERUN_FILE_PATH)
    }

    pub fn line_number(&self) -> u32 {
        self.get(keys::LINE_NUMBER)
            .and_then(MetadataValue::as_integer)
            .and_then(|line| u32::try_from(line).ok())
            .unwrap_or(0)
    }

    pub fn location(&self) -> &str {
        self.text(keys::LOCATION).unwrap_or("")
    }

    pub fn scoped_id(&self) -> Option<&str> {
        self.text(keys::SCOPED_ID)
    }

    pub fn block(&self) -> Option<&BodyHandle> {
        self.get(keys::BLOCK).and_then(MetadataValue::as_body)
    }

    pub fn execution_result(&self) -> Option<&ExecutionResultCell> {
        self.get(keys::EXECUTION_RESULT)
            .and_then(MetadataValue::as_execution_result)
    }

    pub fn example_group(&self) -> Option<&SharedRecord> {
        self.get(keys::EXAMPLE_GROUP).and_then(MetadataValue::as_record)
    }

    pub fn parent_example_group(&self) -> Option<&SharedRecord> {
        self.get(keys::PARENT_EXAMPLE_GROUP)
            .and_then(MetadataValue::as_record)
    }

    /// The link to the enclosing group: `example_group` on examples,
    /// `parent_example_group` on groups.
    pub fn parent_link_key(&self) -> &'static str {
        match self.kind {
            RecordKind::Group => keys::PARENT_EXAMPLE_GROUP,
            RecordKind::Example => keys::EXAMPLE_GROUP,
        }
    }

    pub fn parent_link(&self) -> Option<&SharedRecord> {
        self.get(self.parent_link_key())
            .and_then(MetadataValue::as_record)
    }

    /// Stable identifier: `"<rerun_file_path>[<scoped_id>]"`.
    ///
    /// # Example
    ///
    /// ```
    /// use specmeta::core::metadata::record::{MetadataRecord, RecordKind};
    ///
    /// let mut record = MetadataRecord::new(RecordKind::Example);
    /// record.insert("rerun_file_path", "./spec/cart.rs");
    /// record.insert("scoped_id", "1:2");
    /// assert_eq!(record.id(), "./spec/cart.rs[1:2]");
    /// ```
    pub fn id(&self) -> String {
        format!(
            "{}[{}]",
            self.rerun_file_path().unwrap_or(""),
            self.scoped_id().unwrap_or("")
        )
    }

    /// `(absolute_file_path, line_number)` as used by location filters.
    pub fn location_tuple(&self) -> (Option<&str>, u32) {
        (self.absolute_file_path(), self.line_number())
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry("kind", &self.kind)?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Short identity of a record, used where a full record would recurse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub full_description: String,
    pub location: String,
}

/// A record shared between its owner and the records that point at it.
#[derive(Clone)]
pub struct SharedRecord(Arc<RwLock<MetadataRecord>>);

impl SharedRecord {
    pub fn new(record: MetadataRecord) -> Self {
        Self(Arc::new(RwLock::new(record)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MetadataRecord> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access, for legacy adapters and the owning declaration only.
    pub fn write(&self) -> RwLockWriteGuard<'_, MetadataRecord> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of a single field.
    pub fn get(&self, key: &str) -> Option<MetadataValue> {
        self.read().get(key).cloned()
    }

    /// Copy of the whole record.
    pub fn snapshot(&self) -> MetadataRecord {
        self.read().clone()
    }

    pub fn summary(&self) -> RecordSummary {
        match self.0.try_read() {
            Ok(record) => RecordSummary {
                full_description: record.full_description().to_string(),
                location: record.location().to_string(),
            },
            Err(_) => RecordSummary {
                full_description: String::new(),
                location: String::new(),
            },
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SharedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        f.debug_struct("SharedRecord")
            .field("full_description", &summary.full_description)
            .field("location", &summary.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(full: &str) -> SharedRecord {
        let mut record = MetadataRecord::new(RecordKind::Group);
        record.insert(keys::FULL_DESCRIPTION, full);
        record.insert(keys::LOCATION, "./spec/a.rs:1");
        SharedRecord::new(record)
    }

    #[test]
    fn copied_from_is_a_value_copy() {
        let mut parent = MetadataRecord::new(RecordKind::Group);
        parent.insert("slow", true);
        let mut child = MetadataRecord::copied_from(RecordKind::Group, &parent);
        child.insert("slow", false);
        assert_eq!(parent.get("slow"), Some(&MetadataValue::Bool(true)));
    }

    #[test]
    fn parent_link_depends_on_kind() {
        let parent = group("Cart");

        let mut g = MetadataRecord::new(RecordKind::Group);
        g.insert(keys::PARENT_EXAMPLE_GROUP, parent.clone());
        assert!(g.parent_link().unwrap().ptr_eq(&parent));

        let mut e = MetadataRecord::new(RecordKind::Example);
        e.insert(keys::EXAMPLE_GROUP, parent.clone());
        assert!(e.parent_link().unwrap().ptr_eq(&parent));
        assert!(e.parent_example_group().is_none());
    }

    #[test]
    fn defaults_for_missing_fields() {
        let record = MetadataRecord::new(RecordKind::Example);
        assert_eq!(record.description(), "");
        assert_eq!(record.line_number(), 0);
        assert_eq!(record.id(), "[]");
        assert!(record.description_args().is_empty());
    }

    #[test]
    fn remove_keeps_order() {
        let mut record = MetadataRecord::new(RecordKind::Group);
        record.insert("a", 1);
        record.insert("b", 2);
        record.insert("c", 3);
        record.remove("b");
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn serializes_links_as_summaries() {
        let mut record = MetadataRecord::new(RecordKind::Example);
        record.insert(keys::EXAMPLE_GROUP, group("Cart"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "example");
        assert_eq!(json["example_group"]["full_description"], "Cart");
        assert_eq!(json["example_group"]["location"], "./spec/a.rs:1");
    }

    #[test]
    fn summary_while_write_locked_does_not_block() {
        let shared = group("Cart");
        let _guard = shared.write();
        assert_eq!(shared.summary().full_description, "");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn records_are_shareable_across_threads() {
        assert_send_sync::<SharedRecord>();
        assert_send_sync::<crate::core::metadata::GroupMetadata>();
        assert_send_sync::<crate::core::metadata::ExampleMetadata>();

        let shared = group("Cart");
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.read().full_description().to_string())
            })
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap(), "Cart");
        }
    }
}
