//! compat::record
//!
//! Legacy map view of a metadata record.
//!
//! Every key reads and writes the wrapped record directly, except the
//! virtual `example_group` key: it is routed to the record's link to its
//! enclosing group (`parent_example_group` on groups). A group record
//! therefore never gains a literal `example_group` entry through this view.

use super::{CompatHash, HashBacking};
use crate::core::keys;
use crate::core::metadata::record::{RecordKind, SharedRecord};
use crate::core::value::{MetadataValue, ValueMap};

/// [`HashBacking`] over a [`SharedRecord`].
#[derive(Debug, Clone)]
pub struct RecordBacking {
    record: SharedRecord,
}

impl RecordBacking {
    pub fn new(record: SharedRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }
}

impl HashBacking for RecordBacking {
    fn supports(&self, _key: &str) -> bool {
        true
    }

    fn read(&self, key: &str) -> Option<MetadataValue> {
        let record = self.record.read();
        if key == keys::EXAMPLE_GROUP {
            return record.parent_link().cloned().map(MetadataValue::Record);
        }
        record.get(key).cloned()
    }

    fn write(&self, key: &str, value: MetadataValue) {
        let mut record = self.record.write();
        let key = if key == keys::EXAMPLE_GROUP {
            record.parent_link_key()
        } else {
            key
        };
        record.insert(key, value);
    }

    fn clear(&self, key: &str) {
        // The parent link is structural.
        if key == keys::EXAMPLE_GROUP {
            return;
        }
        self.record.write().remove(key);
    }

    fn overlay(&self) -> ValueMap {
        let record = self.record.read();
        let mut map = record.entries().clone();
        if record.kind() == RecordKind::Group {
            if let Some(parent) = record.parent_link() {
                map.insert(
                    keys::EXAMPLE_GROUP.to_string(),
                    MetadataValue::Record(parent.clone()),
                );
            }
        }
        map
    }
}

/// Legacy map view of a group (or example) record.
pub type LegacyGroupHash = CompatHash<RecordBacking>;

impl CompatHash<RecordBacking> {
    pub fn for_record(record: SharedRecord) -> Self {
        Self::new(RecordBacking::new(record))
    }

    pub fn record(&self) -> &SharedRecord {
        self.backing().record()
    }

    /// View of the enclosing group, following the parent link.
    pub fn example_group(&self) -> Option<LegacyGroupHash> {
        let parent = self.record().read().parent_link().cloned()?;
        Some(Self::for_record(parent))
    }
}
