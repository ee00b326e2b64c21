//! compat
//!
//! Dictionary-style access to typed metadata, for legacy call sites.
//!
//! # Architecture
//!
//! A [`CompatHash`] wraps a [`HashBacking`] (typed attributes behind a
//! shared handle) plus an extras store for keys the backing does not serve.
//! The [`LegacyHash`] trait is the key/value capability legacy code talks to.
//!
//! - `get`/`set` route supported keys to the backing, the rest to extras
//! - Every other operation works on a plain map view and writes the changed
//!   entries back, so merges and deletions land in the backing or in extras
//! - Each access reports to a deprecation sink when one is configured
//!
//! # Modules
//!
//! - [`record`] - Adapter over a metadata record with the virtual
//!   `example_group` key
//! - [`execution`] - Adapter over an example's execution result

pub mod execution;
pub mod record;

pub use execution::{ExecutionResultBacking, ExecutionResultHash};
pub use record::{LegacyGroupHash, RecordBacking};

use crate::core::deprecation::SharedSink;
use crate::core::value::{MetadataValue, ValueMap};

/// Typed storage behind a [`CompatHash`].
///
/// Backings hold shared handles, so writes go through `&self`.
pub trait HashBacking {
    /// Whether the backing serves `key` (otherwise extras do).
    fn supports(&self, key: &str) -> bool;

    /// Current value of a supported key.
    fn read(&self, key: &str) -> Option<MetadataValue>;

    fn write(&self, key: &str, value: MetadataValue);

    /// Return a supported key to its unassigned state.
    fn clear(&self, key: &str);

    /// Declared attribute names, in declaration order.
    fn attribute_names(&self) -> &[&'static str] {
        &[]
    }

    /// Whether a declared attribute was ever assigned.
    fn is_assigned(&self, key: &str) -> bool {
        self.read(key).is_some()
    }

    /// Entries laid over the map view; they win on conflict.
    fn overlay(&self) -> ValueMap {
        ValueMap::new()
    }
}

/// Generic key/value capability offered to legacy call sites.
pub trait LegacyHash {
    fn get(&self, key: &str) -> Option<MetadataValue>;

    fn set(&mut self, key: &str, value: MetadataValue);

    /// Plain map view. Unassigned declared attributes appear as nil.
    fn to_map(&self) -> ValueMap;

    /// Run a mutating operation on a map view and write the result back.
    fn update_map(&mut self, operation: &str, f: &mut dyn FnMut(&mut ValueMap));

    /// Run a read-only operation on a map view.
    fn inspect_map(&self, operation: &str, f: &mut dyn FnMut(&ValueMap));

    fn delete(&mut self, key: &str) -> Option<MetadataValue> {
        let mut removed = None;
        self.update_map("delete", &mut |map| removed = map.shift_remove(key));
        removed
    }

    fn merge(&mut self, other: ValueMap) {
        let mut other = Some(other);
        self.update_map("merge", &mut |map| {
            if let Some(other) = other.take() {
                map.extend(other);
            }
        });
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&str, &MetadataValue) -> bool) {
        self.update_map("retain", &mut |map| map.retain(|k, v| keep(k.as_str(), &*v)));
    }

    /// Replace every value with `transform(key, value)`.
    fn transform_values(&mut self, transform: &mut dyn FnMut(&str, MetadataValue) -> MetadataValue) {
        self.update_map("transform_values", &mut |map| {
            let taken = std::mem::take(map);
            *map = taken
                .into_iter()
                .map(|(k, v)| {
                    let v = transform(k.as_str(), v);
                    (k, v)
                })
                .collect();
        });
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.inspect_map("keys", &mut |map| keys = map.keys().cloned().collect());
        keys
    }

    fn entries(&self) -> Vec<(String, MetadataValue)> {
        let mut entries = Vec::new();
        self.inspect_map("each", &mut |map| {
            entries = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        });
        entries
    }

    fn contains_key(&self, key: &str) -> bool {
        let mut found = false;
        self.inspect_map("key?", &mut |map| found = map.contains_key(key));
        found
    }

    fn len(&self) -> usize {
        let mut len = 0;
        self.inspect_map("size", &mut |map| len = map.len());
        len
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Notices {
    sink: SharedSink,
    subject: String,
    replacement: Option<String>,
}

/// Adapter presenting a [`HashBacking`] as a [`LegacyHash`].
pub struct CompatHash<B> {
    backing: B,
    extras: ValueMap,
    notices: Option<Notices>,
}

impl<B: HashBacking> CompatHash<B> {
    /// Adapter with an empty extras store and no deprecation notices.
    pub fn new(backing: B) -> Self {
        Self {
            backing,
            extras: ValueMap::new(),
            notices: None,
        }
    }

    /// Report every access to `sink` as `"<subject> (`<operation>`)"`.
    pub fn with_deprecations(
        mut self,
        sink: SharedSink,
        subject: impl Into<String>,
        replacement: Option<&str>,
    ) -> Self {
        self.notices = Some(Notices {
            sink,
            subject: subject.into(),
            replacement: replacement.map(str::to_string),
        });
        self
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Keys stored outside the backing.
    pub fn extras(&self) -> &ValueMap {
        &self.extras
    }

    fn notice(&self, operation: &str) {
        if let Some(notices) = &self.notices {
            let subject = format!("{} (`{}`)", notices.subject, operation);
            notices
                .sink
                .deprecate(&subject, notices.replacement.as_deref());
        }
    }

    fn store(&mut self, key: &str, value: MetadataValue) {
        if self.backing.supports(key) {
            self.backing.write(key, value);
        } else {
            self.extras.insert(key.to_string(), value);
        }
    }

    fn remove_entry(&mut self, key: &str) {
        if self.backing.supports(key) {
            self.backing.clear(key);
        } else {
            self.extras.shift_remove(key);
        }
    }

    /// Map view without never-assigned declared attributes.
    fn delegation_map(&self) -> ValueMap {
        let mut map = self.extras.clone();
        for name in self.backing.attribute_names() {
            if self.backing.is_assigned(name) {
                if let Some(value) = self.backing.read(name) {
                    map.insert((*name).to_string(), value);
                }
            }
        }
        map.extend(self.backing.overlay());
        map
    }
}

impl<B: HashBacking> LegacyHash for CompatHash<B> {
    fn get(&self, key: &str) -> Option<MetadataValue> {
        self.notice("[]");
        if self.backing.supports(key) {
            self.backing.read(key)
        } else {
            self.extras.get(key).cloned()
        }
    }

    fn set(&mut self, key: &str, value: MetadataValue) {
        self.notice("[]=");
        self.store(key, value);
    }

    fn to_map(&self) -> ValueMap {
        let mut map = self.extras.clone();
        for name in self.backing.attribute_names() {
            let value = self.backing.read(name).unwrap_or(MetadataValue::Nil);
            map.insert((*name).to_string(), value);
        }
        map.extend(self.backing.overlay());
        map
    }

    fn update_map(&mut self, operation: &str, f: &mut dyn FnMut(&mut ValueMap)) {
        self.notice(operation);
        let before = self.delegation_map();
        let mut map = before.clone();

        f(&mut map);

        for key in before.keys().filter(|k| !map.contains_key(k.as_str())) {
            self.remove_entry(key);
        }
        // Unchanged entries are left alone: two keys may alias one field.
        for (key, value) in map {
            if before.get(&key) != Some(&value) {
                self.store(&key, value);
            }
        }
    }

    fn inspect_map(&self, operation: &str, f: &mut dyn FnMut(&ValueMap)) {
        self.notice(operation);
        f(&self.delegation_map());
    }
}
