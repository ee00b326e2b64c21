//! core::metadata::group
//!
//! Group metadata factory.
//!
//! # Inheritance
//!
//! A group's record starts as a value copy of its parent's record, so user
//! tags flow down the tree. `parent_example_group` then points at the
//! parent's shared record. Root groups have no parent link.
//!
//! # Derived fields
//!
//! - `described_class`: the first description argument when it is a type
//!   handle, else the parent's
//! - `full_description`: the parent's full description joined to this
//!   group's description, with the separator chosen from the parent's last
//!   description argument and this group's first

use tracing::debug;

use super::builder::{ConfigurationError, Declaration, DerivedFields, MetadataBuilder};
use super::record::{MetadataRecord, RecordKind, SharedRecord};
use super::MetadataContext;
use crate::compat::LegacyGroupHash;
use crate::core::deprecation::SharedSink;
use crate::core::description::{description_separator, join_with};
use crate::core::keys;
use crate::core::types::{BodyHandle, DescriptionArg, TypeHandle};
use crate::core::value::MetadataValue;

struct GroupFields {
    parent: Option<ParentFacts>,
}

struct ParentFacts {
    full_description: String,
    last_arg: Option<DescriptionArg>,
    described_class: Option<TypeHandle>,
}

impl DerivedFields for GroupFields {
    fn full_description(&self, record: &MetadataRecord) -> String {
        let Some(parent) = &self.parent else {
            return record.description().to_string();
        };
        let own_args = record.description_args();
        let separator = description_separator(parent.last_arg.as_ref(), own_args.first());
        join_with(&parent.full_description, separator, record.description())
    }

    fn described_class(&self, record: &MetadataRecord) -> Option<TypeHandle> {
        match record.description_args().first() {
            Some(DescriptionArg::Type(handle)) => Some(handle.clone()),
            _ => self
                .parent
                .as_ref()
                .and_then(|p| p.described_class.clone()),
        }
    }
}

/// Metadata of one example group.
#[derive(Clone)]
pub struct GroupMetadata {
    record: SharedRecord,
    deprecations: SharedSink,
}

impl GroupMetadata {
    /// Build the metadata of a group declared under `parent` (root when
    /// `None`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ReservedKey` if a user tag uses a
    /// reserved key. No record is produced in that case.
    pub fn create(
        context: &MetadataContext,
        parent: Option<&GroupMetadata>,
        description_args: Vec<DescriptionArg>,
        declaration: Declaration,
    ) -> Result<Self, ConfigurationError> {
        let (seed, fields) = match parent {
            Some(parent) => {
                let parent_record = parent.record.read();
                let mut seed = MetadataRecord::copied_from(RecordKind::Group, &parent_record);
                seed.insert(keys::PARENT_EXAMPLE_GROUP, parent.record.clone());
                let facts = ParentFacts {
                    full_description: parent_record.full_description().to_string(),
                    last_arg: parent_record.description_args().pop(),
                    described_class: parent_record.described_class().cloned(),
                };
                (seed, GroupFields { parent: Some(facts) })
            }
            None => (
                MetadataRecord::new(RecordKind::Group),
                GroupFields { parent: None },
            ),
        };

        let record = MetadataBuilder::new(context, seed, description_args, declaration)
            .populate(&fields)?;
        debug!(
            full_description = record.full_description(),
            nested = parent.is_some(),
            "created group metadata"
        );

        Ok(Self {
            record: SharedRecord::new(record),
            deprecations: context.deprecations().clone(),
        })
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    /// Clone of one field.
    pub fn get(&self, key: &str) -> Option<MetadataValue> {
        self.record.get(key)
    }

    pub fn description(&self) -> String {
        self.record.read().description().to_string()
    }

    pub fn full_description(&self) -> String {
        self.record.read().full_description().to_string()
    }

    pub fn described_class(&self) -> Option<TypeHandle> {
        self.record.read().described_class().cloned()
    }

    pub fn file_path(&self) -> Option<String> {
        self.record.read().file_path().map(str::to_string)
    }

    pub fn line_number(&self) -> u32 {
        self.record.read().line_number()
    }

    pub fn location(&self) -> String {
        self.record.read().location().to_string()
    }

    pub fn id(&self) -> String {
        self.record.read().id()
    }

    /// The parent group's record, absent at root.
    pub fn parent(&self) -> Option<SharedRecord> {
        self.record.read().parent_example_group().cloned()
    }

    /// Dictionary view of this group's record.
    pub fn compat(&self) -> LegacyGroupHash {
        LegacyGroupHash::for_record(self.record.clone())
    }

    /// Dictionary view of the parent group's record.
    ///
    /// Nothing is written into this group's record.
    pub fn legacy_example_group(&self) -> Option<LegacyGroupHash> {
        self.deprecations.deprecate(
            "The `example_group` key in a group's metadata",
            Some("the group's metadata directly, and `parent_example_group` for its parent"),
        );
        self.parent().map(LegacyGroupHash::for_record)
    }

    pub fn legacy_example_group_block(&self) -> Option<BodyHandle> {
        self.deprecations
            .deprecate("The `example_group_block` metadata key", Some("`block`"));
        self.record.read().block().cloned()
    }

    pub fn legacy_describes(&self) -> Option<TypeHandle> {
        self.deprecations
            .deprecate("The `describes` metadata key", Some("`described_class`"));
        self.described_class()
    }
}

impl std::fmt::Debug for GroupMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GroupMetadata").field(&self.record).finish()
    }
}
