//! core::metadata::example
//!
//! Example metadata factory.
//!
//! An example's record is a value copy of its group's record with
//! `parent_example_group` dropped, `example_group` pointing at the group's
//! shared record and a fresh execution result cell. The full description is
//! always the group's joined to the example's with a single space, even
//! when the example's description is empty. Only a missing description
//! leaves the group's text as is.

use tracing::debug;

use super::builder::{ConfigurationError, Declaration, DerivedFields, MetadataBuilder};
use super::group::GroupMetadata;
use super::record::{MetadataRecord, RecordKind, SharedRecord};
use super::MetadataContext;
use crate::compat::{ExecutionResultHash, LegacyGroupHash};
use crate::core::deprecation::SharedSink;
use crate::core::execution::ExecutionResultCell;
use crate::core::keys;
use crate::core::types::{DescriptionArg, TypeHandle};
use crate::core::value::MetadataValue;

struct ExampleFields {
    group_full_description: String,
    group_described_class: Option<TypeHandle>,
}

impl DerivedFields for ExampleFields {
    fn full_description(&self, record: &MetadataRecord) -> String {
        if record.description_args().is_empty() {
            return self.group_full_description.clone();
        }
        if self.group_full_description.is_empty() {
            return record.description().to_string();
        }
        format!("{} {}", self.group_full_description, record.description())
    }

    fn described_class(&self, _record: &MetadataRecord) -> Option<TypeHandle> {
        self.group_described_class.clone()
    }
}

/// Metadata of one example.
#[derive(Clone)]
pub struct ExampleMetadata {
    record: SharedRecord,
    execution_result: ExecutionResultCell,
    deprecations: SharedSink,
}

impl ExampleMetadata {
    /// Build the metadata of an example declared in `group`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ReservedKey` if a user tag uses a
    /// reserved key.
    pub fn create(
        context: &MetadataContext,
        group: &GroupMetadata,
        description: Option<String>,
        mut declaration: Declaration,
    ) -> Result<Self, ConfigurationError> {
        let execution_result = ExecutionResultCell::new();
        let inclusion = std::mem::take(&mut declaration.shared_group_inclusion_backtrace);

        let (seed, fields) = {
            let group_record = group.record().read();
            let mut seed = MetadataRecord::copied_from(RecordKind::Example, &group_record);
            seed.remove(keys::PARENT_EXAMPLE_GROUP);
            seed.insert(
                keys::EXECUTION_RESULT,
                MetadataValue::ExecutionResult(execution_result.clone()),
            );
            seed.insert(keys::EXAMPLE_GROUP, group.record().clone());
            seed.insert(keys::SHARED_GROUP_INCLUSION_BACKTRACE, inclusion);
            let fields = ExampleFields {
                group_full_description: group_record.full_description().to_string(),
                group_described_class: group_record.described_class().cloned(),
            };
            (seed, fields)
        };

        let description_args: Vec<DescriptionArg> =
            description.map(DescriptionArg::from).into_iter().collect();
        let record = MetadataBuilder::new(context, seed, description_args, declaration)
            .populate(&fields)?;
        debug!(
            full_description = record.full_description(),
            "created example metadata"
        );

        Ok(Self {
            record: SharedRecord::new(record),
            execution_result,
            deprecations: context.deprecations().clone(),
        })
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

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

    pub fn location(&self) -> String {
        self.record.read().location().to_string()
    }

    pub fn id(&self) -> String {
        self.record.read().id()
    }

    pub fn location_tuple(&self) -> (Option<String>, u32) {
        let record = self.record.read();
        let (path, line) = record.location_tuple();
        (path.map(str::to_string), line)
    }

    /// The owning group's record.
    pub fn example_group(&self) -> Option<SharedRecord> {
        self.record.read().example_group().cloned()
    }

    /// This example's run result, updated by the runner.
    pub fn execution_result(&self) -> &ExecutionResultCell {
        &self.execution_result
    }

    /// Dictionary view of the execution result. Every access is reported
    /// as deprecated.
    pub fn execution_result_hash(&self) -> ExecutionResultHash {
        ExecutionResultHash::for_cell(self.execution_result.clone(), self.deprecations.clone())
    }

    /// Dictionary view of this example's record.
    pub fn compat(&self) -> LegacyGroupHash {
        LegacyGroupHash::for_record(self.record.clone())
    }
}

impl std::fmt::Debug for ExampleMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExampleMetadata").field(&self.record).finish()
    }
}
