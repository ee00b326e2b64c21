//! core::metadata::builder
//!
//! Fills in the computed fields of a seeded record.
//!
//! # Steps
//!
//! 1. Reject user tags that use a reserved key
//! 2. Store `block` and `description_args`, compute `description`
//! 3. Compute `full_description` and `described_class` (group and example
//!    rules differ, see [`DerivedFields`])
//! 4. Resolve the location fields and `scoped_id`
//! 5. Merge the remaining user tags
//!
//! Only step 1 can fail. On failure no record is produced.

use thiserror::Error;
use tracing::debug;

use super::record::MetadataRecord;
use super::MetadataContext;
use crate::core::description::description_from_args;
use crate::core::keys::{self, ReservedKeySet};
use crate::core::tags::UserTags;
use crate::core::types::{BodyHandle, DescriptionArg, TypeHandle};
use crate::core::value::MetadataValue;

/// Errors from metadata construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{}", reserved_key_message(.key, .caller.as_deref(), .reserved))]
    ReservedKey {
        /// The offending tag name.
        key: String,
        /// Every reserved key, in canonical order.
        reserved: Vec<&'static str>,
        /// First call-stack frame outside the framework, if known.
        caller: Option<String>,
    },
}

fn reserved_key_message(key: &str, caller: Option<&str>, reserved: &[&'static str]) -> String {
    let rule = "*".repeat(50);
    format!(
        "{rule}\n`{key}` is not allowed\n\n\
         specmeta reserves some metadata keys for its own internal use,\n\
         including `{key}`, which is used on:\n\n  {}.\n\n\
         Here are all of the reserved metadata keys:\n\n  {}\n{rule}",
        caller.unwrap_or("<unknown location>"),
        reserved.join("\n  "),
    )
}

/// Everything about a declaration besides its description.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub tags: UserTags,
    pub body: Option<BodyHandle>,
    /// Call-stack frames at the declaration site, most recent first.
    pub call_stack: Vec<String>,
    /// 1-based position among the siblings declared in the same file.
    pub index: usize,
    /// Frames of the shared-group inclusions in effect (examples only).
    pub shared_group_inclusion_backtrace: Vec<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self::new()
    }
}

impl Declaration {
    pub fn new() -> Self {
        Self {
            tags: UserTags::default(),
            body: None,
            call_stack: Vec::new(),
            index: 1,
            shared_group_inclusion_backtrace: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: UserTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_body(mut self, body: BodyHandle) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a call-stack frame (push most recent first).
    pub fn called_from(mut self, frame: impl Into<String>) -> Self {
        self.call_stack.push(frame.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_shared_group_inclusion(mut self, frames: Vec<String>) -> Self {
        self.shared_group_inclusion_backtrace = frames;
        self
    }
}

/// The fields whose rules differ between groups and examples.
///
/// Both are computed from the seeded record, after `description` and
/// `description_args` are in place.
pub(crate) trait DerivedFields {
    fn full_description(&self, record: &MetadataRecord) -> String;
    fn described_class(&self, record: &MetadataRecord) -> Option<TypeHandle>;
}

/// Populates one seeded record.
pub(crate) struct MetadataBuilder<'a> {
    context: &'a MetadataContext,
    record: MetadataRecord,
    tags: UserTags,
    description_args: Vec<DescriptionArg>,
    body: Option<BodyHandle>,
    call_stack: Vec<String>,
    index: usize,
}

impl<'a> MetadataBuilder<'a> {
    pub(crate) fn new(
        context: &'a MetadataContext,
        record: MetadataRecord,
        description_args: Vec<DescriptionArg>,
        declaration: Declaration,
    ) -> Self {
        Self {
            context,
            record,
            tags: declaration.tags,
            description_args,
            body: declaration.body,
            call_stack: declaration.call_stack,
            index: declaration.index,
        }
    }

    pub(crate) fn populate(
        mut self,
        fields: &dyn DerivedFields,
    ) -> Result<MetadataRecord, ConfigurationError> {
        self.ensure_valid_user_keys()?;

        self.record.insert(
            keys::BLOCK,
            self.body.clone().map_or(MetadataValue::Nil, MetadataValue::Body),
        );
        self.record.insert(
            keys::DESCRIPTION_ARGS,
            MetadataValue::List(
                self.description_args
                    .iter()
                    .cloned()
                    .map(MetadataValue::from)
                    .collect(),
            ),
        );
        self.record.insert(
            keys::DESCRIPTION,
            description_from_args(&self.description_args),
        );

        let full_description = fields.full_description(&self.record);
        self.record.insert(keys::FULL_DESCRIPTION, full_description);
        let described_class = fields.described_class(&self.record);
        self.record.insert(keys::DESCRIBED_CLASS, described_class);

        self.populate_location_attributes();

        for (key, value) in self.tags {
            self.record.insert(key, value);
        }

        debug!(
            kind = ?self.record.kind(),
            full_description = self.record.full_description(),
            location = self.record.location(),
            "built metadata record"
        );
        Ok(self.record)
    }

    fn ensure_valid_user_keys(&self) -> Result<(), ConfigurationError> {
        match ReservedKeySet::first_collision(self.tags.keys()) {
            Some(key) => Err(ConfigurationError::ReservedKey {
                key: key.to_string(),
                reserved: ReservedKeySet::all().to_vec(),
                caller: self
                    .context
                    .resolver()
                    .first_caller_frame(&self.call_stack)
                    .map(str::to_string),
            }),
            None => Ok(()),
        }
    }

    fn populate_location_attributes(&mut self) {
        let resolver = self.context.resolver();
        let explicit = self.tags.remove(keys::CALLER);
        let resolved = resolver.resolve(explicit.as_ref(), self.body.as_ref(), &self.call_stack);

        let absolute = resolved
            .file_path
            .as_deref()
            .map(|path| resolver.absolute_path(path));
        let location = resolved.location();

        self.record
            .insert(keys::FILE_PATH, resolved.file_path.clone());
        self.record.insert(
            keys::LINE_NUMBER,
            MetadataValue::Integer(i64::from(resolved.line_number)),
        );
        self.record.insert(keys::LOCATION, location);
        self.record.insert(keys::ABSOLUTE_FILE_PATH, absolute);

        let inherited_rerun = self
            .record
            .rerun_file_path()
            .map(str::to_string);
        if inherited_rerun.is_none() {
            self.record
                .insert(keys::RERUN_FILE_PATH, resolved.file_path);
        }

        let scoped_id = match self.record.scoped_id() {
            Some(parent) => format!("{parent}:{}", self.index),
            None => self.index.to_string(),
        };
        self.record.insert(keys::SCOPED_ID, scoped_id);
    }
}
