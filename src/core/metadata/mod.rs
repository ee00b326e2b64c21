//! core::metadata
//!
//! Metadata records for groups and examples.
//!
//! # Modules
//!
//! - [`record`] - The record type and its shared handle
//! - [`builder`] - Computed-field population shared by groups and examples
//! - [`group`] - Group metadata factory
//! - [`example`] - Example metadata factory
//!
//! # Architecture
//!
//! A [`MetadataContext`] carries the collaborators every factory needs: the
//! location resolver and the deprecation sink. Hosts build one per run and
//! pass it to [`GroupMetadata::create`] and [`ExampleMetadata::create`].
//!
//! # Example
//!
//! ```
//! use specmeta::core::metadata::{Declaration, ExampleMetadata, GroupMetadata, MetadataContext};
//!
//! let context = MetadataContext::default();
//! let group = GroupMetadata::create(&context, None, vec!["Cart".into()], Declaration::new())
//!     .unwrap();
//! let example = ExampleMetadata::create(
//!     &context,
//!     &group,
//!     Some("totals line items".into()),
//!     Declaration::new(),
//! )
//! .unwrap();
//! assert_eq!(example.full_description(), "Cart totals line items");
//! ```

pub mod builder;
pub mod example;
pub mod group;
pub mod record;

pub use builder::{ConfigurationError, Declaration};
pub use example::ExampleMetadata;
pub use group::GroupMetadata;
pub use record::{MetadataRecord, RecordKind, RecordSummary, SharedRecord};

use std::sync::Arc;

use crate::core::config::{Config, ConfigError, DeprecationMode};
use crate::core::deprecation::{SharedSink, SilentSink, TracingSink};
use crate::core::location::{LocationResolver, PatternClassifier, DEFAULT_FRAMEWORK_PATTERNS};

/// Collaborators shared by the metadata factories.
#[derive(Clone)]
pub struct MetadataContext {
    resolver: LocationResolver,
    deprecations: SharedSink,
}

impl MetadataContext {
    pub fn new(resolver: LocationResolver, deprecations: SharedSink) -> Self {
        Self {
            resolver,
            deprecations,
        }
    }

    /// Build a context from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a framework pattern does not
    /// compile.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let classifier = PatternClassifier::new(config.framework_patterns())
            .map_err(|e| ConfigError::InvalidValue(format!("invalid framework pattern: {e}")))?;
        let resolver = LocationResolver::new(Arc::new(classifier))
            .with_ephemeral_sentinels(config.ephemeral_sentinels());
        let deprecations: SharedSink = match config.deprecation_mode() {
            DeprecationMode::Warn => Arc::new(TracingSink),
            DeprecationMode::Silent => Arc::new(SilentSink),
        };
        Ok(Self::new(resolver, deprecations))
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn deprecations(&self) -> &SharedSink {
        &self.deprecations
    }

    pub fn with_deprecations(mut self, sink: SharedSink) -> Self {
        self.deprecations = sink;
        self
    }

    pub fn with_resolver(mut self, resolver: LocationResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Context resolving against `working_dir`, treating `/framework/` frames
    /// as framework frames and dropping deprecation notices.
    #[cfg(test)]
    pub(crate) fn for_tests(working_dir: &str) -> Self {
        let classifier = PatternClassifier::new([r"/framework/"]).unwrap_or_default();
        let resolver = LocationResolver::new(Arc::new(classifier)).with_working_dir(working_dir);
        Self::new(resolver, Arc::new(SilentSink))
    }
}

impl Default for MetadataContext {
    /// Default framework patterns, the process working directory and
    /// deprecations reported through `tracing`.
    fn default() -> Self {
        let classifier = PatternClassifier::new(DEFAULT_FRAMEWORK_PATTERNS).unwrap_or_default();
        Self::new(
            LocationResolver::new(Arc::new(classifier)),
            Arc::new(TracingSink),
        )
    }
}

impl std::fmt::Debug for MetadataContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataContext")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
