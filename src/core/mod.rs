//! core
//!
//! Core domain types, record construction and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: TypeHandle, DescriptionArg, BodyHandle
//! - [`value`] - The closed set of metadata values
//! - [`keys`] - Computed field names and the reserved key set
//! - [`description`] - Description text composition
//! - [`tags`] - User tag expansion
//! - [`location`] - File and line resolution from bodies and call stacks
//! - [`execution`] - Per-example run results
//! - [`deprecation`] - Deprecation notice sinks
//! - [`metadata`] - Group and example metadata records and factories
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing: type handles and text are distinct description inputs
//! - Construction is deterministic for identical inputs
//! - Location resolution never fails

pub mod config;
pub mod deprecation;
pub mod description;
pub mod execution;
pub mod keys;
pub mod location;
pub mod metadata;
pub mod tags;
pub mod types;
pub mod value;
