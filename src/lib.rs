//! specmeta - Metadata model for behavior-driven test suites
//!
//! Every test group and every example owns a metadata record that combines
//! user tags with computed attributes: a hierarchical description, the
//! source location, the type under test and a per-run result cell. Filters,
//! reporters and runners read these records; they live outside this crate.
//!
//! # Architecture
//!
//! - [`core`] - Record model, construction factories, location resolution
//!   and configuration
//! - [`compat`] - Dictionary-style adapters for legacy call sites
//! - [`logging`] - Tracing subscriber setup
//!
//! # Invariants
//!
//! 1. User tags never use a reserved key; a collision fails construction
//! 2. A child record is a value copy of its parent; only the parent links
//!    are shared
//! 3. After construction only the execution result changes
//! 4. Group records never contain a literal `example_group` entry

pub mod compat;
pub mod core;
pub mod logging;
