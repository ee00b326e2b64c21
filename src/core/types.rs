//! core::types
//!
//! Strong types for the inputs a declaration hands to the metadata engine.
//!
//! # Types
//!
//! - [`TypeHandle`] - A type or namespace used as the subject of a group
//! - [`DescriptionArg`] - One raw description argument (type handle or text)
//! - [`BodyHandle`] - Opaque handle to a group/example body
//! - [`SourceLocation`] - A declared `file:line` position
//!
//! # Validation
//!
//! Type handles are validated at construction time so that a handle can
//! never render as text that would be mistaken for a method-style suffix
//! (`#call`, `.new`, `::Inner`).
//!
//! # Examples
//!
//! ```
//! use specmeta::core::types::{DescriptionArg, TypeHandle};
//!
//! let widget = TypeHandle::new("app::Widget").unwrap();
//! let arg = DescriptionArg::from(widget);
//! assert!(arg.is_type_handle());
//! assert_eq!(arg.text(), "app::Widget");
//!
//! assert!(TypeHandle::new("#render").is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid type handle: {0}")]
    InvalidTypeHandle(String),

    #[error("invalid source location: {0}")]
    InvalidSourceLocation(String),
}

/// A validated type or namespace handle.
///
/// Rules:
/// - Cannot be empty
/// - Cannot contain whitespace
/// - Cannot start with `#`, `.` or `:`
///
/// # Example
///
/// ```
/// use specmeta::core::types::TypeHandle;
///
/// let handle = TypeHandle::new("billing::Invoice").unwrap();
/// assert_eq!(handle.as_str(), "billing::Invoice");
/// assert_eq!(handle.short_name(), "Invoice");
///
/// assert!(TypeHandle::new("").is_err());
/// assert!(TypeHandle::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeHandle(String);

impl TypeHandle {
    /// Create a new validated type handle.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTypeHandle` if the name breaks the rules above.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Handle for a Rust type, named by its fully qualified path.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidTypeHandle(
                "type handle cannot be empty".into(),
            ));
        }

        if name.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidTypeHandle(format!(
                "type handle cannot contain whitespace: '{name}'"
            )));
        }

        for prefix in ['#', '.', ':'] {
            if name.starts_with(prefix) {
                return Err(TypeError::InvalidTypeHandle(format!(
                    "type handle cannot start with '{prefix}'"
                )));
            }
        }

        Ok(())
    }

    /// Get the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last `::` segment of the handle.
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for TypeHandle {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeHandle> for String {
    fn from(handle: TypeHandle) -> Self {
        handle.0
    }
}

impl AsRef<str> for TypeHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One raw description argument of a group or example.
///
/// Only a [`TypeHandle`] counts as "a type/namespace" when choosing the
/// description separator or the described class. Everything else is text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DescriptionArg {
    /// The subject under test.
    Type(TypeHandle),
    /// A plain label such as `"#render"` or `"when empty"`.
    Text(String),
}

impl DescriptionArg {
    /// Textual rendering used in descriptions.
    pub fn text(&self) -> &str {
        match self {
            DescriptionArg::Type(handle) => handle.as_str(),
            DescriptionArg::Text(text) => text,
        }
    }

    /// Whether this argument is a type/namespace handle.
    pub fn is_type_handle(&self) -> bool {
        matches!(self, DescriptionArg::Type(_))
    }

    /// The type handle, if this argument is one.
    pub fn as_type_handle(&self) -> Option<&TypeHandle> {
        match self {
            DescriptionArg::Type(handle) => Some(handle),
            DescriptionArg::Text(_) => None,
        }
    }
}

impl From<TypeHandle> for DescriptionArg {
    fn from(handle: TypeHandle) -> Self {
        DescriptionArg::Type(handle)
    }
}

impl From<&str> for DescriptionArg {
    fn from(text: &str) -> Self {
        DescriptionArg::Text(text.to_string())
    }
}

impl From<String> for DescriptionArg {
    fn from(text: String) -> Self {
        DescriptionArg::Text(text)
    }
}

impl fmt::Display for DescriptionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A declared `file:line` source position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path as reported by the declaration (absolute or relative).
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl SourceLocation {
    /// Create a source location.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSourceLocation` for an empty path.
    pub fn new(file: impl Into<String>, line: u32) -> Result<Self, TypeError> {
        let file = file.into();
        if file.is_empty() {
            return Err(TypeError::InvalidSourceLocation(
                "file path cannot be empty".into(),
            ));
        }
        Ok(Self { file, line })
    }

    /// Position of the caller of the function this is invoked from.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Opaque handle to the body of a group or example.
///
/// The metadata engine never runs the body. It only stores the handle and
/// asks it for a declared source position. Two handles are equal only if
/// they are clones of the same handle.
///
/// # Example
///
/// ```
/// use specmeta::core::types::BodyHandle;
///
/// let body = BodyHandle::new().with_source_location("spec/cart_spec.rs", 12);
/// assert_eq!(body.source_location().unwrap().line, 12);
/// assert_eq!(body, body.clone());
/// assert_ne!(body, BodyHandle::new());
/// ```
#[derive(Clone, Default)]
pub struct BodyHandle(Arc<BodyInner>);

#[derive(Debug, Default)]
struct BodyInner {
    label: Option<String>,
    source_location: Option<SourceLocation>,
}

impl BodyHandle {
    /// A body with no declared position.
    pub fn new() -> Self {
        Self::default()
    }

    /// A body declared at the caller's position.
    #[track_caller]
    pub fn here() -> Self {
        Self(Arc::new(BodyInner {
            label: None,
            source_location: Some(SourceLocation::caller()),
        }))
    }

    /// Attach a declared source position.
    pub fn with_source_location(self, file: impl Into<String>, line: u32) -> Self {
        Self(Arc::new(BodyInner {
            label: self.0.label.clone(),
            source_location: Some(SourceLocation {
                file: file.into(),
                line,
            }),
        }))
    }

    /// Attach a human-readable label (used in debug output only).
    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self(Arc::new(BodyInner {
            label: Some(label.into()),
            source_location: self.0.source_location.clone(),
        }))
    }

    /// The declared source position, if the body exposes one.
    pub fn source_location(&self) -> Option<&SourceLocation> {
        self.0.source_location.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.0.label.as_deref()
    }

    /// Whether both handles refer to the same body.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for BodyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyHandle")
            .field("label", &self.0.label)
            .field("source_location", &self.0.source_location)
            .finish()
    }
}
