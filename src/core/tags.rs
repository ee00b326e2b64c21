//! core::tags
//!
//! User-supplied tags and the shorthand that produces them.
//!
//! # Shorthand
//!
//! Declaration layers collect tags as two typed inputs: an ordered list of
//! bare tag names and a name-to-value map. Bare names expand to `true`.
//!
//! For layers that still receive one mixed argument list,
//! [`UserTags::from_trailing_args`] peels tags off its end: an optional
//! trailing map is taken first, then bare names are popped from the end
//! until something other than a bare name is reached.
//!
//! # Example
//!
//! ```
//! use specmeta::core::tags::{DeclarationArg, UserTags};
//! use specmeta::core::value::{MetadataValue, ValueMap};
//!
//! let mut timeout = ValueMap::new();
//! timeout.insert("timeout".into(), MetadataValue::Integer(5));
//!
//! let mut args = vec![
//!     DeclarationArg::from("checkout"),
//!     DeclarationArg::Tag("slow".into()),
//!     DeclarationArg::Tag("ui".into()),
//!     DeclarationArg::Tags(timeout),
//! ];
//! let tags = UserTags::from_trailing_args(&mut args, None);
//!
//! assert_eq!(tags.get("slow"), Some(&MetadataValue::Bool(true)));
//! assert_eq!(tags.get("ui"), Some(&MetadataValue::Bool(true)));
//! assert_eq!(tags.get("timeout"), Some(&MetadataValue::Integer(5)));
//! assert_eq!(args.len(), 1);
//! ```

use super::deprecation::DeprecationSink;
use super::keys;
use super::types::DescriptionArg;
use super::value::{MetadataValue, ValueMap};

/// User tags attached to a group or example declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTags(ValueMap);

impl UserTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tags from bare names and an explicit map.
    ///
    /// Map entries are inserted first; bare names are then applied from last
    /// to first, each as `true`, overriding a map entry of the same name.
    pub fn from_parts<I, S>(bare_names: I, map: ValueMap) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        let mut tags = Self(map);
        for name in bare_names.into_iter().rev() {
            tags.0.insert(name.into(), MetadataValue::Bool(true));
        }
        tags
    }

    /// Peel trailing tag arguments off a mixed declaration argument list.
    ///
    /// `args` keeps the leading non-tag arguments. When `filter_warnings` is
    /// given, a literal `example_group` key reports a deprecation: filtering
    /// by a nested group map is a legacy form.
    pub fn from_trailing_args(
        args: &mut Vec<DeclarationArg>,
        filter_warnings: Option<&dyn DeprecationSink>,
    ) -> Self {
        let mut tags = match args.last() {
            Some(DeclarationArg::Tags(_)) => match args.pop() {
                Some(DeclarationArg::Tags(map)) => Self(map),
                _ => Self::new(),
            },
            _ => Self::new(),
        };

        while let Some(DeclarationArg::Tag(_)) = args.last() {
            if let Some(DeclarationArg::Tag(name)) = args.pop() {
                tags.0.insert(name, MetadataValue::Bool(true));
            }
        }

        if let Some(sink) = filter_warnings {
            if tags.contains_key(keys::EXAMPLE_GROUP) {
                sink.deprecate(
                    "Filtering by an `example_group` subhash",
                    Some("the subhash to filter directly"),
                );
            }
        }

        tags
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Builder-style bare tag (`name: true`).
    pub fn flag(self, name: impl Into<String>) -> Self {
        self.with(name, true)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a tag, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<MetadataValue> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> ValueMap {
        self.0
    }
}

impl From<ValueMap> for UserTags {
    fn from(map: ValueMap) -> Self {
        Self(map)
    }
}

impl IntoIterator for UserTags {
    type Item = (String, MetadataValue);
    type IntoIter = indexmap::map::IntoIter<String, MetadataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One argument of a mixed declaration argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationArg {
    Description(DescriptionArg),
    /// Bare tag name, shorthand for `name: true`.
    Tag(String),
    /// Explicit tag map.
    Tags(ValueMap),
}

impl DeclarationArg {
    /// Turn a leftover argument into a description argument.
    ///
    /// Bare names and maps that were not trailing render as text.
    pub fn into_description_arg(self) -> DescriptionArg {
        match self {
            DeclarationArg::Description(arg) => arg,
            DeclarationArg::Tag(name) => DescriptionArg::Text(name),
            DeclarationArg::Tags(map) => DescriptionArg::Text(MetadataValue::Map(map).to_string()),
        }
    }
}

impl From<&str> for DeclarationArg {
    fn from(text: &str) -> Self {
        DeclarationArg::Description(DescriptionArg::from(text))
    }
}

impl From<DescriptionArg> for DeclarationArg {
    fn from(arg: DescriptionArg) -> Self {
        DeclarationArg::Description(arg)
    }
}

/// Split a mixed argument list into description arguments and tags.
pub fn split_declaration_args(
    mut args: Vec<DeclarationArg>,
) -> (Vec<DescriptionArg>, UserTags) {
    let tags = UserTags::from_trailing_args(&mut args, None);
    let description_args = args
        .into_iter()
        .map(DeclarationArg::into_description_arg)
        .collect();
    (description_args, tags)
}
