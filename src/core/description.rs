//! core::description
//!
//! Description text composition.
//!
//! # Separator rule
//!
//! Two parts are joined with no separator when the parent part is a type
//! handle and the child text starts with `#`, `::` or `.` (so `Cart` and
//! `#total` become `Cart#total`). Every other pair is joined with one space.
//!
//! # Invariants
//!
//! - Pure functions: identical inputs always produce identical output
//! - An absent or empty child yields the parent text unchanged
//! - An empty parent yields the child text unchanged

use super::types::DescriptionArg;

const METHOD_PREFIXES: [&str; 3] = ["#", "::", "."];

/// Separator between a parent and a child description part.
///
/// # Example
///
/// ```
/// use specmeta::core::description::description_separator;
/// use specmeta::core::types::{DescriptionArg, TypeHandle};
///
/// let cart = DescriptionArg::from(TypeHandle::new("Cart").unwrap());
/// assert_eq!(description_separator(Some(&cart), Some(&"#total".into())), "");
/// assert_eq!(description_separator(Some(&cart), Some(&"when empty".into())), " ");
/// assert_eq!(description_separator(Some(&"Cart".into()), Some(&"#total".into())), " ");
/// ```
pub fn description_separator(
    parent: Option<&DescriptionArg>,
    child: Option<&DescriptionArg>,
) -> &'static str {
    let parent_is_type = parent.is_some_and(DescriptionArg::is_type_handle);
    let child_is_method = child.is_some_and(|c| starts_with_method_prefix(c.text()));

    if parent_is_type && child_is_method {
        ""
    } else {
        " "
    }
}

fn starts_with_method_prefix(text: &str) -> bool {
    METHOD_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

/// Join two already-rendered texts with an explicit separator.
pub fn join_with(parent: &str, separator: &str, child: &str) -> String {
    if child.is_empty() {
        return parent.to_string();
    }
    if parent.is_empty() {
        return child.to_string();
    }
    let mut joined = String::with_capacity(parent.len() + separator.len() + child.len());
    joined.push_str(parent);
    joined.push_str(separator);
    joined.push_str(child);
    joined
}

/// Combine two description arguments with the separator rule.
pub fn combine(parent: Option<&DescriptionArg>, child: Option<&DescriptionArg>) -> String {
    let parent_text = parent.map_or("", DescriptionArg::text);
    let child_text = child.map_or("", DescriptionArg::text);
    join_with(parent_text, description_separator(parent, child), child_text)
}

/// The `description` of a record built from its description arguments.
///
/// Only the first two arguments take part.
///
/// # Example
///
/// ```
/// use specmeta::core::description::description_from_args;
/// use specmeta::core::types::{DescriptionArg, TypeHandle};
///
/// let args = vec![
///     DescriptionArg::from(TypeHandle::new("Cart").unwrap()),
///     DescriptionArg::from("#total"),
/// ];
/// assert_eq!(description_from_args(&args), "Cart#total");
/// assert_eq!(description_from_args(&[]), "");
/// ```
pub fn description_from_args(args: &[DescriptionArg]) -> String {
    combine(args.first(), args.get(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TypeHandle;

    fn ty(name: &str) -> DescriptionArg {
        DescriptionArg::from(TypeHandle::new(name).unwrap())
    }

    #[test]
    fn single_arg_is_its_text() {
        assert_eq!(description_from_args(&["a cart".into()]), "a cart");
        assert_eq!(description_from_args(&[ty("Cart")]), "Cart");
    }

    #[test]
    fn method_prefixes_join_without_space() {
        assert_eq!(description_from_args(&[ty("Cart"), "#total".into()]), "Cart#total");
        assert_eq!(description_from_args(&[ty("Cart"), ".build".into()]), "Cart.build");
        assert_eq!(description_from_args(&[ty("Cart"), "::Item".into()]), "Cart::Item");
    }

    #[test]
    fn text_parent_always_uses_space() {
        assert_eq!(
            description_from_args(&["Cart".into(), "#total".into()]),
            "Cart #total"
        );
    }

    #[test]
    fn plain_child_uses_space() {
        assert_eq!(
            description_from_args(&[ty("Cart"), "with items".into()]),
            "Cart with items"
        );
    }

    #[test]
    fn extra_args_are_ignored() {
        assert_eq!(
            description_from_args(&["a".into(), "b".into(), "c".into()]),
            "a b"
        );
    }

    #[test]
    fn empty_parts_collapse() {
        assert_eq!(join_with("", " ", "child"), "child");
        assert_eq!(join_with("parent", " ", ""), "parent");
        assert_eq!(combine(None, None), "");
    }
}
