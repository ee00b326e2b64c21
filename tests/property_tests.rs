//! Property-based tests for description composition, tags and locations.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::sync::Arc;

use proptest::prelude::*;

use specmeta::core::description::{combine, description_from_args, description_separator};
use specmeta::core::keys::ReservedKeySet;
use specmeta::core::location::{parse_frame, LocationResolver, PatternClassifier};
use specmeta::core::metadata::{Declaration, GroupMetadata, MetadataContext};
use specmeta::core::tags::UserTags;
use specmeta::core::types::{DescriptionArg, TypeHandle};
use specmeta::core::value::{MetadataValue, ValueMap};

fn context() -> MetadataContext {
    let classifier = PatternClassifier::new([r"/framework/"]).unwrap();
    let resolver = LocationResolver::new(Arc::new(classifier)).with_working_dir("/work");
    MetadataContext::new(resolver, specmeta::core::deprecation::silent())
}

/// Strategy for type handle names like `Cart` or `Shop::Cart`.
fn type_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{0,8}", 1..3).prop_map(|parts| parts.join("::"))
}

/// Strategy for free-text descriptions, including method-style ones.
fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z ]{0,20}",
        "#[a-z_]{1,10}",
        "\\.[a-z_]{1,10}",
        "::[A-Z][a-z]{0,8}",
    ]
}

fn description_arg() -> impl Strategy<Value = DescriptionArg> {
    prop_oneof![
        type_name().prop_map(|n| DescriptionArg::from(TypeHandle::new(n).unwrap())),
        text().prop_map(DescriptionArg::from),
    ]
}

/// Strategy for tag names that are never reserved.
fn tag_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,12}".prop_filter("must not be reserved", |n| !ReservedKeySet::contains(n))
}

proptest! {
    /// The separator is empty only for a type handle followed by method text.
    #[test]
    fn separator_rule(parent in description_arg(), child in text()) {
        let child = DescriptionArg::from(child);
        let separator = description_separator(Some(&parent), Some(&child));
        let method_like = ["#", "::", "."].iter().any(|p| child.text().starts_with(p));
        if parent.is_type_handle() && method_like {
            prop_assert_eq!(separator, "");
        } else {
            prop_assert_eq!(separator, " ");
        }
    }

    /// Combining with an absent child yields the parent text.
    #[test]
    fn combine_without_child_is_parent(parent in description_arg()) {
        prop_assert_eq!(combine(Some(&parent), None), parent.text());
    }

    /// Description computation is a pure function of its inputs.
    #[test]
    fn description_is_deterministic(args in prop::collection::vec(description_arg(), 0..4)) {
        prop_assert_eq!(description_from_args(&args), description_from_args(&args));
    }

    /// Only the first two arguments take part in the description.
    #[test]
    fn extra_args_are_ignored(
        args in prop::collection::vec(description_arg(), 2..3),
        extra in description_arg(),
    ) {
        let mut longer = args.clone();
        longer.push(extra);
        prop_assert_eq!(description_from_args(&args), description_from_args(&longer));
    }

    /// A nested group's full description extends its parent's.
    #[test]
    fn nested_full_description_extends_parent(
        parent_args in prop::collection::vec(description_arg(), 1..3),
        child_args in prop::collection::vec(description_arg(), 1..3),
    ) {
        let context = context();
        let parent = GroupMetadata::create(&context, None, parent_args, Declaration::new()).unwrap();
        let child =
            GroupMetadata::create(&context, Some(&parent), child_args, Declaration::new()).unwrap();

        prop_assert_eq!(parent.full_description(), parent.description());
        prop_assert!(child.full_description().starts_with(&parent.full_description()));
        prop_assert!(child.full_description().ends_with(&child.description()));
    }

    /// Bare names expand to `true` and explicit values are kept.
    #[test]
    fn tag_expansion(
        bare in prop::collection::vec(tag_name(), 0..4),
        valued in prop::collection::vec((tag_name(), any::<i64>()), 0..4),
    ) {
        let mut map = ValueMap::new();
        for (name, value) in &valued {
            map.insert(name.clone(), MetadataValue::Integer(*value));
        }
        let tags = UserTags::from_parts(bare.clone(), map.clone());

        for name in &bare {
            prop_assert_eq!(tags.get(name), Some(&MetadataValue::Bool(true)));
        }
        for (name, value) in &map {
            if !bare.contains(name) {
                prop_assert_eq!(tags.get(name), Some(value));
            }
        }
    }

    /// Frames parse to their path and line whether or not a column follows.
    #[test]
    fn frame_parsing(path in "(/[a-z]{1,8}){1,4}\\.rs", line in 1u32..100_000, col in 1u32..200) {
        let with_col = format!("{path}:{line}:{col}");
        let without_col = format!("{path}:{line}");
        prop_assert_eq!(parse_frame(&with_col), Some((path.as_str(), line)));
        prop_assert_eq!(parse_frame(&without_col), Some((path.as_str(), line)));
    }

    /// Location is always `<file_path>:<line_number>`.
    #[test]
    fn location_format(name in "[a-z]{1,10}", line in 1u32..10_000) {
        let context = context();
        let frame = format!("/work/spec/{name}.rs:{line}");
        let group = GroupMetadata::create(
            &context,
            None,
            vec!["g".into()],
            Declaration::new().called_from(frame),
        )
        .unwrap();
        prop_assert_eq!(group.location(), format!("./spec/{name}.rs:{line}"));
    }
}
