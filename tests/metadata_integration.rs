//! Integration tests for group and example metadata construction.
//!
//! These tests drive the public factories the way a declaration layer
//! would: a context per run, groups nested under groups, examples under
//! groups.

use std::sync::Arc;

use serde::Serialize;

use specmeta::compat::LegacyHash;
use specmeta::core::deprecation::CollectingSink;
use specmeta::core::description::combine;
use specmeta::core::keys;
use specmeta::core::location::{LocationResolver, PatternClassifier};
use specmeta::core::metadata::{
    ConfigurationError, Declaration, ExampleMetadata, GroupMetadata, MetadataContext,
};
use specmeta::core::tags::{split_declaration_args, DeclarationArg, UserTags};
use specmeta::core::types::{BodyHandle, DescriptionArg, TypeHandle};
use specmeta::core::value::{MetadataValue, ValueMap};

fn context_with(sink: Arc<CollectingSink>) -> MetadataContext {
    let classifier = PatternClassifier::new([r"/framework/"]).unwrap();
    let resolver = LocationResolver::new(Arc::new(classifier)).with_working_dir("/work");
    MetadataContext::new(resolver, sink)
}

fn context() -> MetadataContext {
    context_with(Arc::new(CollectingSink::new()))
}

fn ty(name: &str) -> DescriptionArg {
    DescriptionArg::from(TypeHandle::new(name).unwrap())
}

fn group(
    context: &MetadataContext,
    parent: Option<&GroupMetadata>,
    args: Vec<DescriptionArg>,
) -> GroupMetadata {
    GroupMetadata::create(context, parent, args, Declaration::new()).unwrap()
}

fn example(context: &MetadataContext, group: &GroupMetadata, description: &str) -> ExampleMetadata {
    ExampleMetadata::create(context, group, Some(description.to_string()), Declaration::new())
        .unwrap()
}

// =============================================================================
// Descriptions
// =============================================================================

mod descriptions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_full_description_equals_description() {
        let context = context();
        for args in [
            vec![ty("Cart")],
            vec!["a cart".into()],
            vec![ty("Cart"), "#total".into()],
            vec![],
        ] {
            let root = group(&context, None, args);
            assert_eq!(root.full_description(), root.description());
        }
    }

    #[test]
    fn nested_group_combines_with_parent() {
        let context = context();
        let root = group(&context, None, vec![ty("Cart")]);
        let method = group(&context, Some(&root), vec!["#total".into()]);
        let class_method = group(&context, Some(&root), vec![".build".into()]);
        let namespaced = group(&context, Some(&root), vec!["::Item".into()]);
        let context_group = group(&context, Some(&method), vec!["when empty".into()]);

        assert_eq!(method.full_description(), "Cart#total");
        assert_eq!(class_method.full_description(), "Cart.build");
        assert_eq!(namespaced.full_description(), "Cart::Item");
        assert_eq!(context_group.full_description(), "Cart#total when empty");
    }

    #[test]
    fn text_parent_always_uses_space() {
        let context = context();
        let root = group(&context, None, vec!["Cart".into()]);
        let child = group(&context, Some(&root), vec!["#total".into()]);
        assert_eq!(
            child.full_description(),
            combine(Some(&"Cart".into()), Some(&"#total".into()))
        );
        assert_eq!(child.full_description(), "Cart #total");
    }

    #[test]
    fn example_joins_group_with_space() {
        let context = context();
        let root = group(&context, None, vec![ty("Cart")]);
        let e = example(&context, &root, "#total is zero");

        assert_eq!(e.full_description(), "Cart #total is zero");
        assert_eq!(e.described_class(), root.described_class());
    }

    #[test]
    fn computation_is_deterministic() {
        let build = || {
            let context = context();
            let root = group(&context, None, vec![ty("Cart"), "#total".into()]);
            let child = group(&context, Some(&root), vec!["with items".into()]);
            (root.description(), child.full_description())
        };
        assert_eq!(build(), build());
    }
}

// =============================================================================
// Tags
// =============================================================================

mod tags {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_args_expand_to_tags() {
        let mut timeout = ValueMap::new();
        timeout.insert("timeout".into(), MetadataValue::Integer(5));
        let (args, tags) = split_declaration_args(vec![
            DeclarationArg::from("checkout"),
            DeclarationArg::Tag("slow".into()),
            DeclarationArg::Tag("ui".into()),
            DeclarationArg::Tags(timeout),
        ]);

        let context = context();
        let root = GroupMetadata::create(&context, None, args, Declaration::new().with_tags(tags))
            .unwrap();

        assert_eq!(root.description(), "checkout");
        assert_eq!(root.get("slow"), Some(MetadataValue::Bool(true)));
        assert_eq!(root.get("ui"), Some(MetadataValue::Bool(true)));
        assert_eq!(root.get("timeout"), Some(MetadataValue::Integer(5)));
    }

    #[test]
    fn reserved_location_tag_fails() {
        let context = context();
        let result = GroupMetadata::create(
            &context,
            None,
            vec!["Cart".into()],
            Declaration::new()
                .with_tags(UserTags::new().with("location", "elsewhere"))
                .called_from("/opt/framework/dsl.rs:12")
                .called_from("/work/spec/cart.rs:3:1"),
        );

        let err = result.unwrap_err();
        let ConfigurationError::ReservedKey { key, caller, .. } = &err;
        assert_eq!(key, "location");
        assert_eq!(caller.as_deref(), Some("/work/spec/cart.rs:3:1"));
        assert!(err.to_string().contains("`location` is not allowed"));
    }

    #[test]
    fn every_reserved_key_is_rejected_on_examples() {
        let context = context();
        let root = group(&context, None, vec!["Cart".into()]);
        for key in keys::ReservedKeySet::all() {
            let result = ExampleMetadata::create(
                &context,
                &root,
                Some("x".into()),
                Declaration::new().with_tags(UserTags::new().flag(*key)),
            );
            assert!(result.is_err(), "{key} was accepted");
        }
    }
}

// =============================================================================
// Locations
// =============================================================================

mod locations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn location_formats_path_and_line() {
        let context = context();
        let root = GroupMetadata::create(
            &context,
            None,
            vec!["Foo".into()],
            Declaration::new()
                .with_body(BodyHandle::new().with_source_location("/work/spec/foo_spec.rb", 10)),
        )
        .unwrap();

        assert_eq!(root.file_path().as_deref(), Some("./spec/foo_spec.rb"));
        assert_eq!(root.line_number(), 10);
        assert_eq!(root.location(), "./spec/foo_spec.rb:10");
    }

    #[test]
    fn ephemeral_script_has_no_file_path() {
        let context = context();
        let root = GroupMetadata::create(
            &context,
            None,
            vec!["inline".into()],
            Declaration::new().called_from("-e:1"),
        )
        .unwrap();

        assert_eq!(root.file_path(), None);
        assert_eq!(root.line_number(), 1);
        assert_eq!(root.location(), ":1");
    }

    #[test]
    fn framework_frames_are_skipped() {
        let context = context();
        let root = group(&context, None, vec!["Cart".into()]);
        let e = ExampleMetadata::create(
            &context,
            &root,
            Some("totals".into()),
            Declaration::new()
                .called_from("/opt/framework/core/example.rs:88:9")
                .called_from("/opt/framework/dsl.rs:14:5")
                .called_from("/work/spec/cart.rs:21:5"),
        )
        .unwrap();
        assert_eq!(e.location(), "./spec/cart.rs:21");
    }

    #[test]
    fn explicit_caller_tag_wins_and_is_consumed() {
        let context = context();
        let root = GroupMetadata::create(
            &context,
            None,
            vec!["Cart".into()],
            Declaration::new()
                .with_tags(UserTags::new().with(
                    keys::CALLER,
                    MetadataValue::List(vec!["/work/spec/generated.rs".into(), 7.into()]),
                ))
                .with_body(BodyHandle::new().with_source_location("/work/spec/cart.rs", 1)),
        )
        .unwrap();

        assert_eq!(root.location(), "./spec/generated.rs:7");
        assert_eq!(root.get(keys::CALLER), None);
    }
}

// =============================================================================
// Legacy access
// =============================================================================

mod legacy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn adapter_round_trips_described_class() {
        let context = context();
        let root = group(&context, None, vec![ty("Cart")]);
        let mut hash = root.compat();

        let order = MetadataValue::from(TypeHandle::new("Order").unwrap());
        hash.set(keys::DESCRIBED_CLASS, order.clone());
        assert_eq!(root.described_class().unwrap().as_str(), "Order");

        root.record().write().insert(
            keys::DESCRIBED_CLASS,
            TypeHandle::new("Invoice").unwrap(),
        );
        assert_eq!(
            hash.get(keys::DESCRIBED_CLASS),
            Some(MetadataValue::from(TypeHandle::new("Invoice").unwrap()))
        );
    }

    #[test]
    fn example_group_writes_reach_the_parent_only() {
        let sink = Arc::new(CollectingSink::new());
        let context = context_with(sink.clone());
        let root = group(&context, None, vec![ty("Cart")]);
        let child = group(&context, Some(&root), vec!["#total".into()]);

        let mut parent_view = child.legacy_example_group().unwrap();
        parent_view.set("flaky", true.into());

        assert_eq!(root.get("flaky"), Some(MetadataValue::Bool(true)));
        assert_eq!(child.get("flaky"), None);
        assert!(!child.record().read().contains_key(keys::EXAMPLE_GROUP));
        assert!(!root.record().read().contains_key(keys::EXAMPLE_GROUP));
        assert_eq!(sink.notices().len(), 1);

        let e = example(&context, &child, "sums");
        assert!(e.record().read().contains_key(keys::EXAMPLE_GROUP));
    }

    #[test]
    fn group_map_view_synthesizes_example_group() {
        let context = context();
        let root = group(&context, None, vec![ty("Cart")]);
        let child = group(&context, Some(&root), vec!["#total".into()]);

        let map = child.compat().to_map();
        let linked = map.get(keys::EXAMPLE_GROUP).and_then(MetadataValue::as_record);
        assert!(linked.unwrap().ptr_eq(root.record()));
        assert!(!child.record().read().contains_key(keys::EXAMPLE_GROUP));
    }

    #[test]
    fn execution_result_is_per_example_and_reported() {
        let sink = Arc::new(CollectingSink::new());
        let context = context_with(sink.clone());
        let root = group(&context, None, vec!["Cart".into()]);
        let first = example(&context, &root, "a");
        let second = example(&context, &root, "b");

        let mut hash = first.execution_result_hash();
        hash.set("pending_message", "not yet".into());
        hash.set("unknown", 1.into());

        assert_eq!(
            first.execution_result().snapshot().pending_message.as_deref(),
            Some("not yet")
        );
        assert_eq!(second.execution_result().snapshot().pending_message, None);
        assert_eq!(hash.get("unknown"), Some(MetadataValue::Integer(1)));
        assert_eq!(
            sink.subjects(),
            vec![
                "Treating `execution_result` as a hash (`[]=`)",
                "Treating `execution_result` as a hash (`[]=`)",
                "Treating `execution_result` as a hash (`[]`)",
            ]
        );
    }
}

// =============================================================================
// Serialization
// =============================================================================

#[derive(Serialize)]
struct Snapshot {
    full_description: String,
    location: String,
    id: String,
    described_class: Option<String>,
    record: serde_json::Value,
}

#[test]
fn example_record_snapshot() {
    let context = context();
    let root = GroupMetadata::create(
        &context,
        None,
        vec![ty("Cart")],
        Declaration::new()
            .with_tags(UserTags::new().flag("slow"))
            .with_body(BodyHandle::new().with_source_location("/work/spec/cart.rs", 3)),
    )
    .unwrap();
    let e = ExampleMetadata::create(
        &context,
        &root,
        Some("#total is zero".into()),
        Declaration::new()
            .with_body(BodyHandle::new().with_source_location("/work/spec/cart.rs", 4)),
    )
    .unwrap();

    let record = serde_json::to_value(e.record().snapshot()).unwrap();
    let snapshot = Snapshot {
        full_description: e.full_description(),
        location: e.location(),
        id: e.id(),
        described_class: e.described_class().map(|c| c.to_string()),
        record: serde_json::json!({
            "block": record["block"],
            "example_group": record["example_group"],
            "execution_status": record["execution_result"]["status"],
            "kind": record["kind"],
        }),
    };

    insta::assert_json_snapshot!(snapshot, @r###"
    {
      "full_description": "Cart #total is zero",
      "location": "./spec/cart.rs:4",
      "id": "./spec/cart.rs[1:1]",
      "described_class": "Cart",
      "record": {
        "block": "/work/spec/cart.rs:4",
        "example_group": {
          "full_description": "Cart",
          "location": "./spec/cart.rs:3"
        },
        "execution_status": null,
        "kind": "example"
      }
    }
    "###);
}
