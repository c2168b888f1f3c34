mod common;

use std::sync::Arc;

use bindtree_codec::binding::data_object_eq;
use bindtree_codec::{
    BindingCodecRegistry, BindingValue, CodecError, CodecOptions, DataObject, DataObjectBuilder,
    EnumValue, InstanceIdentifier, StaticTypeRegistry, TypedValue,
};
use bindtree_node::{
    AugmentationIdentifier, GenericNode, GenericPath, KeyPredicates, NodeIdentifierWithPredicates,
    PathArgument, Scalar,
};
use bindtree_schema::{QName, SchemaLocation};
use common::*;
use serde_json::json;

fn assert_same(a: &Arc<dyn DataObject>, b: &Arc<dyn DataObject>) {
    assert!(data_object_eq(&**a, &**b), "{a:?} != {b:?}");
}

fn entry_id(name: &str) -> NodeIdentifierWithPredicates {
    NodeIdentifierWithPredicates::new(
        q("top-level-list"),
        [(q("name"), Scalar::from(name))].into_iter().collect::<KeyPredicates>(),
    )
}

fn entry_node(data: &Arc<GenericNode>, name: &str) -> Arc<GenericNode> {
    data.find(&[
        PathArgument::Node(q("top-level-list")),
        PathArgument::Entry(entry_id(name)),
    ])
    .expect("entry present")
}

fn settings(ty_name: &str, mode: &str) -> Arc<dyn DataObject> {
    DataObjectBuilder::new(ty(ty_name))
        .leaf(
            "mode",
            EnumValue {
                ty: ty("t.Mode"),
                name: mode.into(),
                value: if mode == "auto" { 0 } else { 1 },
            },
        )
        .leaf("level", TypedValue::derived(ty("t.Level"), TypedValue::Uint8(3)))
        .build()
}

fn full_entry(name: &str) -> Arc<dyn DataObject> {
    let extended = DataObjectBuilder::new(ty("t.ExtendedCase"))
        .container(
            "extended",
            DataObjectBuilder::new(ty("t.Extended")).leaf("note", "n").build(),
        )
        .build();
    entry(name)
        .leaf("flags", flags(&["alpha", "gamma"]))
        .leaf("value", TypedValue::union(ty("t.Either"), TypedValue::Uint32(7)))
        .leaf_list("tags", [TypedValue::from("a"), TypedValue::from("b")])
        .choice("identifier", extended)
        .augmentation(DataObjectBuilder::new(ty("t.ListExtra")).leaf("extra", "x").build())
        .build()
}

fn full_top() -> Arc<dyn DataObject> {
    DataObjectBuilder::new(ty("t.Top"))
        .list("top-level-list", [full_entry("foo"), entry("bar").build()])
        .leaf("transport", TypedValue::Identity(ty("t.Tcp")))
        .container("settings", settings("t.Settings", "manual"))
        .list(
            "history",
            [
                DataObjectBuilder::new(ty("t.History")).leaf("entry", "boot").build(),
                DataObjectBuilder::new(ty("t.History")).leaf("entry", "halt").build(),
            ],
        )
        .build()
}

#[test]
fn single_entry_top_matches_expected_generic_tree() {
    let registry = registry();
    let obj = top([entry("foo").build()]);

    let (path, data) = registry.encode(&top_path(), &obj).unwrap();
    assert_eq!(path, [PathArgument::Node(q("top"))].into_iter().collect::<GenericPath>());

    let expected = GenericNode::container(
        q("top"),
        [GenericNode::map(
            q("top-level-list"),
            false,
            [GenericNode::map_entry(
                entry_id("foo"),
                [GenericNode::leaf(q("name"), "foo")],
            )],
        )],
    );
    assert_eq!(data, expected);

    let (typed, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_eq!(typed, top_path());
    assert_same(&decoded, &obj);
}

#[test]
fn full_tree_round_trips() {
    let registry = registry();
    let obj = full_top();
    let (path, data) = registry.encode(&top_path(), &obj).unwrap();
    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_same(&decoded, &obj);

    let entries = decoded.attribute("top-level-list").unwrap().unwrap();
    let foo = &entries.as_list().unwrap()[0];
    assert_eq!(foo.implemented_type(), &ty("t.TopLevelList"));
    let extra = foo.augmentation(&ty("t.ListExtra")).unwrap().unwrap();
    assert_eq!(
        extra.attribute("extra").unwrap(),
        Some(BindingValue::Leaf(TypedValue::from("x")))
    );
    let case = foo.attribute("identifier").unwrap().unwrap();
    assert_eq!(case.as_object().unwrap().implemented_type(), &ty("t.ExtendedCase"));
}

#[test]
fn list_entry_round_trips_on_its_own() {
    let registry = registry();
    let obj = full_entry("foo");
    let (path, data) = registry.encode(&entry_path("foo"), &obj).unwrap();
    assert!(matches!(&*data, GenericNode::MapEntry { id, .. } if *id == entry_id("foo")));

    let (typed, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_eq!(typed, entry_path("foo"));
    assert_same(&decoded, &obj);
}

#[test]
fn bits_carry_only_set_flags() {
    let registry = registry();
    let obj = top([entry("foo").leaf("flags", flags(&["alpha", "gamma"])).build()]);
    let (path, data) = registry.encode(&top_path(), &obj).unwrap();

    let leaf = entry_node(&data, "foo")
        .child(&PathArgument::Node(q("flags")))
        .unwrap();
    assert_eq!(leaf.value(), Some(&Scalar::bits(["alpha", "gamma"])));

    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    let entries = decoded.attribute("top-level-list").unwrap().unwrap();
    let flags_value = entries.as_list().unwrap()[0].attribute("flags").unwrap();
    assert_eq!(
        flags_value,
        Some(BindingValue::Leaf(flags(&["alpha", "gamma"])))
    );
}

#[test]
fn union_picks_first_accepting_member() {
    let registry = registry();
    let obj = top([
        entry("num")
            .leaf("value", TypedValue::union(ty("t.Either"), TypedValue::Uint32(9)))
            .build(),
        entry("text")
            .leaf("value", TypedValue::union(ty("t.Either"), TypedValue::from("nine")))
            .build(),
    ]);
    let (path, data) = registry.encode(&top_path(), &obj).unwrap();
    let value_of = |name: &str| {
        entry_node(&data, name)
            .child(&PathArgument::Node(q("value")))
            .and_then(|leaf| leaf.value().cloned())
    };
    assert_eq!(value_of("num"), Some(Scalar::Uint32(9)));
    assert_eq!(value_of("text"), Some(Scalar::from("nine")));

    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_same(&decoded, &obj);
}

#[test]
fn children_follow_schema_order_not_attribute_order() {
    let registry = registry();
    let scrambled = DataObjectBuilder::new(ty("t.TopLevelList"))
        .augmentation(DataObjectBuilder::new(ty("t.ListExtra")).leaf("extra", "x").build())
        .leaf_list("tags", [TypedValue::from("t")])
        .choice(
            "identifier",
            DataObjectBuilder::new(ty("t.SimpleCase")).leaf("simple", "s").build(),
        )
        .leaf("flags", flags(&["beta"]))
        .key(list_key("foo"))
        .build();
    let obj = top([scrambled]);

    let order = |data: &Arc<GenericNode>| -> Vec<PathArgument> {
        entry_node(data, "foo").children().unwrap().keys().cloned().collect()
    };
    let (_, first) = registry.encode(&top_path(), &obj).unwrap();
    let (_, second) = registry.encode(&top_path(), &obj).unwrap();

    let expected = vec![
        PathArgument::Node(q("name")),
        PathArgument::Node(q("flags")),
        PathArgument::Node(q("tags")),
        PathArgument::Node(q("identifier")),
        PathArgument::Augmentation(AugmentationIdentifier::new([aq("extra")].into_iter().collect())),
    ];
    assert_eq!(order(&first), expected);
    assert_eq!(order(&second), expected);
    assert_eq!(
        bindtree_node::json::to_json(&first).to_string(),
        bindtree_node::json::to_json(&second).to_string()
    );
}

#[test]
fn empty_lists_are_not_encoded() {
    let registry = registry();
    let obj = DataObjectBuilder::new(ty("t.Top"))
        .list("top-level-list", Vec::<Arc<dyn DataObject>>::new())
        .build();
    let (path, data) = registry.encode(&top_path(), &obj).unwrap();
    assert_eq!(data, GenericNode::container(q("top"), Vec::<Arc<GenericNode>>::new()));

    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_eq!(decoded.attribute("top-level-list").unwrap(), None);
    assert_same(&decoded, &obj);
}

#[test]
fn grouping_instances_encode_alike_and_decode_to_canonical_type() {
    let registry = registry();
    let canonical = DataObjectBuilder::new(ty("t.Top"))
        .container("settings", settings("t.Settings", "auto"))
        .build();
    let borrowed = DataObjectBuilder::new(ty("t.Top"))
        .container("settings", settings("t.MirrorSettings", "auto"))
        .build();

    let (path, a) = registry.encode(&top_path(), &canonical).unwrap();
    let (_, b) = registry.encode(&top_path(), &borrowed).unwrap();
    assert_eq!(a, b);

    let (_, decoded) = registry.decode(&path, &b).unwrap().unwrap();
    let settings = decoded.attribute("settings").unwrap().unwrap();
    assert_eq!(settings.as_object().unwrap().implemented_type(), &ty("t.Settings"));
    assert_same(&decoded, &canonical);
}

#[test]
fn augmentations_from_one_grouping_are_interchangeable() {
    let registry = registry();
    let with = |aug: &str| {
        top([entry("foo")
            .augmentation(DataObjectBuilder::new(ty(aug)).leaf("extra", "x").build())
            .build()])
    };
    let (path, a) = registry.encode(&top_path(), &with("t.ListExtra")).unwrap();
    let (_, b) = registry.encode(&top_path(), &with("t.MirrorExtra")).unwrap();
    assert_eq!(a, b);

    let (_, decoded) = registry.decode(&path, &b).unwrap().unwrap();
    assert_same(&decoded, &with("t.ListExtra"));
}

#[test]
fn absent_augmentation_is_none() {
    let registry = registry();
    let obj = entry("foo").build();
    let (path, data) = registry.encode(&entry_path("foo"), &obj).unwrap();
    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert!(decoded.augmentation(&ty("t.ListExtra")).unwrap().is_none());
    assert!(decoded.augmentations().unwrap().is_empty());
}

#[test]
fn eager_decoding_detaches_from_generic_tree() {
    let registry = BindingCodecRegistry::with_options(schema(), types(), CodecOptions::eager());
    let obj = full_top();
    let (path, data) = registry.encode(&top_path(), &obj).unwrap();
    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert!(format!("{decoded:?}").starts_with("ImmutableDataObject"));
    assert_same(&decoded, &obj);
}

#[test]
fn notifications_round_trip() {
    let registry = registry();
    let event = DataObjectBuilder::new(ty("t.Event")).leaf("message", "link down").build();
    let data = registry.encode_notification(&event).unwrap();
    assert_eq!(
        data,
        GenericNode::container(q("event"), [GenericNode::leaf(q("message"), "link down")])
    );
    assert_same(&registry.decode_notification(&data).unwrap(), &event);

    let err = registry.encode_notification(&top([])).unwrap_err();
    assert!(matches!(err, CodecError::InvalidValue { .. }));
}

#[test]
fn rpc_payloads_round_trip() {
    let registry = registry();
    let input = DataObjectBuilder::new(ty("t.ResetInput"))
        .leaf("target", entry_path("foo"))
        .build();
    let data = registry.encode_rpc_data(&input).unwrap();
    let target = data.child(&PathArgument::Node(q("target"))).unwrap();
    let expected_path: GenericPath = [
        PathArgument::Node(q("top")),
        PathArgument::Node(q("top-level-list")),
        PathArgument::Entry(entry_id("foo")),
    ]
    .into_iter()
    .collect();
    assert_eq!(target.value(), Some(&Scalar::InstanceIdentifier(expected_path)));
    assert_same(&registry.decode_rpc_data(&ty("t.ResetInput"), &data).unwrap(), &input);

    let output = DataObjectBuilder::new(ty("t.ResetOutput")).leaf("ok", true).build();
    let data = registry.encode_rpc_data(&output).unwrap();
    assert_same(&registry.decode_rpc_data(&ty("t.ResetOutput"), &data).unwrap(), &output);
    assert!(matches!(
        registry.decode_rpc_data(&ty("t.ResetInput"), &data),
        Err(CodecError::InvalidValue { .. })
    ));
}

#[test]
fn identities_map_both_ways() {
    let registry = registry();
    assert_eq!(registry.identity_to_qname(&ty("t.Tcp")).unwrap(), q("tcp"));
    assert_eq!(registry.qname_to_identity(&q("transport")).unwrap(), ty("t.Transport"));
    assert!(matches!(
        registry.qname_to_identity(&QName::new("urn:test:other", "udp")),
        Err(CodecError::MissingSchema(_))
    ));
}

#[test]
fn mismatched_attribute_shape_is_rejected() {
    let registry = registry();
    let obj = DataObjectBuilder::new(ty("t.Top")).leaf("settings", "oops").build();
    assert!(matches!(
        registry.encode(&top_path(), &obj),
        Err(CodecError::InvalidValue { .. })
    ));
}

#[test]
fn unbound_schema_node_is_a_missing_type() {
    let types = StaticTypeRegistry::new();
    types.bind(
        ty("t.Top"),
        SchemaLocation::Node(path(&[q("top")])),
    );
    let registry = BindingCodecRegistry::new(schema(), Arc::new(types));
    let data = GenericNode::container(
        q("top"),
        [GenericNode::unkeyed_list(
            q("history"),
            [GenericNode::unkeyed_entry(
                q("history"),
                [GenericNode::leaf(q("entry"), "boot")],
            )],
        )],
    );
    let path: GenericPath = [PathArgument::Node(q("top"))].into_iter().collect();
    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert!(matches!(
        decoded.attribute("history"),
        Err(CodecError::MissingType(_))
    ));
}

#[test]
fn encoded_tree_renders_as_json() {
    let registry = registry();
    let obj = DataObjectBuilder::new(ty("t.Top"))
        .list("top-level-list", [entry("foo").leaf_list("tags", [TypedValue::from("a")]).build()])
        .container(
            "settings",
            DataObjectBuilder::new(ty("t.Settings")).leaf("owner", "ops").build(),
        )
        .build();
    let (_, data) = registry.encode(&top_path(), &obj).unwrap();
    assert_eq!(
        bindtree_node::json::to_json(&data),
        json!({
            "urn:test:main:top": {
                "top-level-list": [{"name": "foo", "tags": ["a"]}],
                "settings": {"owner": "ops"}
            }
        })
    );
}

fn extra_id() -> AugmentationIdentifier {
    AugmentationIdentifier::new([aq("extra")].into_iter().collect())
}

#[test]
fn augmentation_encodes_at_its_entry_path() {
    let registry = registry();
    let typed = entry_path("foo").child(ty("t.ListExtra"));
    let aug = DataObjectBuilder::new(ty("t.ListExtra")).leaf("extra", "x").build();

    let (path, data) = registry.encode(&typed, &aug).unwrap();
    assert_eq!(path.last(), Some(&PathArgument::Augmentation(extra_id())));
    assert_eq!(
        data,
        GenericNode::augmentation(extra_id(), [GenericNode::leaf(aq("extra"), "x")])
    );

    let (decoded_path, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_eq!(decoded_path, typed);
    assert_same(&decoded, &aug);

    let whole = top([entry("foo").augmentation(Arc::clone(&aug)).build()]);
    let (_, whole) = registry.encode(&top_path(), &whole).unwrap();
    let nested = entry_node(&whole, "foo")
        .child(&PathArgument::Augmentation(extra_id()))
        .unwrap();
    assert_eq!(nested, data);
}

#[test]
fn container_inside_a_case_encodes_at_its_path() {
    let registry = registry();
    let typed = entry_path("foo").child(ty("t.Extended"));
    let extended = DataObjectBuilder::new(ty("t.Extended")).leaf("note", "n").build();
    let (path, data) = registry.encode(&typed, &extended).unwrap();
    assert_eq!(path.last(), Some(&PathArgument::Node(q("extended"))));
    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    assert_same(&decoded, &extended);
}

#[test]
fn grouping_sibling_type_encodes_at_a_path() {
    let registry = registry();
    let at = InstanceIdentifier::of(ty("t.Mirror")).child(ty("t.MirrorSettings"));
    let (path, borrowed) = registry.encode(&at, &settings("t.Settings", "auto")).unwrap();
    let (_, own) = registry.encode(&at, &settings("t.MirrorSettings", "auto")).unwrap();
    assert_eq!(borrowed, own);

    let (_, decoded) = registry.decode(&path, &borrowed).unwrap().unwrap();
    assert_eq!(decoded.implemented_type(), &ty("t.MirrorSettings"));
    assert_same(&decoded, &settings("t.MirrorSettings", "auto"));

    let at = entry_path("foo").child(ty("t.ListExtra"));
    let mirror_extra = DataObjectBuilder::new(ty("t.MirrorExtra")).leaf("extra", "x").build();
    let (_, data) = registry.encode(&at, &mirror_extra).unwrap();
    assert_eq!(
        data,
        GenericNode::augmentation(extra_id(), [GenericNode::leaf(aq("extra"), "x")])
    );
}

#[test]
fn unrelated_type_is_still_rejected_at_a_path() {
    let registry = registry();
    let at = InstanceIdentifier::of(ty("t.Mirror")).child(ty("t.MirrorSettings"));
    let extended = DataObjectBuilder::new(ty("t.Extended")).leaf("note", "n").build();
    let err = registry.encode(&at, &extended).unwrap_err();
    assert!(matches!(err, CodecError::InvalidValue { .. }), "{err}");
}

#[test]
fn case_is_selected_past_a_leading_augmentation() {
    let registry = registry();
    let data = GenericNode::map_entry(
        entry_id("foo"),
        [
            GenericNode::leaf(q("name"), "foo"),
            GenericNode::choice(
                q("identifier"),
                [
                    GenericNode::augmentation(
                        AugmentationIdentifier::new([aq("case-extra")].into_iter().collect()),
                        Vec::<Arc<GenericNode>>::new(),
                    ),
                    GenericNode::leaf(q("simple"), "s"),
                ],
            ),
        ],
    );
    let path: GenericPath = [
        PathArgument::Node(q("top")),
        PathArgument::Node(q("top-level-list")),
        PathArgument::Entry(entry_id("foo")),
    ]
    .into_iter()
    .collect();

    let (_, decoded) = registry.decode(&path, &data).unwrap().unwrap();
    let identifier = decoded.attribute("identifier").unwrap().unwrap();
    let case = identifier.as_object().unwrap();
    assert_eq!(case.implemented_type(), &ty("t.SimpleCase"));
    assert_eq!(
        case.attribute("simple").unwrap(),
        Some(BindingValue::Leaf(TypedValue::from("s")))
    );
}
