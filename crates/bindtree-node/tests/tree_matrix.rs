use std::sync::Arc;

use bindtree_node::json::to_json;
use bindtree_node::{
    GenericNode, GenericPath, GenericTreeBuilder, KeyPredicates, NodeIdentifierWithPredicates,
    NodeStreamWriter, NodeWithValue, PathArgument, Scalar,
};
use bindtree_schema::QName;
use serde_json::json;

fn q(local: &str) -> QName {
    QName::new("urn:t", local)
}

fn entry_id(name: &str) -> NodeIdentifierWithPredicates {
    NodeIdentifierWithPredicates::new(
        q("list"),
        [(q("name"), Scalar::from(name))].into_iter().collect::<KeyPredicates>(),
    )
}

fn sample() -> Arc<GenericNode> {
    GenericNode::container(
        q("top"),
        [
            GenericNode::map(
                q("list"),
                false,
                [
                    GenericNode::map_entry(entry_id("a"), [GenericNode::leaf(q("name"), "a")]),
                    GenericNode::map_entry(entry_id("b"), [GenericNode::leaf(q("name"), "b")]),
                ],
            ),
            GenericNode::leaf_set(q("tags"), true, [Scalar::from("x"), Scalar::from("y")]),
        ],
    )
}

#[test]
fn find_walks_maps_and_leaf_sets() {
    let root = sample();
    let name = root
        .find(&[
            PathArgument::Node(q("list")),
            PathArgument::Entry(entry_id("b")),
            PathArgument::Node(q("name")),
        ])
        .unwrap();
    assert_eq!(name.value(), Some(&Scalar::from("b")));

    let tag = root
        .find(&[
            PathArgument::Node(q("tags")),
            PathArgument::Value(NodeWithValue {
                node_type: q("tags"),
                value: Scalar::from("y"),
            }),
        ])
        .unwrap();
    assert_eq!(*tag, GenericNode::Leaf { name: q("tags"), value: Scalar::from("y") });

    assert!(root.find(&[PathArgument::Entry(entry_id("a"))]).is_none());
    assert!(root
        .find(&[PathArgument::Node(q("list")), PathArgument::Entry(entry_id("zz"))])
        .is_none());
}

#[test]
fn equality_ignores_child_order_but_not_entry_content() {
    let forward = GenericNode::container(
        q("c"),
        [GenericNode::leaf(q("a"), 1), GenericNode::leaf(q("b"), 2)],
    );
    let backward = GenericNode::container(
        q("c"),
        [GenericNode::leaf(q("b"), 2), GenericNode::leaf(q("a"), 1)],
    );
    assert_eq!(forward, backward);

    let changed = GenericNode::container(
        q("c"),
        [GenericNode::leaf(q("a"), 1), GenericNode::leaf(q("b"), 3)],
    );
    assert_ne!(forward, changed);
}

#[test]
fn streamed_tree_matches_constructed_tree() {
    let mut b = GenericTreeBuilder::new();
    b.start_container(q("top")).unwrap();
    b.start_map(q("list"), false).unwrap();
    for name in ["a", "b"] {
        b.start_map_entry(entry_id(name)).unwrap();
        b.leaf(q("name"), Scalar::from(name)).unwrap();
        b.end_node().unwrap();
    }
    b.end_node().unwrap();
    b.start_leaf_set(q("tags"), true).unwrap();
    b.leaf_set_entry(Scalar::from("x")).unwrap();
    b.leaf_set_entry(Scalar::from("y")).unwrap();
    b.end_node().unwrap();
    b.end_node().unwrap();
    assert_eq!(b.finish().unwrap(), sample());
}

#[test]
fn paths_render_and_shrink() {
    let path: GenericPath = [
        PathArgument::Node(q("top")),
        PathArgument::Node(q("list")),
        PathArgument::Entry(entry_id("a")),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        path.to_string(),
        "/(urn:t)top/(urn:t)list/(urn:t)list[(urn:t)name='a']"
    );
    assert_eq!(path.parent().unwrap().len(), 2);
    assert_eq!(GenericPath::empty().to_string(), "/");
    assert!(GenericPath::empty().parent().is_none());
}

#[test]
fn json_keeps_entry_order() {
    assert_eq!(
        to_json(&sample()),
        json!({
            "urn:t:top": {
                "list": [{"name": "a"}, {"name": "b"}],
                "tags": ["x", "y"]
            }
        })
    );
}
