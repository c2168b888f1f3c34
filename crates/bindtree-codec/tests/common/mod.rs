#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use bindtree_codec::{
    BindingCodecRegistry, BindingType, BitsValue, DataObject, DataObjectBuilder, ImmutableKey,
    ImmutableKeyFactory, InstanceIdentifier, KeyHolder, StaticTypeRegistry, TypedValue,
};
use bindtree_schema::{
    AugmentationBuilder, Bit, EnumMember, QName, SchemaContext, SchemaContextBuilder, SchemaLocation,
    SchemaNodeBuilder as N, SchemaPath, TypeDefinition,
};

pub const NS: &str = "urn:test:main";
pub const AUG_NS: &str = "urn:test:aug";

pub fn q(local: &str) -> QName {
    QName::new(NS, local)
}

pub fn aq(local: &str) -> QName {
    QName::new(AUG_NS, local)
}

pub fn ty(name: &str) -> BindingType {
    BindingType::new(name)
}

pub fn path(steps: &[QName]) -> SchemaPath {
    SchemaPath::from_qnames(steps.iter().cloned())
}

fn node(steps: &[&str]) -> SchemaLocation {
    SchemaLocation::Node(path(&steps.iter().map(|s| q(s)).collect::<Vec<_>>()))
}

fn augmentation(target: &[&str], children: &[QName]) -> SchemaLocation {
    SchemaLocation::Augmentation {
        target: path(&target.iter().map(|s| q(s)).collect::<Vec<_>>()),
        identity: children.iter().cloned().collect::<BTreeSet<_>>(),
    }
}

pub fn flags_type() -> TypeDefinition {
    TypeDefinition::Bits {
        name: q("flags"),
        bits: ["alpha", "beta", "gamma"]
            .iter()
            .enumerate()
            .map(|(i, n)| Bit {
                name: (*n).to_owned(),
                position: i as u32,
            })
            .collect(),
    }
}

fn either_type() -> TypeDefinition {
    TypeDefinition::Union {
        name: q("either"),
        members: vec![TypeDefinition::Uint32, TypeDefinition::String],
    }
}

/// Contents of the `settings` grouping, instantiated under `top` and `mirror`.
fn settings() -> N {
    N::container(q("settings"))
        .origin(path(&[q("settings-grouping"), q("settings")]))
        .child(N::leaf(
            q("mode"),
            TypeDefinition::Enumeration {
                name: q("mode"),
                members: vec![
                    EnumMember {
                        name: "auto".to_owned(),
                        value: 0,
                    },
                    EnumMember {
                        name: "manual".to_owned(),
                        value: 1,
                    },
                ],
            },
        ))
        .child(N::leaf(
            q("level"),
            TypeDefinition::Derived {
                name: q("level"),
                base: Box::new(TypeDefinition::Uint8),
            },
        ))
        .child(N::leaf(q("owner"), TypeDefinition::String))
}

/// Augmentation contributed by one grouping to both `top-level-list` and `mirror`.
fn extra(target: SchemaPath) -> AugmentationBuilder {
    AugmentationBuilder::new(target)
        .origin(path(&[aq("extra-grouping")]))
        .child(N::leaf(aq("extra"), TypeDefinition::String))
}

pub fn schema() -> Arc<SchemaContext> {
    let reset = q("reset");
    SchemaContextBuilder::new()
        .module("main", NS)
        .module("aug", AUG_NS)
        .identity(q("transport"), Vec::new())
        .identity(q("tcp"), [q("transport")])
        .data(
            N::container(q("top"))
                .child(
                    N::list(q("top-level-list"), [q("name")])
                        .child(N::leaf(q("name"), TypeDefinition::String))
                        .child(N::leaf(q("flags"), flags_type()))
                        .child(N::leaf(q("value"), either_type()))
                        .child(N::leaf_list(q("tags"), TypeDefinition::String))
                        .child(
                            N::choice(q("identifier"))
                                .child(
                                    N::case(q("simple-case"))
                                        .child(N::leaf(q("simple"), TypeDefinition::String)),
                                )
                                .child(
                                    N::case(q("extended-case")).child(
                                        N::container(q("extended"))
                                            .child(N::leaf(q("note"), TypeDefinition::String)),
                                    ),
                                ),
                        ),
                )
                .child(N::leaf(
                    q("transport"),
                    TypeDefinition::IdentityRef {
                        bases: vec![q("transport")],
                    },
                ))
                .child(settings())
                .child(
                    N::unkeyed_list(q("history")).child(N::leaf(q("entry"), TypeDefinition::String)),
                ),
        )
        .data(N::container(q("mirror")).child(settings()))
        .augment(extra(path(&[q("top"), q("top-level-list")])))
        .augment(extra(path(&[q("mirror")])))
        .notification(N::notification(q("event")).child(N::leaf(q("message"), TypeDefinition::String)))
        .rpc(
            N::rpc(reset.clone())
                .child(N::input(&reset).child(N::leaf(
                    q("target"),
                    TypeDefinition::InstanceIdentifier {
                        require_instance: true,
                    },
                )))
                .child(N::output(&reset).child(N::leaf(q("ok"), TypeDefinition::Boolean))),
        )
        .build()
        .unwrap()
}

pub fn types() -> Arc<StaticTypeRegistry> {
    let types = StaticTypeRegistry::new();
    types
        .bind(ty("t.Top"), node(&["top"]))
        .bind(ty("t.TopLevelList"), node(&["top", "top-level-list"]))
        .bind(ty("t.Identifier"), node(&["top", "top-level-list", "identifier"]))
        .bind(
            ty("t.SimpleCase"),
            node(&["top", "top-level-list", "identifier", "simple-case"]),
        )
        .bind(
            ty("t.ExtendedCase"),
            node(&["top", "top-level-list", "identifier", "extended-case"]),
        )
        .bind(
            ty("t.Extended"),
            node(&["top", "top-level-list", "identifier", "extended-case", "extended"]),
        )
        .bind(ty("t.Settings"), node(&["top", "settings"]))
        .bind(ty("t.History"), node(&["top", "history"]))
        .bind(ty("t.Mirror"), node(&["mirror"]))
        .bind(ty("t.MirrorSettings"), node(&["mirror", "settings"]))
        .bind(ty("t.ListExtra"), augmentation(&["top", "top-level-list"], &[aq("extra")]))
        .bind(ty("t.MirrorExtra"), augmentation(&["mirror"], &[aq("extra")]))
        .bind(ty("t.Event"), node(&["event"]))
        .bind(ty("t.ResetInput"), node(&["reset", "input"]))
        .bind(ty("t.ResetOutput"), node(&["reset", "output"]))
        .bind_key(
            ty("t.TopLevelList"),
            Arc::new(ImmutableKeyFactory::new(ty("t.TopLevelListKey"), ["name"])),
        )
        .bind_definition(q("flags"), ty("t.Flags"))
        .bind_definition(q("either"), ty("t.Either"))
        .bind_definition(q("mode"), ty("t.Mode"))
        .bind_definition(q("level"), ty("t.Level"))
        .bind_identity(q("transport"), ty("t.Transport"))
        .bind_identity(q("tcp"), ty("t.Tcp"));
    Arc::new(types)
}

pub fn registry() -> BindingCodecRegistry {
    BindingCodecRegistry::new(schema(), types())
}

pub fn list_key(name: &str) -> Arc<dyn KeyHolder> {
    Arc::new(ImmutableKey::new(
        ty("t.TopLevelListKey"),
        [("name", TypedValue::from(name))],
    ))
}

/// A list entry with its key set and nothing else.
pub fn entry(name: &str) -> DataObjectBuilder {
    DataObjectBuilder::new(ty("t.TopLevelList")).key(list_key(name))
}

pub fn top<I>(entries: I) -> Arc<dyn DataObject>
where
    I: IntoIterator<Item = Arc<dyn DataObject>>,
{
    DataObjectBuilder::new(ty("t.Top"))
        .list("top-level-list", entries)
        .build()
}

pub fn flags(set: &[&str]) -> TypedValue {
    TypedValue::Bits(BitsValue::new(
        ty("t.Flags"),
        ["alpha", "beta", "gamma"]
            .iter()
            .map(|n| (*n, set.contains(n))),
    ))
}

pub fn top_path() -> InstanceIdentifier {
    InstanceIdentifier::of(ty("t.Top"))
}

pub fn entry_path(name: &str) -> InstanceIdentifier {
    top_path().keyed(ty("t.TopLevelList"), list_key(name))
}
