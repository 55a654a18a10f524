//! Schema document loading, lookup, and path resolution.

use yangsmith_core::{
    collect_complexity, load_str, parse_key_path, Datatype, Error, NodeKind,
};

const MODEL: &str = r#"{
  "modules": {
    "ios": ["ios", "urn:ios"],
    "inet": ["inet", "urn:inet"]
  },
  "typedefs": {
    "host-name": ["string", [[[1, 16]], ["[a-z][a-z0-9_-]+"]]]
  },
  "identities": {
    "routing-protocol": ["ospf", "bgp"],
    "null-protocol": []
  },
  "tree": {
    "ios:interface": ["container", ["", ""], {
      "Serial": ["list", ["", ""], {
        "name": ["leaf", ["", ""], ["string", [[], []]]],
        "mtu": ["leaf", ["../name != 'x'", ""], ["uint16", [[64, 9000]]]]
      }, [["ios", "name"]]]
    }],
    "ios:routing": ["container", ["", ""], {
      "router": ["choice", ["", ""], {
        "ospf": {
          "area": ["leaf", ["", ""], ["uint8", []]]
        },
        "bgp": {
          "asn": ["leaf", ["", ""], ["uint32", []]]
        }
      }],
      "peer": ["leaf", ["", ""], ["leafref", "../../interface/Serial/name"]],
      "description": ["leaf", ["", ""], ["typedef", "host-name"]]
    }]
  }
}"#;

#[test]
fn loads_tree_shape_in_declared_order() {
    let tree = load_str(MODEL).unwrap();
    let names: Vec<&str> = tree
        .root_children()
        .iter()
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(names, ["ios:interface", "ios:routing"]);

    let interface = tree.find_named(tree.root_children(), "ios:interface", false).unwrap();
    let node = tree.node(interface);
    assert_eq!(node.module.as_deref(), Some("ios"));

    let children = tree.children_of(Some(interface)).unwrap();
    let serial = tree.find_in(children, None, "Serial", false).unwrap();
    match &tree.node(serial).kind {
        NodeKind::List {
            key_leafs,
            children,
            non_key_children,
        } => {
            assert_eq!(key_leafs, &["name".to_string()]);
            assert_eq!(children.len(), 2);
            assert_eq!(non_key_children.len(), 1);
            assert_eq!(non_key_children[0].0, "mtu");
        }
        other => panic!("expected a list, got {}", other.label()),
    }
}

#[test]
fn choice_members_are_found_transparently() {
    let tree = load_str(MODEL).unwrap();
    let routing = tree.find_named(tree.root_children(), "ios:routing", false).unwrap();
    let children = tree.children_of(Some(routing)).unwrap();

    let area = tree.find_in(children, None, "area", true).unwrap();
    assert_eq!(tree.node(area).name, "area");
    // Exact lookup does not see through the choice.
    assert!(tree.find_in(children, None, "area", false).is_none());
}

#[test]
fn relative_leafref_requalifies_after_module_ascent() {
    let tree = load_str(MODEL).unwrap();
    let routing = tree.find_named(tree.root_children(), "ios:routing", false).unwrap();
    let children = tree.children_of(Some(routing)).unwrap();
    let peer = tree.find_in(children, None, "peer", false).unwrap();

    let target = tree
        .resolve_path(Some(peer), Some("ios"), "../../interface/Serial/name")
        .unwrap();
    assert_eq!(tree.node(target).name, "name");

    // Resolution is deterministic for identical inputs.
    let again = tree
        .resolve_path(Some(peer), Some("ios"), "../../interface/Serial/name")
        .unwrap();
    assert_eq!(target, again);
}

#[test]
fn absolute_and_prefixed_paths_resolve() {
    let tree = load_str(MODEL).unwrap();
    let by_absolute = tree
        .resolve_path(None, None, "/ios:interface/Serial/mtu")
        .unwrap();
    assert_eq!(tree.node(by_absolute).name, "mtu");

    let routing = tree.find_named(tree.root_children(), "ios:routing", false).unwrap();
    let children = tree.children_of(Some(routing)).unwrap();
    let peer = tree.find_in(children, None, "peer", false).unwrap();
    let by_prefix = tree
        .resolve_path(Some(peer), Some("ios"), "../../ios:interface/Serial/mtu")
        .unwrap();
    assert_eq!(by_prefix, by_absolute);
}

#[test]
fn failed_segment_reports_path_and_origin() {
    let tree = load_str(MODEL).unwrap();
    let err = tree
        .resolve_path(None, None, "/ios:interface/Ethernet/name")
        .unwrap_err();
    match err {
        Error::PathResolution { path, segment, .. } => {
            assert_eq!(path, "/ios:interface/Ethernet/name");
            assert_eq!(segment, "Ethernet");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn key_path_addressing_round_trips() {
    let tree = load_str(MODEL).unwrap();
    let segments = parse_key_path("/ios:interface/Serial/mtu").unwrap();
    let mtu = tree.find_key_path(&segments).unwrap();
    assert_eq!(tree.node(mtu).name, "mtu");
    assert_eq!(tree.display_path(Some(mtu)), "/ios:interface/Serial/mtu");

    // Scope-relative address stops at the enclosing list.
    let scoped = tree.key_path_to_scope(mtu);
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].name, "mtu");

    assert_eq!(tree.effective_module(mtu), Some("ios"));
}

#[test]
fn unknown_node_kind_is_fatal() {
    let err = load_str(
        r#"{"modules": {}, "tree": {"x": ["notification", ["", ""], {}]}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaLoad(_)));
}

#[test]
fn typedefs_and_identities_load() {
    let tree = load_str(MODEL).unwrap();
    match tree.typedefs.get("host-name") {
        Some(Datatype::Str { lengths, patterns }) => {
            assert_eq!(lengths.len(), 1);
            assert_eq!(patterns, &["[a-z][a-z0-9_-]+".to_string()]);
        }
        other => panic!("unexpected typedef: {other:?}"),
    }
    assert_eq!(tree.identities["routing-protocol"], ["ospf", "bgp"]);
    assert!(tree.identities["null-protocol"].is_empty());
}

#[test]
fn complexity_report_counts_the_essentials() {
    let tree = load_str(MODEL).unwrap();
    let report = collect_complexity(&tree, None, false);

    // Root summary row plus the Serial list, plus choice/case markers.
    assert!(report
        .lists
        .iter()
        .any(|l| l.path == "ios:interface/Serial" && l.keys == "name"));
    assert_eq!(report.leafrefs.len(), 1);
    assert_eq!(report.leafrefs[0].target, "../../interface/Serial/name");
    assert!(report.ns_leafrefs.is_empty());
    assert_eq!(report.whens.len(), 1);

    // One unconstrained string (Serial/name), one typedef-expanded pattern.
    assert!(report.patterns.iter().any(|p| p.pattern.is_empty()));
    assert!(report
        .patterns
        .iter()
        .any(|p| p.pattern == "[a-z][a-z0-9_-]+" && p.count == 1));
}

#[test]
fn one_level_report_stops_at_the_scope_surface() {
    let tree = load_str(MODEL).unwrap();
    let interface = tree
        .find_named(tree.root_children(), "ios:interface", false)
        .unwrap();
    let report = collect_complexity(&tree, Some(interface), true);

    // The Serial row itself is still listed, but its members are not walked.
    assert!(report.lists.iter().any(|l| l.path == "ios:interface/Serial"));
    assert!(report.whens.is_empty());
    assert!(report.patterns.is_empty());

    let full = collect_complexity(&tree, Some(interface), false);
    assert_eq!(full.whens.len(), 1);
}
