//! Descriptor-driven traversal and the whole-schema walk.

use serde_json::json;
use yangsmith_core::{load_str, SchemaTree};
use yangsmith_generate::{
    generate_all, generate_at, run_descriptor, Descriptor, DescriptorValue, GenerationContext,
    GenerationError, OutputNode, StatefulSources, TreeBackend, ValueSource,
};

const MODEL: &str = r#"{
  "modules": {
    "net": ["net", "urn:net"]
  },
  "tree": {
    "net:devices": ["container", ["", ""], {
      "device": ["list", ["", ""], {
        "name": ["leaf", ["", ""], ["string", [[], []]]],
        "mtu": ["leaf", ["", ""], ["uint16", [[1500, 1500]]]],
        "tags": ["leaf-list", ["", ""], ["string", [[], []]]],
        "mode": ["choice", ["", ""], {
          "a": {
            "a-val": ["leaf", ["", ""], ["uint8", [[1, 1]]]]
          },
          "b": {
            "b-val": ["leaf", ["", ""], ["uint8", [[2, 2]]]]
          }
        }]
      }, [["net", "name"]]]
    }],
    "net:system": ["container", ["", ""], {
      "hostname": ["leaf", ["", ""], ["string", [[], []]]]
    }]
  }
}"#;

fn model() -> SchemaTree {
    load_str(MODEL).unwrap()
}

fn run(tree: &SchemaTree, seed: u64, descriptor: &Descriptor) -> Result<OutputNode, GenerationError> {
    let mut ctx = GenerationContext::new(tree, seed);
    let mut root = OutputNode::root("config");
    let mut state = StatefulSources::default();
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut root);
        run_descriptor(&mut ctx, &mut backend, descriptor, &mut state)?;
    }
    Ok(root)
}

#[test]
fn zero_instances_emit_nothing() {
    let tree = model();
    let descriptor = Descriptor::from_json(&json!({
        "devices": { "device": { "__NO_INSTANCES": 0 } }
    }))
    .unwrap();
    let root = run(&tree, 1, &descriptor).unwrap();
    let devices = root.child("devices").unwrap();
    assert_eq!(devices.children_named("device").count(), 0);
}

#[test]
fn fixed_key_value_repeats_across_instances() {
    let tree = model();
    let descriptor = Descriptor::from_json(&json!({
        "devices": { "device": { "__NO_INSTANCES": 2, "name": "fixed" } }
    }))
    .unwrap();
    let root = run(&tree, 2, &descriptor).unwrap();
    let devices = root.child("devices").unwrap();
    let entries: Vec<_> = devices.children_named("device").collect();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry.children[0].name, "name");
        assert_eq!(entry.children[0].text.as_deref(), Some("fixed"));
        // Unspecified non-leaf-list members are auto-filled.
        assert_eq!(entry.child("mtu").unwrap().text.as_deref(), Some("1500"));
        // Leaf-lists stay unfilled when unspecified.
        assert_eq!(entry.children_named("tags").count(), 0);
    }
}

#[test]
fn skip_silences_a_subtree_without_error() {
    let tree = model();
    let descriptor = Descriptor::from_json(&json!({
        "devices": { "__SKIP": true },
        "system": { "hostname": "ce0" }
    }))
    .unwrap();
    let root = run(&tree, 3, &descriptor).unwrap();
    assert!(root.child("devices").is_none());
    let system = root.child("system").unwrap();
    assert_eq!(system.child("hostname").unwrap().text.as_deref(), Some("ce0"));
}

#[test]
fn choose_pins_the_case_regardless_of_seed() {
    let tree = model();
    let descriptor = Descriptor::from_json(&json!({
        "devices": { "device": { "mode": { "__CHOOSE": "b" } } }
    }))
    .unwrap();
    for seed in 0..10 {
        let root = run(&tree, seed, &descriptor).unwrap();
        let devices = root.child("devices").unwrap();
        let entry = devices.child("device").unwrap();
        assert!(entry.child("a-val").is_none());
        assert_eq!(entry.child("b-val").unwrap().text.as_deref(), Some("2"));
    }
}

#[test]
fn namespaces_are_resolved_through_the_module_table() {
    let tree = model();
    let descriptor = Descriptor::from_json(&json!({ "devices": {} })).unwrap();
    let root = run(&tree, 4, &descriptor).unwrap();
    let devices = root.child("devices").unwrap();
    assert_eq!(devices.namespace.as_deref(), Some("urn:net"));
}

#[test]
fn leaf_list_sequences_and_expansions() {
    let tree = model();
    let descriptor = Descriptor::new().subtree(
        "devices",
        Descriptor::new().subtree(
            "device",
            Descriptor::new()
                .literal("name", "ce0")
                .member(
                    "tags",
                    DescriptorValue::Sequence(vec![json!("edge"), json!("lab")]),
                ),
        ),
    );
    let root = run(&tree, 5, &descriptor).unwrap();
    let entry = root.child("devices").unwrap().child("device").unwrap();
    let tags: Vec<_> = entry
        .children_named("tags")
        .map(|t| t.text.clone().unwrap())
        .collect();
    assert_eq!(tags, ["edge", "lab"]);

    let mut state = StatefulSources::default();
    state.register_counter("tag-seq", 1);
    let descriptor = Descriptor::new().subtree(
        "devices",
        Descriptor::new().subtree(
            "device",
            Descriptor::new().literal("name", "ce1").member(
                "tags",
                DescriptorValue::Expansion(
                    ValueSource::literal(3),
                    ValueSource::Stateful("tag-seq".to_string()),
                ),
            ),
        ),
    );
    let mut ctx = GenerationContext::new(&tree, 6);
    let mut root = OutputNode::root("config");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut root);
        run_descriptor(&mut ctx, &mut backend, &descriptor, &mut state).unwrap();
    }
    let entry = root.child("devices").unwrap().child("device").unwrap();
    let tags: Vec<_> = entry
        .children_named("tags")
        .map(|t| t.text.clone().unwrap())
        .collect();
    assert_eq!(tags, ["1", "2", "3"]);
}

#[test]
fn computed_sources_see_the_schema_position() {
    let tree = model();
    let descriptor = Descriptor::new().subtree(
        "system",
        Descriptor::new().member(
            "hostname",
            DescriptorValue::Source(ValueSource::Computed(Box::new(|tree, node| {
                json!(format!("host-{}", tree.node(node.unwrap()).name))
            }))),
        ),
    );
    let root = run(&tree, 7, &descriptor).unwrap();
    let system = root.child("system").unwrap();
    assert_eq!(
        system.child("hostname").unwrap().text.as_deref(),
        Some("host-hostname")
    );
}

#[test]
fn unknown_members_and_misplaced_directives_are_fatal() {
    let tree = model();
    let unknown = Descriptor::from_json(&json!({
        "devices": { "no-such-member": "x" }
    }))
    .unwrap();
    assert!(matches!(
        run(&tree, 8, &unknown),
        Err(GenerationError::UnknownMember { member, .. }) if member == "no-such-member"
    ));

    let misplaced = Descriptor::from_json(&json!({
        "devices": { "__NO_INSTANCES": 2 }
    }))
    .unwrap();
    assert!(matches!(
        run(&tree, 9, &misplaced),
        Err(GenerationError::DirectiveMisuse { expected: "list", .. })
    ));

    let misplaced_choose = Descriptor::from_json(&json!({
        "devices": { "device": { "__CHOOSE": "a" } }
    }))
    .unwrap();
    assert!(matches!(
        run(&tree, 10, &misplaced_choose),
        Err(GenerationError::DirectiveMisuse { expected: "choice", .. })
    ));
}

#[test]
fn whole_schema_walk_touches_every_branch() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 11);
    let mut root = OutputNode::root("config");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut root);
        generate_all(&mut ctx, &mut backend).unwrap();
    }
    let devices = root.child("devices").unwrap();
    let entry = devices.child("device").unwrap();
    assert_eq!(entry.children[0].name, "name");
    assert_eq!(entry.child("mtu").unwrap().text.as_deref(), Some("1500"));
    // One sample entry per leaf-list.
    assert_eq!(entry.children_named("tags").count(), 1);
    // Exactly one case of the choice is realized.
    let case_leafs =
        entry.children_named("a-val").count() + entry.children_named("b-val").count();
    assert_eq!(case_leafs, 1);

    let system = root.child("system").unwrap();
    assert!(system.child("hostname").is_some());
}

#[test]
fn path_descent_emits_the_enclosing_levels() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 12);
    let mut root = OutputNode::root("config");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut root);
        generate_at(&mut ctx, &mut backend, "/net:devices/device").unwrap();
    }
    let devices = root.child("devices").unwrap();
    let entry = devices.child("device").unwrap();
    assert_eq!(entry.children[0].name, "name");
    assert!(entry.child("mtu").is_some());
}

#[test]
fn path_descent_rejects_leaf_levels() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 13);
    let mut root = OutputNode::root("config");
    let mut backend = TreeBackend::new(&tree.modules, &mut root);
    let result = generate_at(&mut ctx, &mut backend, "/net:system/hostname");
    assert!(matches!(result, Err(GenerationError::InvalidRoot { .. })));
}
