//! Text renderings of the schema: tree view, complexity tables, and the
//! descriptor scaffold.

use std::fmt::Write as _;

use serde_json::{Map, Value};
use yangsmith_core::{
    parse_key_path, Children, ComplexityReport, NodeId, NodeKind, SchemaTree, Segment,
};
use yangsmith_generate::descriptor;

use crate::CliError;

const INDENT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    pub leafs: bool,
    pub one_level: bool,
    pub hide_choice: bool,
}

/// Render the schema tree view. With `path` set, the enclosing levels are
/// printed once and the walk starts below them.
pub fn tree_view(
    tree: &SchemaTree,
    options: TreeOptions,
    path: Option<&str>,
) -> Result<String, CliError> {
    let mut out = String::new();
    let (scope, indent) = match path {
        Some(path) => {
            let (node, segments) = resolve_scope(tree, path)?;
            print_levels(tree, &segments, &mut out);
            let children = tree
                .children_of(Some(node))
                .ok_or_else(|| CliError::InvalidPath(path.to_string()))?;
            (children, segments.len())
        }
        None => (tree.root_children(), 0),
    };
    print_scope(tree, scope, options, indent, &mut out);
    Ok(out)
}

fn resolve_scope(tree: &SchemaTree, path: &str) -> Result<(NodeId, Vec<Segment>), CliError> {
    let segments = parse_key_path(path).map_err(|_| CliError::InvalidPath(path.to_string()))?;
    let node = tree
        .find_key_path(&segments)
        .ok_or_else(|| CliError::InvalidPath(path.to_string()))?;
    Ok((node, segments))
}

fn print_levels(tree: &SchemaTree, segments: &[Segment], out: &mut String) {
    let mut scope = tree.root_children();
    for (indent, segment) in segments.iter().enumerate() {
        let Some(id) = tree.find_in(scope, segment.module.as_deref(), &segment.name, true) else {
            return;
        };
        let node = tree.node(id);
        let pad = " ".repeat(indent * INDENT);
        match &node.kind {
            NodeKind::Container { presence, children } => {
                let label = if *presence { "p-container" } else { "container" };
                let _ = writeln!(out, "{pad}{} ({label})", node.name);
                scope = children;
            }
            NodeKind::List {
                key_leafs, children, ..
            } => {
                let _ = writeln!(out, "{pad}{} (list: {})", node.name, key_leafs.join(","));
                scope = children;
            }
            _ => return,
        }
    }
}

fn print_scope(
    tree: &SchemaTree,
    children: &Children,
    options: TreeOptions,
    indent: usize,
    out: &mut String,
) {
    for (name, id) in children {
        let node = tree.node(*id);
        let pad = " ".repeat(indent * INDENT);
        match &node.kind {
            NodeKind::Container { presence, children } => {
                let label = if *presence { "p-container" } else { "container" };
                let _ = writeln!(out, "{pad}{} ({label})", node.name);
                if !options.one_level {
                    print_scope(tree, children, options, indent + 1, out);
                }
            }
            NodeKind::List {
                key_leafs, children, ..
            } => {
                let _ = writeln!(out, "{pad}{name} (list: {})", key_leafs.join(","));
                if !options.one_level {
                    print_scope(tree, children, options, indent + 1, out);
                }
            }
            NodeKind::Choice { cases } => {
                if !options.hide_choice {
                    let _ = writeln!(out, "{pad}{name} (choice)");
                }
                for (case, members) in cases {
                    if !options.hide_choice {
                        let case_pad = " ".repeat((indent + 1) * INDENT);
                        let _ = writeln!(
                            out,
                            "{case_pad}{case} (case) ({} member(s))",
                            members.len()
                        );
                    }
                    print_scope(tree, members, options, indent + 2, out);
                }
            }
            NodeKind::Leaf { datatype } => {
                if options.leafs {
                    let _ = writeln!(out, "{pad}{name} (leaf) ({})", datatype.kind());
                }
            }
            NodeKind::LeafList { datatype } => {
                if options.leafs {
                    let _ = writeln!(out, "{pad}{name} (leaf-list) ({})", datatype.kind());
                }
            }
        }
    }
}

/// Which sections of the complexity report to print.
#[derive(Debug, Clone, Copy)]
pub struct ComplexitySections {
    pub lists: bool,
    pub leafrefs: bool,
    pub ns_leafrefs: bool,
    pub whens: bool,
    pub musts: bool,
    pub patterns: bool,
}

impl ComplexitySections {
    pub fn any(&self) -> bool {
        self.lists || self.leafrefs || self.ns_leafrefs || self.whens || self.musts || self.patterns
    }

    pub fn all() -> Self {
        ComplexitySections {
            lists: true,
            leafrefs: true,
            ns_leafrefs: true,
            whens: true,
            musts: true,
            patterns: true,
        }
    }
}

pub fn complexity_text(report: &ComplexityReport, sections: ComplexitySections) -> String {
    let mut out = String::new();
    if sections.lists {
        let _ = writeln!(out, "\n=== Lists ===\n");
        for entry in &report.lists {
            let path = format!("{}{}", " ".repeat(entry.depth * INDENT), entry.path);
            let count = entry
                .leaf_count
                .map(|c| c.to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "{path:<120} {:<20} {count:>5}", entry.keys);
        }
    }
    if sections.ns_leafrefs {
        let _ = writeln!(out, "\n=== Non-strict Leafrefs ===\n");
        for entry in &report.ns_leafrefs {
            let _ = writeln!(out, "{:<120} {}", entry.path, entry.target);
        }
    }
    if sections.leafrefs {
        let _ = writeln!(out, "\n=== Leafrefs ===\n");
        for entry in &report.leafrefs {
            let _ = writeln!(out, "{:<120} {}", entry.path, entry.target);
        }
    }
    if sections.whens {
        let _ = writeln!(out, "\n=== When statements ===\n");
        for entry in &report.whens {
            let _ = writeln!(out, "{:<120} {}", entry.path, entry.expression);
        }
    }
    if sections.musts {
        let _ = writeln!(out, "\n=== Must statements ===\n");
        for entry in &report.musts {
            let _ = writeln!(out, "{:<120} {}", entry.path, entry.expression);
        }
    }
    if sections.patterns {
        let _ = writeln!(out, "\n=== Patterns ===\n");
        for entry in &report.patterns {
            let name = if entry.pattern.is_empty() {
                "(string)".to_string()
            } else {
                format!("\"{}\"", entry.pattern)
            };
            let min = entry.min_length.map(|v| v.to_string()).unwrap_or_default();
            let max = entry
                .max_length
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "{name:<120} {:>6} {min:>4} - {max:>6}", entry.count);
        }
    }
    out
}

/// Build a descriptor scaffold for the schema: one member per container,
/// list, and choice. Lists carry a `__NO_INSTANCES` directive, choices a
/// `__CHOOSE` preset to their first case. With `path` set, the scaffold
/// covers that scope and is wrapped in the enclosing levels so it can be
/// fed back to `rundesc` unchanged.
pub fn descriptor_scaffold(tree: &SchemaTree, path: Option<&str>) -> Result<Value, CliError> {
    let (scope, segments) = match path {
        Some(path) => {
            let (node, segments) = resolve_scope(tree, path)?;
            let children = tree
                .children_of(Some(node))
                .ok_or_else(|| CliError::InvalidPath(path.to_string()))?;
            (children, segments)
        }
        None => (tree.root_children(), Vec::new()),
    };
    let mut value = scaffold_scope(tree, scope);
    for segment in segments.iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert(segment.name.clone(), value);
        value = Value::Object(wrapper);
    }
    Ok(value)
}

fn scaffold_scope(tree: &SchemaTree, children: &Children) -> Value {
    let mut members = Map::new();
    for (name, id) in children {
        let node = tree.node(*id);
        match &node.kind {
            NodeKind::Container { children, .. } => {
                members.insert(name.clone(), scaffold_scope(tree, children));
            }
            NodeKind::List { children, .. } => {
                let mut list = Map::new();
                list.insert(descriptor::NO_INSTANCES.to_string(), Value::from(1));
                if let Value::Object(inner) = scaffold_scope(tree, children) {
                    list.extend(inner);
                }
                members.insert(name.clone(), Value::Object(list));
            }
            NodeKind::Choice { cases } => {
                let mut choice = Map::new();
                if let Some((first, _)) = cases.first() {
                    choice.insert(descriptor::CHOOSE.to_string(), Value::from(first.as_str()));
                }
                for (case, case_members) in cases {
                    choice.insert(case.clone(), scaffold_scope(tree, case_members));
                }
                members.insert(name.clone(), Value::Object(choice));
            }
            NodeKind::Leaf { .. } | NodeKind::LeafList { .. } => {}
        }
    }
    Value::Object(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yangsmith_core::load_str;

    const MODEL: &str = r#"{
        "modules": {"net": ["net", "urn:net"]},
        "tree": {
            "net:devices": ["container", ["", ""], {
                "device": ["list", ["", ""], {
                    "name": ["leaf", ["", ""], ["string", [[], []]]],
                    "mtu": ["leaf", ["", ""], ["uint16", [[1500, 9000]]]],
                    "mode": ["choice", ["", ""], {
                        "a": {"a-val": ["leaf", ["", ""], ["uint8", [[1, 1]]]]},
                        "b": {"b-val": ["leaf", ["", ""], ["uint8", [[2, 2]]]]}
                    }]
                }, [["net", "name"]]]
            }]
        },
        "typedefs": {},
        "identities": {}
    }"#;

    #[test]
    fn tree_view_shows_lists_with_keys() {
        let tree = load_str(MODEL).unwrap();
        let view = tree_view(&tree, TreeOptions::default(), None).unwrap();
        assert!(view.contains("devices (container)"));
        assert!(view.contains("device (list: name)"));
        assert!(view.contains("mode (choice)"));
        assert!(!view.contains("(leaf)"));
    }

    #[test]
    fn leafs_appear_only_on_request() {
        let tree = load_str(MODEL).unwrap();
        let options = TreeOptions {
            leafs: true,
            ..TreeOptions::default()
        };
        let view = tree_view(&tree, options, None).unwrap();
        assert!(view.contains("mtu (leaf) (uint16)"));
    }

    #[test]
    fn path_scoped_view_prints_the_enclosing_levels() {
        let tree = load_str(MODEL).unwrap();
        let view = tree_view(&tree, TreeOptions::default(), Some("/net:devices/device")).unwrap();
        assert!(view.starts_with("devices (container)"));
        assert!(view.contains("    device (list: name)"));
    }

    #[test]
    fn scaffold_marks_lists_and_choices() {
        let tree = load_str(MODEL).unwrap();
        let scaffold = descriptor_scaffold(&tree, None).unwrap();
        let device = &scaffold["devices"]["device"];
        assert_eq!(device["__NO_INSTANCES"], Value::from(1));
        assert_eq!(device["mode"]["__CHOOSE"], Value::from("a"));
        assert!(device["mode"]["b"].is_object());
    }

    #[test]
    fn scaffold_round_trips_through_the_descriptor_parser() {
        let tree = load_str(MODEL).unwrap();
        let scaffold = descriptor_scaffold(&tree, None).unwrap();
        let text = serde_json::to_string(&scaffold).unwrap();
        yangsmith_generate::Descriptor::from_json_str(&text).unwrap();
    }

    #[test]
    fn unknown_path_is_reported() {
        let tree = load_str(MODEL).unwrap();
        assert!(tree_view(&tree, TreeOptions::default(), Some("/nope")).is_err());
    }
}
