//! Schema complexity analysis: nested lists, leafref density, when/must
//! expressions, and a census of string patterns. Purely diagnostic; the
//! report is a serializable contract so frontends can render or archive it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::datatype::Datatype;
use crate::schema::{format_key_path, Children, NodeId, NodeKind, SchemaTree};

/// Complexity snapshot for one schema (or one branch of it).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComplexityReport {
    pub lists: Vec<ListEntry>,
    pub leafrefs: Vec<LeafrefEntry>,
    pub ns_leafrefs: Vec<LeafrefEntry>,
    pub whens: Vec<ExpressionEntry>,
    pub musts: Vec<ExpressionEntry>,
    pub patterns: Vec<PatternEntry>,
}

/// A list (or choice/case marker) row in the nesting table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListEntry {
    pub depth: usize,
    pub path: String,
    pub keys: String,
    pub leaf_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeafrefEntry {
    pub path: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpressionEntry {
    pub path: String,
    pub expression: String,
}

/// Occurrence count for one pattern text. An empty pattern stands for
/// unconstrained strings. Length bounds are filled in by the synthesis
/// engine, which owns the pattern interpreter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PatternEntry {
    pub pattern: String,
    pub count: usize,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// Collect complexity metrics for the scope rooted at `start` (`None` for
/// the whole schema). With `one_level` set the walk does not descend into
/// containers or lists; choice cases are still expanded.
pub fn collect_complexity(
    tree: &SchemaTree,
    start: Option<NodeId>,
    one_level: bool,
) -> ComplexityReport {
    let mut report = ComplexityReport::default();
    let scope = scope_children(tree, start);
    report.lists.push(ListEntry {
        depth: 0,
        path: tree.display_path(start),
        keys: String::new(),
        leaf_count: Some(count_leafs(tree, &scope)),
    });
    walk(tree, &scope, 0, one_level, &mut report);
    report
}

fn scope_children(tree: &SchemaTree, start: Option<NodeId>) -> Children {
    tree.children_of(start).cloned().unwrap_or_default()
}

fn walk(
    tree: &SchemaTree,
    children: &Children,
    depth: usize,
    one_level: bool,
    report: &mut ComplexityReport,
) {
    for (_, id) in children {
        let node = tree.node(*id);
        if !node.when.is_empty() {
            report.whens.push(ExpressionEntry {
                path: format_key_path(&tree.key_path(*id), true),
                expression: node.when.clone(),
            });
        }
        if !node.must.is_empty() {
            report.musts.push(ExpressionEntry {
                path: format_key_path(&tree.key_path(*id), true),
                expression: node.must.clone(),
            });
        }
        match &node.kind {
            NodeKind::Container { children, .. } => {
                if !one_level {
                    walk(tree, children, depth, one_level, report);
                }
            }
            NodeKind::List {
                key_leafs,
                children,
                ..
            } => {
                report.lists.push(ListEntry {
                    depth,
                    path: format_key_path(&tree.key_path_to_scope(*id), false),
                    keys: key_leafs.join(","),
                    leaf_count: Some(count_leafs(tree, children)),
                });
                if !one_level {
                    walk(tree, children, depth + 1, one_level, report);
                }
            }
            NodeKind::Choice { cases } => {
                report.lists.push(ListEntry {
                    depth,
                    path: format!(
                        "{} (choice)",
                        format_key_path(&tree.key_path_to_scope(*id), false)
                    ),
                    keys: String::new(),
                    leaf_count: None,
                });
                for (case, members) in cases {
                    report.lists.push(ListEntry {
                        depth: depth + 1,
                        path: format!("{case} (case)"),
                        keys: String::new(),
                        leaf_count: Some(count_leafs(tree, members)),
                    });
                    walk(tree, members, depth + 2, one_level, report);
                }
            }
            NodeKind::Leaf { datatype } | NodeKind::LeafList { datatype } => {
                match datatype {
                    Datatype::Leafref { path, strict: true } => {
                        report.leafrefs.push(LeafrefEntry {
                            path: format_key_path(&tree.key_path(*id), true),
                            target: path.clone(),
                        });
                    }
                    Datatype::Leafref {
                        path,
                        strict: false,
                    } => {
                        report.ns_leafrefs.push(LeafrefEntry {
                            path: format_key_path(&tree.key_path(*id), true),
                            target: path.clone(),
                        });
                    }
                    _ => {}
                }
                collect_patterns(tree, datatype, report);
            }
        }
    }
}

fn collect_patterns(tree: &SchemaTree, datatype: &Datatype, report: &mut ComplexityReport) {
    match datatype {
        Datatype::Str { patterns, .. } => {
            if patterns.is_empty() {
                bump_pattern(report, "");
            } else {
                for pattern in patterns {
                    bump_pattern(report, pattern);
                }
            }
        }
        Datatype::Typedef(name) => {
            if let Some(underlying) = tree.typedefs.get(name) {
                collect_patterns(tree, underlying, report);
            }
        }
        Datatype::Union(members) => {
            for member in members {
                collect_patterns(tree, member, report);
            }
        }
        _ => {}
    }
}

fn bump_pattern(report: &mut ComplexityReport, pattern: &str) {
    if let Some(entry) = report.patterns.iter_mut().find(|e| e.pattern == pattern) {
        entry.count += 1;
        return;
    }
    report.patterns.push(PatternEntry {
        pattern: pattern.to_string(),
        count: 1,
        min_length: None,
        max_length: None,
    });
}

fn count_leafs(tree: &SchemaTree, children: &Children) -> usize {
    let mut count = 0;
    for (_, id) in children {
        match &tree.node(*id).kind {
            NodeKind::Container { children, .. } => count += count_leafs(tree, children),
            NodeKind::Leaf { .. } | NodeKind::LeafList { .. } => count += 1,
            _ => {}
        }
    }
    count
}
