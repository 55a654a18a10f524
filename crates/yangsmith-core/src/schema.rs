//! Schema node arena and path resolution.
//!
//! Nodes live in a flat arena; parents are indices, so the tree carries
//! back-references without ownership cycles. Children are ordered and keyed
//! by the exact entry key from the compiled document (`"module:name"` at
//! module boundaries, bare `name` otherwise); output ordering and leafref
//! resolution both depend on that.

use std::collections::BTreeMap;
use std::fmt;

use crate::datatype::Datatype;
use crate::error::{Error, Result};

/// Handle into the schema node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// Ordered child scope: `(entry key, node)` pairs.
pub type Children = Vec<(String, NodeId)>;

/// One `(module, name)` step of a schema address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub module: Option<String>,
    pub name: String,
}

impl Segment {
    /// Parse `"name"` or `"module:name"`.
    pub fn parse(part: &str) -> Self {
        match part.split_once(':') {
            Some((module, name)) => Segment {
                module: Some(module.to_string()),
                name: name.to_string(),
            },
            None => Segment {
                module: None,
                name: part.to_string(),
            },
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}:{}", module, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parse a `/a/mod:b/c` address. The string must start with `/`.
pub fn parse_key_path(path: &str) -> Result<Vec<Segment>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
    Ok(rest.split('/').map(Segment::parse).collect())
}

/// Render segments back to `/a/mod:b/c` form.
pub fn format_key_path(segments: &[Segment], leading_slash: bool) -> String {
    let joined = segments
        .iter()
        .map(Segment::to_string)
        .collect::<Vec<_>>()
        .join("/");
    if leading_slash {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Module registry from the compiled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub prefix: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: BTreeMap<String, Module>,
}

impl ModuleTable {
    pub fn insert(&mut self, name: String, module: Module) {
        self.modules.insert(name, module);
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn namespace(&self, name: &str) -> Option<&str> {
        self.modules.get(name).map(|m| m.namespace.as_str())
    }

    pub fn prefix_to_module(&self, prefix: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|(_, m)| m.prefix == prefix)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Module)> {
        self.modules.iter().map(|(name, m)| (name.as_str(), m))
    }
}

/// Node-kind specific payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Container {
        presence: bool,
        children: Children,
    },
    List {
        /// Bare names of the key leafs, in declared order. Never empty.
        key_leafs: Vec<String>,
        children: Children,
        /// Children that are not key leafs, in declared order.
        non_key_children: Children,
    },
    Choice {
        /// Case name to independent child scope, in declared order.
        cases: Vec<(String, Children)>,
    },
    Leaf {
        datatype: Datatype,
    },
    LeafList {
        datatype: Datatype,
    },
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Container { .. } => "container",
            NodeKind::List { .. } => "list",
            NodeKind::Choice { .. } => "choice",
            NodeKind::Leaf { .. } => "leaf",
            NodeKind::LeafList { .. } => "leaf-list",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub name: String,
    /// Owning module; set only where the node sits at a module boundary.
    pub module: Option<String>,
    pub parent: Option<NodeId>,
    pub when: String,
    pub must: String,
    pub kind: NodeKind,
}

impl SchemaNode {
    pub fn datatype(&self) -> Option<&Datatype> {
        match &self.kind {
            NodeKind::Leaf { datatype } | NodeKind::LeafList { datatype } => Some(datatype),
            _ => None,
        }
    }
}

/// Immutable schema tree plus the document tables the generator consults.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: Children,
    pub modules: ModuleTable,
    pub typedefs: BTreeMap<String, Datatype>,
    pub identities: BTreeMap<String, Vec<String>>,
}

impl SchemaTree {
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0 as usize]
    }

    pub fn root_children(&self) -> &Children {
        &self.root
    }

    /// Direct child scope of `scope` (`None` addresses the root). Choice
    /// nodes have no single scope; they expose cases instead.
    pub fn children_of(&self, scope: Option<NodeId>) -> Option<&Children> {
        match scope {
            None => Some(&self.root),
            Some(id) => match &self.node(id).kind {
                NodeKind::Container { children, .. } | NodeKind::List { children, .. } => {
                    Some(children)
                }
                _ => None,
            },
        }
    }

    /// Search `children` for `(module?, name)`. Choice children are searched
    /// transparently (including nested choices) unless `in_choice` is false.
    pub fn find_in(
        &self,
        children: &Children,
        module: Option<&str>,
        name: &str,
        in_choice: bool,
    ) -> Option<NodeId> {
        for (_, id) in children {
            let node = self.node(*id);
            if in_choice {
                if let NodeKind::Choice { cases } = &node.kind {
                    for (_, case_children) in cases {
                        if let Some(found) = self.find_in(case_children, module, name, in_choice) {
                            return Some(found);
                        }
                    }
                    continue;
                }
            }
            if node.name == name && (module.is_none() || module == node.module.as_deref()) {
                return Some(*id);
            }
        }
        None
    }

    /// `find_in` addressed by a `"name"` / `"module:name"` string.
    pub fn find_named(
        &self,
        children: &Children,
        part: &str,
        in_choice: bool,
    ) -> Option<NodeId> {
        let segment = Segment::parse(part);
        self.find_in(children, segment.module.as_deref(), &segment.name, in_choice)
    }

    /// Walk a parsed `/a/b/c` address from the root, descending through
    /// choices transparently.
    pub fn find_key_path(&self, segments: &[Segment]) -> Option<NodeId> {
        let mut scope = self.root.clone();
        let mut found = None;
        for segment in segments {
            let id = self.find_in(&scope, segment.module.as_deref(), &segment.name, true)?;
            found = Some(id);
            scope = self.children_of(Some(id)).cloned().unwrap_or_default();
        }
        found
    }

    /// Root-to-node address of `id`.
    pub fn key_path(&self, id: NodeId) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = self.node(cursor);
            segments.push(Segment {
                module: node.module.clone(),
                name: node.name.clone(),
            });
            current = node.parent;
        }
        segments.reverse();
        segments
    }

    /// Address of `id` relative to the nearest enclosing List (or the
    /// root), used for reporting and for path-keyed override tables.
    pub fn key_path_to_scope(&self, id: NodeId) -> Vec<Segment> {
        let mut segments = vec![Segment {
            module: self.node(id).module.clone(),
            name: self.node(id).name.clone(),
        }];
        let mut current = self.node(id).parent;
        while let Some(cursor) = current {
            let node = self.node(cursor);
            if matches!(node.kind, NodeKind::List { .. }) {
                break;
            }
            segments.push(Segment {
                module: node.module.clone(),
                name: node.name.clone(),
            });
            current = node.parent;
        }
        segments.reverse();
        segments
    }

    /// Nearest module owned by `id` or one of its ancestors. This is the
    /// namespace context a value at `id` is generated in.
    pub fn effective_module(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = self.node(cursor);
            if let Some(module) = node.module.as_deref() {
                return Some(module);
            }
            current = node.parent;
        }
        None
    }

    /// Rendered root-to-node address, for diagnostics.
    pub fn display_path(&self, id: Option<NodeId>) -> String {
        match id {
            Some(id) => format_key_path(&self.key_path(id), true),
            None => "/".to_string(),
        }
    }

    /// Resolve a leafref-style path expression.
    ///
    /// `start` anchors relative paths (those beginning with `".."`);
    /// absolute paths walk from the root. Ascending past a node that owns a
    /// module records a boundary crossing; the next bare segment is then
    /// re-qualified with `context_module`, while an explicitly prefixed
    /// segment settles the crossing on its own. Only one crossing is
    /// tracked, so nested multi-boundary ascents re-qualify once.
    pub fn resolve_path(
        &self,
        start: Option<NodeId>,
        context_module: Option<&str>,
        path: &str,
    ) -> Result<NodeId> {
        let parts: Vec<&str> = path.split('/').collect();
        let (mut cursor, walk): (Option<NodeId>, &[&str]) = if parts.first() == Some(&"..") {
            (start, &parts)
        } else {
            // Absolute: drop the empty segment before the leading '/'.
            (None, parts.get(1..).unwrap_or(&[]))
        };

        let mut left_module = false;
        let mut resolved = None;
        for part in walk {
            if *part == ".." {
                if let Some(id) = cursor {
                    if self.node(id).module.is_some() {
                        left_module = true;
                    }
                    cursor = self.node(id).parent;
                }
                resolved = cursor;
                continue;
            }
            let key = if let Some((prefix, name)) = part.split_once(':') {
                left_module = false;
                let module = self.modules.prefix_to_module(prefix).ok_or_else(|| {
                    Error::PathResolution {
                        path: path.to_string(),
                        segment: (*part).to_string(),
                        at: self.display_path(start),
                    }
                })?;
                format!("{module}:{name}")
            } else if left_module {
                left_module = false;
                match context_module {
                    Some(module) => format!("{module}:{part}"),
                    None => (*part).to_string(),
                }
            } else {
                (*part).to_string()
            };

            let children = self.children_of(cursor).ok_or_else(|| Error::PathResolution {
                path: path.to_string(),
                segment: key.clone(),
                at: self.display_path(cursor),
            })?;
            let next = children
                .iter()
                .find(|(entry, _)| *entry == key)
                .map(|(_, id)| *id)
                .ok_or_else(|| Error::PathResolution {
                    path: path.to_string(),
                    segment: key.clone(),
                    at: self.display_path(start),
                })?;
            cursor = Some(next);
            resolved = Some(next);
        }

        resolved.ok_or_else(|| Error::PathResolution {
            path: path.to_string(),
            segment: String::new(),
            at: self.display_path(start),
        })
    }
}
