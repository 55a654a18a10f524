//! Abstract output surface for generated configuration trees.
//!
//! Traversal only ever talks to `OutputBackend`; the default
//! implementation materializes an in-memory `OutputNode` tree that a
//! frontend serializes however it likes. Namespaces are resolved through
//! the module table at emission time, so the tree is self-describing.

use serde::Serialize;
use yangsmith_core::ModuleTable;

/// Scoped sink for generated nodes. `add_container` and `add_list_entry`
/// return a child backend covering the new scope; key leafs of a list
/// entry are already emitted when the child backend is handed out.
pub trait OutputBackend {
    fn add_container<'s>(
        &'s mut self,
        name: &str,
        module: Option<&str>,
    ) -> Box<dyn OutputBackend + 's>;

    fn add_list_entry<'s>(
        &'s mut self,
        name: &str,
        module: Option<&str>,
        key_leafs: &[String],
        values: &[Option<String>],
    ) -> Box<dyn OutputBackend + 's>;

    fn add_leaf(&mut self, name: &str, module: Option<&str>, value: Option<&str>);
}

/// One node of the materialized output document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputNode {
    pub name: String,
    pub namespace: Option<String>,
    pub text: Option<String>,
    pub children: Vec<OutputNode>,
}

impl OutputNode {
    pub fn root(name: impl Into<String>) -> Self {
        OutputNode {
            name: name.into(),
            ..OutputNode::default()
        }
    }

    /// First direct child named `name`, for assertions and lookups.
    pub fn child(&self, name: &str) -> Option<&OutputNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named(&self, name: &str) -> impl Iterator<Item = &OutputNode> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Default backend: appends to an `OutputNode` subtree.
pub struct TreeBackend<'a> {
    modules: &'a ModuleTable,
    node: &'a mut OutputNode,
}

impl<'a> TreeBackend<'a> {
    pub fn new(modules: &'a ModuleTable, node: &'a mut OutputNode) -> Self {
        TreeBackend { modules, node }
    }

    fn append(&mut self, name: &str, module: Option<&str>) -> &mut OutputNode {
        let namespace = module
            .and_then(|m| self.modules.namespace(m))
            .map(str::to_string);
        self.node.children.push(OutputNode {
            name: name.to_string(),
            namespace,
            text: None,
            children: Vec::new(),
        });
        let last = self.node.children.len() - 1;
        &mut self.node.children[last]
    }
}

impl OutputBackend for TreeBackend<'_> {
    fn add_container<'s>(
        &'s mut self,
        name: &str,
        module: Option<&str>,
    ) -> Box<dyn OutputBackend + 's> {
        let modules = self.modules;
        let node = self.append(name, module);
        Box::new(TreeBackend { modules, node })
    }

    fn add_list_entry<'s>(
        &'s mut self,
        name: &str,
        module: Option<&str>,
        key_leafs: &[String],
        values: &[Option<String>],
    ) -> Box<dyn OutputBackend + 's> {
        let modules = self.modules;
        let node = self.append(name, module);
        let mut entry = TreeBackend { modules, node };
        for (key, value) in key_leafs.iter().zip(values) {
            entry.add_leaf(key, module, value.as_deref());
        }
        Box::new(entry)
    }

    fn add_leaf(&mut self, name: &str, module: Option<&str>, value: Option<&str>) {
        let leaf = self.append(name, module);
        leaf.text = value.map(str::to_string);
    }
}
