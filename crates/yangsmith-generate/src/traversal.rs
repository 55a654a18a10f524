//! Schema traversal: the descriptor-driven state machine and the
//! descriptor-free whole-schema walk.
//!
//! Both walks are synchronous depth-first recursion. Backend scopes
//! borrow their parent scope, so the in-progress document is only ever
//! touched by the active frame.

use rand::Rng;
use tracing::{debug, warn};

use yangsmith_core::{parse_key_path, Children, Error, NodeId, NodeKind, SchemaTree};

use crate::descriptor::{value_count, value_text, Descriptor, DescriptorValue, StatefulSources};
use crate::errors::GenerationError;
use crate::output::OutputBackend;
use crate::values::GenerationContext;

/// Run `descriptor` against the schema root.
pub fn run_descriptor(
    ctx: &mut GenerationContext,
    backend: &mut dyn OutputBackend,
    descriptor: &Descriptor,
    state: &mut StatefulSources,
) -> Result<(), GenerationError> {
    iterate(ctx, None, backend, descriptor, state)
}

fn iterate(
    ctx: &mut GenerationContext,
    node: Option<NodeId>,
    backend: &mut dyn OutputBackend,
    desc: &Descriptor,
    state: &mut StatefulSources,
) -> Result<(), GenerationError> {
    if desc.skip {
        return Ok(());
    }
    let tree = ctx.tree;
    let Some(id) = node else {
        reject_misplaced_directives(tree, desc, "schema", node)?;
        let mut processed = Vec::new();
        return process_members(ctx, None, tree.root_children(), backend, desc, state, &mut processed);
    };

    match &tree.node(id).kind {
        NodeKind::List {
            key_leafs,
            children,
            ..
        } => {
            if desc.choose.is_some() {
                return Err(misuse(tree, crate::descriptor::CHOOSE, "choice", "list", id));
            }
            let count = match &desc.no_instances {
                Some(source) => value_count(source.evaluate(tree, Some(id), state)?)?,
                None => 1,
            };
            for _ in 0..count {
                let mut processed: Vec<String> = Vec::new();
                let mut values = Vec::new();
                for key in key_leafs {
                    processed.push(key.clone());
                    let key_node = tree.find_in(children, None, key, true).ok_or_else(|| {
                        GenerationError::UnknownMember {
                            member: key.clone(),
                            path: tree.display_path(Some(id)),
                        }
                    })?;
                    let value = match desc.get(key) {
                        Some(DescriptorValue::Source(source)) => {
                            Some(value_text(source.evaluate(tree, Some(key_node), state)?))
                        }
                        Some(_) => {
                            return Err(GenerationError::InvalidDescriptor(format!(
                                "key leaf '{key}' must be a scalar value"
                            )));
                        }
                        None => default_leaf_value(ctx, key_node)?,
                    };
                    values.push(value);
                }
                let list = tree.node(id);
                let mut entry =
                    backend.add_list_entry(&list.name, list.module.as_deref(), key_leafs, &values);
                process_members(ctx, Some(id), children, &mut *entry, desc, state, &mut processed)?;
                fill_unspecified(ctx, children, &mut *entry, desc, &processed)?;
            }
        }
        NodeKind::Container { children, .. } => {
            reject_misplaced_directives(tree, desc, "container", node)?;
            let container = tree.node(id);
            let mut scope = backend.add_container(&container.name, container.module.as_deref());
            let mut processed = Vec::new();
            process_members(ctx, Some(id), children, &mut *scope, desc, state, &mut processed)?;
            fill_unspecified(ctx, children, &mut *scope, desc, &processed)?;
        }
        NodeKind::Choice { cases } => {
            if desc.no_instances.is_some() {
                return Err(misuse(
                    tree,
                    crate::descriptor::NO_INSTANCES,
                    "list",
                    "choice",
                    id,
                ));
            }
            if cases.is_empty() {
                debug!(path = %tree.display_path(Some(id)), "choice has no cases");
                return Ok(());
            }
            let case_name = match &desc.choose {
                Some(source) => value_text(source.evaluate(tree, Some(id), state)?),
                None => cases[ctx.rng.random_range(0..cases.len())].0.clone(),
            };
            let case_children = cases
                .iter()
                .find(|(name, _)| *name == case_name)
                .map(|(_, children)| children)
                .ok_or_else(|| GenerationError::UnknownMember {
                    member: case_name.clone(),
                    path: tree.display_path(Some(id)),
                })?;
            let empty = Descriptor::new();
            let case_desc = match desc.get(&case_name) {
                Some(DescriptorValue::Tree(sub)) => sub,
                Some(_) => {
                    return Err(GenerationError::InvalidDescriptor(format!(
                        "case '{case_name}' must be a nested descriptor"
                    )));
                }
                None => &empty,
            };
            let mut processed = Vec::new();
            process_members(ctx, Some(id), case_children, backend, case_desc, state, &mut processed)?;
            fill_unspecified(ctx, case_children, backend, case_desc, &processed)?;
        }
        other => {
            return Err(GenerationError::InvalidRoot {
                kind: other.label(),
                path: tree.display_path(Some(id)),
            });
        }
    }
    Ok(())
}

/// Walk the declared members of `desc` against the schema scope
/// `children`. Directive keys are handled by the caller; lookup here is
/// exact (choice transparency disabled).
fn process_members(
    ctx: &mut GenerationContext,
    scope: Option<NodeId>,
    children: &Children,
    backend: &mut dyn OutputBackend,
    desc: &Descriptor,
    state: &mut StatefulSources,
    processed: &mut Vec<String>,
) -> Result<(), GenerationError> {
    let tree = ctx.tree;
    for (name, value) in &desc.members {
        if processed.iter().any(|done| done == name) {
            continue;
        }
        processed.push(name.clone());
        let child =
            tree.find_named(children, name, false)
                .ok_or_else(|| GenerationError::UnknownMember {
                    member: name.clone(),
                    path: tree.display_path(scope),
                })?;
        let child_node = tree.node(child);
        match value {
            DescriptorValue::Tree(sub) => iterate(ctx, Some(child), backend, sub, state)?,
            DescriptorValue::Sequence(items) => match &child_node.kind {
                NodeKind::LeafList { .. } => {
                    for item in items {
                        let text = value_text(item.clone());
                        backend.add_leaf(&child_node.name, child_node.module.as_deref(), Some(&text));
                    }
                }
                other => {
                    return Err(GenerationError::InvalidDescriptor(format!(
                        "member '{name}' is a {} and cannot take a value sequence",
                        other.label()
                    )));
                }
            },
            DescriptorValue::Expansion(count_source, value_source) => match &child_node.kind {
                NodeKind::LeafList { .. } => {
                    let count = value_count(count_source.evaluate(tree, Some(child), state)?)?;
                    for _ in 0..count {
                        let text = value_text(value_source.evaluate(tree, Some(child), state)?);
                        backend.add_leaf(&child_node.name, child_node.module.as_deref(), Some(&text));
                    }
                }
                other => {
                    return Err(GenerationError::InvalidDescriptor(format!(
                        "member '{name}' is a {} and cannot take a (count, source) expansion",
                        other.label()
                    )));
                }
            },
            DescriptorValue::Source(source) => match &child_node.kind {
                NodeKind::LeafList { .. } => {
                    warn!(member = %name, "scalar value on a leaf-list member, skipping");
                }
                _ => {
                    let text = value_text(source.evaluate(tree, Some(child), state)?);
                    backend.add_leaf(&child_node.name, child_node.module.as_deref(), Some(&text));
                }
            },
        }
    }
    Ok(())
}

/// Default-generate every leaf child the descriptor did not mention.
/// Leaf-lists stay unfilled when unspecified.
fn fill_unspecified(
    ctx: &mut GenerationContext,
    children: &Children,
    backend: &mut dyn OutputBackend,
    desc: &Descriptor,
    processed: &[String],
) -> Result<(), GenerationError> {
    let tree = ctx.tree;
    for (entry_key, id) in children {
        let node = tree.node(*id);
        let mentioned = |name: &str| {
            desc.get(name).is_some() || processed.iter().any(|done| done == name)
        };
        if mentioned(entry_key) || mentioned(&node.name) {
            continue;
        }
        if let NodeKind::Leaf { .. } = node.kind {
            if let Some(value) = default_leaf_value(ctx, *id)? {
                backend.add_leaf(&node.name, node.module.as_deref(), Some(&value));
            }
        }
    }
    Ok(())
}

fn default_leaf_value(
    ctx: &mut GenerationContext,
    id: NodeId,
) -> Result<Option<String>, GenerationError> {
    let tree = ctx.tree;
    let node = tree.node(id);
    let datatype = node
        .datatype()
        .ok_or_else(|| GenerationError::InvalidDatatype {
            path: tree.display_path(Some(id)),
            message: format!("{} node cannot take a leaf value", node.kind.label()),
        })?;
    ctx.generate(datatype, tree.effective_module(id), Some(id))
}

fn reject_misplaced_directives(
    tree: &SchemaTree,
    desc: &Descriptor,
    kind: &'static str,
    node: Option<NodeId>,
) -> Result<(), GenerationError> {
    if desc.no_instances.is_some() {
        return Err(GenerationError::DirectiveMisuse {
            directive: crate::descriptor::NO_INSTANCES,
            expected: "list",
            kind,
            path: tree.display_path(node),
        });
    }
    if desc.choose.is_some() {
        return Err(GenerationError::DirectiveMisuse {
            directive: crate::descriptor::CHOOSE,
            expected: "choice",
            kind,
            path: tree.display_path(node),
        });
    }
    Ok(())
}

fn misuse(
    tree: &SchemaTree,
    directive: &'static str,
    expected: &'static str,
    kind: &'static str,
    id: NodeId,
) -> GenerationError {
    GenerationError::DirectiveMisuse {
        directive,
        expected,
        kind,
        path: tree.display_path(Some(id)),
    }
}

/// Generate a full sample configuration: every container, one entry per
/// list, a random case per choice, one entry per leaf-list.
pub fn generate_all(
    ctx: &mut GenerationContext,
    backend: &mut dyn OutputBackend,
) -> Result<(), GenerationError> {
    let tree = ctx.tree;
    walk_scope(ctx, tree.root_children(), backend, &[], &[])
}

/// Like [`generate_all`], but first descend along `path` (a
/// `/module:name/...` address), emitting the enclosing containers and
/// one list entry per list level, then generate below the addressed
/// node. Only container and list levels are valid on the path.
pub fn generate_at(
    ctx: &mut GenerationContext,
    backend: &mut dyn OutputBackend,
    path: &str,
) -> Result<(), GenerationError> {
    let segments = parse_key_path(path)?;
    let tree = ctx.tree;
    descend(ctx, backend, path, &segments, tree.root_children(), &[])
}

fn descend(
    ctx: &mut GenerationContext,
    backend: &mut dyn OutputBackend,
    full_path: &str,
    segments: &[yangsmith_core::Segment],
    children: &Children,
    path: &[String],
) -> Result<(), GenerationError> {
    let tree = ctx.tree;
    let Some((segment, rest)) = segments.split_first() else {
        return walk_scope(ctx, children, backend, path, &[]);
    };
    let id = tree
        .find_in(children, segment.module.as_deref(), &segment.name, true)
        .ok_or_else(|| Error::PathNotFound(full_path.to_string()))?;
    let node = tree.node(id);
    let mut next = path.to_vec();
    next.push(node.name.clone());
    match &node.kind {
        NodeKind::Container { children, .. } => {
            let mut scope = backend.add_container(&node.name, node.module.as_deref());
            descend(ctx, &mut *scope, full_path, rest, children, &next)
        }
        NodeKind::List { children, .. } => {
            let (mut entry, keys_done) = emit_list_entry(ctx, id, backend, &next)?;
            if rest.is_empty() {
                walk_scope(ctx, children, &mut *entry, &next, &keys_done)
            } else {
                descend(ctx, &mut *entry, full_path, rest, children, &next)
            }
        }
        other => Err(GenerationError::InvalidRoot {
            kind: other.label(),
            path: tree.display_path(Some(id)),
        }),
    }
}

fn walk_scope(
    ctx: &mut GenerationContext,
    children: &Children,
    backend: &mut dyn OutputBackend,
    path: &[String],
    processed: &[String],
) -> Result<(), GenerationError> {
    let tree = ctx.tree;
    for (_, id) in children {
        let node = tree.node(*id);
        match &node.kind {
            NodeKind::Container { children, .. } => {
                let mut scope = backend.add_container(&node.name, node.module.as_deref());
                let mut next = path.to_vec();
                next.push(node.name.clone());
                walk_scope(ctx, children, &mut *scope, &next, &[])?;
            }
            NodeKind::List { children, .. } => {
                let mut next = path.to_vec();
                next.push(node.name.clone());
                let (mut entry, keys_done) = emit_list_entry(ctx, *id, backend, &next)?;
                walk_scope(ctx, children, &mut *entry, &next, &keys_done)?;
            }
            NodeKind::Choice { cases } => {
                if cases.is_empty() {
                    continue;
                }
                let case = &cases[ctx.rng.random_range(0..cases.len())];
                walk_scope(ctx, &case.1, backend, path, &[])?;
            }
            NodeKind::LeafList { .. } => {
                // One sample entry per leaf-list.
                let value = leaf_value(ctx, *id, path)?;
                backend.add_leaf(&node.name, node.module.as_deref(), value.as_deref());
            }
            NodeKind::Leaf { .. } => {
                if processed.iter().any(|done| done == &node.name) {
                    continue;
                }
                let value = leaf_value(ctx, *id, path)?;
                backend.add_leaf(&node.name, node.module.as_deref(), value.as_deref());
            }
        }
    }
    Ok(())
}

fn leaf_value(
    ctx: &mut GenerationContext,
    id: NodeId,
    path: &[String],
) -> Result<Option<String>, GenerationError> {
    let tree = ctx.tree;
    let node = tree.node(id);
    if !ctx.options.use_unaltered_patterns {
        let mut leaf_path = path.to_vec();
        leaf_path.push(node.name.clone());
        if let Some(generator) = ctx.overrides.keypath_override(&leaf_path) {
            if let Some(datatype) = node.datatype() {
                return generator(datatype, &mut ctx.rng).map(Some);
            }
        }
    }
    default_leaf_value(ctx, id)
}

/// Emit one list entry with its key leafs. A key-path override supplies
/// the first key; remaining keys fall back to default generation. Every
/// key is reported back as processed.
fn emit_list_entry<'b>(
    ctx: &mut GenerationContext,
    id: NodeId,
    backend: &'b mut dyn OutputBackend,
    path: &[String],
) -> Result<(Box<dyn OutputBackend + 'b>, Vec<String>), GenerationError> {
    let tree = ctx.tree;
    let node = tree.node(id);
    let NodeKind::List {
        key_leafs,
        children,
        ..
    } = &node.kind
    else {
        return Err(GenerationError::InvalidRoot {
            kind: node.kind.label(),
            path: tree.display_path(Some(id)),
        });
    };
    let overridden =
        !ctx.options.use_unaltered_patterns && ctx.overrides.keypath_override(path).is_some();
    let mut values = Vec::new();
    let mut processed = Vec::new();
    for (index, key) in key_leafs.iter().enumerate() {
        let key_node = tree.find_in(children, None, key, true).ok_or_else(|| {
            GenerationError::UnknownMember {
                member: key.clone(),
                path: tree.display_path(Some(id)),
            }
        })?;
        let datatype =
            tree.node(key_node)
                .datatype()
                .ok_or_else(|| GenerationError::InvalidDatatype {
                    path: tree.display_path(Some(key_node)),
                    message: "list key is not a leaf".to_string(),
                })?;
        let value = match ctx.overrides.keypath_override(path) {
            Some(generator) if overridden && index == 0 => {
                Some(generator(datatype, &mut ctx.rng)?)
            }
            _ => ctx.generate(datatype, tree.effective_module(key_node), Some(key_node))?,
        };
        processed.push(key.clone());
        values.push(value);
    }
    let entry = backend.add_list_entry(&node.name, node.module.as_deref(), key_leafs, &values);
    Ok((entry, processed))
}
