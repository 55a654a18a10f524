//! Loader for the compiled schema document.
//!
//! The compiler serializes every tree entry as `[kind, [when, must],
//! payload, ...]` with positional payloads per kind, so this is a manual
//! walk over `serde_json::Value` rather than a derived deserialization.
//! Loading is the only place a `SchemaLoad` error can arise; the resulting
//! tree is immutable for the rest of the run.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::datatype::{Datatype, IntBound, IntRange, IntWidth, LengthRange};
use crate::error::{Error, Result};
use crate::schema::{Children, Module, ModuleTable, NodeId, NodeKind, SchemaNode, SchemaTree};

/// Load a compiled document from a JSON file.
pub fn load_path(path: &Path) -> Result<SchemaTree> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| Error::SchemaLoad(format!("cannot read {}: {err}", path.display())))?;
    load_str(&text)
}

/// Load a compiled document from JSON text.
pub fn load_str(text: &str) -> Result<SchemaTree> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| Error::SchemaLoad(err.to_string()))?;
    load_value(&value)
}

/// Load a compiled document from already-parsed JSON.
pub fn load_value(doc: &Value) -> Result<SchemaTree> {
    let obj = doc
        .as_object()
        .ok_or_else(|| Error::SchemaLoad("document root must be an object".to_string()))?;

    let mut modules = ModuleTable::default();
    if let Some(table) = obj.get("modules").and_then(Value::as_object) {
        for (name, entry) in table {
            let pair = entry
                .as_array()
                .filter(|a| a.len() >= 2)
                .ok_or_else(|| Error::SchemaLoad(format!("module '{name}' is not a pair")))?;
            modules.insert(
                name.clone(),
                Module {
                    prefix: string_at(&pair[0]).unwrap_or_default(),
                    namespace: string_at(&pair[1]).unwrap_or_default(),
                },
            );
        }
    }

    let mut typedefs = BTreeMap::new();
    if let Some(table) = obj.get("typedefs").and_then(Value::as_object) {
        for (name, entry) in table {
            typedefs.insert(name.clone(), parse_datatype(entry)?);
        }
    }

    let mut identities = BTreeMap::new();
    if let Some(table) = obj.get("identities").and_then(Value::as_object) {
        for (name, entry) in table {
            let derived = entry
                .as_array()
                .map(|items| items.iter().filter_map(string_at).collect())
                .unwrap_or_default();
            identities.insert(name.clone(), derived);
        }
    }

    let tree = obj
        .get("tree")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::SchemaLoad("missing 'tree' object".to_string()))?;

    let mut builder = Builder { nodes: Vec::new() };
    let root = builder.load_children(tree, None)?;

    Ok(SchemaTree {
        nodes: builder.nodes,
        root,
        modules,
        typedefs,
        identities,
    })
}

struct Builder {
    nodes: Vec<SchemaNode>,
}

impl Builder {
    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn load_children(
        &mut self,
        entries: &serde_json::Map<String, Value>,
        parent: Option<NodeId>,
    ) -> Result<Children> {
        let mut children = Children::new();
        for (key, entry) in entries {
            let id = self.load_entry(key, entry, parent)?;
            children.push((key.clone(), id));
        }
        Ok(children)
    }

    fn load_entry(&mut self, key: &str, entry: &Value, parent: Option<NodeId>) -> Result<NodeId> {
        let parts = entry
            .as_array()
            .ok_or_else(|| Error::SchemaLoad(format!("entry '{key}' is not an array")))?;
        let kind = parts
            .first()
            .and_then(string_at)
            .ok_or_else(|| Error::SchemaLoad(format!("entry '{key}' has no kind tag")))?;
        let (when, must) = parse_when_must(parts.get(1));
        let payload = parts.get(2).unwrap_or(&Value::Null);

        let (module, name) = match key.split_once(':') {
            Some((module, name)) => (Some(module.to_string()), name.to_string()),
            None => (None, key.to_string()),
        };

        // Reserve the slot first so children can point back at it.
        let id = self.push(SchemaNode {
            name,
            module,
            parent,
            when,
            must,
            kind: NodeKind::Container {
                presence: false,
                children: Children::new(),
            },
        });

        let kind = match kind.as_str() {
            "container" | "p-container" => {
                let entries = payload.as_object().ok_or_else(|| {
                    Error::SchemaLoad(format!("container '{key}' payload is not an object"))
                })?;
                let children = self.load_children(entries, Some(id))?;
                NodeKind::Container {
                    presence: kind == "p-container",
                    children,
                }
            }
            "list" => {
                let entries = payload.as_object().ok_or_else(|| {
                    Error::SchemaLoad(format!("list '{key}' payload is not an object"))
                })?;
                let children = self.load_children(entries, Some(id))?;
                let key_leafs = parse_key_leafs(parts.get(3), key)?;
                if key_leafs.is_empty() {
                    return Err(Error::SchemaLoad(format!("list '{key}' has no key leafs")));
                }
                let non_key_children = children
                    .iter()
                    .filter(|(_, child)| {
                        let child = &self.nodes[child.0 as usize];
                        !key_leafs.contains(&child.name)
                    })
                    .cloned()
                    .collect();
                NodeKind::List {
                    key_leafs,
                    children,
                    non_key_children,
                }
            }
            "choice" => {
                let entries = payload.as_object().ok_or_else(|| {
                    Error::SchemaLoad(format!("choice '{key}' payload is not an object"))
                })?;
                let mut cases = Vec::new();
                for (case, members) in entries {
                    let members = members.as_object().ok_or_else(|| {
                        Error::SchemaLoad(format!("case '{case}' of '{key}' is not an object"))
                    })?;
                    // Case members hang off the choice's parent scope, the
                    // same way the compiler flattens cases.
                    let children = self.load_children(members, parent)?;
                    cases.push((case.clone(), children));
                }
                NodeKind::Choice { cases }
            }
            "leaf" => NodeKind::Leaf {
                datatype: parse_datatype(payload)?,
            },
            "leaf-list" => NodeKind::LeafList {
                datatype: parse_datatype(payload)?,
            },
            other => {
                return Err(Error::SchemaLoad(format!(
                    "unhandled node kind '{other}' at '{key}'"
                )));
            }
        };

        self.nodes[id.0 as usize].kind = kind;
        Ok(id)
    }
}

fn parse_when_must(value: Option<&Value>) -> (String, String) {
    match value.and_then(Value::as_array) {
        Some(pair) => (
            pair.first().and_then(string_at).unwrap_or_default(),
            pair.get(1).and_then(string_at).unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    }
}

fn parse_key_leafs(value: Option<&Value>, list: &str) -> Result<Vec<String>> {
    let items = value
        .and_then(Value::as_array)
        .ok_or_else(|| Error::SchemaLoad(format!("list '{list}' is missing its key leafs")))?;
    let mut keys = Vec::new();
    for item in items {
        // Each key is a (module, name) pair; only the bare name matters.
        let name = match item {
            Value::Array(pair) => pair.last().and_then(string_at),
            Value::String(name) => Some(name.clone()),
            _ => None,
        }
        .ok_or_else(|| Error::SchemaLoad(format!("list '{list}' has a malformed key leaf")))?;
        keys.push(name);
    }
    Ok(keys)
}

/// Parse a `[kind, meta]` datatype tuple.
pub fn parse_datatype(value: &Value) -> Result<Datatype> {
    let parts = value
        .as_array()
        .ok_or_else(|| Error::SchemaLoad("datatype is not a tuple".to_string()))?;
    let kind = parts
        .first()
        .and_then(string_at)
        .ok_or_else(|| Error::SchemaLoad("datatype has no kind tag".to_string()))?;
    let meta = parts.get(1).unwrap_or(&Value::Null);

    if let Some(width) = IntWidth::from_name(&kind) {
        return Ok(Datatype::Int {
            width,
            ranges: parse_int_ranges(meta)?,
        });
    }

    match kind.as_str() {
        "decimal64" => {
            let pair = meta
                .as_array()
                .ok_or_else(|| Error::SchemaLoad("decimal64 meta is not a pair".to_string()))?;
            let fraction_digits = pair
                .first()
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::SchemaLoad("decimal64 without fraction digits".to_string()))?
                as u32;
            let range = match pair.get(1) {
                Some(Value::Array(ends)) if ends.len() >= 2 => Some((
                    number_at(&ends[0])?,
                    number_at(&ends[1])?,
                )),
                _ => None,
            };
            Ok(Datatype::Decimal64 {
                fraction_digits,
                range,
            })
        }
        "string" => {
            let pair = meta
                .as_array()
                .ok_or_else(|| Error::SchemaLoad("string meta is not a pair".to_string()))?;
            let lengths = match pair.first().and_then(Value::as_array) {
                Some(items) => items
                    .iter()
                    .map(parse_length_range)
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            let patterns = pair
                .get(1)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(string_at).collect())
                .unwrap_or_default();
            Ok(Datatype::Str { lengths, patterns })
        }
        "boolean" => Ok(Datatype::Boolean),
        "empty" => Ok(Datatype::Empty),
        "enumeration" => {
            let symbols = meta
                .as_array()
                .map(|items| items.iter().filter_map(string_at).collect())
                .unwrap_or_default();
            Ok(Datatype::Enumeration(symbols))
        }
        "identityref" => Ok(Datatype::Identityref {
            base: string_at(meta)
                .ok_or_else(|| Error::SchemaLoad("identityref without base".to_string()))?,
        }),
        "leafref" => Ok(Datatype::Leafref {
            path: string_at(meta)
                .ok_or_else(|| Error::SchemaLoad("leafref without path".to_string()))?,
            strict: true,
        }),
        "ns-leafref" => Ok(Datatype::Leafref {
            path: string_at(meta)
                .ok_or_else(|| Error::SchemaLoad("ns-leafref without path".to_string()))?,
            strict: false,
        }),
        "typedef" => Ok(Datatype::Typedef(string_at(meta).ok_or_else(|| {
            Error::SchemaLoad("typedef reference without name".to_string())
        })?)),
        "union" => {
            let members = meta
                .as_array()
                .ok_or_else(|| Error::SchemaLoad("union without members".to_string()))?
                .iter()
                .map(parse_datatype)
                .collect::<Result<Vec<_>>>()?;
            Ok(Datatype::Union(members))
        }
        other => Ok(Datatype::Unsupported(other.to_string())),
    }
}

fn parse_int_ranges(meta: &Value) -> Result<Vec<IntRange>> {
    let items = match meta.as_array() {
        Some(items) => items,
        None => return Ok(Vec::new()),
    };
    let mut ranges = Vec::new();
    for item in items {
        let parts = item
            .as_array()
            .ok_or_else(|| Error::SchemaLoad("integer range is not a tuple".to_string()))?;
        let min = parts
            .first()
            .map(parse_int_bound)
            .transpose()?
            .ok_or_else(|| Error::SchemaLoad("integer range without a lower bound".to_string()))?;
        let max = match parts.get(1) {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_int_bound(value)?),
        };
        let step = match parts.get(2) {
            Some(value) => value
                .as_i64()
                .ok_or_else(|| Error::SchemaLoad("integer range step is not a number".to_string()))?
                as i128,
            None => 1,
        };
        ranges.push(IntRange { min, max, step });
    }
    Ok(ranges)
}

fn parse_int_bound(value: &Value) -> Result<IntBound> {
    match value {
        Value::String(keyword) if keyword == "min" => Ok(IntBound::Min),
        Value::String(keyword) if keyword == "max" => Ok(IntBound::Max),
        Value::Number(number) => {
            if let Some(v) = number.as_i64() {
                Ok(IntBound::Value(v as i128))
            } else if let Some(v) = number.as_u64() {
                Ok(IntBound::Value(v as i128))
            } else {
                // Ranges on huge uint64 types may arrive as floats.
                Ok(IntBound::Value(number.as_f64().unwrap_or_default() as i128))
            }
        }
        other => Err(Error::SchemaLoad(format!(
            "invalid integer range bound: {other}"
        ))),
    }
}

fn parse_length_range(value: &Value) -> Result<LengthRange> {
    let parts = value
        .as_array()
        .ok_or_else(|| Error::SchemaLoad("length range is not a tuple".to_string()))?;
    let min = parts
        .first()
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::SchemaLoad("length range without a lower bound".to_string()))?;
    let max = parts.get(1).and_then(Value::as_u64);
    Ok(LengthRange { min, max })
}

fn number_at(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::SchemaLoad(format!("expected a number, got {value}")))
}

fn string_at(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
