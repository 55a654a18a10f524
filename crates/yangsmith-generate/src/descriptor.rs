//! Declarative generation descriptors.
//!
//! A descriptor mirrors schema structure: members address schema
//! children, directive keys steer traversal. JSON descriptors carry
//! literals only; computed, stateful, and invocation sources are attached
//! programmatically through the builder methods.

use std::collections::HashMap;

use serde_json::Value;
use yangsmith_core::{NodeId, SchemaTree};

use crate::errors::GenerationError;

/// Instance count for a list subtree.
pub const NO_INSTANCES: &str = "__NO_INSTANCES";
/// Case selection for a choice subtree.
pub const CHOOSE: &str = "__CHOOSE";
/// Silently drop this subtree.
pub const SKIP: &str = "__SKIP";

const DIRECTIVE_PREFIX: &str = "__";

pub type ComputedFn = Box<dyn Fn(&SchemaTree, Option<NodeId>) -> Value + Send + Sync>;
pub type InvokeFn = Box<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Where one descriptor-supplied value comes from.
pub enum ValueSource {
    Literal(Value),
    /// Pure function of the schema position.
    Computed(ComputedFn),
    /// Handle into a caller-provided [`StatefulSources`] registry,
    /// consumed once per visit.
    Stateful(String),
    /// An `(operation, arguments)` pair.
    Invocation(InvokeFn, Vec<Value>),
}

impl ValueSource {
    pub fn literal(value: impl Into<Value>) -> Self {
        ValueSource::Literal(value.into())
    }

    pub fn evaluate(
        &self,
        tree: &SchemaTree,
        node: Option<NodeId>,
        state: &mut StatefulSources,
    ) -> Result<Value, GenerationError> {
        match self {
            ValueSource::Literal(value) => Ok(value.clone()),
            ValueSource::Computed(f) => Ok(f(tree, node)),
            ValueSource::Stateful(handle) => state.next(handle),
            ValueSource::Invocation(f, args) => Ok(f(args)),
        }
    }
}

/// Mutable single-use value sources, owned by the caller so descriptor
/// evaluation itself never hides state.
#[derive(Default)]
pub struct StatefulSources {
    sources: HashMap<String, Box<dyn FnMut() -> Value + Send>>,
}

impl StatefulSources {
    pub fn register(
        &mut self,
        handle: impl Into<String>,
        source: Box<dyn FnMut() -> Value + Send>,
    ) {
        self.sources.insert(handle.into(), source);
    }

    /// A counter source yielding `start`, `start+1`, ...
    pub fn register_counter(&mut self, handle: impl Into<String>, start: u64) {
        let mut next = start;
        self.register(
            handle,
            Box::new(move || {
                let value = next;
                next += 1;
                Value::from(value)
            }),
        );
    }

    fn next(&mut self, handle: &str) -> Result<Value, GenerationError> {
        match self.sources.get_mut(handle) {
            Some(source) => Ok(source()),
            None => Err(GenerationError::InvalidDescriptor(format!(
                "unknown stateful source '{handle}'"
            ))),
        }
    }
}

/// One member's payload inside a descriptor.
pub enum DescriptorValue {
    /// Recurse into the corresponding schema subtree.
    Tree(Descriptor),
    /// Single evaluated value for a leaf.
    Source(ValueSource),
    /// Explicit values for a leaf-list, one entry each.
    Sequence(Vec<Value>),
    /// `(count, source)` expansion for a leaf-list.
    Expansion(ValueSource, ValueSource),
}

/// Ordered member map plus the parsed-out directives.
#[derive(Default)]
pub struct Descriptor {
    pub members: Vec<(String, DescriptorValue)>,
    pub no_instances: Option<ValueSource>,
    pub choose: Option<ValueSource>,
    pub skip: bool,
}

impl Descriptor {
    pub fn new() -> Self {
        Descriptor::default()
    }

    pub fn member(mut self, name: impl Into<String>, value: DescriptorValue) -> Self {
        self.members.push((name.into(), value));
        self
    }

    pub fn literal(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.member(name, DescriptorValue::Source(ValueSource::literal(value)))
    }

    pub fn subtree(self, name: impl Into<String>, descriptor: Descriptor) -> Self {
        self.member(name, DescriptorValue::Tree(descriptor))
    }

    pub fn instances(mut self, count: u64) -> Self {
        self.no_instances = Some(ValueSource::literal(count));
        self
    }

    pub fn instances_from(mut self, source: ValueSource) -> Self {
        self.no_instances = Some(source);
        self
    }

    pub fn pick_case(mut self, case: impl Into<Value>) -> Self {
        self.choose = Some(ValueSource::literal(case));
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<&DescriptorValue> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| value)
    }

    pub fn from_json_str(text: &str) -> Result<Self, GenerationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| GenerationError::InvalidDescriptor(err.to_string()))?;
        Self::from_json(&value)
    }

    /// Build a descriptor from JSON. Objects nest, arrays become
    /// leaf-list sequences, scalars become literal sources.
    pub fn from_json(value: &Value) -> Result<Self, GenerationError> {
        let object = value.as_object().ok_or_else(|| {
            GenerationError::InvalidDescriptor("descriptor must be an object".to_string())
        })?;
        let mut descriptor = Descriptor::new();
        for (key, entry) in object {
            if key.starts_with(DIRECTIVE_PREFIX) {
                match key.as_str() {
                    NO_INSTANCES => {
                        descriptor.no_instances = Some(ValueSource::Literal(entry.clone()));
                    }
                    CHOOSE => descriptor.choose = Some(ValueSource::Literal(entry.clone())),
                    SKIP => descriptor.skip = entry == &Value::Bool(true),
                    other => {
                        return Err(GenerationError::InvalidDescriptor(format!(
                            "unknown directive '{other}'"
                        )));
                    }
                }
                continue;
            }
            let member = match entry {
                Value::Object(_) => DescriptorValue::Tree(Self::from_json(entry)?),
                Value::Array(items) => DescriptorValue::Sequence(items.clone()),
                other => DescriptorValue::Source(ValueSource::Literal(other.clone())),
            };
            descriptor.members.push((key.clone(), member));
        }
        Ok(descriptor)
    }
}

/// Render an evaluated value the way it lands in the output document.
pub fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Interpret an evaluated value as an instance/expansion count.
pub fn value_count(value: Value) -> Result<u64, GenerationError> {
    value.as_u64().ok_or_else(|| {
        GenerationError::InvalidDescriptor(format!("expected a non-negative count, got {value}"))
    })
}
