//! Type-directed random value generation.
//!
//! One entry point, `GenerationContext::generate`, dispatches on the
//! datatype tag. String types fall through to the xeger engine, leafrefs
//! re-enter the schema tree to locate their target and then recurse into
//! the target's own datatype. Everything random flows through the
//! context's seedable RNG.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;
use yangsmith_core::{Datatype, IntRange, IntWidth, LengthRange, NodeId, NodeKind, SchemaTree};

use crate::errors::GenerationError;
use crate::overrides::OverrideTables;
use crate::xeger;

/// Tunables shared by value generation and traversal.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Generate from declared patterns verbatim instead of consulting
    /// the override tables; `.*`/`.+` are still rewritten to bounded
    /// readable classes so output stays printable.
    pub use_unaltered_patterns: bool,
}

/// Everything one generation run needs: the immutable schema, a seeded
/// random source, the override tables, and options. Threaded mutably
/// through every call; never shared across runs.
pub struct GenerationContext<'a> {
    pub tree: &'a SchemaTree,
    pub rng: ChaCha8Rng,
    pub overrides: OverrideTables,
    pub options: GeneratorOptions,
    /// Patterns that hit the synthesis attempt cap during this run.
    pub exhausted_patterns: usize,
}

impl<'a> GenerationContext<'a> {
    pub fn new(tree: &'a SchemaTree, seed: u64) -> Self {
        GenerationContext {
            tree,
            rng: ChaCha8Rng::seed_from_u64(seed),
            overrides: OverrideTables::stock(),
            options: GeneratorOptions::default(),
            exhausted_patterns: 0,
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideTables) -> Self {
        self.overrides = overrides;
        self
    }

    /// Produce one value for `datatype` at position `node` (namespace
    /// context `module`). `Ok(None)` means the leaf is presence-only or
    /// the datatype legitimately yields no value (empty, unresolvable
    /// leafref target).
    pub fn generate(
        &mut self,
        datatype: &Datatype,
        module: Option<&str>,
        node: Option<NodeId>,
    ) -> Result<Option<String>, GenerationError> {
        match datatype {
            Datatype::Int { width, ranges } => {
                Ok(Some(self.int_value(*width, ranges, node)?))
            }
            Datatype::Decimal64 {
                fraction_digits,
                range,
            } => Ok(Some(self.decimal64_value(*fraction_digits, *range))),
            Datatype::Str { lengths, patterns } => {
                self.string_value(datatype, lengths, patterns).map(Some)
            }
            Datatype::Boolean => {
                let value = if self.rng.random_bool(0.5) { "true" } else { "false" };
                Ok(Some(value.to_string()))
            }
            Datatype::Empty => Ok(None),
            Datatype::Enumeration(symbols) => {
                if symbols.is_empty() {
                    return Err(self.invalid(node, "enumeration without symbols"));
                }
                Ok(Some(symbols[self.rng.random_range(0..symbols.len())].clone()))
            }
            Datatype::Identityref { base } => self.identity_value(base).map(Some),
            Datatype::Typedef(name) => self.typedef_value(datatype, name, module, node),
            Datatype::Union(members) => {
                if members.is_empty() {
                    return Err(self.invalid(node, "union without members"));
                }
                let member = &members[self.rng.random_range(0..members.len())];
                self.generate(member, module, node)
            }
            Datatype::Leafref { path, .. } => self.leafref_value(path, module, node),
            Datatype::Unsupported(kind) => {
                if !self.options.use_unaltered_patterns {
                    if let Some(generator) = self.overrides.typedef_override(kind) {
                        return generator(datatype, &mut self.rng).map(Some);
                    }
                }
                Err(GenerationError::UnsupportedType {
                    kind: kind.clone(),
                    path: self.tree.display_path(node),
                })
            }
        }
    }

    fn int_value(
        &mut self,
        width: IntWidth,
        ranges: &[IntRange],
        node: Option<NodeId>,
    ) -> Result<String, GenerationError> {
        let (min, max, step) = if ranges.is_empty() {
            let (lo, hi) = width.limits();
            (lo, hi, 1)
        } else {
            let range = &ranges[self.rng.random_range(0..ranges.len())];
            let min = range.min.resolve(width);
            let max = range.max.map_or(min, |bound| bound.resolve(width));
            (min, max, range.step)
        };
        if step <= 0 || max < min {
            return Err(self.invalid(node, &format!("malformed range {min}..{max} step {step}")));
        }
        let steps = (max - min) / step;
        let value = min + step * self.rng.random_range(0..=steps);
        Ok(value.to_string())
    }

    fn decimal64_value(&mut self, fraction_digits: u32, range: Option<(f64, f64)>) -> String {
        let unscaled: i128 = match range {
            None => i128::from(self.rng.random_range(i64::MIN..=i64::MAX)),
            Some((lo, hi)) => {
                let scale = 10f64.powi(fraction_digits as i32);
                let lo = (lo * scale).round() as i128;
                let hi = ((hi * scale).round() as i128).max(lo);
                self.rng.random_range(lo..=hi)
            }
        };
        let negative = unscaled < 0;
        let mut digits = unscaled.unsigned_abs().to_string();
        let fraction = fraction_digits as usize;
        if digits.len() <= fraction {
            digits = format!("{}{digits}", "0".repeat(fraction + 1 - digits.len()));
        }
        let split = digits.len() - fraction;
        let text = format!("{}.{}", &digits[..split], &digits[split..]);
        if negative { format!("-{text}") } else { text }
    }

    fn string_value(
        &mut self,
        datatype: &Datatype,
        lengths: &[LengthRange],
        declared_patterns: &[String],
    ) -> Result<String, GenerationError> {
        // Only the first declared pattern constrains generation.
        let mut pattern = match declared_patterns.first() {
            Some(pattern) => pattern.clone(),
            None if self.options.use_unaltered_patterns => ".*".to_string(),
            None => "[a-zA-Z0-9 ._]+".to_string(),
        };
        let (lmin, lmax) = if lengths.is_empty() {
            (1, 255)
        } else {
            let length = lengths[self.rng.random_range(0..lengths.len())];
            (length.min, length.max.unwrap_or(length.min))
        };

        let overridden =
            !self.options.use_unaltered_patterns && self.overrides.pattern_override(&pattern).is_some();
        if self.options.use_unaltered_patterns {
            pattern = pattern
                .replace(".*", "[a-z0-9]{0,15}")
                .replace(".+", "[a-z0-9]{1,15}");
        }

        let mut value = String::new();
        let mut attempts = 0u32;
        while (value.chars().count() as u64) < lmin {
            value = match self.overrides.pattern_override(&pattern) {
                Some(generator) if overridden => generator(datatype, &mut self.rng)?,
                _ => xeger::synthesize(&pattern, &mut self.rng)?,
            };
            attempts += 1;
            if attempts == 100 {
                warn!(
                    pattern = %pattern,
                    min = lmin,
                    max = lmax,
                    "pattern synthesis hit the attempt cap, keeping last candidate"
                );
                self.exhausted_patterns += 1;
                break;
            }
        }

        let escaped = escape_markup(&value);
        let cleaned: String = escaped
            .chars()
            .filter(|c| *c != '\u{b}' && *c != '\u{c}')
            .collect();
        Ok(truncate_chars(cleaned, lmax))
    }

    fn identity_value(&mut self, base: &str) -> Result<String, GenerationError> {
        let tree = self.tree;
        let key = if tree.identities.contains_key(base) {
            base
        } else {
            // The base may carry its module prefix.
            match base.split_once(':') {
                Some((_, bare)) if tree.identities.contains_key(bare) => bare,
                _ => return Err(GenerationError::UnknownIdentity(base.to_string())),
            }
        };
        let derived = &tree.identities[key];
        if derived.is_empty() {
            Ok(key.to_string())
        } else {
            Ok(derived[self.rng.random_range(0..derived.len())].clone())
        }
    }

    fn typedef_value(
        &mut self,
        datatype: &Datatype,
        name: &str,
        module: Option<&str>,
        node: Option<NodeId>,
    ) -> Result<Option<String>, GenerationError> {
        if !self.options.use_unaltered_patterns {
            if let Some(generator) = self.overrides.typedef_override(name) {
                return generator(datatype, &mut self.rng).map(Some);
            }
        }
        let tree = self.tree;
        let underlying = tree
            .typedefs
            .get(name)
            .ok_or_else(|| GenerationError::UnknownTypedef(name.to_string()))?;
        self.generate(underlying, module, node)
    }

    /// Resolve a leafref and generate a value for its target. Targets
    /// that are not list key leafs yield no value.
    fn leafref_value(
        &mut self,
        path: &str,
        module: Option<&str>,
        node: Option<NodeId>,
    ) -> Result<Option<String>, GenerationError> {
        let tree = self.tree;
        let target = tree.resolve_path(node, module, path)?;
        let target_node = tree.node(target);
        let is_key = match target_node.parent.map(|parent| tree.node(parent)) {
            Some(parent) => match &parent.kind {
                NodeKind::List { key_leafs, .. } => key_leafs.contains(&target_node.name),
                _ => false,
            },
            None => false,
        };
        if !is_key {
            return Ok(None);
        }
        let datatype = target_node.datatype().ok_or_else(|| GenerationError::InvalidDatatype {
            path: tree.display_path(Some(target)),
            message: "leafref target carries no datatype".to_string(),
        })?;
        if !self.options.use_unaltered_patterns {
            let mut scope: Vec<String> = tree
                .key_path(target)
                .into_iter()
                .map(|segment| segment.name)
                .collect();
            scope.pop();
            if let Some(generator) = self.overrides.keypath_override(&scope) {
                return generator(datatype, &mut self.rng).map(Some);
            }
        }
        self.generate(datatype, module, Some(target))
    }

    fn invalid(&self, node: Option<NodeId>, message: &str) -> GenerationError {
        GenerationError::InvalidDatatype {
            path: self.tree.display_path(node),
            message: message.to_string(),
        }
    }
}

/// Escape characters the markup serializer reserves.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn truncate_chars(text: String, max: u64) -> String {
    match text.char_indices().nth(max as usize) {
        Some((index, _)) => text[..index].to_string(),
        None => text,
    }
}
