//! Pattern-tree walker that emits a concrete matching string ("xeger").
//!
//! Every choice point (class member, alternation branch, repeat count)
//! is a uniform pick from the candidate set, driven by the caller's RNG
//! so runs stay reproducible under a fixed seed.

use std::collections::HashMap;

use rand::Rng;

use crate::errors::GenerationError;
use crate::xeger::{ast, complement, ClassItem, Node, PRINTABLE};

/// Upper bound applied to unbounded or very large repeats (`*`, `+`,
/// `{n,}`) during synthesis.
pub const REPEAT_CAP: u32 = 100;

/// Produce a string matching `pattern`.
///
/// The backreference cache lives for exactly one call: a group realized
/// here is replayed verbatim by `\1`-style references later in the same
/// pass, and forgotten afterwards.
pub fn synthesize<R: Rng + ?Sized>(
    pattern: &str,
    rng: &mut R,
) -> Result<String, GenerationError> {
    let nodes = ast::parse(pattern)?;
    let mut cache: HashMap<usize, String> = HashMap::new();
    let mut out = String::new();
    emit_sequence(&nodes, pattern, rng, &mut cache, &mut out)?;
    Ok(out)
}

fn emit_sequence<R: Rng + ?Sized>(
    nodes: &[Node],
    pattern: &str,
    rng: &mut R,
    cache: &mut HashMap<usize, String>,
    out: &mut String,
) -> Result<(), GenerationError> {
    for node in nodes {
        emit_node(node, pattern, rng, cache, out)?;
    }
    Ok(())
}

fn emit_node<R: Rng + ?Sized>(
    node: &Node,
    pattern: &str,
    rng: &mut R,
    cache: &mut HashMap<usize, String>,
    out: &mut String,
) -> Result<(), GenerationError> {
    match node {
        Node::Literal(c) => out.push(*c),
        Node::NotLiteral(c) => {
            let mut excluded = [0u8; 4];
            let candidates = complement(c.encode_utf8(&mut excluded));
            out.push(pick(&candidates, pattern, rng)?);
        }
        Node::Any => {
            let candidates = complement("\n");
            out.push(pick(&candidates, pattern, rng)?);
        }
        Node::Class { negated, items } => {
            let candidates = class_candidates(items, *negated);
            out.push(pick(&candidates, pattern, rng)?);
        }
        Node::Category(category) => {
            out.push(pick(&category.candidates(), pattern, rng)?);
        }
        Node::Group { index, body } => {
            let mut text = String::new();
            emit_sequence(body, pattern, rng, cache, &mut text)?;
            if let Some(index) = index {
                cache.insert(*index, text.clone());
            }
            out.push_str(&text);
        }
        Node::Alternation(branches) => {
            let branch = &branches[rng.random_range(0..branches.len())];
            emit_sequence(branch, pattern, rng, cache, out)?;
        }
        Node::Assertion { negative, body } => {
            // A positive lookaround is approximated by emitting its body;
            // a negative one contributes nothing.
            if !negative {
                emit_sequence(body, pattern, rng, cache, out)?;
            }
        }
        Node::Backref(index) => {
            if let Some(text) = cache.get(index) {
                out.push_str(text);
            }
        }
        Node::Repeat { min, max, node } => {
            let high = max.map_or(REPEAT_CAP, |m| m.min(REPEAT_CAP)).max(*min);
            let count = rng.random_range(*min..=high);
            for _ in 0..count {
                emit_node(node, pattern, rng, cache, out)?;
            }
        }
        Node::Anchor => {}
    }
    Ok(())
}

fn class_candidates(items: &[ClassItem], negated: bool) -> Vec<char> {
    let mut included = String::new();
    for item in items {
        match item {
            ClassItem::Char(c) => included.push(*c),
            ClassItem::Range(lo, hi) => {
                for c in *lo..=*hi {
                    included.push(c);
                }
            }
            ClassItem::Category(category) => {
                included.extend(category.candidates());
            }
        }
    }
    if negated {
        complement(&included)
    } else {
        PRINTABLE.chars().filter(|c| included.contains(*c)).collect()
    }
}

fn pick<R: Rng + ?Sized>(
    candidates: &[char],
    pattern: &str,
    rng: &mut R,
) -> Result<char, GenerationError> {
    if candidates.is_empty() {
        return Err(GenerationError::InvalidPattern {
            pattern: pattern.to_owned(),
            message: "no candidate characters for pattern element".to_owned(),
        });
    }
    Ok(candidates[rng.random_range(0..candidates.len())])
}
