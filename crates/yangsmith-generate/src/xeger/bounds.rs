//! Structural length bounds of a pattern, computed from its syntax tree
//! without generating any text.

use std::collections::HashMap;

use crate::errors::GenerationError;
use crate::xeger::{ast, Node};

/// Minimum and maximum lengths of strings the pattern can match.
/// `None` for the maximum means unbounded; repeats are NOT capped here,
/// so `a{200}` reports 200 and `a+` reports `(1, None)`.
pub fn match_length_bounds(pattern: &str) -> Result<(u64, Option<u64>), GenerationError> {
    let nodes = ast::parse(pattern)?;
    let mut groups: HashMap<usize, (u64, Option<u64>)> = HashMap::new();
    Ok(sequence_bounds(&nodes, &mut groups))
}

fn sequence_bounds(
    nodes: &[Node],
    groups: &mut HashMap<usize, (u64, Option<u64>)>,
) -> (u64, Option<u64>) {
    let mut min = 0u64;
    let mut max = Some(0u64);
    for node in nodes {
        let (nmin, nmax) = node_bounds(node, groups);
        min = min.saturating_add(nmin);
        max = match (max, nmax) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            _ => None,
        };
    }
    (min, max)
}

fn node_bounds(
    node: &Node,
    groups: &mut HashMap<usize, (u64, Option<u64>)>,
) -> (u64, Option<u64>) {
    match node {
        Node::Literal(_)
        | Node::NotLiteral(_)
        | Node::Any
        | Node::Class { .. }
        | Node::Category(_) => (1, Some(1)),
        Node::Group { index, body } => {
            let bounds = sequence_bounds(body, groups);
            if let Some(index) = index {
                groups.insert(*index, bounds);
            }
            bounds
        }
        Node::Alternation(branches) => {
            let mut min = u64::MAX;
            let mut max = Some(0u64);
            for branch in branches {
                let (bmin, bmax) = sequence_bounds(branch, groups);
                min = min.min(bmin);
                max = match (max, bmax) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    _ => None,
                };
            }
            (min, max)
        }
        // Mirrors synthesis: a positive lookaround emits its body, a
        // negative one emits nothing.
        Node::Assertion { negative, body } => {
            if *negative {
                (0, Some(0))
            } else {
                sequence_bounds(body, groups)
            }
        }
        Node::Backref(index) => groups.get(index).copied().unwrap_or((0, Some(0))),
        Node::Repeat { min, max, node } => {
            let (cmin, cmax) = node_bounds(node, groups);
            let low = cmin.saturating_mul(u64::from(*min));
            let high = match (cmax, max) {
                (Some(0), _) => Some(0),
                (Some(cm), Some(m)) => Some(cm.saturating_mul(u64::from(*m))),
                _ => None,
            };
            (low, high)
        }
        Node::Anchor => (0, Some(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_literal_run() {
        assert_eq!(match_length_bounds("abc").unwrap(), (3, Some(3)));
    }

    #[test]
    fn bounded_and_unbounded_repeats() {
        assert_eq!(match_length_bounds("a{2,5}").unwrap(), (2, Some(5)));
        assert_eq!(match_length_bounds("a{200}").unwrap(), (200, Some(200)));
        assert_eq!(match_length_bounds("a+").unwrap(), (1, None));
        assert_eq!(match_length_bounds("a*b").unwrap(), (1, None));
    }

    #[test]
    fn alternation_takes_extremes() {
        assert_eq!(match_length_bounds("(ab|cdef)").unwrap(), (2, Some(4)));
        assert_eq!(match_length_bounds("(a|b{3,})").unwrap(), (1, None));
    }

    #[test]
    fn anchors_are_zero_width() {
        assert_eq!(
            match_length_bounds(r"^[a-z]{4}$").unwrap(),
            (4, Some(4))
        );
    }

    #[test]
    fn backref_reuses_group_bounds() {
        assert_eq!(
            match_length_bounds(r"([a-z]{3})-\1").unwrap(),
            (7, Some(7))
        );
    }

    #[test]
    fn repeated_empty_group_stays_empty() {
        assert_eq!(match_length_bounds("(?:)*x").unwrap(), (1, Some(1)));
    }
}
