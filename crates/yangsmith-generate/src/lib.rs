//! Random sample-configuration generation over a compiled schema tree.
//!
//! The pieces, leaves first: `xeger` synthesizes strings from regular
//! expressions, `values` turns datatypes into concrete values, `overrides`
//! lets callers special-case locations/patterns/typedefs, `descriptor` and
//! `traversal` drive the walk, and `output` abstracts the destination
//! document.

pub mod descriptor;
pub mod errors;
pub mod output;
pub mod overrides;
pub mod report;
pub mod traversal;
pub mod values;
pub mod xeger;

pub use descriptor::{Descriptor, DescriptorValue, StatefulSources, ValueSource};
pub use errors::GenerationError;
pub use output::{OutputBackend, OutputNode, TreeBackend};
pub use overrides::{OverrideFn, OverrideTables};
pub use report::annotate_pattern_bounds;
pub use traversal::{generate_all, generate_at, run_descriptor};
pub use values::{GenerationContext, GeneratorOptions};
