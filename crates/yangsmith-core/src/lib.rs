//! Core contracts for yangsmith.
//!
//! This crate owns the compiled-schema document model: the node arena,
//! leaf datatypes, path resolution (including the leafref walk), and the
//! complexity metrics shared by the generator and the CLI.

pub mod datatype;
pub mod document;
pub mod error;
pub mod metrics;
pub mod schema;

pub use datatype::{Datatype, IntBound, IntRange, IntWidth, LengthRange};
pub use document::{load_path, load_str, load_value};
pub use error::{Error, Result};
pub use metrics::{collect_complexity, ComplexityReport, PatternEntry};
pub use schema::{
    format_key_path, parse_key_path, Children, Module, ModuleTable, NodeId, NodeKind, SchemaNode,
    SchemaTree, Segment,
};
