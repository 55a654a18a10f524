//! Leaf datatypes as encoded by the compiled schema document.
//!
//! The compiler emits every type as a `[kind, meta]` tuple; this module is
//! the closed Rust counterpart. Typedefs stay unresolved (`Typedef(name)`)
//! and are expanded lazily by the value generator.

/// Built-in integer widths and their signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
}

impl IntWidth {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uint8" => Some(IntWidth::Uint8),
            "uint16" => Some(IntWidth::Uint16),
            "uint32" => Some(IntWidth::Uint32),
            "uint64" => Some(IntWidth::Uint64),
            "int8" => Some(IntWidth::Int8),
            "int16" => Some(IntWidth::Int16),
            "int32" => Some(IntWidth::Int32),
            "int64" => Some(IntWidth::Int64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntWidth::Uint8 => "uint8",
            IntWidth::Uint16 => "uint16",
            IntWidth::Uint32 => "uint32",
            IntWidth::Uint64 => "uint64",
            IntWidth::Int8 => "int8",
            IntWidth::Int16 => "int16",
            IntWidth::Int32 => "int32",
            IntWidth::Int64 => "int64",
        }
    }

    /// Inclusive domain of the width, wide enough for u64 on both ends.
    pub fn limits(self) -> (i128, i128) {
        match self {
            IntWidth::Uint8 => (0, u8::MAX as i128),
            IntWidth::Uint16 => (0, u16::MAX as i128),
            IntWidth::Uint32 => (0, u32::MAX as i128),
            IntWidth::Uint64 => (0, u64::MAX as i128),
            IntWidth::Int8 => (i8::MIN as i128, i8::MAX as i128),
            IntWidth::Int16 => (i16::MIN as i128, i16::MAX as i128),
            IntWidth::Int32 => (i32::MIN as i128, i32::MAX as i128),
            IntWidth::Int64 => (i64::MIN as i128, i64::MAX as i128),
        }
    }
}

/// One end of a declared integer range. `Min`/`Max` are the symbolic
/// keywords that stand in for the width's true limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntBound {
    Value(i128),
    Min,
    Max,
}

impl IntBound {
    pub fn resolve(self, width: IntWidth) -> i128 {
        let (lo, hi) = width.limits();
        match self {
            IntBound::Value(v) => v,
            IntBound::Min => lo,
            IntBound::Max => hi,
        }
    }
}

/// A declared `(min, max, step)` sub-range. A missing max collapses the
/// range to the single value `min`; the step defaults to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntRange {
    pub min: IntBound,
    pub max: Option<IntBound>,
    pub step: i128,
}

/// A declared string length sub-range. A missing max means "exactly min".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    pub min: u64,
    pub max: Option<u64>,
}

/// Closed set of leaf datatypes understood by the generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Datatype {
    Int {
        width: IntWidth,
        ranges: Vec<IntRange>,
    },
    Decimal64 {
        fraction_digits: u32,
        range: Option<(f64, f64)>,
    },
    Str {
        lengths: Vec<LengthRange>,
        patterns: Vec<String>,
    },
    Boolean,
    Empty,
    Enumeration(Vec<String>),
    Identityref {
        base: String,
    },
    Leafref {
        path: String,
        /// Non-strict leafrefs need not reference an existing instance;
        /// both resolve identically here.
        strict: bool,
    },
    Typedef(String),
    Union(Vec<Datatype>),
    /// Kinds the generator does not implement (bits, binary,
    /// instance-identifier).
    Unsupported(String),
}

impl Datatype {
    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Datatype::Int { width, .. } => width.name(),
            Datatype::Decimal64 { .. } => "decimal64",
            Datatype::Str { .. } => "string",
            Datatype::Boolean => "boolean",
            Datatype::Empty => "empty",
            Datatype::Enumeration(_) => "enumeration",
            Datatype::Identityref { .. } => "identityref",
            Datatype::Leafref { strict: true, .. } => "leafref",
            Datatype::Leafref { strict: false, .. } => "ns-leafref",
            Datatype::Typedef(_) => "typedef",
            Datatype::Union(_) => "union",
            Datatype::Unsupported(kind) => kind,
        }
    }
}
