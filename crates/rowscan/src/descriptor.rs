//! Static layout descriptors for struct-like destinations.
//!
//! A descriptor is emitted once per struct type by `#[derive(Scannable)]` and
//! lives in a `static`. The field index is computed from descriptors only, so
//! no destination value is needed to resolve a shape.

use std::fmt;

/// Layout of one struct type, members in declaration order.
#[derive(Debug)]
pub struct StructDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

#[derive(Debug)]
pub struct FieldDescriptor {
    /// Member name as declared.
    pub name: &'static str,
    /// Member type as written, for diagnostics.
    pub ty: &'static str,
    /// Explicit column name (or prefix for embedded members). `"-"` ignores
    /// the member.
    pub rename: Option<&'static str>,
    /// Whether the member is visible outside its module.
    pub exported: bool,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Scanned as a single value.
    Leaf,
    /// Fields are promoted into the parent's namespace (or under the rename
    /// prefix). `lazy` members are allocated only when a row writes through
    /// them.
    Embedded {
        descriptor: fn() -> &'static StructDescriptor,
        lazy: bool,
    },
}

pub const IGNORE_MARKER: &str = "-";

impl FieldDescriptor {
    pub fn is_ignored(&self) -> bool {
        self.rename == Some(IGNORE_MARKER)
    }
}

impl StructDescriptor {
    /// Renders the shape as `struct Name { field: Type; ... }`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub fn field(&self, index: usize) -> Option<&'static FieldDescriptor> {
        self.fields.get(index)
    }
}

impl fmt::Display for StructDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} {{", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{sep}{}: {}", field.name, field.ty)?;
            if let Some(rename) = field.rename {
                write!(f, " \"{rename}\"")?;
            }
        }
        if !self.fields.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}
