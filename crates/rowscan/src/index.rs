//! Column name to struct member resolution, cached per shape.

use crate::{
    config::ScanConfig,
    descriptor::{FieldKind, StructDescriptor},
    destination::Record,
    error::{Result, ScanError},
};
use lazy_static::lazy_static;
use std::{
    any::TypeId,
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// One member selection: the member's declaration index in its struct, and
/// whether the member is an optional pointer that must be allocated before
/// writing beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub index: usize,
    pub lazy: bool,
}

/// Member selections from the destination root down to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AccessPath(Vec<Step>);

impl AccessPath {
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn indexes(&self) -> Vec<usize> {
        self.0.iter().map(|step| step.index).collect()
    }

    /// True if the path crosses an optional pointer member.
    pub fn is_lazy(&self) -> bool {
        self.0.iter().any(|step| step.lazy)
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", step.index)?;
        }
        write!(f, "]")
    }
}

/// Where a column lands in the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub column: String,
    pub path: AccessPath,
    /// Dotted member names along the path, e.g. `nested.foo_nested`.
    pub member: String,
}

/// Column name to access path table for one struct shape.
#[derive(Debug)]
pub struct FieldIndex {
    shape: String,
    entries: HashMap<String, FieldEntry>,
}

impl FieldIndex {
    /// Walks the descriptor depth-first in declaration order.
    pub fn build(descriptor: &'static StructDescriptor, config: &ScanConfig) -> Result<Self> {
        let mut walk = Walk {
            config,
            root: descriptor,
            shape: descriptor.describe(),
            entries: HashMap::new(),
            stack: Vec::new(),
        };
        walk.visit(descriptor, "", "", &mut Vec::new())?;

        Ok(FieldIndex {
            shape: walk.shape,
            entries: walk.entries,
        })
    }

    pub fn get(&self, column: &str) -> Option<&FieldEntry> {
        self.entries.get(column)
    }

    /// Textual description of the indexed struct, for diagnostics.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

struct Walk<'a> {
    config: &'a ScanConfig,
    root: &'static StructDescriptor,
    shape: String,
    entries: HashMap<String, FieldEntry>,
    stack: Vec<&'static StructDescriptor>,
}

impl Walk<'_> {
    fn visit(
        &mut self,
        descriptor: &'static StructDescriptor,
        prefix: &str,
        member_prefix: &str,
        path: &mut Vec<Step>,
    ) -> Result<()> {
        if self.stack.iter().any(|seen| std::ptr::eq(*seen, descriptor)) {
            return Err(ScanError::invalid_destination(
                self.root.name,
                format!("struct {} embeds itself", descriptor.name),
            ));
        }
        self.stack.push(descriptor);

        for (index, field) in descriptor.fields.iter().enumerate() {
            if !field.exported || field.is_ignored() {
                continue;
            }
            let member = if member_prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{member_prefix}.{}", field.name)
            };

            match field.kind {
                FieldKind::Leaf => {
                    let name = match field.rename {
                        Some(rename) => rename.to_string(),
                        None => self.config.name_case.apply(field.name).into_owned(),
                    };
                    let column = self.config.join(prefix, &name);
                    path.push(Step { index, lazy: false });
                    let entry = FieldEntry {
                        column: column.clone(),
                        path: AccessPath(path.clone()),
                        member,
                    };
                    path.pop();
                    self.claim(column, entry)?;
                }
                FieldKind::Embedded {
                    descriptor: nested,
                    lazy,
                } => {
                    let nested_prefix = match field.rename {
                        Some(rename) => self.config.join(prefix, rename),
                        None => prefix.to_string(),
                    };
                    path.push(Step { index, lazy });
                    let result = self.visit(nested(), &nested_prefix, &member, path);
                    path.pop();
                    result?;
                }
            }
        }

        self.stack.pop();
        Ok(())
    }

    fn claim(&mut self, column: String, entry: FieldEntry) -> Result<()> {
        if let Some(existing) = self.entries.get(&column) {
            return Err(ScanError::DuplicateColumnMapping {
                column,
                first_member: existing.member.clone(),
                first_path: existing.path.clone(),
                second_member: entry.member,
                second_path: entry.path,
                shape: self.shape.clone(),
            });
        }
        self.entries.insert(column, entry);
        Ok(())
    }
}

type CacheKey = (TypeId, ScanConfig);

lazy_static! {
    static ref FIELD_INDEX_CACHE: RwLock<HashMap<CacheKey, Arc<FieldIndex>>> =
        RwLock::new(HashMap::new());
}

/// Returns the field index for the shape identified by `type_id`, building it
/// on first use.
///
/// Concurrent first uses may each build the index; only the first insert is
/// kept and every caller receives that one. Failed builds are not cached.
pub(crate) fn cached_field_index(
    type_id: TypeId,
    descriptor: &'static StructDescriptor,
    config: &ScanConfig,
) -> Result<Arc<FieldIndex>> {
    let key = (type_id, config.clone());

    if let Some(index) = FIELD_INDEX_CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(index));
    }

    let built = Arc::new(FieldIndex::build(descriptor, config)?);
    let mut cache = FIELD_INDEX_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let index = Arc::clone(cache.entry(key).or_insert(built));
    debug!(
        shape = descriptor.name,
        columns = index.len(),
        "Built field index"
    );
    Ok(index)
}

/// The cached field index of `R` under `config`.
pub fn field_index<R: Record + 'static>(config: &ScanConfig) -> Result<Arc<FieldIndex>> {
    cached_field_index(TypeId::of::<R>(), R::descriptor(), config)
}
