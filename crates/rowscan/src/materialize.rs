//! One-row materialization: stage the row into slots, then commit the slots
//! into the destination.

use crate::{
    destination::{MapTarget, Member, Receiver, Record, Target},
    error::{Result, ScanError, SourceOperation},
    index::{FieldEntry, FieldIndex, Step},
    source::RowSource,
};
use model::Value;
use std::{collections::HashSet, sync::Arc};
use tracing::trace;

/// The resolved plan for one destination shape.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Struct(Arc<FieldIndex>),
    Map,
    Scalar,
}

impl Binding {
    fn name(&self) -> &'static str {
        match self {
            Binding::Struct(_) => "struct",
            Binding::Map => "map",
            Binding::Scalar => "scalar",
        }
    }
}

pub(crate) fn check_duplicate_columns(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(ScanError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

/// Scans the source's current row (number `row`) into `target`.
pub(crate) fn materialize<R: RowSource + ?Sized>(
    binding: &Binding,
    columns: &[String],
    row: usize,
    rows: &mut R,
    target: Target<'_>,
) -> Result<()> {
    check_duplicate_columns(columns)?;

    match (binding, target) {
        (Binding::Struct(index), Target::Struct(record)) => {
            materialize_struct(index, columns, row, rows, record)?
        }
        (Binding::Map, Target::Map(map)) => materialize_map(columns, row, rows, map)?,
        (Binding::Scalar, Target::Scalar(receiver)) => {
            materialize_scalar(columns, row, rows, receiver)?
        }
        (binding, _) => {
            return Err(ScanError::invalid_destination(
                binding.name(),
                "destination does not match the shape the scanner was started with",
            ));
        }
    }

    trace!(row, columns = columns.len(), "Materialized row");
    Ok(())
}

fn populate<R: RowSource + ?Sized>(rows: &mut R, row: usize, width: usize) -> Result<Vec<Value>> {
    let mut slots = vec![Value::Null; width];
    rows.populate(&mut slots)
        .map_err(|err| ScanError::row_source(SourceOperation::Populate { row }, err))?;
    Ok(slots)
}

fn materialize_struct<R: RowSource + ?Sized>(
    index: &FieldIndex,
    columns: &[String],
    row: usize,
    rows: &mut R,
    record: &mut dyn Record,
) -> Result<()> {
    let entries = columns
        .iter()
        .map(|column| {
            index.get(column).ok_or_else(|| ScanError::UnmappedColumn {
                column: column.clone(),
                shape: index.shape().to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let slots = populate(rows, row, columns.len())?;
    for (entry, value) in entries.into_iter().zip(slots) {
        write_path(index, record, entry, entry.path.steps(), value)?;
    }
    Ok(())
}

/// Follows `steps` from `record` to the leaf and stores `value` there.
/// Optional pointer members along the way are allocated here, right before
/// the write that needs them.
fn write_path(
    index: &FieldIndex,
    record: &mut dyn Record,
    entry: &FieldEntry,
    steps: &[Step],
    value: Value,
) -> Result<()> {
    let layout_mismatch = || {
        ScanError::invalid_destination(
            index.shape(),
            format!("member `{}` does not match its descriptor", entry.member),
        )
    };

    let (step, rest) = steps.split_first().ok_or_else(layout_mismatch)?;
    match (record.member_mut(step.index), rest.is_empty()) {
        (Some(Member::Leaf(leaf)), true) => {
            leaf.receive(value)
                .map_err(|source| ScanError::Conversion {
                    column: entry.column.clone(),
                    source,
                })
        }
        (Some(Member::Embedded(embedded)), false) => {
            write_path(index, embedded.record_mut(), entry, rest, value)
        }
        _ => Err(layout_mismatch()),
    }
}

fn materialize_map<R: RowSource + ?Sized>(
    columns: &[String],
    row: usize,
    rows: &mut R,
    map: &mut dyn MapTarget,
) -> Result<()> {
    let slots = populate(rows, row, columns.len())?;
    for (column, value) in columns.iter().zip(slots) {
        map.insert_column(column, value)?;
    }
    Ok(())
}

fn materialize_scalar<R: RowSource + ?Sized>(
    columns: &[String],
    row: usize,
    rows: &mut R,
    receiver: &mut dyn Receiver,
) -> Result<()> {
    let [column] = columns else {
        return Err(ScanError::InvalidScanRowCount(columns.len()));
    };

    let mut slots = populate(rows, row, 1)?;
    let value = slots.pop().unwrap_or_default();
    receiver
        .receive(value)
        .map_err(|source| ScanError::Conversion {
            column: column.clone(),
            source,
        })
}
