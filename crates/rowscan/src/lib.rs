//! Maps rows of named columns onto structs, string-keyed maps and scalars.
//!
//! A driver adapter implements [`RowSource`]; callers pick a destination and
//! use [`scan_all`], [`scan_one`] or a [`RowScanner`] for manual iteration.
//! Struct destinations derive [`Scannable`], which emits the static layout
//! descriptor the field index is computed from.

// Lets code generated by `#[derive(Scannable)]` refer to `::rowscan` from
// inside this crate's own tests.
extern crate self as rowscan;

pub mod api;
pub mod config;
pub mod descriptor;
pub mod destination;
pub mod error;
pub mod index;
pub mod naming;
pub mod scanner;
pub mod source;

mod materialize;

pub use api::{ScanApi, scan_all, scan_one, scan_row};
pub use config::{NameCase, ScanConfig};
pub use descriptor::{FieldDescriptor, FieldKind, StructDescriptor};
pub use destination::{
    Destination, Embed, Embedded, MapTarget, Member, Receiver, Record, Shape, Target, classify,
};
pub use error::{Result, ScanError, SourceOperation};
pub use index::{AccessPath, FieldEntry, FieldIndex, field_index};
pub use model::{ConversionError, FromValue, Json, Value};
pub use naming::to_snake_case;
pub use rowscan_derive::Scannable;
pub use scanner::{RowScanner, ScanPlan, ScannerState, StartContext, StartHook, resolve};
pub use source::{MemoryRows, MemoryRowsError, RowSource};
