use crate::{
    config::ScanConfig,
    destination::{Destination, Shape},
    error::{Result, ScanError, SourceOperation},
    index::cached_field_index,
    materialize::{Binding, materialize},
    source::RowSource,
};
use std::{
    any::{TypeId, type_name},
    fmt,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    NotStarted,
    Started,
}

/// Static identity of the destination type a scanner is started with.
#[derive(Clone, Copy)]
pub struct DestinationInfo {
    pub type_id: TypeId,
    pub type_name: &'static str,
    shape: fn() -> Result<Shape>,
}

impl DestinationInfo {
    pub fn of<D: Destination>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            type_name: type_name::<D>(),
            shape: D::shape,
        }
    }

    pub fn classify(&self) -> Result<Shape> {
        (self.shape)()
    }
}

impl fmt::Debug for DestinationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationInfo")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Everything the start hook needs to resolve a destination shape.
#[derive(Debug)]
pub struct StartContext<'a> {
    pub columns: &'a [String],
    pub destination: DestinationInfo,
    pub config: &'a ScanConfig,
}

/// The outcome of the start hook, reused for every row of the result set.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    binding: Binding,
    destination: TypeId,
    type_name: &'static str,
}

impl ScanPlan {
    pub fn destination_type(&self) -> &'static str {
        self.type_name
    }
}

pub type StartHook = Box<dyn FnMut(&StartContext<'_>) -> Result<ScanPlan> + Send>;

/// Default start hook: classify the destination and, for structs, fetch the
/// shape's field index from the process-wide cache.
pub fn resolve(ctx: &StartContext<'_>) -> Result<ScanPlan> {
    ctx.config.validate()?;
    let shape = ctx.destination.classify()?;
    let binding = match shape {
        Shape::Struct(descriptor) => Binding::Struct(cached_field_index(
            ctx.destination.type_id,
            descriptor,
            ctx.config,
        )?),
        Shape::Map => Binding::Map,
        Shape::Scalar => Binding::Scalar,
    };

    debug!(
        destination = ctx.destination.type_name,
        shape = shape.name(),
        columns = ctx.columns.len(),
        "Resolved destination shape"
    );

    Ok(ScanPlan {
        binding,
        destination: ctx.destination.type_id,
        type_name: ctx.destination.type_name,
    })
}

/// Scans rows of one result set into destinations, resolving the destination
/// shape only once.
///
/// The first successful call to [`RowScanner::scan`] runs the start hook and
/// moves the scanner to [`ScannerState::Started`]; it never goes back. A
/// failing row leaves the resolved shape in place, so the next row can be
/// scanned without resolving again.
pub struct RowScanner<R: RowSource> {
    rows: R,
    config: ScanConfig,
    state: ScannerState,
    columns: Vec<String>,
    plan: Option<ScanPlan>,
    start: StartHook,
    row: usize,
}

impl<R: RowSource> RowScanner<R> {
    pub fn new(rows: R) -> Self {
        Self::with_config(rows, ScanConfig::default())
    }

    pub fn with_config(rows: R, config: ScanConfig) -> Self {
        Self {
            rows,
            config,
            state: ScannerState::NotStarted,
            columns: Vec::new(),
            plan: None,
            start: Box::new(resolve),
            row: 0,
        }
    }

    /// Replaces the hook run at the first scanned row.
    pub fn set_start_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&StartContext<'_>) -> Result<ScanPlan> + Send + 'static,
    {
        self.start = Box::new(hook);
    }

    pub fn started(&self) -> bool {
        self.state == ScannerState::Started
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Number of the current row, starting at 1. Zero before the first advance.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &R {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut R {
        &mut self.rows
    }

    pub fn into_inner(self) -> R {
        self.rows
    }

    /// Moves the underlying row source to its next row.
    pub fn advance(&mut self) -> Result<bool> {
        let next = self.row + 1;
        let has_row = self
            .rows
            .advance()
            .map_err(|err| ScanError::row_source(SourceOperation::Advance { row: next }, err))?;
        if has_row {
            self.row = next;
        }
        Ok(has_row)
    }

    /// Scans the current row into `dst`.
    pub fn scan<D: Destination>(&mut self, dst: &mut D) -> Result<()> {
        if self.state == ScannerState::NotStarted {
            self.start::<D>()?;
        }

        let Some(plan) = &self.plan else {
            return Err(ScanError::invalid_destination(
                type_name::<D>(),
                "scanner started without a plan",
            ));
        };
        if plan.destination != TypeId::of::<D>() {
            return Err(ScanError::invalid_destination(
                type_name::<D>(),
                format!("scanner was started with {}", plan.type_name),
            ));
        }

        materialize(
            &plan.binding,
            &self.columns,
            self.row,
            &mut self.rows,
            dst.target(),
        )
    }

    fn start<D: Destination>(&mut self) -> Result<()> {
        let columns = self
            .rows
            .columns()
            .map_err(|err| ScanError::row_source(SourceOperation::ReadColumns, err))?;
        let ctx = StartContext {
            columns: &columns,
            destination: DestinationInfo::of::<D>(),
            config: &self.config,
        };
        let plan = (self.start)(&ctx)?;

        self.columns = columns;
        self.plan = Some(plan);
        self.state = ScannerState::Started;
        Ok(())
    }
}

impl<R: RowSource> fmt::Debug for RowScanner<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowScanner")
            .field("state", &self.state)
            .field("row", &self.row)
            .field("columns", &self.columns)
            .field("plan", &self.plan)
            .finish()
    }
}
