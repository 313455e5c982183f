//! Table adapters in three capability tiers.

use std::{sync::Arc, time::Instant};

use arrow::datatypes::SchemaRef;
use recordtable_core::{Record, SchemaError, SchemaId, SchemaKind, Schemas};
use recordtable_expr::{Expr, RowPredicate, compile};
use recordtable_types::{RelType, row_type_to_arrow_schema, to_relational};
use tracing::debug;

use crate::{
    context::ScanContext,
    decode::RowDecoder,
    enumerator::{RecordEnumerator, ScanPlan},
    error::TableError,
    supplier::{EmptySupplier, MemorySupplier, RecordSupplier, ScanRequest},
};

/// What every table exposes to the engine.
pub trait Table {
    /// Relational row type; a struct with one field per record field.
    fn row_type(&self) -> &RelType;

    fn schemas(&self) -> &Arc<Schemas>;

    /// Record schema the rows follow.
    fn root(&self) -> SchemaId;

    fn arrow_schema(&self) -> SchemaRef;
}

/// Full scans only.
pub trait ScannableTable: Table {
    fn scan(&self, ctx: &ScanContext) -> Result<RecordEnumerator, TableError>;
}

/// Scans that may take over the engine's filters.
pub trait FilterableTable: Table {
    /// Filters the table handles are removed from `filters`; whatever is
    /// left must still be applied by the engine.
    fn scan_filtered(
        &self,
        ctx: &ScanContext,
        filters: &mut Vec<Expr>,
    ) -> Result<RecordEnumerator, TableError>;
}

/// Scans that take over filters and return only some columns.
pub trait ProjectableFilterableTable: Table {
    /// Like [`FilterableTable::scan_filtered`], producing only the columns in
    /// `projection`, in that order.
    fn scan_projected(
        &self,
        ctx: &ScanContext,
        filters: &mut Vec<Expr>,
        projection: Option<&[usize]>,
    ) -> Result<RecordEnumerator, TableError>;
}

/// State shared by all table tiers.
struct TableCore {
    schemas: Arc<Schemas>,
    root: SchemaId,
    row_type: RelType,
    arrow_schema: SchemaRef,
    decoder: Arc<RowDecoder>,
    supplier: Arc<dyn RecordSupplier>,
    batch_size: usize,
}

impl TableCore {
    fn new(
        schemas: Arc<Schemas>,
        root: SchemaId,
        supplier: Arc<dyn RecordSupplier>,
        batch_size: usize,
    ) -> Result<Self, TableError> {
        let node = schemas.get(root).ok_or(SchemaError::UnknownId { id: root })?;
        if !matches!(node.kind, SchemaKind::Record { .. }) {
            return Err(TableError::NotARecord {
                id: root,
                found: node.type_name(),
            });
        }
        let row_type = to_relational(&schemas, root)?;
        let arrow_schema = Arc::new(row_type_to_arrow_schema(&row_type)?);
        let decoder = Arc::new(RowDecoder::new(Arc::clone(&schemas), root)?);
        Ok(Self {
            schemas,
            root,
            row_type,
            arrow_schema,
            decoder,
            supplier,
            batch_size,
        })
    }

    fn width(&self) -> usize {
        self.decoder.width()
    }

    /// Compile `filters`; on success they are taken out of the list.
    fn take_filters(&self, filters: &mut Vec<Expr>) -> Option<(Vec<Expr>, RowPredicate)> {
        if filters.is_empty() {
            return None;
        }
        match compile(filters, &self.row_type) {
            Ok(predicate) => {
                debug!(count = filters.len(), "filters pushed down");
                Some((std::mem::take(filters), predicate))
            }
            Err(err) => {
                debug!(error = %err, "filters left to the engine");
                None
            }
        }
    }

    fn enumerate(
        &self,
        ctx: &ScanContext,
        filters: &mut Vec<Expr>,
        projection: Option<&[usize]>,
    ) -> Result<RecordEnumerator, TableError> {
        let width = self.width();
        if let Some(&column) = projection.and_then(|p| p.iter().find(|c| **c >= width)) {
            return Err(TableError::ProjectionOutOfRange { column, width });
        }
        let accepted = self.take_filters(filters);
        let (filters, predicate) = match accepted {
            Some((filters, predicate)) => (filters, Some(predicate)),
            None => (Vec::new(), None),
        };

        // offer the projection widened with the columns the filter reads
        let requested = projection.map(|p| {
            let mut columns = p.to_vec();
            if let Some(predicate) = &predicate {
                for column in predicate.columns() {
                    if !columns.contains(column) {
                        columns.push(*column);
                    }
                }
            }
            columns
        });
        let output_schema = match projection {
            Some(p) => Arc::new(self.arrow_schema.project(p)?),
            None => Arc::clone(&self.arrow_schema),
        };
        let deadline = ctx.deadline_from(Instant::now());
        let plan = ScanPlan {
            supplier: Arc::clone(&self.supplier),
            decoder: Arc::clone(&self.decoder),
            request: ScanRequest {
                projection: requested,
                filters,
                deadline,
            },
            predicate,
            projection: projection.map(<[usize]>::to_vec),
            output_schema,
            batch_size: self.batch_size,
            cancel: ctx.cancel_flag().clone(),
            deadline,
        };
        RecordEnumerator::open(plan)
    }
}

macro_rules! impl_table {
    ($ty:ty) => {
        impl Table for $ty {
            fn row_type(&self) -> &RelType {
                &self.core.row_type
            }

            fn schemas(&self) -> &Arc<Schemas> {
                &self.core.schemas
            }

            fn root(&self) -> SchemaId {
                self.core.root
            }

            fn arrow_schema(&self) -> SchemaRef {
                Arc::clone(&self.core.arrow_schema)
            }
        }
    };
}

/// Table that only supports full scans.
pub struct ScannableRecordTable {
    core: TableCore,
}

impl ScannableRecordTable {
    /// Table over records held in memory.
    pub fn from_records(
        schemas: Arc<Schemas>,
        root: SchemaId,
        records: Vec<Record>,
    ) -> Result<Self, TableError> {
        Self::from_supplier(schemas, root, MemorySupplier::new(records))
    }

    pub fn from_supplier(
        schemas: Arc<Schemas>,
        root: SchemaId,
        supplier: impl RecordSupplier + 'static,
    ) -> Result<Self, TableError> {
        TableBuilder::new(schemas, root)
            .with_supplier(supplier)
            .build_scannable()
    }
}

impl ScannableTable for ScannableRecordTable {
    fn scan(&self, ctx: &ScanContext) -> Result<RecordEnumerator, TableError> {
        self.core.enumerate(ctx, &mut Vec::new(), None)
    }
}

/// Table that takes over filters it can compile.
pub struct FilterableRecordTable {
    core: TableCore,
}

impl FilterableRecordTable {
    pub fn new(
        schemas: Arc<Schemas>,
        root: SchemaId,
        supplier: impl RecordSupplier + 'static,
    ) -> Result<Self, TableError> {
        TableBuilder::new(schemas, root)
            .with_supplier(supplier)
            .build_filterable()
    }
}

impl FilterableTable for FilterableRecordTable {
    fn scan_filtered(
        &self,
        ctx: &ScanContext,
        filters: &mut Vec<Expr>,
    ) -> Result<RecordEnumerator, TableError> {
        self.core.enumerate(ctx, filters, None)
    }
}

/// Table that takes over filters and projections.
pub struct ProjectableFilterableRecordTable {
    core: TableCore,
}

impl ProjectableFilterableRecordTable {
    pub fn new(
        schemas: Arc<Schemas>,
        root: SchemaId,
        supplier: impl RecordSupplier + 'static,
    ) -> Result<Self, TableError> {
        TableBuilder::new(schemas, root)
            .with_supplier(supplier)
            .build_projectable_filterable()
    }
}

impl ProjectableFilterableTable for ProjectableFilterableRecordTable {
    fn scan_projected(
        &self,
        ctx: &ScanContext,
        filters: &mut Vec<Expr>,
        projection: Option<&[usize]>,
    ) -> Result<RecordEnumerator, TableError> {
        self.core.enumerate(ctx, filters, projection)
    }
}

impl_table!(ScannableRecordTable);
impl_table!(FilterableRecordTable);
impl_table!(ProjectableFilterableRecordTable);

/// Builder for the record tables.
pub struct TableBuilder {
    schemas: Arc<Schemas>,
    root: SchemaId,
    supplier: Arc<dyn RecordSupplier>,
    batch_size: usize,
}

impl TableBuilder {
    /// Builder for a table whose rows follow the record `root`.
    pub fn new(schemas: Arc<Schemas>, root: SchemaId) -> Self {
        Self {
            schemas,
            root,
            supplier: Arc::new(EmptySupplier),
            batch_size: 1024,
        }
    }

    pub fn with_supplier(mut self, supplier: impl RecordSupplier + 'static) -> Self {
        self.supplier = Arc::new(supplier);
        self
    }

    /// Serve the given records from memory.
    pub fn with_records(self, records: Vec<Record>) -> Self {
        self.with_supplier(MemorySupplier::new(records))
    }

    /// Set the number of rows per RecordBatch (default: 1024).
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    fn core(self) -> Result<TableCore, TableError> {
        TableCore::new(self.schemas, self.root, self.supplier, self.batch_size)
    }

    pub fn build_scannable(self) -> Result<ScannableRecordTable, TableError> {
        Ok(ScannableRecordTable { core: self.core()? })
    }

    pub fn build_filterable(self) -> Result<FilterableRecordTable, TableError> {
        Ok(FilterableRecordTable { core: self.core()? })
    }

    pub fn build_projectable_filterable(
        self,
    ) -> Result<ProjectableFilterableRecordTable, TableError> {
        Ok(ProjectableFilterableRecordTable { core: self.core()? })
    }
}
