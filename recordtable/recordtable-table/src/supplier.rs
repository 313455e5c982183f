//! Sources of record streams for table scans.

use std::{sync::Arc, time::Instant};

use recordtable_core::{Record, RecordStream, StreamError, Value, VecRecordStream};
use recordtable_expr::{Expr, render};
use recordtable_types::RelType;
use tracing::trace;

/// What a scan would like the supplier to do.
///
/// Everything is an offer: the supplier reports in [`OpenedStream`] which
/// parts it applied and the enumerator does the rest.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Column positions to deliver, in order. `None` means every column.
    pub projection: Option<Vec<usize>>,
    /// Conjunction of filters over the full row type.
    pub filters: Vec<Expr>,
    pub deadline: Option<Instant>,
}

impl ScanRequest {
    /// SQL text of the offered filters, for suppliers backed by a SQL source.
    pub fn filter_sql(&self, row_type: &RelType) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        render(&self.filters, row_type).ok()
    }
}

/// A stream plus the pushdowns the supplier applied to it.
///
/// With `projection_applied`, each record carries exactly the requested
/// columns in the requested order. With `filter_applied`, every record
/// satisfies the offered filters.
pub struct OpenedStream {
    pub stream: Box<dyn RecordStream>,
    pub projection_applied: bool,
    pub filter_applied: bool,
}

impl OpenedStream {
    /// A stream with no pushdown applied.
    pub fn new(stream: impl RecordStream + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            projection_applied: false,
            filter_applied: false,
        }
    }

    pub fn with_projection_applied(mut self) -> Self {
        self.projection_applied = true;
        self
    }

    pub fn with_filter_applied(mut self) -> Self {
        self.filter_applied = true;
        self
    }
}

/// Opens record streams on demand; called again on every enumerator reset.
pub trait RecordSupplier: Send + Sync {
    fn open(&self, request: &ScanRequest) -> Result<OpenedStream, StreamError>;
}

impl<F> RecordSupplier for F
where
    F: Fn() -> Result<Box<dyn RecordStream>, StreamError> + Send + Sync,
{
    fn open(&self, _: &ScanRequest) -> Result<OpenedStream, StreamError> {
        self().map(OpenedStream::new)
    }
}

/// Supplier over records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySupplier {
    records: Arc<[Record]>,
    projection_pushdown: bool,
}

impl MemorySupplier {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
            projection_pushdown: false,
        }
    }

    /// Apply requested projections while opening (default: off).
    pub fn with_projection_pushdown(mut self, enabled: bool) -> Self {
        self.projection_pushdown = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSupplier for MemorySupplier {
    fn open(&self, request: &ScanRequest) -> Result<OpenedStream, StreamError> {
        match (&request.projection, self.projection_pushdown) {
            (Some(columns), true) => {
                trace!(columns = ?columns, "memory supplier applying projection");
                let records = self
                    .records
                    .iter()
                    .map(|record| {
                        let values = columns
                            .iter()
                            .map(|c| record.get(*c).cloned().unwrap_or(Value::Null))
                            .collect();
                        Record::new(record.schema(), values)
                    })
                    .collect();
                Ok(OpenedStream::new(VecRecordStream::new(records)).with_projection_applied())
            }
            _ => Ok(OpenedStream::new(VecRecordStream::new(self.records.to_vec()))),
        }
    }
}

/// Supplier of no records; used where only the row type matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySupplier;

impl RecordSupplier for EmptySupplier {
    fn open(&self, _: &ScanRequest) -> Result<OpenedStream, StreamError> {
        Ok(OpenedStream::new(VecRecordStream::new(Vec::new())))
    }
}
