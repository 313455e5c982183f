//! Pull-based, cancellable and resettable row cursor.

use std::{
    fmt::{Display, Formatter},
    sync::Arc,
    time::Instant,
};

use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use recordtable_core::{RecordStream, Value};
use recordtable_expr::{EvalContext, RowPredicate};
use tracing::{debug, trace, warn};

use crate::{
    batch::rows_to_record_batch,
    context::CancelFlag,
    decode::RowDecoder,
    error::TableError,
    supplier::{OpenedStream, RecordSupplier, ScanRequest},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorState {
    /// Before the first row, or right after a reset.
    Unpositioned,
    Positioned,
    Exhausted,
    Closed,
}

impl Display for EnumeratorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EnumeratorState::Unpositioned => "unpositioned",
            EnumeratorState::Positioned => "positioned",
            EnumeratorState::Exhausted => "exhausted",
            EnumeratorState::Closed => "closed",
        })
    }
}

/// Everything a scan needs to (re)open its stream.
pub(crate) struct ScanPlan {
    pub supplier: Arc<dyn RecordSupplier>,
    pub decoder: Arc<RowDecoder>,
    pub request: ScanRequest,
    /// Predicate over the full row layout, if filters were accepted.
    pub predicate: Option<RowPredicate>,
    /// Output columns in full-row positions; `None` for the whole row.
    pub projection: Option<Vec<usize>>,
    pub output_schema: SchemaRef,
    pub batch_size: usize,
    pub cancel: CancelFlag,
    pub deadline: Option<Instant>,
}

/// How rows of the currently open stream turn into output rows.
struct StreamLayout {
    /// Full-row positions of the delivered values; `None` for the full row.
    delivered: Option<Vec<usize>>,
    /// Predicate still to apply, rewritten for the delivered layout.
    predicate: Option<RowPredicate>,
    /// Positions in the delivered row to output; `None` for all of them.
    output: Option<Vec<usize>>,
}

/// Cursor over the rows of one scan.
///
/// Created positioned before the first row. [`move_next`](Self::move_next)
/// advances, [`current`](Self::current) reads the row under the cursor,
/// [`reset`](Self::reset) restarts from the first row and
/// [`close`](Self::close) releases the stream. Dropping the enumerator closes
/// it.
pub struct RecordEnumerator {
    plan: ScanPlan,
    stream: Option<Box<dyn RecordStream>>,
    layout: StreamLayout,
    state: EnumeratorState,
    row: Vec<Value>,
    current: Vec<Value>,
    ctx: EvalContext,
}

impl RecordEnumerator {
    pub(crate) fn open(plan: ScanPlan) -> Result<Self, TableError> {
        let (stream, layout) = open_stream(&plan)?;
        Ok(Self {
            plan,
            stream: Some(stream),
            layout,
            state: EnumeratorState::Unpositioned,
            row: Vec::new(),
            current: Vec::new(),
            ctx: EvalContext::new(),
        })
    }

    pub fn state(&self) -> EnumeratorState {
        self.state
    }

    /// Arrow schema of the rows this enumerator produces.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.plan.output_schema)
    }

    /// Advance to the next row that passes the filters.
    ///
    /// Returns `Ok(false)` once the stream is exhausted. Cancellation and an
    /// expired deadline close the stream and fail the call.
    pub fn move_next(&mut self) -> Result<bool, TableError> {
        match self.state {
            EnumeratorState::Closed => {
                return Err(TableError::InvalidState {
                    state: self.state,
                    operation: "advance",
                });
            }
            EnumeratorState::Exhausted => return Ok(false),
            _ => {}
        }
        if self.plan.cancel.is_cancelled() {
            debug!("scan cancelled");
            self.abort();
            return Err(TableError::Cancelled);
        }
        if self.plan.deadline.is_some_and(|d| Instant::now() >= d) {
            debug!("scan deadline exceeded");
            self.abort();
            return Err(TableError::DeadlineExceeded);
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(TableError::InvalidState {
                state: self.state,
                operation: "advance",
            });
        };
        loop {
            let Some(record) = stream.next_record()? else {
                self.state = EnumeratorState::Exhausted;
                self.current.clear();
                return Ok(false);
            };
            self.plan.decoder.decode_into(
                record.into_values(),
                self.layout.delivered.as_deref(),
                &mut self.row,
            )?;
            if let Some(predicate) = &self.layout.predicate {
                if !predicate.evaluate(&self.row, &mut self.ctx) {
                    continue;
                }
            }
            match &self.layout.output {
                Some(positions) => {
                    self.current.clear();
                    self.current.extend(
                        positions
                            .iter()
                            .map(|p| self.row.get(*p).cloned().unwrap_or(Value::Null)),
                    );
                }
                None => std::mem::swap(&mut self.row, &mut self.current),
            }
            self.state = EnumeratorState::Positioned;
            return Ok(true);
        }
    }

    /// The row under the cursor.
    pub fn current(&self) -> Result<&[Value], TableError> {
        match self.state {
            EnumeratorState::Positioned => Ok(&self.current),
            state => Err(TableError::InvalidState {
                state,
                operation: "read the current row of",
            }),
        }
    }

    /// Close the stream and reopen it from the supplier.
    pub fn reset(&mut self) -> Result<(), TableError> {
        if self.state == EnumeratorState::Closed {
            return Err(TableError::InvalidState {
                state: self.state,
                operation: "reset",
            });
        }
        trace!("resetting enumerator");
        if let Some(mut stream) = self.stream.take() {
            stream.close()?;
        }
        let (stream, layout) = open_stream(&self.plan)?;
        self.stream = Some(stream);
        self.layout = layout;
        self.state = EnumeratorState::Unpositioned;
        self.current.clear();
        Ok(())
    }

    /// Release the stream. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), TableError> {
        self.state = EnumeratorState::Closed;
        self.current.clear();
        if let Some(mut stream) = self.stream.take() {
            stream.close()?;
        }
        Ok(())
    }

    /// Drain the remaining rows into batches of the configured size.
    pub fn collect_batches(&mut self) -> Result<Vec<RecordBatch>, TableError> {
        let schema = self.schema();
        let batch_size = self.plan.batch_size.max(1);
        let mut batches = Vec::new();
        let mut rows = Vec::with_capacity(batch_size);
        while self.move_next()? {
            rows.push(self.current.clone());
            if rows.len() >= batch_size {
                batches.push(rows_to_record_batch(&schema, &rows)?);
                rows.clear();
            }
        }
        if !rows.is_empty() {
            batches.push(rows_to_record_batch(&schema, &rows)?);
        }
        Ok(batches)
    }

    fn abort(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close record stream");
        }
    }
}

impl Iterator for RecordEnumerator {
    type Item = Result<Vec<Value>, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == EnumeratorState::Closed {
            return None;
        }
        match self.move_next() {
            Ok(true) => Some(Ok(self.current.clone())),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl Drop for RecordEnumerator {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Open the supplier's stream and work out what is left to do locally.
fn open_stream(plan: &ScanPlan) -> Result<(Box<dyn RecordStream>, StreamLayout), TableError> {
    trace!(projection = ?plan.request.projection, filters = plan.request.filters.len(), "opening record stream");
    let OpenedStream {
        stream,
        projection_applied,
        filter_applied,
    } = plan.supplier.open(&plan.request)?;
    debug!(projection_applied, filter_applied, "supplier opened stream");

    let delivered = match (&plan.request.projection, projection_applied) {
        (Some(columns), true) => Some(columns.clone()),
        _ => None,
    };
    let predicate = match (&plan.predicate, filter_applied, &delivered) {
        (Some(predicate), false, Some(columns)) => Some(predicate.remap(columns)?),
        (Some(predicate), false, None) => Some(predicate.clone()),
        _ => None,
    };
    let output = match (&plan.projection, &delivered) {
        // the delivered columns start with the requested projection
        (Some(projection), Some(columns)) if columns.len() == projection.len() => None,
        (Some(projection), Some(_)) => Some((0..projection.len()).collect()),
        (Some(projection), None) => Some(projection.clone()),
        (None, _) => None,
    };
    Ok((
        stream,
        StreamLayout {
            delivered,
            predicate,
            output,
        },
    ))
}
