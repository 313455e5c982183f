//! Closeable record streams.

use crate::{error::StreamError, record::Record};

/// Pull-based sequence of records over an external resource.
///
/// `close` must release the resource and be safe to call more than once;
/// reading after `close` returns [`StreamError::Closed`].
pub trait RecordStream: Send {
    /// Next record, or `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<Record>, StreamError>;

    fn close(&mut self) -> Result<(), StreamError>;
}

/// Stream over records already held in memory.
#[derive(Debug)]
pub struct VecRecordStream {
    records: std::vec::IntoIter<Record>,
    closed: bool,
}

impl VecRecordStream {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
            closed: false,
        }
    }
}

impl RecordStream for VecRecordStream {
    fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        Ok(self.records.next())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        Ok(())
    }
}

impl RecordStream for Box<dyn RecordStream> {
    fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
        (**self).next_record()
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}
