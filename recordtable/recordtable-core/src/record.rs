use crate::{schema::SchemaId, value::Value};

/// Generic record: a positional value array parallel to its schema's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: SchemaId,
    values: Vec<Value>,
}

impl Record {
    pub fn new(schema: SchemaId, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Value at `position`, `None` past the end.
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
