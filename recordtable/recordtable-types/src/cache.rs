use std::collections::HashMap;

use recordtable_core::{SchemaId, Schemas};
use recordtable_visit::fingerprint;

use crate::{bridge::to_relational, error::MappingError, rel::RelType};

/// Caller-owned cache of relational types keyed by schema fingerprint.
///
/// Unlike a [`TypeMemo`](crate::TypeMemo) it can be shared across arenas:
/// structurally identical schemas hit the same entry.
#[derive(Debug, Clone, Default)]
pub struct TypeCache {
    entries: HashMap<u64, RelType>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_convert(
        &mut self,
        schemas: &Schemas,
        id: SchemaId,
    ) -> Result<RelType, MappingError> {
        let key = fingerprint(schemas, id)?;
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }
        let rel_type = to_relational(schemas, id)?;
        self.entries.insert(key, rel_type.clone());
        Ok(rel_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
