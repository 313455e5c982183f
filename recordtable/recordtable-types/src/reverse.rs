//! Relational type → schema mapping.

use recordtable_core::{Field, LogicalType, Name, SchemaId, SchemaKind, SchemaNode, Schemas};

use crate::{
    error::MappingError,
    rel::{RelDataType, RelType},
};

/// Build a schema for `rel_type` in `schemas`.
///
/// Structs become records named `record_<n>`, fixed-length binaries become
/// fixed schemas named `fixed_<n>`, dates and timestamps carry the `date` and
/// `instant` logical types, and nullable types become `[null, T]`.
pub fn to_schema(rel_type: &RelType, schemas: &mut Schemas) -> Result<SchemaId, MappingError> {
    let mut builder = SchemaBuilder {
        schemas,
        next_record: 0,
    };
    builder.build(rel_type)
}

struct SchemaBuilder<'a> {
    schemas: &'a mut Schemas,
    next_record: usize,
}

impl SchemaBuilder<'_> {
    fn build(&mut self, rel_type: &RelType) -> Result<SchemaId, MappingError> {
        let id = self.build_non_null(rel_type)?;
        if rel_type.nullable {
            Ok(self.schemas.nullable(id)?)
        } else {
            Ok(id)
        }
    }

    fn build_non_null(&mut self, rel_type: &RelType) -> Result<SchemaId, MappingError> {
        let schemas = &mut *self.schemas;
        let id = match &rel_type.data_type {
            RelDataType::Integer => schemas.int(),
            RelDataType::BigInt => schemas.long(),
            RelDataType::Varchar => schemas.string(),
            RelDataType::Double => schemas.double(),
            RelDataType::Float => schemas.float(),
            RelDataType::Boolean => schemas.boolean(),
            RelDataType::Date => schemas.add(
                SchemaNode::new(SchemaKind::String).with_logical_type(LogicalType::Date),
            )?,
            RelDataType::Timestamp => schemas.instant(),
            RelDataType::Binary(Some(size)) => {
                schemas.fixed(Name::new(format!("fixed_{size}")), *size)
            }
            RelDataType::Binary(None) => schemas.bytes(),
            RelDataType::Array(elem) | RelDataType::Multiset(elem) => {
                let item = self.build(elem)?;
                self.schemas.array(item)?
            }
            RelDataType::Map { key, value }
                if key.data_type == RelDataType::Varchar && !key.nullable =>
            {
                let value = self.build(value)?;
                self.schemas.map(value)?
            }
            RelDataType::Struct(rel_fields) => {
                let name = Name::new(format!("record_{}", self.next_record));
                self.next_record += 1;
                let mut fields = Vec::with_capacity(rel_fields.len());
                for rel_field in rel_fields.iter() {
                    fields.push(Field::new(rel_field.name.clone(), self.build(&rel_field.rel_type)?));
                }
                self.schemas.record(name, fields)?
            }
            RelDataType::Symbol | RelDataType::Any | RelDataType::Map { .. } => {
                return Err(MappingError::UnsupportedRelType {
                    rel_type: rel_type.to_string(),
                });
            }
        };
        Ok(id)
    }
}
