//! Schema → relational type mapping.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use recordtable_core::{LogicalType, SchemaId, SchemaKind, Schemas};
use recordtable_visit::{SchemaVisitor, VisitAction, visit};

use crate::{
    error::MappingError,
    rel::{RelDataType, RelField, RelFields, RelType},
};

/// Mapping of every schema node converted so far, keyed by node identity.
///
/// Only complete types are kept between calls. A node whose type holds a
/// recursive back-reference (`ANY`) depends on where the conversion started,
/// so it is dropped from the memo when the call that produced it returns.
pub type TypeMemo = HashMap<SchemaId, RelType>;

/// Relational type of the schema `id`.
pub fn to_relational(schemas: &Schemas, id: SchemaId) -> Result<RelType, MappingError> {
    let mut memo = TypeMemo::new();
    to_relational_with_memo(schemas, id, &mut memo)
}

/// Like [`to_relational`], reusing and extending `memo`.
///
/// The memo is only meaningful for one arena; ids from another arena would
/// collide.
pub fn to_relational_with_memo(
    schemas: &Schemas,
    id: SchemaId,
    memo: &mut TypeMemo,
) -> Result<RelType, MappingError> {
    if let Some(hit) = memo.get(&id) {
        return Ok(hit.clone());
    }
    let mut cyclic = HashSet::new();
    let converted = visit(
        schemas,
        id,
        RelTypeVisitor {
            memo: &mut *memo,
            cyclic: &mut cyclic,
            error: None,
        },
    )
    .map_err(MappingError::from)
    .and_then(|finished| finished)
    .and_then(|()| resolve(schemas, &*memo, &cyclic, id));
    for id in &cyclic {
        memo.remove(id);
    }
    converted.map(|(rel_type, _)| rel_type)
}

/// Post-order conversion: every child is in the memo before its parent is
/// built. A node that is still open when reached again is a recursive
/// back-reference.
struct RelTypeVisitor<'a> {
    memo: &'a mut TypeMemo,
    /// Converted nodes whose type holds a back-reference.
    cyclic: &'a mut HashSet<SchemaId>,
    error: Option<MappingError>,
}

impl RelTypeVisitor<'_> {
    fn fail(&mut self, err: MappingError) -> VisitAction {
        self.error = Some(err);
        VisitAction::Terminate
    }

    /// Type of `id` and whether it holds a back-reference.
    fn build(&self, schemas: &Schemas, id: SchemaId) -> Result<(RelType, bool), MappingError> {
        let child = |child: SchemaId| resolve(schemas, &*self.memo, &*self.cyclic, child);
        let node = &schemas[id];
        let (data_type, cyclic) = match &node.kind {
            SchemaKind::Record { fields, .. } => {
                let mut cyclic = false;
                let mut rel_fields = Vec::with_capacity(fields.len());
                for field in fields {
                    let (rel_type, back_ref) = child(field.schema)?;
                    cyclic |= back_ref;
                    rel_fields.push(RelField::of(field.name.clone(), rel_type));
                }
                (RelDataType::Struct(RelFields::new(rel_fields)), cyclic)
            }
            SchemaKind::Array(item) => {
                let (elem, cyclic) = child(*item)?;
                (RelDataType::Array(Arc::new(elem)), cyclic)
            }
            SchemaKind::Map(value) => {
                let (value, cyclic) = child(*value)?;
                let data_type = RelDataType::Map {
                    key: Arc::new(RelType::not_null(RelDataType::Varchar)),
                    value: Arc::new(value),
                };
                (data_type, cyclic)
            }
            SchemaKind::Union(branches) => {
                let is_null = |b: &SchemaId| matches!(schemas[*b].kind, SchemaKind::Null);
                let inner = match branches.as_slice() {
                    [a, b] if is_null(a) && !is_null(b) => *b,
                    [a, b] if !is_null(a) && is_null(b) => *a,
                    _ => {
                        return Err(MappingError::UnsupportedUnion {
                            id,
                            branches: branches
                                .iter()
                                .map(|b| schemas[*b].type_name().to_string())
                                .collect(),
                        });
                    }
                };
                let (rel_type, cyclic) = child(inner)?;
                return Ok((rel_type.with_nullable(true), cyclic));
            }
            _ => return terminal_type(schemas, id).map(|t| (t, false)),
        };
        Ok((RelType::not_null(data_type), cyclic))
    }
}

impl SchemaVisitor for RelTypeVisitor<'_> {
    type Output = Result<(), MappingError>;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let node = &schemas[id];
        if self.memo.contains_key(&id)
            || !node.kind.is_terminal()
            || matches!(node.kind, SchemaKind::Null)
        {
            // Null only exists inside a nullable union, checked by the union.
            return VisitAction::Continue;
        }
        match terminal_type(schemas, id) {
            Ok(rel_type) => {
                self.memo.insert(id, rel_type);
                VisitAction::Continue
            }
            Err(err) => self.fail(err),
        }
    }

    fn visit_non_terminal(&mut self, _schemas: &Schemas, id: SchemaId) -> VisitAction {
        if self.memo.contains_key(&id) {
            VisitAction::SkipSubtree
        } else {
            VisitAction::Continue
        }
    }

    fn after_visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        if self.memo.contains_key(&id) {
            return VisitAction::Continue;
        }
        match self.build(schemas, id) {
            Ok((rel_type, cyclic)) => {
                if cyclic {
                    self.cyclic.insert(id);
                }
                self.memo.insert(id, rel_type);
                VisitAction::Continue
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish(self) -> Self::Output {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Look up a converted child; the flag is set when its type holds a
/// back-reference.
fn resolve(
    schemas: &Schemas,
    memo: &TypeMemo,
    cyclic: &HashSet<SchemaId>,
    id: SchemaId,
) -> Result<(RelType, bool), MappingError> {
    if let Some(rel_type) = memo.get(&id) {
        return Ok((rel_type.clone(), cyclic.contains(&id)));
    }
    match schemas.get(id).map(|n| &n.kind) {
        Some(SchemaKind::Null) => Err(MappingError::UnsupportedNull { id }),
        // still open: a back-reference, usually to an enclosing record
        Some(kind) if !kind.is_terminal() => Ok((RelType::nullable(RelDataType::Any), true)),
        _ => Err(MappingError::Unresolved { id }),
    }
}

/// Logical type first, then the structural kind.
fn terminal_type(schemas: &Schemas, id: SchemaId) -> Result<RelType, MappingError> {
    let node = &schemas[id];
    let from_logical = match &node.logical_type {
        Some(LogicalType::Date) => Some(RelDataType::Date),
        Some(LogicalType::Instant) => Some(RelDataType::Timestamp),
        Some(LogicalType::Decimal { .. }) => Some(RelDataType::Double),
        Some(LogicalType::Other(_)) | None => None,
    };
    if let Some(data_type) = from_logical {
        return Ok(RelType::not_null(data_type));
    }
    let data_type = match &node.kind {
        SchemaKind::Null => return Err(MappingError::UnsupportedNull { id }),
        SchemaKind::Boolean => RelDataType::Boolean,
        SchemaKind::Int => RelDataType::Integer,
        SchemaKind::Long => RelDataType::BigInt,
        SchemaKind::Float => RelDataType::Float,
        SchemaKind::Double => RelDataType::Double,
        SchemaKind::String => RelDataType::Varchar,
        SchemaKind::Bytes => RelDataType::Binary(None),
        SchemaKind::Fixed { size, .. } => RelDataType::Binary(Some(*size)),
        SchemaKind::Enum { .. } => RelDataType::Symbol,
        SchemaKind::Record { .. }
        | SchemaKind::Array(_)
        | SchemaKind::Map(_)
        | SchemaKind::Union(_) => return Err(MappingError::Unresolved { id }),
    };
    Ok(RelType::not_null(data_type))
}
