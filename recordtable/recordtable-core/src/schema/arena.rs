use std::{collections::HashSet, ops::Index};

use super::{Field, LogicalType, Name, SchemaId, SchemaKind, SchemaNode};
use crate::error::SchemaError;

/// Append-only arena owning every node of one or more schema graphs.
///
/// Nodes reference each other by [`SchemaId`]. A record may be declared before
/// its fields are known ([`Schemas::declare_record`]) so that a field can point
/// back at an enclosing record; that is the only way to build a cycle. Once a
/// node is added it is never changed, except for filling in a declared
/// record's fields exactly once.
#[derive(Debug, Clone, Default)]
pub struct Schemas {
    nodes: Vec<SchemaNode>,
    pending: HashSet<SchemaId>,
}

impl Schemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    /// Add a fully built node after checking its children exist.
    pub fn add(&mut self, mut node: SchemaNode) -> Result<SchemaId, SchemaError> {
        let next = SchemaId(self.nodes.len() as u32);
        if let SchemaKind::Record { name, fields } = &mut node.kind {
            self.prepare_fields(&name.fullname(), fields)?;
        }
        self.check_children(next, &node.kind)?;
        Ok(self.push(node))
    }

    fn push(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn check_children(&self, id: SchemaId, kind: &SchemaKind) -> Result<(), SchemaError> {
        for child in kind.children() {
            if child.index() >= self.nodes.len() {
                return Err(SchemaError::UnknownId { id: child });
            }
        }
        if let SchemaKind::Union(branches) = kind {
            if branches
                .iter()
                .any(|b| matches!(self.nodes[b.index()].kind, SchemaKind::Union(_)))
            {
                return Err(SchemaError::NestedUnion { id });
            }
        }
        Ok(())
    }

    fn prepare_fields(&self, record: &str, fields: &mut [Field]) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for (position, field) in fields.iter_mut().enumerate() {
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    record: record.to_string(),
                    field: field.name.clone(),
                });
            }
            field.position = position;
        }
        Ok(())
    }

    fn scalar(&mut self, kind: SchemaKind) -> SchemaId {
        self.push(SchemaNode::new(kind))
    }

    pub fn null(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Null)
    }

    pub fn boolean(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Boolean)
    }

    pub fn int(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Int)
    }

    pub fn long(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Long)
    }

    pub fn float(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Float)
    }

    pub fn double(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Double)
    }

    pub fn string(&mut self) -> SchemaId {
        self.scalar(SchemaKind::String)
    }

    pub fn bytes(&mut self) -> SchemaId {
        self.scalar(SchemaKind::Bytes)
    }

    /// `int` carrying the `date` logical type.
    pub fn date(&mut self) -> SchemaId {
        self.push(SchemaNode::new(SchemaKind::Int).with_logical_type(LogicalType::Date))
    }

    /// `long` carrying the `instant` logical type.
    pub fn instant(&mut self) -> SchemaId {
        self.push(SchemaNode::new(SchemaKind::Long).with_logical_type(LogicalType::Instant))
    }

    /// `bytes` carrying the `decimal` logical type.
    pub fn decimal(&mut self, precision: u32, scale: u32) -> SchemaId {
        self.push(
            SchemaNode::new(SchemaKind::Bytes)
                .with_logical_type(LogicalType::Decimal { precision, scale }),
        )
    }

    pub fn fixed(&mut self, name: Name, size: usize) -> SchemaId {
        self.scalar(SchemaKind::Fixed { name, size })
    }

    pub fn enumeration<S: Into<String>>(
        &mut self,
        name: Name,
        symbols: impl IntoIterator<Item = S>,
    ) -> SchemaId {
        let symbols = symbols.into_iter().map(Into::into).collect();
        self.scalar(SchemaKind::Enum { name, symbols })
    }

    pub fn array(&mut self, item: SchemaId) -> Result<SchemaId, SchemaError> {
        self.add(SchemaNode::new(SchemaKind::Array(item)))
    }

    pub fn map(&mut self, value: SchemaId) -> Result<SchemaId, SchemaError> {
        self.add(SchemaNode::new(SchemaKind::Map(value)))
    }

    pub fn union(&mut self, branches: Vec<SchemaId>) -> Result<SchemaId, SchemaError> {
        self.add(SchemaNode::new(SchemaKind::Union(branches)))
    }

    /// `[null, inner]`.
    pub fn nullable(&mut self, inner: SchemaId) -> Result<SchemaId, SchemaError> {
        let null = self.null();
        self.union(vec![null, inner])
    }

    pub fn record(&mut self, name: Name, fields: Vec<Field>) -> Result<SchemaId, SchemaError> {
        self.add(SchemaNode::new(SchemaKind::Record { name, fields }))
    }

    /// Reserve a record whose fields are supplied later by [`Schemas::define_record`].
    pub fn declare_record(&mut self, name: Name) -> SchemaId {
        let id = self.push(SchemaNode::new(SchemaKind::Record {
            name,
            fields: Vec::new(),
        }));
        self.pending.insert(id);
        id
    }

    /// Attach metadata to a record reserved with [`Schemas::declare_record`].
    pub fn annotate_pending(
        &mut self,
        id: SchemaId,
        annotate: impl FnOnce(&mut SchemaNode),
    ) -> Result<(), SchemaError> {
        if !self.pending.contains(&id) {
            return Err(SchemaError::NotPendingRecord { id });
        }
        annotate(&mut self.nodes[id.index()]);
        Ok(())
    }

    pub fn define_record(&mut self, id: SchemaId, mut fields: Vec<Field>) -> Result<(), SchemaError> {
        if !self.pending.contains(&id) {
            return Err(SchemaError::NotPendingRecord { id });
        }
        let record_name = match &self.nodes[id.index()].kind {
            SchemaKind::Record { name, .. } => name.fullname(),
            _ => return Err(SchemaError::NotPendingRecord { id }),
        };
        self.prepare_fields(&record_name, &mut fields)?;
        for field in &fields {
            if field.schema.index() >= self.nodes.len() {
                return Err(SchemaError::UnknownId { id: field.schema });
            }
        }
        if let SchemaKind::Record { fields: slot, .. } = &mut self.nodes[id.index()].kind {
            *slot = fields;
        }
        self.pending.remove(&id);
        Ok(())
    }

    pub fn is_pending(&self, id: SchemaId) -> bool {
        self.pending.contains(&id)
    }

    /// Look up a record field by name or alias.
    pub fn field(&self, record: SchemaId, name: &str) -> Option<&Field> {
        let fields = self.get(record)?.fields();
        fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| fields.iter().find(|f| f.answers_to(name)))
    }

    /// Strip a `[null, T]` union down to `T`; any other node is returned as is.
    pub fn non_null_branch(&self, id: SchemaId) -> SchemaId {
        if let Some(SchemaNode {
            kind: SchemaKind::Union(branches),
            ..
        }) = self.get(id)
        {
            if branches.len() == 2 {
                let is_null = |b: &SchemaId| matches!(self[*b].kind, SchemaKind::Null);
                match (is_null(&branches[0]), is_null(&branches[1])) {
                    (true, false) => return branches[1],
                    (false, true) => return branches[0],
                    _ => {}
                }
            }
        }
        id
    }
}

impl Index<SchemaId> for Schemas {
    type Output = SchemaNode;

    fn index(&self, id: SchemaId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}
