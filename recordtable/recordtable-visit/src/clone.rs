//! Copying schema graphs between arenas.

use std::collections::HashMap;

use recordtable_core::{Field, SchemaError, SchemaId, SchemaKind, SchemaNode, Schemas};

use crate::visitor::{SchemaVisitor, VisitAction, visit};

/// How much of each node survives a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyPolicy {
    /// Structure, names and logical types.
    #[default]
    Essentials,
    /// Everything, including docs, aliases, properties, defaults and sort orders.
    Everything,
}

/// Copy the graph below `root` into a fresh arena.
pub fn clone_schema(
    src: &Schemas,
    root: SchemaId,
    policy: CopyPolicy,
) -> Result<(Schemas, SchemaId), SchemaError> {
    let mut dst = Schemas::new();
    let id = clone_into(src, root, &mut dst, policy)?;
    Ok((dst, id))
}

/// Copy the graph below `root` into `dst` and return the id of the copy.
///
/// Shared nodes stay shared and recursive records stay recursive.
pub fn clone_into(
    src: &Schemas,
    root: SchemaId,
    dst: &mut Schemas,
    policy: CopyPolicy,
) -> Result<SchemaId, SchemaError> {
    let visitor = CloningVisitor {
        dst,
        policy,
        copies: HashMap::new(),
        error: None,
    };
    let copies = visit(src, root, visitor)??;
    copies
        .get(&root)
        .copied()
        .ok_or(SchemaError::UnknownId { id: root })
}

struct CloningVisitor<'a> {
    dst: &'a mut Schemas,
    policy: CopyPolicy,
    copies: HashMap<SchemaId, SchemaId>,
    error: Option<SchemaError>,
}

impl CloningVisitor<'_> {
    fn copy_metadata(&self, from: &SchemaNode, to: &mut SchemaNode) {
        to.logical_type = from.logical_type.clone();
        if self.policy == CopyPolicy::Everything {
            to.doc = from.doc.clone();
            to.aliases = from.aliases.clone();
            to.props = from.props.clone();
        }
    }

    fn copy_field(&self, field: &Field) -> Field {
        let schema = self.copies[&field.schema];
        let mut copy = Field::new(field.name.clone(), schema);
        if self.policy == CopyPolicy::Everything {
            copy.default = field.default.clone();
            copy.order = field.order;
            copy.aliases = field.aliases.clone();
            copy.doc = field.doc.clone();
            copy.props = field.props.clone();
        }
        copy
    }

    fn add(&mut self, src: &SchemaNode, id: SchemaId, kind: SchemaKind) -> VisitAction {
        let mut node = SchemaNode::new(kind);
        self.copy_metadata(src, &mut node);
        match self.dst.add(node) {
            Ok(copy) => {
                self.copies.insert(id, copy);
                VisitAction::Continue
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: SchemaError) -> VisitAction {
        self.error = Some(err);
        VisitAction::Terminate
    }
}

impl SchemaVisitor for CloningVisitor<'_> {
    type Output = Result<HashMap<SchemaId, SchemaId>, SchemaError>;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        if self.copies.contains_key(&id) {
            return VisitAction::Continue;
        }
        let node = &schemas[id];
        self.add(node, id, node.kind.clone())
    }

    fn visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let node = &schemas[id];
        if let SchemaKind::Record { name, .. } = &node.kind {
            // Declared up front so that back-references can point at it.
            let copy = self.dst.declare_record(name.clone());
            let mut meta = SchemaNode::new(SchemaKind::Null);
            self.copy_metadata(node, &mut meta);
            let annotated = self.dst.annotate_pending(copy, |n| {
                n.logical_type = meta.logical_type;
                n.doc = meta.doc;
                n.aliases = meta.aliases;
                n.props = meta.props;
            });
            if let Err(err) = annotated {
                return self.fail(err);
            }
            self.copies.insert(id, copy);
        }
        VisitAction::Continue
    }

    fn after_visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let node = &schemas[id];
        match &node.kind {
            SchemaKind::Record { fields, .. } => {
                let fields = fields.iter().map(|f| self.copy_field(f)).collect();
                match self.dst.define_record(self.copies[&id], fields) {
                    Ok(()) => VisitAction::Continue,
                    Err(err) => self.fail(err),
                }
            }
            SchemaKind::Array(item) => {
                let kind = SchemaKind::Array(self.copies[item]);
                self.add(node, id, kind)
            }
            SchemaKind::Map(value) => {
                let kind = SchemaKind::Map(self.copies[value]);
                self.add(node, id, kind)
            }
            SchemaKind::Union(branches) => {
                let kind = SchemaKind::Union(branches.iter().map(|b| self.copies[b]).collect());
                self.add(node, id, kind)
            }
            _ => VisitAction::Continue,
        }
    }

    fn finish(self) -> Self::Output {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.copies),
        }
    }
}
