//! Field projection by dotted paths.

use recordtable_core::{Field, SchemaError, SchemaId, SchemaKind, SchemaNode, Schemas};

use crate::clone::{CopyPolicy, clone_into};

/// Selected fields of one record, in first-mention order.
#[derive(Debug, Default)]
struct Selection {
    fields: Vec<(String, Selection)>,
    /// The field was named without a sub-path and is kept entirely.
    whole: bool,
}

impl Selection {
    fn insert(&mut self, segments: &[&str]) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        let index = match self.fields.iter().position(|(name, _)| name == head) {
            Some(index) => index,
            None => {
                self.fields.push((head.to_string(), Selection::default()));
                self.fields.len() - 1
            }
        };
        let child = &mut self.fields[index].1;
        if rest.is_empty() {
            // A whole-field mention wins over any narrower one.
            child.fields.clear();
            child.whole = true;
        } else if !child.whole {
            child.insert(rest);
        }
    }
}

/// Build a record schema holding only the fields named by `paths`.
///
/// Paths descend through nested records with `.` and see through nullable
/// unions, arrays and maps on the way. The result lives in a new arena.
pub fn project<S: AsRef<str>>(
    src: &Schemas,
    root: SchemaId,
    paths: &[S],
) -> Result<(Schemas, SchemaId), SchemaError> {
    let mut selection = Selection::default();
    for path in paths {
        let segments: Vec<&str> = path.as_ref().split('.').collect();
        selection.insert(&segments);
    }
    let mut dst = Schemas::new();
    let id = project_record(src, root, &selection, "", &mut dst)?;
    Ok((dst, id))
}

fn project_record(
    src: &Schemas,
    record: SchemaId,
    selection: &Selection,
    prefix: &str,
    dst: &mut Schemas,
) -> Result<SchemaId, SchemaError> {
    let node = src.get(record).ok_or(SchemaError::UnknownId { id: record })?;
    let SchemaKind::Record { name, .. } = &node.kind else {
        return Err(SchemaError::NotARecord {
            path: display_path(prefix),
            found: node.type_name(),
        });
    };

    let mut fields = Vec::with_capacity(selection.fields.len());
    for (field_name, child) in &selection.fields {
        let path = join(prefix, field_name);
        let field = src
            .field(record, field_name)
            .ok_or_else(|| SchemaError::UnknownField { path: path.clone() })?;

        let (schema, default) = if child.whole {
            let copy = clone_into(src, field.schema, dst, CopyPolicy::Everything)?;
            (copy, field.default.clone())
        } else {
            (project_nested(src, field.schema, child, &path, dst)?, None)
        };

        let mut projected = Field::new(field.name.clone(), schema).with_order(field.order);
        projected.default = default;
        projected.aliases = field.aliases.clone();
        projected.doc = field.doc.clone();
        projected.props = field.props.clone();
        fields.push(projected);
    }

    let mut copy = SchemaNode::new(SchemaKind::Record {
        name: name.clone(),
        fields,
    });
    copy.logical_type = node.logical_type.clone();
    copy.doc = node.doc.clone();
    copy.aliases = node.aliases.clone();
    copy.props = node.props.clone();
    dst.add(copy)
}

/// Descend into a record, rewrapping any nullable union, array or map around it.
fn project_nested(
    src: &Schemas,
    id: SchemaId,
    selection: &Selection,
    path: &str,
    dst: &mut Schemas,
) -> Result<SchemaId, SchemaError> {
    let node = &src[id];
    match &node.kind {
        SchemaKind::Record { .. } => project_record(src, id, selection, path, dst),
        SchemaKind::Array(item) => {
            let item = project_nested(src, *item, selection, path, dst)?;
            dst.add(wrap(node, SchemaKind::Array(item)))
        }
        SchemaKind::Map(value) => {
            let value = project_nested(src, *value, selection, path, dst)?;
            dst.add(wrap(node, SchemaKind::Map(value)))
        }
        SchemaKind::Union(branches) if src.non_null_branch(id) != id => {
            let mut projected = Vec::with_capacity(branches.len());
            for branch in branches {
                if matches!(src[*branch].kind, SchemaKind::Null) {
                    projected.push(clone_into(src, *branch, dst, CopyPolicy::Everything)?);
                } else {
                    projected.push(project_nested(src, *branch, selection, path, dst)?);
                }
            }
            dst.add(wrap(node, SchemaKind::Union(projected)))
        }
        _ => Err(SchemaError::NotARecord {
            path: path.to_string(),
            found: node.type_name(),
        }),
    }
}

fn wrap(original: &SchemaNode, kind: SchemaKind) -> SchemaNode {
    let mut node = SchemaNode::new(kind);
    node.logical_type = original.logical_type.clone();
    node.doc = original.doc.clone();
    node.props = original.props.clone();
    node
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "<root>".to_string()
    } else {
        prefix.to_string()
    }
}
