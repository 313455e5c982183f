use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
};

use recordtable_core::{SchemaError, SchemaId, SchemaKind, SchemaNode, Schemas};

use crate::visitor::{SchemaVisitor, VisitAction, visit};

/// Format a schema graph in a readable style:
/// scalar nodes are rendered in one line, compound nodes are pretty-printed.
/// Nested nodes follow the same rule. A nullable union is shown as its
/// non-null branch with `nullable: true`; a record reached again is shown as
/// a reference to its name.
pub fn format_schema(schemas: &Schemas, root: SchemaId) -> Result<String, SchemaError> {
    let rendered = visit(schemas, root, LayoutVisitor::default())?;
    let label = match schemas[root].kind.name() {
        Some(name) => name.fullname(),
        None => schemas[root].type_name().to_string(),
    };
    let mut out = String::new();
    for line in rendered.labeled(&label) {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// [`Display`] adapter over [`format_schema`].
pub struct SchemaDisplay<'a> {
    schemas: &'a Schemas,
    root: SchemaId,
}

pub fn display(schemas: &Schemas, root: SchemaId) -> SchemaDisplay<'_> {
    SchemaDisplay { schemas, root }
}

impl Display for SchemaDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = format_schema(self.schemas, self.root).map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}

#[derive(Debug, Clone)]
enum Rendered {
    /// `type: int, ...`, shown inside braces after a label.
    Inline(Vec<String>),
    /// Lines shown below a label, one indent level deeper.
    Block(Vec<String>),
}

impl Rendered {
    fn labeled(&self, label: &str) -> Vec<String> {
        match self {
            Rendered::Inline(parts) => vec![format!("{label}: {{ {} }}", parts.join(", "))],
            Rendered::Block(lines) => {
                let mut out = Vec::with_capacity(lines.len() + 1);
                out.push(format!("{label}:"));
                out.extend(indent(lines.iter().cloned()));
                out
            }
        }
    }

    fn mark_nullable(self) -> Self {
        match self {
            Rendered::Inline(mut parts) => {
                parts.insert(1.min(parts.len()), "nullable: true".to_string());
                Rendered::Inline(parts)
            }
            Rendered::Block(mut lines) => {
                lines.insert(1.min(lines.len()), "nullable: true".to_string());
                Rendered::Block(lines)
            }
        }
    }
}

#[derive(Default)]
struct LayoutVisitor {
    frames: Vec<Vec<Rendered>>,
    done: HashMap<SchemaId, Rendered>,
    out: Option<Rendered>,
}

impl LayoutVisitor {
    fn emit(&mut self, rendered: Rendered) {
        match self.frames.last_mut() {
            Some(frame) => frame.push(rendered),
            None => self.out = Some(rendered),
        }
    }
}

impl SchemaVisitor for LayoutVisitor {
    type Output = Rendered;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let node = &schemas[id];
        let rendered = match &node.kind {
            SchemaKind::Record { name, .. } => Rendered::Inline(vec![
                "type: record".to_string(),
                format!("ref: {}", name.fullname()),
            ]),
            SchemaKind::Array(_) | SchemaKind::Map(_) | SchemaKind::Union(_) => self
                .done
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Rendered::Inline(vec![format!("type: {}", node.type_name())])),
            _ => Rendered::Inline(terminal_parts(node)),
        };
        self.emit(rendered);
        VisitAction::Continue
    }

    fn visit_non_terminal(&mut self, _schemas: &Schemas, _id: SchemaId) -> VisitAction {
        self.frames.push(Vec::new());
        VisitAction::Continue
    }

    fn after_visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let mut children = self.frames.pop().unwrap_or_default();
        let node = &schemas[id];
        let mut lines = vec![format!("type: {}", node.type_name())];
        let rendered = match &node.kind {
            SchemaKind::Record { name, fields } => {
                lines.push(format!("name: {}", name.fullname()));
                push_logical(&mut lines, node);
                lines.push("fields:".to_string());
                for (field, child) in fields.iter().zip(&children) {
                    lines.extend(indent(child.labeled(&field.name)));
                }
                Rendered::Block(lines)
            }
            SchemaKind::Array(_) => {
                push_logical(&mut lines, node);
                for child in &children {
                    lines.extend(child.labeled("item"));
                }
                Rendered::Block(lines)
            }
            SchemaKind::Map(_) => {
                push_logical(&mut lines, node);
                lines.push("key: { type: string }".to_string());
                for child in &children {
                    lines.extend(child.labeled("value"));
                }
                Rendered::Block(lines)
            }
            SchemaKind::Union(branches) => {
                let inner = schemas.non_null_branch(id);
                if inner != id {
                    let position = branches.iter().position(|b| *b == inner).unwrap_or(0);
                    children.swap_remove(position).mark_nullable()
                } else {
                    lines.push("branches:".to_string());
                    for (i, child) in children.iter().enumerate() {
                        lines.extend(indent(child.labeled(&i.to_string())));
                    }
                    Rendered::Block(lines)
                }
            }
            _ => Rendered::Block(lines),
        };
        if !matches!(node.kind, SchemaKind::Record { .. }) {
            self.done.insert(id, rendered.clone());
        }
        self.emit(rendered);
        VisitAction::Continue
    }

    fn finish(self) -> Rendered {
        self.out.unwrap_or(Rendered::Inline(Vec::new()))
    }
}

fn terminal_parts(node: &SchemaNode) -> Vec<String> {
    let mut parts = vec![format!("type: {}", node.type_name())];
    match &node.kind {
        SchemaKind::Fixed { name, size } => {
            parts.push(format!("name: {}", name.fullname()));
            parts.push(format!("size: {size}"));
        }
        SchemaKind::Enum { name, symbols } => {
            parts.push(format!("name: {}", name.fullname()));
            parts.push(format!("symbols: [{}]", symbols.join(", ")));
        }
        _ => {}
    }
    push_logical(&mut parts, node);
    parts
}

fn push_logical(parts: &mut Vec<String>, node: &SchemaNode) {
    if let Some(logical) = &node.logical_type {
        parts.push(format!("logical: {logical}"));
    }
}

fn indent(lines: impl IntoIterator<Item = String>) -> impl Iterator<Item = String> {
    lines.into_iter().map(|l| format!("    {l}"))
}
