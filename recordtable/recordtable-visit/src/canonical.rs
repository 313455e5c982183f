//! Canonical text and 64-bit Rabin fingerprint of a schema.
//!
//! The canonical form keeps what decides how data is laid out: names, structure,
//! symbols, sizes and logical types. Docs, aliases, properties, defaults and
//! sort orders are dropped, so an [`Essentials`](crate::CopyPolicy::Essentials)
//! copy of a schema has the same fingerprint as the schema itself.

use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use recordtable_core::{LogicalType, SchemaError, SchemaId, SchemaKind, SchemaNode, Schemas};

use crate::visitor::{SchemaVisitor, VisitAction, visit};

/// Fingerprint of the empty byte string; also the CRC-64-AVRO polynomial.
pub const EMPTY_FINGERPRINT: u64 = 0xc15d_213a_a4d7_a795;

const FINGERPRINT_TABLE: [u64; 256] = {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut fp = i as u64;
        let mut j = 0;
        while j < 8 {
            fp = (fp >> 1) ^ (EMPTY_FINGERPRINT & (fp & 1).wrapping_neg());
            j += 1;
        }
        table[i] = fp;
        i += 1;
    }
    table
};

pub fn rabin_fingerprint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(EMPTY_FINGERPRINT, |fp, b| {
        (fp >> 8) ^ FINGERPRINT_TABLE[((fp ^ u64::from(*b)) & 0xff) as usize]
    })
}

pub fn canonical_form(schemas: &Schemas, root: SchemaId) -> Result<String, SchemaError> {
    visit(schemas, root, CanonicalEmitter::default())
}

pub fn fingerprint(schemas: &Schemas, root: SchemaId) -> Result<u64, SchemaError> {
    canonical_form(schemas, root).map(|text| rabin_fingerprint(text.as_bytes()))
}

/// Writes the canonical text in one pass, in visiting order.
#[derive(Default)]
struct CanonicalEmitter {
    /// Non-terminals still being visited.
    frames: Vec<Frame>,
    /// Named types already written out in full.
    defined: HashSet<String>,
    /// Where finished unnamed composites sit in `out`, for when they are
    /// reached again.
    rendered: HashMap<SchemaId, Range<usize>>,
    out: String,
}

struct Frame {
    id: SchemaId,
    start: usize,
    /// Children written so far.
    written: usize,
}

impl CanonicalEmitter {
    /// Separator and field wrapper before the next child of the open frame.
    fn open_child(&mut self, schemas: &Schemas) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        match &schemas[frame.id].kind {
            SchemaKind::Record { fields, .. } => {
                if frame.written > 0 {
                    self.out.push(',');
                }
                let name = fields.get(frame.written).map_or("", |f| f.name.as_str());
                self.out.push_str("{\"name\":");
                self.out.push_str(&quote(name));
                self.out.push_str(",\"type\":");
            }
            SchemaKind::Union(_) if frame.written > 0 => self.out.push(','),
            _ => {}
        }
        frame.written += 1;
    }

    fn close_child(&mut self, schemas: &Schemas) {
        if let Some(frame) = self.frames.last() {
            if matches!(schemas[frame.id].kind, SchemaKind::Record { .. }) {
                self.out.push('}');
            }
        }
    }
}

impl SchemaVisitor for CanonicalEmitter {
    type Output = String;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        self.open_child(schemas);
        let node = &schemas[id];
        let text = match &node.kind {
            SchemaKind::Record { name, .. } => quote(&name.fullname()),
            SchemaKind::Array(_) | SchemaKind::Map(_) | SchemaKind::Union(_) => self
                .rendered
                .get(&id)
                .and_then(|range| self.out.get(range.clone()))
                .map(str::to_owned)
                .unwrap_or_default(),
            kind => match kind.name().map(|n| n.fullname()) {
                Some(full) if self.defined.contains(&full) => quote(&full),
                Some(full) => {
                    self.defined.insert(full);
                    render_terminal(node)
                }
                None => render_terminal(node),
            },
        };
        self.out.push_str(&text);
        self.close_child(schemas);
        VisitAction::Continue
    }

    fn visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        self.open_child(schemas);
        let start = self.out.len();
        match &schemas[id].kind {
            SchemaKind::Record { name, .. } => {
                let full = name.fullname();
                self.out.push_str("{\"name\":");
                self.out.push_str(&quote(&full));
                self.out.push_str(",\"type\":\"record\",\"fields\":[");
                self.defined.insert(full);
            }
            SchemaKind::Array(_) => self.out.push_str("{\"type\":\"array\",\"items\":"),
            SchemaKind::Map(_) => self.out.push_str("{\"type\":\"map\",\"values\":"),
            SchemaKind::Union(_) => self.out.push('['),
            _ => {}
        }
        self.frames.push(Frame {
            id,
            start,
            written: 0,
        });
        VisitAction::Continue
    }

    fn after_visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        let start = self.frames.pop().map_or(self.out.len(), |frame| frame.start);
        let node = &schemas[id];
        match &node.kind {
            SchemaKind::Record { .. } => {
                self.out.push(']');
                push_logical(&mut self.out, node.logical_type.as_ref());
                self.out.push('}');
            }
            SchemaKind::Array(_) | SchemaKind::Map(_) => {
                push_logical(&mut self.out, node.logical_type.as_ref());
                self.out.push('}');
                self.rendered.insert(id, start..self.out.len());
            }
            SchemaKind::Union(_) => {
                self.out.push(']');
                self.rendered.insert(id, start..self.out.len());
            }
            _ => {}
        }
        self.close_child(schemas);
        VisitAction::Continue
    }

    fn finish(self) -> String {
        self.out
    }
}

fn render_terminal(node: &SchemaNode) -> String {
    let body = match &node.kind {
        SchemaKind::Fixed { name, size } => format!(
            "{{\"name\":{},\"type\":\"fixed\",\"size\":{size}",
            quote(&name.fullname())
        ),
        SchemaKind::Enum { name, symbols } => {
            let symbols: Vec<String> = symbols.iter().map(|s| quote(s)).collect();
            format!(
                "{{\"name\":{},\"type\":\"enum\",\"symbols\":[{}]",
                quote(&name.fullname()),
                symbols.join(",")
            )
        }
        kind if node.logical_type.is_none() => return quote(kind.type_name()),
        kind => format!("{{\"type\":{}", quote(kind.type_name())),
    };
    wrap_logical(body, node)
}

/// Close an object opened by the caller, adding the logical type if any.
fn wrap_logical(mut body: String, node: &SchemaNode) -> String {
    push_logical(&mut body, node.logical_type.as_ref());
    body.push('}');
    body
}

fn push_logical(text: &mut String, logical_type: Option<&LogicalType>) {
    match logical_type {
        Some(LogicalType::Decimal { precision, scale }) => text.push_str(&format!(
            ",\"logicalType\":\"decimal\",\"precision\":{precision},\"scale\":{scale}"
        )),
        Some(other) => {
            text.push_str(",\"logicalType\":");
            text.push_str(&quote(other.name()));
        }
        None => {}
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
