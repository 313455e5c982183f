use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
};

use crate::value::Value;

/// Stable identity of a node inside a [`Schemas`](super::Schemas) arena.
///
/// Two nodes are the same schema exactly when their ids are equal; structural
/// equality is a separate question answered by `recordtable-visit::diff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) u32);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for SchemaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a named schema (record, enum or fixed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Split a dotted full name: `"com.acme.User"` has namespace `com.acme`.
    pub fn from_fullname(fullname: &str) -> Self {
        match fullname.rsplit_once('.') {
            Some((namespace, name)) => Self {
                name: name.to_string(),
                namespace: Some(namespace.to_string()),
            },
            None => Self::new(fullname),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.fullname())
    }
}

/// Refinement of a node's runtime representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Days since the Unix epoch (on `int`) or an ISO-8601 date (on `string`).
    Date,
    /// Milliseconds since the Unix epoch, on `long`.
    Instant,
    /// Big-endian two's complement unscaled value, on `bytes` or `fixed`.
    Decimal { precision: u32, scale: u32 },
    Other(String),
}

impl LogicalType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "date" => LogicalType::Date,
            "instant" | "timestamp-millis" => LogicalType::Instant,
            other => LogicalType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LogicalType::Date => "date",
            LogicalType::Instant => "instant",
            LogicalType::Decimal { .. } => "decimal",
            LogicalType::Other(name) => name,
        }
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({precision}, {scale})")
            }
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

/// Structural kind of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    Fixed { name: Name, size: usize },
    Enum { name: Name, symbols: Vec<String> },
    Record { name: Name, fields: Vec<Field> },
    Array(SchemaId),
    Map(SchemaId),
    Union(Vec<SchemaId>),
}

impl SchemaKind {
    /// Terminal nodes have no child schemas: scalars, enums and fixed.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SchemaKind::Record { .. }
                | SchemaKind::Array(_)
                | SchemaKind::Map(_)
                | SchemaKind::Union(_)
        )
    }

    pub fn name(&self) -> Option<&Name> {
        match self {
            SchemaKind::Fixed { name, .. }
            | SchemaKind::Enum { name, .. }
            | SchemaKind::Record { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Child schemas in declaration order.
    pub fn children(&self) -> Vec<SchemaId> {
        match self {
            SchemaKind::Record { fields, .. } => fields.iter().map(|f| f.schema).collect(),
            SchemaKind::Array(item) | SchemaKind::Map(item) => vec![*item],
            SchemaKind::Union(branches) => branches.clone(),
            _ => Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::String => "string",
            SchemaKind::Bytes => "bytes",
            SchemaKind::Fixed { .. } => "fixed",
            SchemaKind::Enum { .. } => "enum",
            SchemaKind::Record { .. } => "record",
            SchemaKind::Array(_) => "array",
            SchemaKind::Map(_) => "map",
            SchemaKind::Union(_) => "union",
        }
    }
}

/// One node of the schema graph with its metadata.
///
/// Only `kind` and `logical_type` take part in type mapping; docs, aliases and
/// properties are carried for cloning and diffing.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub logical_type: Option<LogicalType>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub props: BTreeMap<String, String>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            logical_type: None,
            doc: None,
            aliases: Vec::new(),
            props: BTreeMap::new(),
        }
    }

    pub fn with_logical_type(mut self, logical_type: LogicalType) -> Self {
        self.logical_type = Some(logical_type);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            SchemaKind::Record { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Record field. `position` is assigned by the arena when the record is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub position: usize,
    pub schema: SchemaId,
    pub default: Option<Value>,
    pub order: SortOrder,
    pub aliases: Vec<String>,
    pub doc: Option<String>,
    pub props: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: SchemaId) -> Self {
        Self {
            name: name.into(),
            position: 0,
            schema,
            default: None,
            order: SortOrder::default(),
            aliases: Vec::new(),
            doc: None,
            props: BTreeMap::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// True when `name` is this field's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}
