//! Relational type algebra seen by the query engine.

use std::{
    fmt::{Display, Formatter, Result},
    mem,
    ops::Deref,
    sync::Arc,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RelDataType {
    Integer,
    BigInt,
    Varchar,
    /// Fixed length when known.
    Binary(Option<usize>),
    Double,
    Float,
    Boolean,
    Date,
    Timestamp,
    Symbol,
    /// Opaque value; used for recursive back-references.
    Any,
    Struct(RelFields),
    Array(Arc<RelType>),
    Multiset(Arc<RelType>),
    Map {
        key: Arc<RelType>,
        value: Arc<RelType>,
    },
}

impl RelDataType {
    pub fn type_name(&self) -> &'static str {
        match self {
            RelDataType::Integer => "INTEGER",
            RelDataType::BigInt => "BIGINT",
            RelDataType::Varchar => "VARCHAR",
            RelDataType::Binary(_) => "BINARY",
            RelDataType::Double => "DOUBLE",
            RelDataType::Float => "FLOAT",
            RelDataType::Boolean => "BOOLEAN",
            RelDataType::Date => "DATE",
            RelDataType::Timestamp => "TIMESTAMP",
            RelDataType::Symbol => "SYMBOL",
            RelDataType::Any => "ANY",
            RelDataType::Struct(_) => "STRUCT",
            RelDataType::Array(_) => "ARRAY",
            RelDataType::Multiset(_) => "MULTISET",
            RelDataType::Map { .. } => "MAP",
        }
    }

    /// Move out the children no other type shares, leaving `Any` behind.
    fn take_children(&mut self, out: &mut Vec<RelType>) {
        match mem::replace(self, RelDataType::Any) {
            RelDataType::Array(elem) | RelDataType::Multiset(elem) => out.extend(Arc::into_inner(elem)),
            RelDataType::Map { key, value } => {
                out.extend(Arc::into_inner(key));
                out.extend(Arc::into_inner(value));
            }
            RelDataType::Struct(RelFields(fields)) => {
                if let Some(fields) = Arc::into_inner(fields) {
                    out.extend(fields.into_iter().map(|f| f.rel_type));
                }
            }
            _ => {}
        }
    }
}

/// A relational data type plus its nullability.
///
/// Children are shared, so cloning is cheap whatever the nesting depth, and
/// dropping does not recurse.
#[derive(Debug, Clone, PartialEq)]
pub struct RelType {
    pub data_type: RelDataType,
    pub nullable: bool,
}

impl RelType {
    pub fn new(data_type: RelDataType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }

    pub fn not_null(data_type: RelDataType) -> Self {
        Self::new(data_type, false)
    }

    pub fn nullable(data_type: RelDataType) -> Self {
        Self::new(data_type, true)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Fields of a struct type.
    pub fn fields(&self) -> Option<&RelFields> {
        match &self.data_type {
            RelDataType::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

impl Drop for RelType {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.data_type.take_children(&mut pending);
        while let Some(mut child) = pending.pop() {
            child.data_type.take_children(&mut pending);
        }
    }
}

impl Display for RelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.data_type {
            RelDataType::Binary(Some(len)) => write!(f, "BINARY({len})")?,
            RelDataType::Struct(fields) => {
                f.write_str("STRUCT(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", field.name, field.rel_type)?;
                }
                f.write_str(")")?;
            }
            RelDataType::Array(elem) => write!(f, "ARRAY<{elem}>")?,
            RelDataType::Multiset(elem) => write!(f, "MULTISET<{elem}>")?,
            RelDataType::Map { key, value } => write!(f, "MAP<{key}, {value}>")?,
            other => f.write_str(other.type_name())?,
        }
        if !self.nullable {
            f.write_str(" NOT NULL")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelField {
    pub name: String,
    pub rel_type: RelType,
}

impl RelField {
    pub fn new(name: impl Into<String>, data_type: RelDataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            rel_type: RelType::new(data_type, nullable),
        }
    }

    pub fn of(name: impl Into<String>, rel_type: RelType) -> Self {
        Self {
            name: name.into(),
            rel_type,
        }
    }
}

/// Ordered fields of a struct type; a field's ordinal is its column position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelFields(Arc<Vec<RelField>>);

impl RelFields {
    pub fn new(fields: Vec<RelField>) -> Self {
        Self(Arc::new(fields))
    }

    pub fn as_slice(&self) -> &[RelField] {
        &self.0
    }

    /// Position of the field named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|f| f.name == name)
    }
}

impl From<Vec<RelField>> for RelFields {
    fn from(value: Vec<RelField>) -> Self {
        Self::new(value)
    }
}

impl Deref for RelFields {
    type Target = [RelField];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}
