//! Filters written as SQL text.

use std::sync::Arc;

use recordtable_core::{SchemaId, Schemas};
use recordtable_expr::{Catalog, Expr, RowPredicate, compile, plan_sql, quote_ident};
use recordtable_types::RelType;
use tracing::debug;

use crate::{
    error::TableError,
    supplier::EmptySupplier,
    table::{FilterableRecordTable, Table},
};

/// Catalog holding one empty table named after its record.
pub struct SingleTableCatalog {
    name: String,
    table: FilterableRecordTable,
}

impl SingleTableCatalog {
    pub fn new(schemas: Arc<Schemas>, root: SchemaId) -> Result<Self, TableError> {
        let table = FilterableRecordTable::new(schemas, root, EmptySupplier)?;
        let name = table.schemas()[root]
            .kind
            .name()
            .map(|n| n.fullname())
            .unwrap_or_default();
        Ok(Self { name, table })
    }

    /// Table name, the full name of the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &FilterableRecordTable {
        &self.table
    }
}

impl Catalog for SingleTableCatalog {
    fn row_type(&self, table: &str) -> Option<RelType> {
        (table == self.name).then(|| self.table.row_type().clone())
    }
}

/// A SQL condition parsed and compiled against a record schema.
#[derive(Debug, Clone)]
pub struct SqlFilter {
    pub filter: Expr,
    pub predicate: RowPredicate,
}

/// Compile the SQL condition `text` over the fields of the record `root`.
pub fn compile_sql_filter(
    schemas: Arc<Schemas>,
    root: SchemaId,
    text: &str,
) -> Result<SqlFilter, TableError> {
    let catalog = SingleTableCatalog::new(schemas, root)?;
    let sql = format!("SELECT * FROM {} WHERE {text}", quote_ident(catalog.name()));
    debug!(sql = %sql, "compiling textual filter");
    let plan = plan_sql(&sql, &catalog)?;
    let filter = plan.filter().cloned().unwrap_or(Expr::Literal(true.into()));
    let predicate = compile(std::slice::from_ref(&filter), catalog.table().row_type())?;
    Ok(SqlFilter { filter, predicate })
}
