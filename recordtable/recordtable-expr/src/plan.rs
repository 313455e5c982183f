//! Planning of `SELECT * FROM <table> WHERE <condition>` statements.

use std::fmt::{Display, Formatter};

use recordtable_types::{RelFields, RelType};
use sqlparser::{
    ast::{
        BinaryOperator, DataType, Expr as SqlExpr, FunctionArg, FunctionArgExpr,
        FunctionArguments, GroupByExpr, Ident, ObjectName, ObjectNamePart, Query, Select,
        SelectItem, SetExpr, Statement, TableFactor, UnaryOperator, Value as SqlValue,
    },
    dialect::GenericDialect,
    parser::Parser,
};
use tracing::{debug, trace};

use crate::{
    compile::compile,
    error::PlanError,
    expr::{BinaryOp, Expr, Literal},
    literal::{parse_date, parse_timestamp},
};

/// Table lookup used while planning.
pub trait Catalog {
    /// Row type of `table`, `None` when the catalog has no such table.
    fn row_type(&self, table: &str) -> Option<RelType>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    Scan {
        table: String,
        row_type: RelType,
    },
    Filter {
        predicate: Expr,
        input: Box<LogicalPlan>,
    },
}

impl LogicalPlan {
    /// The validated filter condition, if the plan has one.
    pub fn filter(&self) -> Option<&Expr> {
        match self {
            LogicalPlan::Filter { predicate, .. } => Some(predicate),
            LogicalPlan::Scan { .. } => None,
        }
    }

    pub fn row_type(&self) -> &RelType {
        match self {
            LogicalPlan::Scan { row_type, .. } => row_type,
            LogicalPlan::Filter { input, .. } => input.row_type(),
        }
    }

    pub fn table(&self) -> &str {
        match self {
            LogicalPlan::Scan { table, .. } => table,
            LogicalPlan::Filter { input, .. } => input.table(),
        }
    }
}

impl Display for LogicalPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalPlan::Scan { table, .. } => write!(f, "Scan: {table}"),
            LogicalPlan::Filter { predicate, input } => {
                writeln!(f, "Filter: {predicate:?}")?;
                write!(f, "  {input}")
            }
        }
    }
}

/// Parse and plan `sql` against `catalog`.
///
/// Only a single `SELECT *` over one table with an optional `WHERE` clause is
/// accepted. The condition is type checked before the plan is returned.
pub fn plan_sql(sql: &str, catalog: &dyn Catalog) -> Result<LogicalPlan, PlanError> {
    let mut statements = Parser::parse_sql(&GenericDialect {}, sql)?;
    if statements.len() != 1 {
        return Err(PlanError::Unsupported(format!(
            "expected exactly one statement, found {}",
            statements.len()
        )));
    }
    let Some(Statement::Query(query)) = statements.pop() else {
        return Err(PlanError::Unsupported("only SELECT statements are accepted".into()));
    };
    let select = plain_select(&query)?;
    let table = single_table(select)?;
    let row_type = catalog
        .row_type(&table)
        .ok_or_else(|| PlanError::UnknownTable { name: table.clone() })?;
    trace!(table = %table, "planning scan");

    let scan = LogicalPlan::Scan {
        table: table.clone(),
        row_type,
    };
    let Some(selection) = &select.selection else {
        return Ok(scan);
    };
    let fields = scan
        .row_type()
        .fields()
        .ok_or_else(|| PlanError::Unsupported(format!("table '{table}' has no columns")))?;
    let predicate = Resolver { table: &table, fields }.convert(selection)?;
    compile(std::slice::from_ref(&predicate), scan.row_type())?;
    debug!(table = %table, ?predicate, "planned filter");
    Ok(LogicalPlan::Filter {
        predicate,
        input: Box::new(scan),
    })
}

fn plain_select(query: &Query) -> Result<&Select, PlanError> {
    if query.with.is_some()
        || query.order_by.is_some()
        || query.limit_clause.is_some()
        || query.fetch.is_some()
    {
        return Err(PlanError::Unsupported(
            "WITH, ORDER BY, LIMIT and FETCH are not supported".into(),
        ));
    }
    let SetExpr::Select(select) = query.body.as_ref() else {
        return Err(PlanError::Unsupported("only plain SELECT is accepted".into()));
    };
    if select.distinct.is_some() || select.having.is_some() || !group_by_is_empty(&select.group_by)
    {
        return Err(PlanError::Unsupported(
            "DISTINCT, GROUP BY and HAVING are not supported".into(),
        ));
    }
    match select.projection.as_slice() {
        [SelectItem::Wildcard(_)] => Ok(select),
        _ => Err(PlanError::Unsupported("only SELECT * is accepted".into())),
    }
}

fn group_by_is_empty(expr: &GroupByExpr) -> bool {
    match expr {
        GroupByExpr::All(_) => false,
        GroupByExpr::Expressions(columns, modifiers) => columns.is_empty() && modifiers.is_empty(),
    }
}

fn single_table(select: &Select) -> Result<String, PlanError> {
    let [from] = select.from.as_slice() else {
        return Err(PlanError::Unsupported("exactly one table is required".into()));
    };
    if !from.joins.is_empty() {
        return Err(PlanError::Unsupported("joins are not supported".into()));
    }
    match &from.relation {
        TableFactor::Table { name, .. } => object_name(name),
        other => Err(PlanError::Unsupported(format!("unsupported table factor: {other}"))),
    }
}

fn object_name(name: &ObjectName) -> Result<String, PlanError> {
    let mut parts = Vec::with_capacity(name.0.len());
    for part in &name.0 {
        match part {
            ObjectNamePart::Identifier(ident) => parts.push(ident.value.clone()),
            _ => {
                return Err(PlanError::Unsupported(
                    "object names using functions are not supported".into(),
                ));
            }
        }
    }
    Ok(parts.join("."))
}

/// Converts sqlparser expressions to positional filter expressions.
struct Resolver<'a> {
    table: &'a str,
    fields: &'a RelFields,
}

impl Resolver<'_> {
    /// Exact match first, then the unique case-insensitive match.
    fn column(&self, ident: &Ident) -> Result<Expr, PlanError> {
        let name = ident.value.as_str();
        if let Some(position) = self.fields.position(name) {
            return Ok(Expr::Column(position));
        }
        let mut matches = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.name.eq_ignore_ascii_case(name));
        match (matches.next(), matches.next()) {
            (Some((position, _)), None) => Ok(Expr::Column(position)),
            _ => Err(PlanError::UnknownColumn {
                name: name.to_string(),
            }),
        }
    }

    fn convert(&self, expr: &SqlExpr) -> Result<Expr, PlanError> {
        match expr {
            SqlExpr::Identifier(ident) => self.column(ident),
            SqlExpr::CompoundIdentifier(parts) => match parts.as_slice() {
                [ident] => self.column(ident),
                [qualifier, ident] if qualifier.value == self.table => self.column(ident),
                _ => Err(PlanError::UnknownColumn {
                    name: parts
                        .iter()
                        .map(|p| p.value.as_str())
                        .collect::<Vec<_>>()
                        .join("."),
                }),
            },
            SqlExpr::Value(value) => literal(&value.value).map(Expr::Literal),
            SqlExpr::Nested(inner) => self.convert(inner),
            SqlExpr::BinaryOp { left, op, right } => {
                let op = binary_op(op)?;
                Ok(self.convert(left)?.binary(op, self.convert(right)?))
            }
            SqlExpr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => Ok(self.convert(expr)?.not()),
                UnaryOperator::Plus => self.convert(expr),
                UnaryOperator::Minus => match self.convert(expr)? {
                    Expr::Literal(Literal::Integer(v)) => Ok(Expr::Literal(Literal::Integer(-v))),
                    Expr::Literal(Literal::Double(v)) => Ok(Expr::Literal(Literal::Double(-v))),
                    other => Ok(Expr::Literal(Literal::Integer(0)).minus(other)),
                },
                other => Err(PlanError::Unsupported(format!("unary operator {other}"))),
            },
            SqlExpr::IsNull(inner) => Ok(self.convert(inner)?.is_null()),
            SqlExpr::IsNotNull(inner) => Ok(self.convert(inner)?.is_not_null()),
            SqlExpr::InList {
                expr,
                list,
                negated,
            } => {
                let list = list
                    .iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.convert(expr)?.in_list(list, *negated))
            }
            SqlExpr::Between {
                expr,
                negated,
                low,
                high,
            } => {
                let value = self.convert(expr)?;
                let range = value
                    .clone()
                    .gt_eq(self.convert(low)?)
                    .and(value.lt_eq(self.convert(high)?));
                Ok(if *negated { range.not() } else { range })
            }
            SqlExpr::Like {
                negated,
                expr,
                pattern,
                escape_char: None,
                ..
            } => {
                let value = self.convert(expr)?;
                let pattern = self.convert(pattern)?;
                Ok(if *negated {
                    value.not_like(pattern)
                } else {
                    value.like(pattern)
                })
            }
            SqlExpr::Cast {
                expr, data_type, ..
            } => self.cast(expr, data_type),
            SqlExpr::Function(function) => {
                let args = match &function.args {
                    FunctionArguments::List(list) => list
                        .args
                        .iter()
                        .map(|arg| match arg {
                            FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => self.convert(e),
                            other => Err(PlanError::Unsupported(format!(
                                "function argument {other}"
                            ))),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    FunctionArguments::None => Vec::new(),
                    FunctionArguments::Subquery(_) => {
                        return Err(PlanError::Unsupported("subquery arguments".into()));
                    }
                };
                Ok(Expr::Call {
                    name: function.name.to_string(),
                    args,
                })
            }
            other => Err(PlanError::Unsupported(format!("expression {other}"))),
        }
    }

    fn cast(&self, expr: &SqlExpr, data_type: &DataType) -> Result<Expr, PlanError> {
        let SqlExpr::Value(value) = expr else {
            return Err(PlanError::Unsupported(format!(
                "CAST of non-literal expression {expr}"
            )));
        };
        let SqlValue::SingleQuotedString(text) = &value.value else {
            return Err(PlanError::Unsupported(format!("CAST of {value}")));
        };
        match data_type {
            DataType::Date => parse_date(text)
                .map(|d| Expr::Literal(Literal::Date(d)))
                .ok_or_else(|| PlanError::InvalidLiteral(format!("'{text}' is not a DATE"))),
            DataType::Timestamp(..) => parse_timestamp(text)
                .map(|ts| Expr::Literal(Literal::Timestamp(ts)))
                .ok_or_else(|| PlanError::InvalidLiteral(format!("'{text}' is not a TIMESTAMP"))),
            other => Err(PlanError::Unsupported(format!("CAST to {other}"))),
        }
    }
}

fn binary_op(op: &BinaryOperator) -> Result<BinaryOp, PlanError> {
    Ok(match op {
        BinaryOperator::Eq => BinaryOp::Eq,
        BinaryOperator::NotEq => BinaryOp::NotEq,
        BinaryOperator::Lt => BinaryOp::Lt,
        BinaryOperator::LtEq => BinaryOp::LtEq,
        BinaryOperator::Gt => BinaryOp::Gt,
        BinaryOperator::GtEq => BinaryOp::GtEq,
        BinaryOperator::And => BinaryOp::And,
        BinaryOperator::Or => BinaryOp::Or,
        BinaryOperator::Plus => BinaryOp::Plus,
        BinaryOperator::Minus => BinaryOp::Minus,
        BinaryOperator::Multiply => BinaryOp::Multiply,
        BinaryOperator::Divide => BinaryOp::Divide,
        other => return Err(PlanError::Unsupported(format!("binary operator {other}"))),
    })
}

fn literal(value: &SqlValue) -> Result<Literal, PlanError> {
    match value {
        SqlValue::Null => Ok(Literal::Null),
        SqlValue::Boolean(v) => Ok(Literal::Boolean(*v)),
        SqlValue::SingleQuotedString(v) => Ok(Literal::String(v.clone())),
        SqlValue::Number(text, _) => parse_number(text),
        other => Err(PlanError::Unsupported(format!("literal {other}"))),
    }
}

fn parse_number(text: &str) -> Result<Literal, PlanError> {
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>()
            .map(Literal::Double)
            .map_err(|err| PlanError::InvalidLiteral(format!("'{text}': {err}")))
    } else {
        text.parse::<i64>()
            .map(Literal::Integer)
            .map_err(|err| PlanError::InvalidLiteral(format!("'{text}': {err}")))
    }
}
