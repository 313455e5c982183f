//! Filter expressions → flat postfix row predicates.

use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use recordtable_core::Value;
use recordtable_types::{RelDataType, RelFields, RelType};

use crate::{
    error::CompileError,
    expr::{BinaryOp, Expr, Literal},
    literal::{parse_date, parse_timestamp},
};

/// Scalar operand as seen by a compiled program.
#[derive(Debug, Clone, PartialEq)]
enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Arc<str>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Datum {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Boolean(v) => Datum::Bool(*v),
            Value::Int(v) => Datum::Int(i64::from(*v)),
            Value::Long(v) => Datum::Int(*v),
            Value::Float(v) => Datum::Double(f64::from(*v)),
            Value::Double(v) => Datum::Double(*v),
            Value::String(v) | Value::Enum(v) => Datum::Str(Arc::clone(v)),
            Value::Date(v) => Datum::Date(*v),
            Value::Timestamp(v) => Datum::Timestamp(*v),
            _ => Datum::Null,
        }
    }

    fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Datum::Null,
            Literal::Boolean(v) => Datum::Bool(*v),
            Literal::Integer(v) => Datum::Int(*v),
            Literal::Double(v) => Datum::Double(*v),
            Literal::String(v) => Datum::Str(Arc::from(v.as_str())),
            Literal::Date(v) => Datum::Date(*v),
            Literal::Timestamp(v) => Datum::Timestamp(*v),
        }
    }

    /// SQL comparison; `None` when either side is null or the kinds differ.
    fn compare(&self, other: &Datum) -> Option<Ordering> {
        match (self, other) {
            (Datum::Bool(a), Datum::Bool(b)) => Some(a.cmp(b)),
            (Datum::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
            (Datum::Int(a), Datum::Double(b)) => (*a as f64).partial_cmp(b),
            (Datum::Double(a), Datum::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Datum::Double(a), Datum::Double(b)) => a.partial_cmp(b),
            (Datum::Str(a), Datum::Str(b)) => Some(a.cmp(b)),
            (Datum::Date(a), Datum::Date(b)) => Some(a.cmp(b)),
            (Datum::Timestamp(a), Datum::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn truth(&self) -> Option<bool> {
        match self {
            Datum::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Option<bool>> for Datum {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Datum::Null, Datum::Bool)
    }
}

/// Static type of an operand during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    Null,
    Boolean,
    Integer,
    Double,
    Varchar,
    Date,
    Timestamp,
}

impl ScalarType {
    fn name(self) -> &'static str {
        match self {
            ScalarType::Null => "NULL",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Integer => "INTEGER",
            ScalarType::Double => "DOUBLE",
            ScalarType::Varchar => "VARCHAR",
            ScalarType::Date => "DATE",
            ScalarType::Timestamp => "TIMESTAMP",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Double)
    }

    fn comparable_with(self, other: ScalarType) -> bool {
        self == other
            || self == ScalarType::Null
            || other == ScalarType::Null
            || (self.is_numeric() && other.is_numeric())
    }

    fn of_column(rel_type: &RelType) -> Option<Self> {
        match rel_type.data_type {
            RelDataType::Boolean => Some(ScalarType::Boolean),
            RelDataType::Integer | RelDataType::BigInt => Some(ScalarType::Integer),
            RelDataType::Float | RelDataType::Double => Some(ScalarType::Double),
            RelDataType::Varchar | RelDataType::Symbol => Some(ScalarType::Varchar),
            RelDataType::Date => Some(ScalarType::Date),
            RelDataType::Timestamp => Some(ScalarType::Timestamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Plus,
    Minus,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq)]
enum Instr {
    Load(usize),
    /// `IS [NOT] NULL` on a column of any type.
    ColumnIsNull { column: usize, negated: bool },
    Push(Datum),
    Compare(BinaryOp),
    Arith(ArithOp),
    And,
    Or,
    Not,
    IsNull { negated: bool },
    InList { len: usize, negated: bool },
    Like { pattern: Arc<LikePattern>, negated: bool },
}

/// Reusable evaluation scratch space; one per enumerator.
#[derive(Debug, Default)]
pub struct EvalContext {
    stack: Vec<Datum>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn pop(&mut self) -> Datum {
        self.stack.pop().unwrap_or(Datum::Null)
    }
}

/// Executable form of a conjunction of filters.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPredicate {
    program: Vec<Instr>,
    columns: Vec<usize>,
}

impl RowPredicate {
    /// Predicate accepting every row.
    pub fn always() -> Self {
        Self {
            program: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Column positions the predicate reads, ascending.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Rewrite column references for a narrower row layout.
    ///
    /// `layout[i]` is the original position of the column now found at `i`.
    pub fn remap(&self, layout: &[usize]) -> Result<RowPredicate, CompileError> {
        let find = |column: usize| {
            layout
                .iter()
                .position(|c| *c == column)
                .ok_or(CompileError::ColumnOutOfRange {
                    column,
                    width: layout.len(),
                })
        };
        let mut program = Vec::with_capacity(self.program.len());
        for instr in &self.program {
            program.push(match instr {
                Instr::Load(column) => Instr::Load(find(*column)?),
                Instr::ColumnIsNull { column, negated } => Instr::ColumnIsNull {
                    column: find(*column)?,
                    negated: *negated,
                },
                other => other.clone(),
            });
        }
        let mut columns = self
            .columns
            .iter()
            .map(|c| find(*c))
            .collect::<Result<Vec<_>, _>>()?;
        columns.sort_unstable();
        Ok(RowPredicate { program, columns })
    }

    /// Three-valued evaluation; unknown rejects the row.
    pub fn evaluate(&self, row: &[Value], ctx: &mut EvalContext) -> bool {
        if self.program.is_empty() {
            return true;
        }
        ctx.stack.clear();
        for instr in &self.program {
            let result = match instr {
                Instr::Load(column) => row.get(*column).map_or(Datum::Null, Datum::from_value),
                Instr::ColumnIsNull { column, negated } => {
                    let is_null = row.get(*column).is_none_or(Value::is_null);
                    Datum::Bool(is_null != *negated)
                }
                Instr::Push(datum) => datum.clone(),
                Instr::Compare(op) => {
                    let right = ctx.pop();
                    let left = ctx.pop();
                    left.compare(&right).map(|ord| holds(*op, ord)).into()
                }
                Instr::Arith(op) => {
                    let right = ctx.pop();
                    let left = ctx.pop();
                    arith(*op, &left, &right)
                }
                Instr::And => {
                    let right = ctx.pop().truth();
                    let left = ctx.pop().truth();
                    match (left, right) {
                        (Some(false), _) | (_, Some(false)) => Datum::Bool(false),
                        (Some(true), Some(true)) => Datum::Bool(true),
                        _ => Datum::Null,
                    }
                }
                Instr::Or => {
                    let right = ctx.pop().truth();
                    let left = ctx.pop().truth();
                    match (left, right) {
                        (Some(true), _) | (_, Some(true)) => Datum::Bool(true),
                        (Some(false), Some(false)) => Datum::Bool(false),
                        _ => Datum::Null,
                    }
                }
                Instr::Not => ctx.pop().truth().map(|v| !v).into(),
                Instr::IsNull { negated } => {
                    let is_null = ctx.pop() == Datum::Null;
                    Datum::Bool(is_null != *negated)
                }
                Instr::InList { len, negated } => {
                    let split = ctx.stack.len().saturating_sub(*len);
                    let (head, candidates) = ctx.stack.split_at(split);
                    let found = match head.last() {
                        None | Some(Datum::Null) => None,
                        Some(value) => {
                            let mut found = Some(false);
                            for candidate in candidates {
                                match value.compare(candidate) {
                                    Some(Ordering::Equal) => {
                                        found = Some(true);
                                        break;
                                    }
                                    Some(_) => {}
                                    None => found = None,
                                }
                            }
                            found
                        }
                    };
                    ctx.stack.truncate(split.saturating_sub(1));
                    found.map(|v| v != *negated).into()
                }
                Instr::Like { pattern, negated } => match ctx.pop() {
                    Datum::Str(text) => Datum::Bool(pattern.matches(&text) != *negated),
                    _ => Datum::Null,
                },
            };
            ctx.stack.push(result);
        }
        matches!(ctx.stack.pop(), Some(Datum::Bool(true)))
    }
}

fn holds(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::NotEq => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::LtEq => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::GtEq => ord != Ordering::Less,
        _ => false,
    }
}

fn arith(op: ArithOp, left: &Datum, right: &Datum) -> Datum {
    match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => match op {
            ArithOp::Plus => a.checked_add(*b),
            ArithOp::Minus => a.checked_sub(*b),
            ArithOp::Multiply => a.checked_mul(*b),
            ArithOp::Divide => a.checked_div(*b),
        }
        .map_or(Datum::Null, Datum::Int),
        (Datum::Int(_) | Datum::Double(_), Datum::Int(_) | Datum::Double(_)) => {
            let (a, b) = (as_f64(left), as_f64(right));
            match op {
                ArithOp::Plus => Datum::Double(a + b),
                ArithOp::Minus => Datum::Double(a - b),
                ArithOp::Multiply => Datum::Double(a * b),
                ArithOp::Divide if b == 0.0 => Datum::Null,
                ArithOp::Divide => Datum::Double(a / b),
            }
        }
        _ => Datum::Null,
    }
}

fn as_f64(datum: &Datum) -> f64 {
    match datum {
        Datum::Int(v) => *v as f64,
        Datum::Double(v) => *v,
        _ => f64::NAN,
    }
}

/// Compiled `LIKE` pattern: `%` matches any run, `_` any single character.
#[derive(Debug, Clone, PartialEq)]
struct LikePattern {
    tokens: Vec<LikeToken>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    AnyRun,
    AnyChar,
    Char(char),
}

impl LikePattern {
    fn new(pattern: &str) -> Self {
        let tokens = pattern
            .chars()
            .map(|c| match c {
                '%' => LikeToken::AnyRun,
                '_' => LikeToken::AnyChar,
                c => LikeToken::Char(c),
            })
            .collect();
        Self { tokens }
    }

    /// Greedy match with a single backtrack point at the last `%`.
    fn matches(&self, text: &str) -> bool {
        let (mut t, mut p) = (0usize, 0usize);
        let mut backtrack: Option<(usize, usize)> = None;
        loop {
            let next = text[t..].chars().next();
            match (self.tokens.get(p), next) {
                (Some(LikeToken::AnyRun), _) => {
                    p += 1;
                    backtrack = Some((p, t));
                }
                (Some(LikeToken::AnyChar), Some(c)) => {
                    p += 1;
                    t += c.len_utf8();
                }
                (Some(LikeToken::Char(expected)), Some(c)) if *expected == c => {
                    p += 1;
                    t += c.len_utf8();
                }
                (None, None) => return true,
                _ => match backtrack {
                    Some((bp, bt)) => match text[bt..].chars().next() {
                        Some(c) => {
                            let bt = bt + c.len_utf8();
                            backtrack = Some((bp, bt));
                            p = bp;
                            t = bt;
                        }
                        None => return false,
                    },
                    None => return false,
                },
            }
        }
    }
}

/// Compile the conjunction of `filters` against the row struct `row_type`.
pub fn compile(filters: &[Expr], row_type: &RelType) -> Result<RowPredicate, CompileError> {
    let fields = row_type.fields().ok_or_else(|| CompileError::NotAStruct {
        rel_type: row_type.to_string(),
    })?;
    let mut compiler = Compiler {
        fields,
        program: Vec::new(),
    };
    for (i, filter) in filters.iter().enumerate() {
        let ty = compiler.emit(filter)?;
        if !matches!(ty, ScalarType::Boolean | ScalarType::Null) {
            return Err(CompileError::NotAPredicate {
                found: ty.name().to_string(),
            });
        }
        if i > 0 {
            compiler.program.push(Instr::And);
        }
    }
    let mut columns: Vec<usize> = filters.iter().flat_map(Expr::columns).collect();
    columns.sort_unstable();
    columns.dedup();
    Ok(RowPredicate {
        program: compiler.program,
        columns,
    })
}

struct Compiler<'a> {
    fields: &'a RelFields,
    program: Vec<Instr>,
}

impl Compiler<'_> {
    fn column_type(&self, column: usize) -> Result<ScalarType, CompileError> {
        let field = self
            .fields
            .get(column)
            .ok_or(CompileError::ColumnOutOfRange {
                column,
                width: self.fields.len(),
            })?;
        ScalarType::of_column(&field.rel_type).ok_or_else(|| CompileError::UnsupportedColumnType {
            column,
            rel_type: field.rel_type.to_string(),
        })
    }

    fn emit(&mut self, expr: &Expr) -> Result<ScalarType, CompileError> {
        match expr {
            Expr::Column(column) => {
                let ty = self.column_type(*column)?;
                self.program.push(Instr::Load(*column));
                Ok(ty)
            }
            Expr::Literal(literal) => {
                self.program.push(Instr::Push(Datum::from_literal(literal)));
                Ok(literal_type(literal))
            }
            Expr::Binary { op, left, right } if op.is_comparison() => {
                let left_at = self.program.len();
                let lt = self.emit(left)?;
                let rt = self.emit_coerced(right, lt)?;
                let lt = self.coerce_at(left_at, left, lt, rt)?;
                if !lt.comparable_with(rt) {
                    return Err(mismatch(*op, lt, rt));
                }
                self.program.push(Instr::Compare(*op));
                Ok(ScalarType::Boolean)
            }
            Expr::Binary { op, left, right } if op.is_logical() => {
                let lt = self.emit(left)?;
                let rt = self.emit(right)?;
                let boolish = |t| matches!(t, ScalarType::Boolean | ScalarType::Null);
                if !boolish(lt) || !boolish(rt) {
                    return Err(mismatch(*op, lt, rt));
                }
                self.program.push(match op {
                    BinaryOp::And => Instr::And,
                    _ => Instr::Or,
                });
                Ok(ScalarType::Boolean)
            }
            Expr::Binary { op, left, right } => {
                let lt = self.emit(left)?;
                let rt = self.emit(right)?;
                let numeric = |t: ScalarType| t.is_numeric() || t == ScalarType::Null;
                if !numeric(lt) || !numeric(rt) {
                    return Err(mismatch(*op, lt, rt));
                }
                let arith_op = match op {
                    BinaryOp::Plus => ArithOp::Plus,
                    BinaryOp::Minus => ArithOp::Minus,
                    BinaryOp::Multiply => ArithOp::Multiply,
                    _ => ArithOp::Divide,
                };
                self.program.push(Instr::Arith(arith_op));
                Ok(if lt == ScalarType::Double || rt == ScalarType::Double {
                    ScalarType::Double
                } else {
                    ScalarType::Integer
                })
            }
            Expr::Not(inner) => {
                let ty = self.emit(inner)?;
                if !matches!(ty, ScalarType::Boolean | ScalarType::Null) {
                    return Err(CompileError::TypeMismatch {
                        op: "NOT".to_string(),
                        left: ty.name().to_string(),
                        right: String::new(),
                    });
                }
                self.program.push(Instr::Not);
                Ok(ScalarType::Boolean)
            }
            Expr::IsNull { expr, negated } => {
                if let Expr::Column(column) = expr.as_ref() {
                    if *column >= self.fields.len() {
                        return Err(CompileError::ColumnOutOfRange {
                            column: *column,
                            width: self.fields.len(),
                        });
                    }
                    self.program.push(Instr::ColumnIsNull {
                        column: *column,
                        negated: *negated,
                    });
                } else {
                    self.emit(expr)?;
                    self.program.push(Instr::IsNull { negated: *negated });
                }
                Ok(ScalarType::Boolean)
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let ty = self.emit(expr)?;
                for item in list {
                    let item_ty = self.emit_coerced(item, ty)?;
                    if !ty.comparable_with(item_ty) {
                        return Err(mismatch(BinaryOp::Eq, ty, item_ty));
                    }
                }
                self.program.push(Instr::InList {
                    len: list.len(),
                    negated: *negated,
                });
                Ok(ScalarType::Boolean)
            }
            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                let Expr::Literal(Literal::String(pattern)) = pattern.as_ref() else {
                    return Err(CompileError::NonLiteralPattern);
                };
                let ty = self.emit(expr)?;
                if !matches!(ty, ScalarType::Varchar | ScalarType::Null) {
                    return Err(CompileError::TypeMismatch {
                        op: "LIKE".to_string(),
                        left: ty.name().to_string(),
                        right: ScalarType::Varchar.name().to_string(),
                    });
                }
                self.program.push(Instr::Like {
                    pattern: Arc::new(LikePattern::new(pattern)),
                    negated: *negated,
                });
                Ok(ScalarType::Boolean)
            }
            Expr::Call { name, .. } => Err(CompileError::UnsupportedFunction { name: name.clone() }),
        }
    }

    /// Emit `expr`, reading a string literal as a date or timestamp when the
    /// other operand has that type.
    fn emit_coerced(&mut self, expr: &Expr, other: ScalarType) -> Result<ScalarType, CompileError> {
        let at = self.program.len();
        let ty = self.emit(expr)?;
        self.coerce_at(at, expr, ty, other)
    }

    /// Re-read the string literal emitted at `at` once the type of the other
    /// operand is known.
    fn coerce_at(
        &mut self,
        at: usize,
        expr: &Expr,
        ty: ScalarType,
        other: ScalarType,
    ) -> Result<ScalarType, CompileError> {
        let Expr::Literal(Literal::String(text)) = expr else {
            return Ok(ty);
        };
        let datum = match other {
            ScalarType::Date => parse_date(text)
                .map(Datum::Date)
                .ok_or_else(|| invalid_literal(text, "DATE"))?,
            ScalarType::Timestamp => parse_timestamp(text)
                .map(Datum::Timestamp)
                .ok_or_else(|| invalid_literal(text, "TIMESTAMP"))?,
            _ => return Ok(ty),
        };
        if let Some(slot) = self.program.get_mut(at) {
            *slot = Instr::Push(datum);
        }
        Ok(other)
    }
}

fn literal_type(literal: &Literal) -> ScalarType {
    match literal {
        Literal::Null => ScalarType::Null,
        Literal::Boolean(_) => ScalarType::Boolean,
        Literal::Integer(_) => ScalarType::Integer,
        Literal::Double(_) => ScalarType::Double,
        Literal::String(_) => ScalarType::Varchar,
        Literal::Date(_) => ScalarType::Date,
        Literal::Timestamp(_) => ScalarType::Timestamp,
    }
}

fn mismatch(op: BinaryOp, left: ScalarType, right: ScalarType) -> CompileError {
    CompileError::TypeMismatch {
        op: op.symbol().to_string(),
        left: left.name().to_string(),
        right: right.name().to_string(),
    }
}

fn invalid_literal(text: &str, target: &'static str) -> CompileError {
    CompileError::InvalidLiteral {
        value: text.to_string(),
        target,
    }
}
