//! Structural comparison of two schema graphs.

use std::{
    collections::{BTreeSet, HashSet},
    fmt::{Display, Formatter, Result as FmtResult},
};

use recordtable_core::{LogicalType, SchemaId, SchemaKind, SchemaNode, Schemas, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum DiffKind {
    TypeMismatch { left: String, right: String },
    NameMismatch { left: String, right: String },
    FixedSizeMismatch { left: usize, right: usize },
    EnumSymbolsMismatch { left: Vec<String>, right: Vec<String> },
    /// The right record has a field the left one lacks.
    MissingFieldLeft { field: String },
    /// The left record has a field the right one lacks.
    MissingFieldRight { field: String },
    LogicalTypeMismatch {
        left: Option<LogicalType>,
        right: Option<LogicalType>,
    },
    PropertyMismatch {
        key: String,
        left: Option<String>,
        right: Option<String>,
    },
    DocMismatch {
        left: Option<String>,
        right: Option<String>,
    },
    DefaultMismatch {
        left: Option<Value>,
        right: Option<Value>,
    },
}

/// One difference, located by a path such as `address.city`, `tags[]`,
/// `attrs{}` or `opt|1` (union branch). The empty path is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDiff {
    pub path: String,
    pub kind: DiffKind,
}

impl Display for SchemaDiff {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        match &self.kind {
            DiffKind::TypeMismatch { left, right } => {
                write!(f, "{path}: type {left} != {right}")
            }
            DiffKind::NameMismatch { left, right } => {
                write!(f, "{path}: name {left} != {right}")
            }
            DiffKind::FixedSizeMismatch { left, right } => {
                write!(f, "{path}: fixed size {left} != {right}")
            }
            DiffKind::EnumSymbolsMismatch { left, right } => {
                write!(f, "{path}: symbols {left:?} != {right:?}")
            }
            DiffKind::MissingFieldLeft { field } => {
                write!(f, "{path}: field '{field}' missing on the left")
            }
            DiffKind::MissingFieldRight { field } => {
                write!(f, "{path}: field '{field}' missing on the right")
            }
            DiffKind::LogicalTypeMismatch { left, right } => {
                write!(f, "{path}: logical type {left:?} != {right:?}")
            }
            DiffKind::PropertyMismatch { key, left, right } => {
                write!(f, "{path}: property '{key}' {left:?} != {right:?}")
            }
            DiffKind::DocMismatch { left, right } => {
                write!(f, "{path}: doc {left:?} != {right:?}")
            }
            DiffKind::DefaultMismatch { left, right } => {
                write!(f, "{path}: default {left:?} != {right:?}")
            }
        }
    }
}

/// Compare the graph below `left_root` with the graph below `right_root`.
///
/// Differences are reported depth-first in declaration order. Pairs of nodes
/// are compared at most once, so recursive schemas terminate.
pub fn diff(
    left: &Schemas,
    left_root: SchemaId,
    right: &Schemas,
    right_root: SchemaId,
) -> Vec<SchemaDiff> {
    let mut diffs = Vec::new();
    let mut seen: HashSet<(SchemaId, SchemaId)> = HashSet::new();
    let mut work = vec![(left_root, right_root, String::new())];

    while let Some((l, r, path)) = work.pop() {
        if !seen.insert((l, r)) {
            continue;
        }
        let (Some(ln), Some(rn)) = (left.get(l), right.get(r)) else {
            continue;
        };
        let mut report = Report {
            diffs: &mut diffs,
            path: &path,
        };

        if ln.kind.type_name() != rn.kind.type_name() {
            report.push(DiffKind::TypeMismatch {
                left: ln.type_name().to_string(),
                right: rn.type_name().to_string(),
            });
            continue;
        }
        if ln.logical_type != rn.logical_type {
            report.push(DiffKind::LogicalTypeMismatch {
                left: ln.logical_type.clone(),
                right: rn.logical_type.clone(),
            });
        }
        compare_metadata(ln, rn, &mut report);

        let mut children = Vec::new();
        match (&ln.kind, &rn.kind) {
            (
                SchemaKind::Fixed { name: lname, size: lsize },
                SchemaKind::Fixed { name: rname, size: rsize },
            ) => {
                compare_names(lname.fullname(), rname.fullname(), &mut report);
                if lsize != rsize {
                    report.push(DiffKind::FixedSizeMismatch {
                        left: *lsize,
                        right: *rsize,
                    });
                }
            }
            (
                SchemaKind::Enum { name: lname, symbols: lsyms },
                SchemaKind::Enum { name: rname, symbols: rsyms },
            ) => {
                compare_names(lname.fullname(), rname.fullname(), &mut report);
                if lsyms != rsyms {
                    report.push(DiffKind::EnumSymbolsMismatch {
                        left: lsyms.clone(),
                        right: rsyms.clone(),
                    });
                }
            }
            (
                SchemaKind::Record { name: lname, fields: lfields },
                SchemaKind::Record { name: rname, fields: rfields },
            ) => {
                compare_names(lname.fullname(), rname.fullname(), &mut report);
                for lf in lfields {
                    let Some(rf) = rfields.iter().find(|rf| rf.name == lf.name) else {
                        report.push(DiffKind::MissingFieldRight {
                            field: lf.name.clone(),
                        });
                        continue;
                    };
                    let field_path = join(&path, &lf.name);
                    if lf.default != rf.default {
                        report.push_at(
                            &field_path,
                            DiffKind::DefaultMismatch {
                                left: lf.default.clone(),
                                right: rf.default.clone(),
                            },
                        );
                    }
                    children.push((lf.schema, rf.schema, field_path));
                }
                for rf in rfields {
                    if !lfields.iter().any(|lf| lf.name == rf.name) {
                        report.push(DiffKind::MissingFieldLeft {
                            field: rf.name.clone(),
                        });
                    }
                }
            }
            (SchemaKind::Array(li), SchemaKind::Array(ri)) => {
                children.push((*li, *ri, format!("{path}[]")));
            }
            (SchemaKind::Map(lv), SchemaKind::Map(rv)) => {
                children.push((*lv, *rv, format!("{path}{{}}")));
            }
            (SchemaKind::Union(lb), SchemaKind::Union(rb)) => {
                if lb.len() != rb.len() {
                    report.push(DiffKind::TypeMismatch {
                        left: format!("union of {}", lb.len()),
                        right: format!("union of {}", rb.len()),
                    });
                }
                for (i, (lb, rb)) in lb.iter().zip(rb).enumerate() {
                    children.push((*lb, *rb, format!("{path}|{i}")));
                }
            }
            _ => {}
        }

        work.extend(children.into_iter().rev());
    }

    diffs
}

struct Report<'a> {
    diffs: &'a mut Vec<SchemaDiff>,
    path: &'a str,
}

impl Report<'_> {
    fn push(&mut self, kind: DiffKind) {
        let path = self.path.to_string();
        self.push_at(&path, kind);
    }

    fn push_at(&mut self, path: &str, kind: DiffKind) {
        self.diffs.push(SchemaDiff {
            path: path.to_string(),
            kind,
        });
    }
}

fn compare_names(left: String, right: String, report: &mut Report<'_>) {
    if left != right {
        report.push(DiffKind::NameMismatch { left, right });
    }
}

fn compare_metadata(ln: &SchemaNode, rn: &SchemaNode, report: &mut Report<'_>) {
    if ln.doc != rn.doc {
        report.push(DiffKind::DocMismatch {
            left: ln.doc.clone(),
            right: rn.doc.clone(),
        });
    }
    let keys: BTreeSet<&String> = ln.props.keys().chain(rn.props.keys()).collect();
    for key in keys {
        let (l, r) = (ln.props.get(key), rn.props.get(key));
        if l != r {
            report.push(DiffKind::PropertyMismatch {
                key: key.clone(),
                left: l.cloned(),
                right: r.cloned(),
            });
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
