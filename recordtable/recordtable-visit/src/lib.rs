//! Schema graph traversal for `recordtable`.
//!
//! [`visit`] walks a possibly recursive schema graph without recursion and
//! without revisiting nodes. The other modules are visitors and helpers built
//! on top of it.

mod canonical;
mod clone;
mod diff;
mod format;
mod probe;
mod project;
mod visitor;

pub use canonical::{EMPTY_FINGERPRINT, canonical_form, fingerprint, rabin_fingerprint};
pub use clone::{CopyPolicy, clone_into, clone_schema};
pub use diff::{DiffKind, SchemaDiff, diff};
pub use format::{SchemaDisplay, display, format_schema};
pub use probe::contains_logical_types;
pub use project::project;
pub use visitor::{SchemaVisitor, VisitAction, VisitStats, visit, visit_with_stats};
