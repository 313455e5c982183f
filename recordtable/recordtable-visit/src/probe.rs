use recordtable_core::{SchemaError, SchemaId, Schemas};

use crate::visitor::{SchemaVisitor, VisitAction, visit};

/// True when any node reachable from `root` carries a logical type.
pub fn contains_logical_types(schemas: &Schemas, root: SchemaId) -> Result<bool, SchemaError> {
    visit(schemas, root, LogicalTypeProbe::default())
}

#[derive(Default)]
struct LogicalTypeProbe {
    found: bool,
}

impl LogicalTypeProbe {
    fn check(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        if schemas[id].logical_type.is_some() {
            self.found = true;
            VisitAction::Terminate
        } else {
            VisitAction::Continue
        }
    }
}

impl SchemaVisitor for LogicalTypeProbe {
    type Output = bool;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        self.check(schemas, id)
    }

    fn visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction {
        self.check(schemas, id)
    }

    fn after_visit_non_terminal(&mut self, _: &Schemas, _: SchemaId) -> VisitAction {
        VisitAction::Continue
    }

    fn finish(self) -> bool {
        self.found
    }
}
