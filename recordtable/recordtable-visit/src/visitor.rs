//! Non-recursive, cycle-safe traversal of a schema graph.

use std::collections::{HashSet, VecDeque};

use recordtable_core::{SchemaError, SchemaId, Schemas};

/// What the traversal does after a hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    Continue,
    /// Do not descend into the node's children. The post-visit hook still runs.
    /// Treated as `Continue` when returned for a terminal.
    SkipSubtree,
    /// Drop the remaining pending siblings of the current node.
    SkipSiblings,
    /// Stop immediately and return the visitor's result.
    Terminate,
}

/// Callbacks driven by [`visit`].
///
/// Terminal nodes (scalars, enums, fixed) and every node reached a second time
/// go to [`visit_terminal`](SchemaVisitor::visit_terminal). Records, arrays,
/// maps and unions get a pre-visit and, once all children are done, a
/// post-visit.
pub trait SchemaVisitor {
    type Output;

    fn visit_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction;

    fn visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction;

    fn after_visit_non_terminal(&mut self, schemas: &Schemas, id: SchemaId) -> VisitAction;

    fn finish(self) -> Self::Output;
}

/// Counters collected by [`visit_with_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitStats {
    /// Largest number of entries waiting in the work list at any time.
    pub peak_pending: usize,
    pub terminal_visits: usize,
    pub non_terminal_visits: usize,
    pub post_visits: usize,
}

impl VisitStats {
    pub fn hook_calls(&self) -> usize {
        self.terminal_visits + self.non_terminal_visits + self.post_visits
    }
}

#[derive(Debug, Clone, Copy)]
enum WorkItem {
    Node(SchemaId),
    After(SchemaId),
}

/// Walk the graph below `root` depth-first, children in declaration order.
pub fn visit<V: SchemaVisitor>(
    schemas: &Schemas,
    root: SchemaId,
    visitor: V,
) -> Result<V::Output, SchemaError> {
    visit_with_stats(schemas, root, visitor).map(|(output, _)| output)
}

pub fn visit_with_stats<V: SchemaVisitor>(
    schemas: &Schemas,
    root: SchemaId,
    mut visitor: V,
) -> Result<(V::Output, VisitStats), SchemaError> {
    if schemas.get(root).is_none() {
        return Err(SchemaError::UnknownId { id: root });
    }

    let mut work = VecDeque::from([WorkItem::Node(root)]);
    let mut visited: HashSet<SchemaId> = HashSet::new();
    let mut stats = VisitStats {
        peak_pending: 1,
        ..VisitStats::default()
    };

    while let Some(item) = work.pop_back() {
        match item {
            WorkItem::Node(id) => {
                let node = &schemas[id];
                if node.kind.is_terminal() || visited.contains(&id) {
                    stats.terminal_visits += 1;
                    match visitor.visit_terminal(schemas, id) {
                        VisitAction::Terminate => break,
                        VisitAction::SkipSiblings => skip_siblings(&mut work),
                        VisitAction::Continue | VisitAction::SkipSubtree => {}
                    }
                    continue;
                }

                stats.non_terminal_visits += 1;
                let action = visitor.visit_non_terminal(schemas, id);
                visited.insert(id);
                match action {
                    VisitAction::Terminate => break,
                    VisitAction::SkipSiblings => skip_siblings(&mut work),
                    VisitAction::SkipSubtree => work.push_back(WorkItem::After(id)),
                    VisitAction::Continue => {
                        work.push_back(WorkItem::After(id));
                        for child in node.kind.children().into_iter().rev() {
                            work.push_back(WorkItem::Node(child));
                        }
                    }
                }
                stats.peak_pending = stats.peak_pending.max(work.len());
            }
            WorkItem::After(id) => {
                stats.post_visits += 1;
                match visitor.after_visit_non_terminal(schemas, id) {
                    VisitAction::Terminate => break,
                    VisitAction::SkipSiblings => skip_siblings(&mut work),
                    VisitAction::Continue | VisitAction::SkipSubtree => {}
                }
            }
        }
    }

    Ok((visitor.finish(), stats))
}

/// Pending siblings sit above the parent's `After` entry.
fn skip_siblings(work: &mut VecDeque<WorkItem>) {
    while let Some(WorkItem::Node(_)) = work.back() {
        work.pop_back();
    }
}
