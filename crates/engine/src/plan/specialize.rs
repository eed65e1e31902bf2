use std::sync::Arc;

use common::{BqlResult, CancellationToken, Config, LookupOptions};
use statement::{GraphClause, ObjectPattern, PredicatePattern, SubjectPattern};
use store::Graph;
use table::{Row, Table};
use types::{Cell, CellKind, Object};

use crate::clause;

/// Partial-binding specialization (§4.4.1): takes a snapshot of the
/// current rows, truncates the working table, then for each snapshot
/// row builds a specialized clause and re-fetches. Mutating the row
/// collection while iterating the snapshot would be a bug — copy first.
///
/// `base_lookup_options` is the clause's own bounds already tightened
/// against the statement's global bounds (§3/§4.3/§6); each row further
/// tightens that base via its own predicate anchor.
pub(super) fn specialize(
    clause: &GraphClause,
    tbl: Table,
    graphs: &[Arc<dyn Graph>],
    base_lookup_options: &LookupOptions,
    config: &Config,
    cancel: &CancellationToken,
) -> BqlResult<Table> {
    let snapshot: Vec<Row> = tbl.rows().to_vec();
    let mut working = tbl;
    working.truncate();

    for row in &snapshot {
        let specialized = specialize_clause(clause, row, base_lookup_options);
        let fetched = clause::simple_fetch(&specialized, graphs, &specialized.lookup_options, config, cancel)?;
        working.add_bindings(fetched.bindings());
        for fetched_row in fetched.rows() {
            working.add_row(Table::merge_rows(&[row, fetched_row]));
        }
    }

    Ok(working)
}

fn specialize_clause(clause: &GraphClause, row: &Row, base_lookup_options: &LookupOptions) -> GraphClause {
    let subject = match &clause.subject {
        SubjectPattern::Fixed(_) => clause.subject.clone(),
        SubjectPattern::Unbound { binding, alias } => {
            match get_bound_value_for_component(row, binding, alias.as_deref(), CellKind::Node) {
                Some(Cell::Node(n)) => SubjectPattern::Fixed(n),
                _ => clause.subject.clone(),
            }
        }
    };

    let predicate = match &clause.predicate {
        PredicatePattern::Fixed(_) => clause.predicate.clone(),
        PredicatePattern::Unbound { binding, alias } => {
            match get_bound_value_for_component(row, binding, alias.as_deref(), CellKind::Predicate) {
                Some(Cell::Predicate(p)) => PredicatePattern::Fixed(p),
                _ => clause.predicate.clone(),
            }
        }
    };

    let object = match &clause.object {
        ObjectPattern::Fixed(_) => clause.object.clone(),
        ObjectPattern::Unbound { binding, alias } => {
            let bound = get_bound_value_for_component(row, binding, alias.as_deref(), CellKind::Node)
                .or_else(|| get_bound_value_for_component(row, binding, alias.as_deref(), CellKind::Predicate))
                .or_else(|| get_bound_value_for_component(row, binding, alias.as_deref(), CellKind::Literal));
            match bound {
                Some(Cell::Node(n)) => ObjectPattern::Fixed(Object::Node(n)),
                Some(Cell::Predicate(p)) => ObjectPattern::Fixed(Object::Predicate(p)),
                Some(Cell::Literal(l)) => ObjectPattern::Fixed(Object::Literal(l)),
                _ => clause.object.clone(),
            }
        }
    };

    let lookup_options = clause::update_time_bounds_for_row(base_lookup_options, clause, row);

    GraphClause {
        subject,
        predicate,
        object,
        lookup_options,
    }
}

/// Accepts one or two cells from the `(binding, alias)` pair only if
/// both present and of the expected kind and deep-equal; otherwise
/// returns `None` and the component is left unfixed.
fn get_bound_value_for_component(
    row: &Row,
    binding: &str,
    alias: Option<&str>,
    expected_kind: CellKind,
) -> Option<Cell> {
    let primary = row.get(binding).filter(|c| c.kind() == expected_kind);
    let aliased = alias.and_then(|a| row.get(a)).filter(|c| c.kind() == expected_kind);
    match (primary, aliased) {
        (Some(p), Some(a)) if p == a => Some(p.clone()),
        (Some(_), Some(_)) => None,
        (Some(p), None) => Some(p.clone()),
        (None, Some(a)) => Some(a.clone()),
        (None, None) => None,
    }
}
