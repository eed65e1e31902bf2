use std::sync::Arc;

use common::{BqlError, BqlResult, CancellationToken};
use statement::{GraphClause, ObjectPattern, PredicatePattern, SubjectPattern};
use store::Graph;
use table::{Row, Table};
use types::{Node, Object, Predicate, Triple};

/// A clause whose every component is already bound by prior clauses
/// (§4.4.1's `exist == total` case): reconstructs the concrete triple
/// for each row and drops rows the graphs don't agree exist. Unlike
/// `simple_fetch`'s union-over-graphs, existence is a conjunction — every
/// graph must have the triple, matching `simple_exist` (§9).
pub(super) fn existence_filter(
    clause: &GraphClause,
    mut tbl: Table,
    graphs: &[Arc<dyn Graph>],
    cancel: &CancellationToken,
) -> BqlResult<Table> {
    let mut i = 0;
    while i < tbl.num_rows() {
        cancel.check()?;
        let triple = reconstruct_triple(clause, &tbl.rows()[i])?;

        let mut all_exist = true;
        for graph in graphs {
            if !graph.exist(&triple)? {
                all_exist = false;
                break;
            }
        }

        if all_exist {
            i += 1;
        } else {
            tbl.delete_row(i);
        }
    }
    Ok(tbl)
}

fn reconstruct_triple(clause: &GraphClause, row: &Row) -> BqlResult<Triple> {
    let subject = resolve_node(&clause.subject, row)?;
    let predicate = resolve_predicate(&clause.predicate, row)?;
    let object = resolve_object(&clause.object, row)?;
    Ok(Triple::new(subject, predicate, object))
}

/// Tries the primary binding first, then the alias, per §4.4.2.
fn row_cell<'a>(row: &'a Row, binding: &str, alias: Option<&str>) -> Option<&'a types::Cell> {
    row.get(binding).or_else(|| alias.and_then(|a| row.get(a)))
}

fn resolve_node(pattern: &SubjectPattern, row: &Row) -> BqlResult<Node> {
    match pattern {
        SubjectPattern::Fixed(n) => Ok(n.clone()),
        SubjectPattern::Unbound { binding, alias } => row_cell(row, binding, alias.as_deref())
            .and_then(|c| c.as_node())
            .cloned()
            .ok_or_else(|| BqlError::Input(format!("existence_filter: binding '{binding}' is not a node"))),
    }
}

fn resolve_predicate(pattern: &PredicatePattern, row: &Row) -> BqlResult<Predicate> {
    match pattern {
        PredicatePattern::Fixed(p) => Ok(p.clone()),
        PredicatePattern::Unbound { binding, alias } => row_cell(row, binding, alias.as_deref())
            .and_then(|c| c.as_predicate())
            .cloned()
            .ok_or_else(|| BqlError::Input(format!("existence_filter: binding '{binding}' is not a predicate"))),
    }
}

fn resolve_object(pattern: &ObjectPattern, row: &Row) -> BqlResult<Object> {
    match pattern {
        ObjectPattern::Fixed(o) => Ok(o.clone()),
        ObjectPattern::Unbound { binding, alias } => {
            let cell = row_cell(row, binding, alias.as_deref())
                .ok_or_else(|| BqlError::Input(format!("existence_filter: binding '{binding}' is unset")))?;
            if let Some(n) = cell.as_node() {
                Ok(Object::Node(n.clone()))
            } else if let Some(p) = cell.as_predicate() {
                Ok(Object::Predicate(p.clone()))
            } else if let Some(l) = cell.as_literal() {
                Ok(Object::Literal(l.clone()))
            } else {
                Err(BqlError::Input(format!(
                    "existence_filter: binding '{binding}' is not a valid object"
                )))
            }
        }
    }
}
