use common::LookupOptions;
use statement::{GraphClause, PredicatePattern};
use table::Row;
use types::Literal;

/// Narrows `lo` using a row's predicate-anchor alias, when the clause's
/// predicate carries one and the row has bound it to an `Int64`
/// timestamp. The tightening is monotone: the resulting lower bound is
/// the max of the incoming lower bound and the row's anchor, the upper
/// bound the min — pinning the fetch to (at most) that single instant.
pub fn update_time_bounds_for_row(lo: &LookupOptions, clause: &GraphClause, row: &Row) -> LookupOptions {
    if let PredicatePattern::Unbound { alias: Some(alias), .. } = &clause.predicate {
        if let Some(cell) = row.get(alias) {
            if let Some(Literal::Int64(anchor)) = cell.as_literal() {
                return lo.tighten(Some(*anchor), Some(*anchor));
            }
        }
    }
    *lo
}
