use std::sync::Arc;

use common::{BqlResult, CancellationToken};
use statement::GraphClause;
use store::Graph;
use table::Table;
use types::Triple;

use super::{binding_names, triple_to_row};

/// Tests whether `triple` exists in every open graph (existence is a
/// conjunction across `FROM` graphs, not a union — see §9's documented
/// asymmetry with `simple_fetch`). Returns the clause's single bound row
/// when it does; an empty-schema table otherwise.
pub fn simple_exist(
    clause: &GraphClause,
    triple: &Triple,
    graphs: &[Arc<dyn Graph>],
    cancel: &CancellationToken,
) -> BqlResult<(bool, Table)> {
    for graph in graphs {
        cancel.check()?;
        if !graph.exist(triple)? {
            return Ok((false, Table::new(Vec::new())));
        }
    }

    let mut table = Table::new(binding_names(clause));
    table.add_row(triple_to_row(clause, triple));
    Ok((true, table))
}
