mod existence_filter;
mod specialize;
mod tail;


use std::sync::Arc;

use common::{BqlResult, CancellationToken, Config};
use statement::Statement;
use store::Graph;
use table::Table;

use crate::clause;

/// Drives a single `Statement` to completion: owns the working `Table`
/// and borrows `Graph` handles from the store for the duration of
/// execution. Clauses are processed sequentially in the statement's
/// given order (most-specific first); operations on the working table
/// require no locking because of this discipline (§5).
pub struct QueryPlan<'a> {
    statement: &'a Statement,
    graphs: Vec<Arc<dyn Graph>>,
    config: Config,
    cancel: CancellationToken,
}

impl<'a> QueryPlan<'a> {
    pub fn new(
        statement: &'a Statement,
        graphs: Vec<Arc<dyn Graph>>,
        config: Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            statement,
            graphs,
            config,
            cancel,
        }
    }

    pub fn execute(&self) -> BqlResult<Table> {
        let mut tbl = Table::new(Vec::new());

        for clause in &self.statement.sorted_graph_pattern_clauses {
            self.cancel.check()?;

            if clause.specificity() == 3 {
                let triple = clause::fixed_triple(clause)?;
                let (exists, one_row) = clause::simple_exist(clause, &triple, &self.graphs, &self.cancel)?;
                if exists {
                    tbl.append_table(one_row)?;
                } else {
                    tbl.truncate();
                    break;
                }
                continue;
            }

            let own_bindings = clause::binding_names(clause);
            let total = own_bindings.len();
            let exist = own_bindings.iter().filter(|b| tbl.has_binding(b)).count();

            let global = &self.statement.global_lookup_options;
            let lookup_options = clause.lookup_options.tighten(global.lower_bound, global.upper_bound);

            if exist == 0 {
                let fetched = clause::simple_fetch(
                    clause,
                    &self.graphs,
                    &lookup_options,
                    &self.config,
                    &self.cancel,
                )?;
                if tbl.bindings().is_empty() {
                    tbl = fetched;
                } else {
                    tbl = tbl.dot_product(&fetched);
                }
            } else if exist < total {
                tbl = specialize::specialize(clause, tbl, &self.graphs, &lookup_options, &self.config, &self.cancel)?;
            } else {
                tbl = existence_filter::existence_filter(clause, tbl, &self.graphs, &self.cancel)?;
            }
        }

        tail::apply(self.statement, tbl)
    }
}
