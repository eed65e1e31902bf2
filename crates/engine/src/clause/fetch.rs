use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use common::{BqlError, BqlResult, CancellationToken, Config, LookupOptions};
use statement::{GraphClause, ObjectPattern, PredicatePattern, SubjectPattern};
use store::{Graph, TriplePattern};
use table::Table;
use types::Triple;

use super::{binding_names, triple_to_row};

/// Streams triples matching `clause`'s partial pattern from every open
/// graph, producing a `Table` whose schema is exactly the clause's
/// bindings and aliases — one row per matching triple.
///
/// Results from the graphs are multiplexed over a bounded channel
/// (`config.chan_size`); row order is not guaranteed. The first error
/// from any graph aborts the fetch; partial results are discarded.
pub fn simple_fetch(
    clause: &GraphClause,
    graphs: &[Arc<dyn Graph>],
    opts: &LookupOptions,
    config: &Config,
    cancel: &CancellationToken,
) -> BqlResult<Table> {
    let pattern = TriplePattern {
        subject: match &clause.subject {
            SubjectPattern::Fixed(n) => Some(n.clone()),
            SubjectPattern::Unbound { .. } => None,
        },
        predicate: match &clause.predicate {
            PredicatePattern::Fixed(p) => Some(p.name.clone()),
            PredicatePattern::Unbound { .. } => None,
        },
        object: match &clause.object {
            ObjectPattern::Fixed(o) => Some(o.clone()),
            ObjectPattern::Unbound { .. } => None,
        },
    };

    let (tx, rx) = mpsc::sync_channel::<BqlResult<Triple>>(config.chan_size.max(1));

    thread::scope(|scope| {
        for graph in graphs {
            let tx = tx.clone();
            let pattern = pattern.clone();
            scope.spawn(move || match graph.lookup(&pattern, opts) {
                Ok(triples) => {
                    for t in triples {
                        if tx.send(Ok(t)).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                }
            });
        }
        drop(tx);

        let mut table = Table::new(binding_names(clause));
        for msg in rx {
            if cancel.is_cancelled() {
                return Err(BqlError::Cancelled);
            }
            table.add_row(triple_to_row(clause, &msg?));
        }
        Ok(table)
    })
}
