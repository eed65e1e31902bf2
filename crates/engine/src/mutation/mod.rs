
use std::sync::Mutex;

use common::{BqlError, BqlResult};
use statement::Statement;
use store::Store;
use types::Triple;

/// `CREATE GRAPH` (§4.5): for each graph named in `statement.graphs`, asks
/// the store to create it; errors are accumulated rather than
/// short-circuiting, same fan-out discipline as [`insert`].
pub fn create(store: &dyn Store, statement: &Statement) -> BqlResult<()> {
    fan_out_names(store, statement, |store, name| store.new_graph(name).map(|_| ()))
}

/// `DROP GRAPH` (§4.5), symmetrical with [`create`]. Named `drop_graph`
/// since `drop` is reserved.
pub fn drop_graph(store: &dyn Store, statement: &Statement) -> BqlResult<()> {
    fan_out_names(store, statement, |store, name| store.delete_graph(name))
}

/// `INSERT` (§4.5): writes `statement.data` to every graph named in
/// `statement.graphs`, fanned out across threads. Errors from individual
/// graphs are collected rather than short-circuiting, so one bad graph
/// doesn't hide failures on the others.
pub fn insert(store: &dyn Store, statement: &Statement) -> BqlResult<()> {
    fan_out(store, statement, |graph, data| graph.add_triples(data))
}

/// `DELETE` (§4.5): removes `statement.data` from every graph named in
/// `statement.graphs`, same fan-out discipline as [`insert`].
pub fn delete(store: &dyn Store, statement: &Statement) -> BqlResult<()> {
    fan_out(store, statement, |graph, data| graph.remove_triples(data))
}

fn fan_out(
    store: &dyn Store,
    statement: &Statement,
    op: impl Fn(&dyn store::Graph, &[Triple]) -> BqlResult<()> + Sync,
) -> BqlResult<()> {
    let errors: Mutex<Vec<String>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for name in &statement.graphs {
            let op = &op;
            let errors = &errors;
            scope.spawn(move || {
                let result = store.graph(name).and_then(|graph| op(graph.as_ref(), &statement.data));
                if let Err(e) = result {
                    errors.lock().unwrap().push(format!("{name}: {e}"));
                }
            });
        }
    });

    let errors = errors.into_inner().unwrap();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BqlError::Store(errors.join("; ")))
    }
}

fn fan_out_names(
    store: &dyn Store,
    statement: &Statement,
    op: impl Fn(&dyn Store, &str) -> BqlResult<()> + Sync,
) -> BqlResult<()> {
    let errors: Mutex<Vec<String>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for name in &statement.graphs {
            let op = &op;
            let errors = &errors;
            scope.spawn(move || {
                if let Err(e) = op(store, name) {
                    errors.lock().unwrap().push(format!("{name}: {e}"));
                }
            });
        }
    });

    let errors = errors.into_inner().unwrap();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BqlError::Store(errors.join("; ")))
    }
}
