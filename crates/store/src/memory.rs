use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use common::{BqlError, BqlResult, LookupOptions};
use types::Triple;

use crate::{Graph, Store, TriplePattern};

/// A non-durable, all-in-memory [`Store`]. It has no indexes, no WAL, no
/// paging — it exists to let the engine be exercised end-to-end in
/// tests, not to stand in for a production store.
#[derive(Default)]
pub struct MemoryStore {
    graphs: Mutex<HashMap<String, Arc<MemoryGraph>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn new_graph(&self, name: &str) -> BqlResult<Arc<dyn Graph>> {
        let mut graphs = self.graphs.lock().unwrap();
        if graphs.contains_key(name) {
            return Err(BqlError::Store(format!("graph '{}' already exists", name)));
        }
        let graph = Arc::new(MemoryGraph::default());
        graphs.insert(name.to_string(), graph.clone());
        Ok(graph)
    }

    fn delete_graph(&self, name: &str) -> BqlResult<()> {
        let mut graphs = self.graphs.lock().unwrap();
        graphs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BqlError::Store(format!("graph '{}' does not exist", name)))
    }

    fn graph(&self, name: &str) -> BqlResult<Arc<dyn Graph>> {
        let graphs = self.graphs.lock().unwrap();
        graphs
            .get(name)
            .cloned()
            .map(|g| g as Arc<dyn Graph>)
            .ok_or_else(|| BqlError::Store(format!("graph '{}' does not exist", name)))
    }
}

#[derive(Default)]
pub struct MemoryGraph {
    triples: Mutex<Vec<Triple>>,
}

impl Graph for MemoryGraph {
    fn add_triples(&self, triples: &[Triple]) -> BqlResult<()> {
        self.triples.lock().unwrap().extend(triples.iter().cloned());
        Ok(())
    }

    fn remove_triples(&self, triples: &[Triple]) -> BqlResult<()> {
        let mut stored = self.triples.lock().unwrap();
        stored.retain(|t| !triples.contains(t));
        Ok(())
    }

    fn exist(&self, triple: &Triple) -> BqlResult<bool> {
        Ok(self.triples.lock().unwrap().iter().any(|t| t == triple))
    }

    fn lookup(&self, pattern: &TriplePattern, opts: &LookupOptions) -> BqlResult<Vec<Triple>> {
        let stored = self.triples.lock().unwrap();
        Ok(stored
            .iter()
            .filter(|t| matches_pattern(t, pattern, opts))
            .cloned()
            .collect())
    }
}

fn matches_pattern(triple: &Triple, pattern: &TriplePattern, opts: &LookupOptions) -> bool {
    if let Some(subject) = &pattern.subject {
        if &triple.subject != subject {
            return false;
        }
    }
    if let Some(name) = &pattern.predicate {
        if &triple.predicate.name != name {
            return false;
        }
    }
    if let Some(object) = &pattern.object {
        if &triple.object != object {
            return false;
        }
    }
    if let Some(ts) = triple.predicate.timestamp {
        if let Some(lower) = opts.lower_bound {
            if ts < lower {
                return false;
            }
        }
        if let Some(upper) = opts.upper_bound {
            if ts > upper {
                return false;
            }
        }
    }
    true
}
