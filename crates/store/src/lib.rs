pub mod memory;

use std::sync::Arc;

use common::{BqlResult, LookupOptions};
use types::{Node, Object, Triple};

/// The partial triple pattern consumed by a graph's streaming lookup,
/// one fixed component per `Some`. Unfixed components match anything.
#[derive(Clone, Debug, Default)]
pub struct TriplePattern {
    pub subject: Option<Node>,
    pub predicate: Option<String>,
    pub object: Option<Object>,
}

/// The persistent collaborator that owns named graphs. Implementations
/// are expected to be durable; [`memory::MemoryStore`] is a non-durable
/// reference implementation for tests.
pub trait Store: Send + Sync {
    fn new_graph(&self, name: &str) -> BqlResult<Arc<dyn Graph>>;
    fn delete_graph(&self, name: &str) -> BqlResult<()>;
    fn graph(&self, name: &str) -> BqlResult<Arc<dyn Graph>>;
}

/// A single named graph of triples.
pub trait Graph: Send + Sync {
    fn add_triples(&self, triples: &[Triple]) -> BqlResult<()>;
    fn remove_triples(&self, triples: &[Triple]) -> BqlResult<()>;
    fn exist(&self, triple: &Triple) -> BqlResult<bool>;

    /// Returns every stored triple matching `pattern`, constrained by
    /// `opts`'s temporal bounds on the predicate's timestamp. Immutable
    /// predicates (`timestamp: None`) always satisfy any bound.
    fn lookup(&self, pattern: &TriplePattern, opts: &LookupOptions) -> BqlResult<Vec<Triple>>;
}
