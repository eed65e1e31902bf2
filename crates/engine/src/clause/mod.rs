pub mod bounds;
pub mod exist;
pub mod fetch;

use common::BqlError;
use common::BqlResult;
use statement::{GraphClause, ObjectPattern, PredicatePattern, SubjectPattern};
use table::Row;
use types::{Cell, Literal, Object, Triple};

pub use bounds::update_time_bounds_for_row;
pub use exist::simple_exist;
pub use fetch::simple_fetch;

/// The primary and, where declared, alias binding names a clause
/// introduces — i.e. every binding name tied to one of its unfixed
/// components.
pub(crate) fn binding_names(clause: &GraphClause) -> Vec<String> {
    let mut names = Vec::new();
    if let SubjectPattern::Unbound { binding, alias } = &clause.subject {
        names.push(binding.clone());
        if let Some(a) = alias {
            names.push(a.clone());
        }
    }
    if let PredicatePattern::Unbound { binding, alias } = &clause.predicate {
        names.push(binding.clone());
        if let Some(a) = alias {
            names.push(a.clone());
        }
    }
    if let ObjectPattern::Unbound { binding, alias } = &clause.object {
        names.push(binding.clone());
        if let Some(a) = alias {
            names.push(a.clone());
        }
    }
    names
}

/// Builds the single concrete `(S, P, O)` triple for a clause whose
/// components are all fixed (specificity 3).
pub(crate) fn fixed_triple(clause: &GraphClause) -> BqlResult<Triple> {
    let subject = match &clause.subject {
        SubjectPattern::Fixed(n) => n.clone(),
        SubjectPattern::Unbound { .. } => {
            return Err(BqlError::Input("fixed_triple: subject is unbound".into()))
        }
    };
    let predicate = match &clause.predicate {
        PredicatePattern::Fixed(p) => p.clone(),
        PredicatePattern::Unbound { .. } => {
            return Err(BqlError::Input("fixed_triple: predicate is unbound".into()))
        }
    };
    let object = match &clause.object {
        ObjectPattern::Fixed(o) => o.clone(),
        ObjectPattern::Unbound { .. } => {
            return Err(BqlError::Input("fixed_triple: object is unbound".into()))
        }
    };
    Ok(Triple::new(subject, predicate, object))
}

/// Emits cells for a clause's bindings/aliases from a matching triple:
/// the primary binding gets the component's own cell; the alias (when
/// declared) gets the component's *identity* — the node/predicate's bare
/// name for S/O, the anchor timestamp for P's temporal predicates.
pub(crate) fn triple_to_row(clause: &GraphClause, triple: &Triple) -> Row {
    let mut row = Row::new();

    if let SubjectPattern::Unbound { binding, alias } = &clause.subject {
        row.insert(binding.clone(), Cell::Node(triple.subject.clone()));
        if let Some(a) = alias {
            row.insert(a.clone(), Cell::Text(triple.subject.id.clone()));
        }
    }

    if let PredicatePattern::Unbound { binding, alias } = &clause.predicate {
        row.insert(binding.clone(), Cell::Predicate(triple.predicate.clone()));
        if let Some(a) = alias {
            if let Some(ts) = triple.predicate.timestamp {
                row.insert(a.clone(), Cell::Literal(Literal::Int64(ts)));
            }
        }
    }

    if let ObjectPattern::Unbound { binding, alias } = &clause.object {
        row.insert(binding.clone(), object_cell(&triple.object));
        if let Some(a) = alias {
            row.insert(a.clone(), object_identity_cell(&triple.object));
        }
    }

    row
}

fn object_cell(o: &Object) -> Cell {
    match o {
        Object::Node(n) => Cell::Node(n.clone()),
        Object::Predicate(p) => Cell::Predicate(p.clone()),
        Object::Literal(l) => Cell::Literal(l.clone()),
    }
}

fn object_identity_cell(o: &Object) -> Cell {
    match o {
        Object::Node(n) => Cell::Text(n.id.clone()),
        Object::Predicate(p) => Cell::Text(p.name.clone()),
        Object::Literal(l) => Cell::Literal(l.clone()),
    }
}
