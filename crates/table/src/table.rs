use common::{BqlError, BqlResult};

use crate::row::Row;

/// Columnar-by-binding row set produced and consumed by the clause
/// executor and query plan driver.
///
/// A `Table` carries its schema (the ordered, duplicate-free list of
/// binding names) once, separately from the rows themselves; each [`Row`]
/// is a binding→cell map whose keys are always a subset of the schema.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub(crate) bindings: Vec<String>,
    pub(crate) rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given schema. Duplicate bindings
    /// are collapsed, keeping the first occurrence's position.
    pub fn new(bindings: Vec<String>) -> Self {
        let mut table = Self {
            bindings: Vec::new(),
            rows: Vec::new(),
        };
        table.add_bindings(&bindings);
        table
    }

    /// Extends the schema with any bindings not already present.
    /// Pre-existing rows are unaffected: their missing keys remain
    /// semantically absent rather than being back-filled.
    pub fn add_bindings(&mut self, bs: &[String]) {
        for b in bs {
            if !self.bindings.iter().any(|existing| existing == b) {
                self.bindings.push(b.clone());
            }
        }
    }

    /// Appends a row. Any key in `r` outside the current schema is added
    /// to the schema as a side effect.
    pub fn add_row(&mut self, r: Row) {
        let extra: Vec<String> = r
            .keys()
            .filter(|k| !self.bindings.iter().any(|b| &b == k))
            .cloned()
            .collect();
        self.add_bindings(&extra);
        self.rows.push(r);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    pub fn has_binding(&self, b: &str) -> bool {
        self.bindings.iter().any(|existing| existing == b)
    }

    /// Clears all rows; the schema is preserved.
    pub fn truncate(&mut self) {
        self.rows.clear();
    }

    /// Removes the row at `i`; subsequent indices shift down by one.
    /// The existence-filter pass (§4.4.2) relies on revisiting the same
    /// index after a removal.
    pub fn delete_row(&mut self, i: usize) {
        self.rows.remove(i);
    }

    /// Unions this table's rows with `other`'s. Schemas must be equal as
    /// sets; the result schema is the receiver's.
    pub fn append_table(&mut self, other: Table) -> BqlResult<()> {
        if !same_schema_as_set(&self.bindings, &other.bindings) {
            return Err(BqlError::Input(format!(
                "AppendTable: schema mismatch, {:?} vs {:?}",
                self.bindings, other.bindings
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Cartesian-product join with equality required on shared bindings.
    /// For every pair `(rL, rR)` whose values agree on every binding in
    /// `schemaL ∩ schemaR`, emits a merged row. The result schema is
    /// `schemaL ∪ schemaR`, preserving the receiver's binding order
    /// first.
    pub fn dot_product(&self, other: &Table) -> Table {
        let shared: Vec<&String> = self
            .bindings
            .iter()
            .filter(|b| other.bindings.iter().any(|ob| ob == *b))
            .collect();

        let mut result_bindings = self.bindings.clone();
        for b in &other.bindings {
            if !result_bindings.iter().any(|existing| existing == b) {
                result_bindings.push(b.clone());
            }
        }

        let mut rows = Vec::new();
        for rl in &self.rows {
            for rr in &other.rows {
                let matches = shared.iter().all(|b| match (rl.get(*b), rr.get(*b)) {
                    (Some(cl), Some(cr)) => cl == cr,
                    _ => false,
                });
                if matches {
                    let mut merged = rl.clone();
                    for (k, v) in rr.iter() {
                        merged.insert(k.clone(), v.clone());
                    }
                    rows.push(merged);
                }
            }
        }

        Table {
            bindings: result_bindings,
            rows,
        }
    }

    /// Merges a sequence of rows into one; later rows' keys win on
    /// collision.
    pub fn merge_rows(rows: &[&Row]) -> Row {
        let mut merged = Row::new();
        for row in rows {
            for (k, v) in row.iter() {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }

    /// Restricts the schema to `bs`, in order, dropping all other columns
    /// from every row. Fails if any binding in `bs` is not in the
    /// current schema.
    pub fn project_bindings(&mut self, bs: &[String]) -> BqlResult<()> {
        for b in bs {
            if !self.has_binding(b) {
                return Err(BqlError::Input(format!(
                    "ProjectBindings: unknown binding '{}'",
                    b
                )));
            }
        }
        for row in &mut self.rows {
            row.retain(|k, _| bs.iter().any(|b| b == k));
        }
        self.bindings = bs.to_vec();
        Ok(())
    }
}

fn same_schema_as_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| y == x))
}
