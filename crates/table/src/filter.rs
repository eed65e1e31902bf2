use crate::row::Row;
use crate::table::Table;

impl Table {
    /// Removes every row where `should_remove(row)` returns `true`.
    /// Iteration order is deterministic (current row order).
    pub fn filter<F>(&mut self, should_remove: F)
    where
        F: Fn(&Row) -> bool,
    {
        self.rows.retain(|row| !should_remove(row));
    }
}
