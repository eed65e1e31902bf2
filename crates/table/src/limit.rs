use crate::table::Table;

impl Table {
    /// Truncates to the first `n` rows. No-op if `n >= num_rows()`.
    pub fn limit(&mut self, n: usize) {
        if n < self.rows.len() {
            self.rows.truncate(n);
        }
    }
}
