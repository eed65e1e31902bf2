use common::{BqlError, BqlResult};

use crate::accumulator::AliasAccPair;
use crate::row::Row;
use crate::sort::SortConfig;
use crate::table::Table;

impl Table {
    /// Group-by reduce. Groups are maximal runs of rows with equal
    /// values on every `cfg` binding — the caller must have already
    /// sorted the table on `cfg` (`Sort` followed by `Reduce` on the
    /// same key). For each group and each `AliasAccPair`, produces one
    /// output cell under its `out_alias`. The output schema is the union
    /// of the group-by bindings and the `out_alias` set.
    pub fn reduce(&self, cfg: &SortConfig, acc_pairs: &[AliasAccPair]) -> BqlResult<Table> {
        let mut out_bindings: Vec<String> = cfg.iter().map(|k| k.binding.clone()).collect();
        for pair in acc_pairs {
            if !out_bindings.iter().any(|b| b == &pair.out_alias) {
                out_bindings.push(pair.out_alias.clone());
            }
        }

        let mut out_rows = Vec::new();
        let mut i = 0;
        while i < self.rows.len() {
            let mut j = i + 1;
            while j < self.rows.len() && group_key_equal(&self.rows[i], &self.rows[j], cfg) {
                j += 1;
            }
            let group = &self.rows[i..j];

            let mut out_row = Row::new();
            for key in cfg {
                if let Some(cell) = group[0].get(&key.binding) {
                    out_row.insert(key.binding.clone(), cell.clone());
                }
            }

            for pair in acc_pairs {
                let cell = match pair.kind.instantiate() {
                    Some(mut acc) => {
                        for row in group {
                            if let Some(cell) = row.get(&pair.in_alias) {
                                acc.push(cell)?;
                            }
                        }
                        acc.finish()
                    }
                    None => group[0].get(&pair.in_alias).cloned().ok_or_else(|| {
                        BqlError::Input(format!("Reduce: missing binding '{}'", pair.in_alias))
                    })?,
                };
                out_row.insert(pair.out_alias.clone(), cell);
            }

            out_rows.push(out_row);
            i = j;
        }

        Ok(Table {
            bindings: out_bindings,
            rows: out_rows,
        })
    }
}

fn group_key_equal(a: &Row, b: &Row, cfg: &SortConfig) -> bool {
    cfg.iter().all(|key| {
        let av = a.get(&key.binding).map(|c| c.to_comparable_string()).unwrap_or_default();
        let bv = b.get(&key.binding).map(|c| c.to_comparable_string()).unwrap_or_default();
        av == bv
    })
}
