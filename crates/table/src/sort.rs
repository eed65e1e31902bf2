use crate::table::Table;

/// Ascending or descending key direction for [`Table::sort`] and the
/// group-by key in [`crate::Table::reduce`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One key in a lexicographic sort/group-by configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub binding: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(binding: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(binding: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// An ordered list of [`SortKey`]s, used both by `ORDER BY` and as the
/// group-by key feeding `Reduce`.
pub type SortConfig = Vec<SortKey>;

impl Table {
    /// Stable sort by a lexicographic key over `Cell` comparable-strings.
    /// Rows missing a sort binding compare as the empty string.
    pub fn sort(&mut self, cfg: &SortConfig) {
        self.rows.sort_by(|a, b| {
            for key in cfg {
                let av = a
                    .get(&key.binding)
                    .map(|c| c.to_comparable_string())
                    .unwrap_or_default();
                let bv = b
                    .get(&key.binding)
                    .map(|c| c.to_comparable_string())
                    .unwrap_or_default();
                let ord = av.cmp(&bv);
                let ord = match key.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }
}
