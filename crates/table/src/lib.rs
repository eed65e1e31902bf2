mod accumulator;
mod filter;
mod limit;
mod reduce;
mod row;
mod sort;
mod table;

#[cfg(test)]
mod tests;

pub use accumulator::{Accumulator, AccumulatorKind, AliasAccPair, CountAccumulator, CountDistinctAccumulator, SumFloat64Accumulator, SumInt64Accumulator};
pub use row::Row;
pub use sort::{SortConfig, SortDirection, SortKey};
pub use table::Table;
