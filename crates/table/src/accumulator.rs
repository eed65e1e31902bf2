use hashbrown::HashSet;

use common::{BqlError, BqlResult};
use types::{Cell, Literal};

/// Per-group reducer producing one output cell from the group's rows,
/// fed one cell at a time via [`Accumulator::push`].
pub trait Accumulator {
    fn push(&mut self, cell: &Cell) -> BqlResult<()>;
    fn finish(self: Box<Self>) -> Cell;
}

/// Cardinality of the group, irrespective of the pushed cells' values.
#[derive(Default)]
pub struct CountAccumulator {
    count: i64,
}

impl Accumulator for CountAccumulator {
    fn push(&mut self, _cell: &Cell) -> BqlResult<()> {
        self.count += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Cell {
        Cell::Literal(Literal::Int64(self.count))
    }
}

/// Count of distinct cell values pushed, compared by comparable string.
#[derive(Default)]
pub struct CountDistinctAccumulator {
    seen: HashSet<String>,
}

impl Accumulator for CountDistinctAccumulator {
    fn push(&mut self, cell: &Cell) -> BqlResult<()> {
        self.seen.insert(cell.to_comparable_string());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Cell {
        Cell::Literal(Literal::Int64(self.seen.len() as i64))
    }
}

/// Arithmetic sum of `Literal::Int64` cells; fails on any other literal
/// type or non-literal cell.
#[derive(Default)]
pub struct SumInt64Accumulator {
    sum: i64,
}

impl Accumulator for SumInt64Accumulator {
    fn push(&mut self, cell: &Cell) -> BqlResult<()> {
        match cell.as_literal() {
            Some(Literal::Int64(i)) => {
                self.sum += i;
                Ok(())
            }
            _ => Err(BqlError::Aggregation(format!(
                "SumInt64 expects int64 literals, got {:?}",
                cell
            ))),
        }
    }

    fn finish(self: Box<Self>) -> Cell {
        Cell::Literal(Literal::Int64(self.sum))
    }
}

/// Arithmetic sum of `Literal::Float64` cells; fails on any other literal
/// type or non-literal cell.
#[derive(Default)]
pub struct SumFloat64Accumulator {
    sum: f64,
}

impl Accumulator for SumFloat64Accumulator {
    fn push(&mut self, cell: &Cell) -> BqlResult<()> {
        match cell.as_literal() {
            Some(Literal::Float64(f)) => {
                self.sum += f;
                Ok(())
            }
            _ => Err(BqlError::Aggregation(format!(
                "SumFloat64 expects float64 literals, got {:?}",
                cell
            ))),
        }
    }

    fn finish(self: Box<Self>) -> Cell {
        Cell::Literal(Literal::Float64(self.sum))
    }
}

/// Which accumulator to instantiate for an [`AliasAccPair`]. `Identity`
/// is not a trait-object accumulator: it passes the group's common value
/// straight through, used for group-by bindings that aren't aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccumulatorKind {
    Count,
    CountDistinct,
    SumInt64,
    SumFloat64,
    Identity,
}

impl AccumulatorKind {
    pub(crate) fn instantiate(self) -> Option<Box<dyn Accumulator>> {
        match self {
            AccumulatorKind::Count => Some(Box::<CountAccumulator>::default()),
            AccumulatorKind::CountDistinct => Some(Box::<CountDistinctAccumulator>::default()),
            AccumulatorKind::SumInt64 => Some(Box::<SumInt64Accumulator>::default()),
            AccumulatorKind::SumFloat64 => Some(Box::<SumFloat64Accumulator>::default()),
            AccumulatorKind::Identity => None,
        }
    }
}

/// One `(in_alias, out_alias, accumulator)` triple for [`crate::Table::reduce`]:
/// for every group, `in_alias`'s cells feed the accumulator and the
/// result is written to `out_alias`.
pub struct AliasAccPair {
    pub in_alias: String,
    pub out_alias: String,
    pub kind: AccumulatorKind,
}

impl AliasAccPair {
    pub fn new(in_alias: impl Into<String>, out_alias: impl Into<String>, kind: AccumulatorKind) -> Self {
        Self {
            in_alias: in_alias.into(),
            out_alias: out_alias.into(),
            kind,
        }
    }
}
