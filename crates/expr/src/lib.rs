
use std::cmp::Ordering;

use common::{BqlError, BqlResult};
use table::Row;

/// Comparison operators supported by the HAVING grammar: `{=, <, >}`.
/// `!=`, `<=`, `>=` are deliberately absent — the grammar this evaluator
/// serves names exactly these three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComparisonOp {
    Eq,
    Lt,
    Gt,
}

impl TryFrom<&str> for ComparisonOp {
    type Error = BqlError;

    fn try_from(s: &str) -> BqlResult<Self> {
        match s {
            "=" => Ok(ComparisonOp::Eq),
            "<" => Ok(ComparisonOp::Lt),
            ">" => Ok(ComparisonOp::Gt),
            other => Err(BqlError::Evaluation(format!(
                "unsupported comparison operator '{}'",
                other
            ))),
        }
    }
}

/// Logical binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    And,
    Or,
}

impl TryFrom<&str> for BinaryOp {
    type Error = BqlError;

    fn try_from(s: &str) -> BqlResult<Self> {
        match s {
            "and" => Ok(BinaryOp::And),
            "or" => Ok(BinaryOp::Or),
            other => Err(BqlError::Evaluation(format!(
                "unsupported binary operator '{}'",
                other
            ))),
        }
    }
}

/// Logical unary operators (currently just negation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    Not,
}

impl TryFrom<&str> for UnaryOp {
    type Error = BqlError;

    fn try_from(s: &str) -> BqlResult<Self> {
        match s {
            "not" => Ok(UnaryOp::Not),
            other => Err(BqlError::Evaluation(format!(
                "unsupported unary operator '{}'",
                other
            ))),
        }
    }
}

/// A HAVING boolean expression tree over row bindings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    /// Resolves `left` and `right` to cells in the current row and
    /// compares them. Equality uses deep value equality (`Cell`'s
    /// `Eq`/`Ord`, themselves backed by the canonical comparable
    /// string), not textual comparison.
    Comparison {
        op: ComparisonOp,
        left: String,
        right: String,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
}

impl Expr {
    /// Builds a `Comparison` node. Rejects an empty binding name on
    /// either side at construction time.
    pub fn comparison(
        op: ComparisonOp,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> BqlResult<Expr> {
        let left = left.into();
        let right = right.into();
        if left.is_empty() || right.is_empty() {
            return Err(BqlError::Evaluation(
                "comparison binding names must not be empty".into(),
            ));
        }
        Ok(Expr::Comparison { op, left, right })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Expr {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }
}

/// Evaluates an [`Expr`] against a single row. The reference behavior is
/// eager: both operands of a `Binary` node are evaluated even when the
/// left operand alone already determines the result.
pub struct EvalContext<'a> {
    pub row: &'a Row,
}

impl<'a> EvalContext<'a> {
    pub fn new(row: &'a Row) -> Self {
        Self { row }
    }

    pub fn eval(&self, expr: &Expr) -> BqlResult<bool> {
        match expr {
            Expr::Comparison { op, left, right } => {
                let lc = self
                    .row
                    .get(left)
                    .ok_or_else(|| BqlError::Evaluation(format!("unknown binding '{}'", left)))?;
                let rc = self
                    .row
                    .get(right)
                    .ok_or_else(|| BqlError::Evaluation(format!("unknown binding '{}'", right)))?;
                let ord = lc.cmp(rc);
                Ok(match op {
                    ComparisonOp::Eq => ord == Ordering::Equal,
                    ComparisonOp::Lt => ord == Ordering::Less,
                    ComparisonOp::Gt => ord == Ordering::Greater,
                })
            }
            Expr::Binary { op, left, right } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                Ok(match op {
                    BinaryOp::And => l && r,
                    BinaryOp::Or => l || r,
                })
            }
            Expr::Unary { op, expr } => {
                let v = self.eval(expr)?;
                Ok(match op {
                    UnaryOp::Not => !v,
                })
            }
        }
    }
}
