use common::BqlResult;
use expr::EvalContext;
use statement::{AggregationOp, Statement};
use table::{AccumulatorKind, AliasAccPair, Row, SortConfig, SortKey, Table};
use types::Literal;

/// The four tail stages run after the clause loop (§4.4.2): projection
/// (with optional grouping/aggregation), `ORDER BY`, `HAVING`, and
/// `LIMIT` — followed by the schema-preserving empty-result fixup.
pub(super) fn apply(statement: &Statement, tbl: Table) -> BqlResult<Table> {
    let mut tbl = project_and_group_by(statement, tbl)?;
    tbl.sort(&statement.order_by);
    tbl = apply_having(statement, tbl)?;
    if let Some(n) = statement.limit {
        tbl.limit(n);
    }
    if tbl.num_rows() == 0 {
        tbl = Table::new(statement.output_bindings.clone());
    }
    Ok(tbl)
}

fn project_and_group_by(statement: &Statement, tbl: Table) -> BqlResult<Table> {
    let has_aggregation = statement.projections.iter().any(|p| p.aggregation.is_some());
    if statement.group_by_bindings.is_empty() && !has_aggregation {
        return Ok(project_plain(statement, tbl));
    }

    let mut grouped = tbl;
    let group_cfg: SortConfig = statement
        .group_by_bindings
        .iter()
        .map(|b| SortKey::asc(b.clone()))
        .collect();
    grouped.sort(&group_cfg);

    let mut acc_pairs = Vec::with_capacity(statement.projections.len());
    for projection in &statement.projections {
        let kind = match projection.aggregation {
            None => AccumulatorKind::Identity,
            Some(AggregationOp::Count) => {
                if projection.distinct {
                    AccumulatorKind::CountDistinct
                } else {
                    AccumulatorKind::Count
                }
            }
            Some(AggregationOp::Sum) => sum_kind_for(&grouped, &projection.binding),
        };
        acc_pairs.push(AliasAccPair::new(
            projection.binding.clone(),
            projection.alias.clone(),
            kind,
        ));
    }

    grouped.reduce(&group_cfg, &acc_pairs)
}

/// SUM has no static int/float distinction in the statement itself;
/// look at the first matching cell in the (pre-group) table to decide
/// which accumulator applies.
fn sum_kind_for(tbl: &Table, binding: &str) -> AccumulatorKind {
    for row in tbl.rows() {
        if let Some(literal) = row.get(binding).and_then(|c| c.as_literal()) {
            return match literal {
                Literal::Float64(_) => AccumulatorKind::SumFloat64,
                _ => AccumulatorKind::SumInt64,
            };
        }
    }
    AccumulatorKind::SumInt64
}

fn project_plain(statement: &Statement, tbl: Table) -> Table {
    let aliases: Vec<String> = statement.projections.iter().map(|p| p.alias.clone()).collect();
    let mut out = Table::new(aliases);
    for row in tbl.rows() {
        let mut new_row = Row::new();
        for projection in &statement.projections {
            if let Some(cell) = row.get(&projection.binding) {
                new_row.insert(projection.alias.clone(), cell.clone());
            }
        }
        out.add_row(new_row);
    }
    out
}

fn apply_having(statement: &Statement, tbl: Table) -> BqlResult<Table> {
    let Some(expr) = &statement.having else {
        return Ok(tbl);
    };

    let mut kept = tbl.clone();
    kept.truncate();
    for row in tbl.rows() {
        if EvalContext::new(row).eval(expr)? {
            kept.add_row(row.clone());
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use common::LookupOptions;
    use expr::{ComparisonOp, Expr};
    use statement::{AggregationOp, Projection, Statement, StatementType};
    use table::{Row, SortKey, Table};
    use types::{Cell, Literal, Node};

    use super::apply;

    fn base_statement() -> Statement {
        Statement {
            kind: StatementType::Query,
            graphs: Vec::new(),
            data: Vec::new(),
            bindings: Vec::new(),
            output_bindings: vec!["name".into()],
            projections: vec![Projection::identity("name", "name")],
            group_by_bindings: Vec::new(),
            order_by: Vec::new(),
            having: None,
            limit: None,
            sorted_graph_pattern_clauses: Vec::new(),
            global_lookup_options: LookupOptions::unbounded(),
        }
    }

    fn row_with(binding: &str, cell: Cell) -> Row {
        let mut row = Row::new();
        row.insert(binding.to_string(), cell);
        row
    }

    #[test]
    fn plain_projection_renames_bindings() {
        let mut statement = base_statement();
        statement.projections = vec![Projection::identity("child", "name")];

        let mut tbl = Table::new(vec!["child".into()]);
        tbl.add_row(row_with("child", Cell::Node(Node::new("/u", "mary"))));

        let result = apply(&statement, tbl).unwrap();
        assert_eq!(result.bindings(), &["name".to_string()]);
        assert_eq!(
            result.rows()[0].get("name"),
            Some(&Cell::Node(Node::new("/u", "mary")))
        );
    }

    #[test]
    fn group_by_count_aggregates_per_group() {
        let mut statement = base_statement();
        statement.output_bindings = vec!["parent".into(), "total".into()];
        statement.group_by_bindings = vec!["parent".into()];
        statement.projections = vec![
            Projection::identity("parent", "parent"),
            Projection::aggregate("child", "total", AggregationOp::Count, false),
        ];

        let mut tbl = Table::new(vec!["parent".into(), "child".into()]);
        let mut r1 = Row::new();
        r1.insert("parent".into(), Cell::Text("mary".into()));
        r1.insert("child".into(), Cell::Text("ann".into()));
        tbl.add_row(r1);
        let mut r2 = Row::new();
        r2.insert("parent".into(), Cell::Text("mary".into()));
        r2.insert("child".into(), Cell::Text("tom".into()));
        tbl.add_row(r2);

        let result = apply(&statement, tbl).unwrap();
        assert_eq!(result.num_rows(), 1);
        assert_eq!(
            result.rows()[0].get("total"),
            Some(&Cell::Literal(Literal::Int64(2)))
        );
    }

    #[test]
    fn having_filters_groups_after_aggregation() {
        // HAVING can only compare two bindings, so the threshold has to ride
        // along as its own projected (constant) column.
        let mut statement = base_statement();
        statement.output_bindings = vec!["parent".into(), "total".into(), "two".into()];
        statement.group_by_bindings = vec!["parent".into()];
        statement.projections = vec![
            Projection::identity("parent", "parent"),
            Projection::aggregate("child", "total", AggregationOp::Count, false),
            Projection::identity("two", "two"),
        ];
        statement.having = Some(Expr::comparison(ComparisonOp::Eq, "total", "two").unwrap());

        let mut tbl = Table::new(vec!["parent".into(), "child".into(), "two".into()]);
        let mut r1 = Row::new();
        r1.insert("parent".into(), Cell::Text("mary".into()));
        r1.insert("child".into(), Cell::Text("ann".into()));
        r1.insert("two".into(), Cell::Literal(Literal::Int64(2)));
        tbl.add_row(r1);
        let mut r2 = Row::new();
        r2.insert("parent".into(), Cell::Text("mary".into()));
        r2.insert("child".into(), Cell::Text("tom".into()));
        r2.insert("two".into(), Cell::Literal(Literal::Int64(2)));
        tbl.add_row(r2);
        let mut r3 = Row::new();
        r3.insert("parent".into(), Cell::Text("peter".into()));
        r3.insert("child".into(), Cell::Text("sue".into()));
        r3.insert("two".into(), Cell::Literal(Literal::Int64(2)));
        tbl.add_row(r3);

        let result = apply(&statement, tbl).unwrap();
        assert_eq!(result.num_rows(), 1);
        assert_eq!(result.rows()[0].get("parent"), Some(&Cell::Text("mary".into())));
    }

    #[test]
    fn order_by_sorts_final_rows() {
        let mut statement = base_statement();
        statement.order_by = vec![SortKey::asc("name")];

        let mut tbl = Table::new(vec!["name".into()]);
        tbl.add_row(row_with("name", Cell::Text("peter".into())));
        tbl.add_row(row_with("name", Cell::Text("mary".into())));

        let result = apply(&statement, tbl).unwrap();
        let names: Vec<&str> = result
            .rows()
            .iter()
            .map(|r| r.get("name").unwrap().as_text().unwrap())
            .collect();
        assert_eq!(names, vec!["mary", "peter"]);
    }

    #[test]
    fn limit_truncates_rows() {
        let mut statement = base_statement();
        statement.limit = Some(1);

        let mut tbl = Table::new(vec!["name".into()]);
        tbl.add_row(row_with("name", Cell::Text("mary".into())));
        tbl.add_row(row_with("name", Cell::Text("peter".into())));

        let result = apply(&statement, tbl).unwrap();
        assert_eq!(result.num_rows(), 1);
    }

    #[test]
    fn empty_result_gets_declared_output_schema() {
        let statement = base_statement();
        let tbl = Table::new(Vec::new());

        let result = apply(&statement, tbl).unwrap();
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.bindings(), &["name".to_string()]);
    }
}
