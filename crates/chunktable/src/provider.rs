// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! DataFusion TableProvider for constraint-driven tables
//!
//! DataFusion hands the provider the query's filters at scan time. The
//! provider turns the ones it understands into a [`ConstraintSet`] and asks
//! the table's generator for rows:
//!
//! - `col = literal` / `literal = col` become EQUALS
//! - `col LIKE 'pattern'` becomes LIKE
//! - `col IN (literal, ...)` becomes one EQUALS per item
//! - an `OR` of the above on a single column contributes all of its parts
//!
//! Pushdown is reported as `Inexact`, so DataFusion re-applies every filter
//! to the rows the table returns. A scan without a constraint on the
//! table's REQUIRED column fails at planning time.

use std::any::Any;
use std::sync::Arc;

use arrow_schema::SchemaRef;
use async_trait::async_trait;
use datafusion::catalog::{Session, TableProvider};
use datafusion::common::Result as DataFusionResult;
use datafusion::datasource::{MemTable, TableType};
use datafusion::logical_expr::expr::InList;
use datafusion::logical_expr::{BinaryExpr, Expr, Like, Operator as SqlOperator, TableProviderFilterPushDown};
use datafusion::physical_plan::ExecutionPlan;
use datafusion::scalar::ScalarValue;

use crate::constraint::{ConstraintSet, ConstraintValue, Operator};
use crate::error::ChunkTableError;
use crate::registry::TableGenerator;
use crate::schema::ColumnSchema;

#[derive(Debug)]
pub struct ConstraintTableProvider {
    name: String,
    generator: Arc<dyn TableGenerator>,
}

impl ConstraintTableProvider {
    pub fn new(name: String, generator: Arc<dyn TableGenerator>) -> Self {
        Self { name, generator }
    }
}

/// A single pushed-down predicate on one column
#[derive(Debug, Clone, PartialEq)]
struct ColumnConstraint {
    column: String,
    op: Operator,
    value: ConstraintValue,
}

/// Recognise `filter` as one or more column constraints.
///
/// Returns `None` when any part of the filter is outside the supported forms,
/// so that a filter is either fully understood or not used at all.
fn extract_constraints(filter: &Expr, columns: &ColumnSchema) -> Option<Vec<ColumnConstraint>> {
    let known = |name: &str| columns.column(name).is_some();

    match filter {
        Expr::BinaryExpr(BinaryExpr { left, op: SqlOperator::Or, right }) => {
            let mut either = extract_constraints(left, columns)?;
            either.extend(extract_constraints(right, columns)?);
            let one_column = either.windows(2).all(|pair| pair[0].column == pair[1].column);
            one_column.then_some(either)
        }
        Expr::BinaryExpr(BinaryExpr { left, op: SqlOperator::Eq, right }) => {
            let (column, value) = match (left.as_ref(), right.as_ref()) {
                (Expr::Column(col), other) | (other, Expr::Column(col)) => {
                    (col.name.clone(), literal_value(other)?)
                }
                _ => return None,
            };
            known(&column).then(|| {
                vec![ColumnConstraint {
                    column,
                    op: Operator::Equals,
                    value,
                }]
            })
        }
        Expr::Like(Like {
            negated: false,
            expr,
            pattern,
            escape_char: None,
            case_insensitive: false,
        }) => {
            let Expr::Column(col) = expr.as_ref() else {
                return None;
            };
            let ConstraintValue::Text(pattern) = literal_value(pattern)? else {
                return None;
            };
            known(&col.name).then(|| {
                vec![ColumnConstraint {
                    column: col.name.clone(),
                    op: Operator::Like,
                    value: ConstraintValue::Text(pattern),
                }]
            })
        }
        Expr::InList(InList {
            expr,
            list,
            negated: false,
        }) => {
            let Expr::Column(col) = expr.as_ref() else {
                return None;
            };
            if !known(&col.name) || list.is_empty() {
                return None;
            }
            list.iter()
                .map(|item| {
                    literal_value(item).map(|value| ColumnConstraint {
                        column: col.name.clone(),
                        op: Operator::Equals,
                        value,
                    })
                })
                .collect()
        }
        _ => None,
    }
}

/// Literal value of `expr`, looking through casts the planner may insert
fn literal_value(expr: &Expr) -> Option<ConstraintValue> {
    match expr {
        Expr::Literal(value) => scalar_value(value),
        Expr::Cast(cast) => literal_value(&cast.expr),
        Expr::TryCast(cast) => literal_value(&cast.expr),
        _ => None,
    }
}

fn scalar_value(value: &ScalarValue) -> Option<ConstraintValue> {
    match value {
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => Some(ConstraintValue::Text(s.clone())),
        ScalarValue::Int8(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::Int16(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::Int32(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::Int64(Some(v)) => Some(ConstraintValue::Integer(*v)),
        ScalarValue::UInt8(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::UInt16(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::UInt32(Some(v)) => Some(ConstraintValue::Integer(i64::from(*v))),
        ScalarValue::UInt64(Some(v)) => i64::try_from(*v).ok().map(ConstraintValue::Integer),
        _ => None,
    }
}

/// Build the constraint set for a scan from its pushed-down filters
fn constraint_set(filters: &[Expr], columns: &ColumnSchema) -> ConstraintSet {
    let mut set = ConstraintSet::new();
    for filter in filters {
        for c in extract_constraints(filter, columns).unwrap_or_default() {
            set.add(c.column, c.op, c.value);
        }
    }
    set
}

#[async_trait]
impl TableProvider for ConstraintTableProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        self.generator.schema()
    }

    fn table_type(&self) -> TableType {
        TableType::Base
    }

    fn supports_filters_pushdown(
        &self,
        filters: &[&Expr],
    ) -> DataFusionResult<Vec<TableProviderFilterPushDown>> {
        let columns = self.generator.columns();
        Ok(filters
            .iter()
            .map(|filter| match extract_constraints(filter, columns) {
                Some(_) => TableProviderFilterPushDown::Inexact,
                None => TableProviderFilterPushDown::Unsupported,
            })
            .collect())
    }

    async fn scan(
        &self,
        state: &dyn Session,
        projection: Option<&Vec<usize>>,
        filters: &[Expr],
        limit: Option<usize>,
    ) -> DataFusionResult<Arc<dyn ExecutionPlan>> {
        let columns = self.generator.columns();
        let constraints = constraint_set(filters, columns);

        let required = columns.required_column().name;
        if !constraints.is_constrained(required) {
            return Err(ChunkTableError::MissingRequiredConstraint {
                table: self.name.clone(),
                column: required.to_string(),
            }
            .into());
        }

        let table = self.name.as_str();
        diagnostics::log_debug!("Scanning {table} with {count} filters", table: table, count: filters.len());

        let batch = self.generator.generate(&constraints).await?;
        let mem_table = MemTable::try_new(self.schema(), vec![vec![batch]])?;
        mem_table.scan(state, projection, &[], limit).await
    }
}
