//! Small DataFrame helpers shared by the pipeline stages.

use polars::prelude::*;

use crate::error::{MissingColumn, ProxyError, Result};
use crate::schema::scratch;

/// Collect every column in `required` that `df` does not carry.
pub(crate) fn missing_columns(
    df: &DataFrame,
    table: &'static str,
    required: &[&str],
) -> Vec<MissingColumn> {
    let schema = df.schema();
    required
        .iter()
        .filter(|&&name| !schema.contains(name))
        .map(|&name| MissingColumn {
            table,
            column: name.to_string(),
        })
        .collect()
}

/// Fail with every missing column across the given tables.
pub(crate) fn require_columns(tables: &[(&DataFrame, &'static str, &[&str])]) -> Result<()> {
    let missing: Vec<MissingColumn> = tables
        .iter()
        .flat_map(|(df, table, required)| missing_columns(df, table, required))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProxyError::MissingColumns(missing))
    }
}

/// Distinct key tuples in first-seen order.
pub(crate) fn distinct(lf: LazyFrame, keys: &[&str]) -> LazyFrame {
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    lf.group_by_stable(key_exprs.clone())
        .agg([len().alias(scratch::ROW_COUNT)])
        .select(key_exprs)
}

/// Key column trimmed and cast to String.
pub(crate) fn key_string(column: &str) -> Expr {
    col(column)
        .cast(DataType::String)
        .str()
        .strip_chars(lit(" \t\r\n"))
}

pub(crate) fn as_int(column: &str) -> Expr {
    col(column).cast(DataType::Int64)
}

pub(crate) fn as_float(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

/// Null Float64 column, used when synthesising rows.
pub(crate) fn null_float(alias: &str) -> Expr {
    lit(NULL).cast(DataType::Float64).alias(alias)
}

/// Owned string values of a column, nulls skipped.
pub(crate) fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(df
        .column(column)?
        .str()?
        .into_iter()
        .filter_map(|v| v.map(|s| s.to_string()))
        .collect())
}
