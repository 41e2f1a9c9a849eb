//! Explicit long ⇄ wide reshaping.
//!
//! The pivot layout is carried as a `PivotSchema` value instead of being
//! inferred from column-name patterns, so a pivot and its inverse are driven
//! by the same description.

use polars::prelude::*;

use crate::error::Result;

/// Layout of a long table: `index` identifies a row, `names_from` holds the
/// discriminator (e.g. gear) and `values_from` the measurement.
#[derive(Debug, Clone)]
pub struct PivotSchema {
    pub index: Vec<String>,
    pub names_from: String,
    pub values_from: String,
}

impl PivotSchema {
    pub fn new(
        index: impl IntoIterator<Item = impl Into<String>>,
        names_from: impl Into<String>,
        values_from: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into_iter().map(Into::into).collect(),
            names_from: names_from.into(),
            values_from: values_from.into(),
        }
    }

    fn index_exprs(&self) -> Vec<Expr> {
        self.index.iter().map(|c| col(c.as_str())).collect()
    }
}

/// Long → wide: one column per entry of `names`, one row per distinct index.
///
/// Cells with no long row are null; duplicate index rows keep the first value.
pub fn pivot_wider(lf: LazyFrame, schema: &PivotSchema, names: &[String]) -> LazyFrame {
    let value_columns: Vec<Expr> = names
        .iter()
        .map(|name| {
            col(schema.values_from.as_str())
                .filter(col(schema.names_from.as_str()).eq(lit(name.as_str())))
                .first()
                .alias(name.as_str())
        })
        .collect();

    lf.group_by_stable(schema.index_exprs()).agg(value_columns)
}

/// Wide → long: one row per (input row, name), the named columns folded into
/// `names_from` / `values_from`. Columns not in `index` or `names` are dropped.
pub fn pivot_longer(lf: LazyFrame, schema: &PivotSchema, names: &[String]) -> Result<LazyFrame> {
    let slices: Vec<LazyFrame> = names
        .iter()
        .map(|name| {
            let mut exprs = schema.index_exprs();
            exprs.push(lit(name.as_str()).alias(schema.names_from.as_str()));
            exprs.push(
                col(name.as_str())
                    .cast(DataType::Float64)
                    .alias(schema.values_from.as_str()),
            );
            lf.clone().select(exprs)
        })
        .collect();

    if slices.is_empty() {
        let mut exprs = schema.index_exprs();
        exprs.push(lit(NULL).cast(DataType::String).alias(schema.names_from.as_str()));
        exprs.push(lit(NULL).cast(DataType::Float64).alias(schema.values_from.as_str()));
        return Ok(lf.select(exprs).limit(0));
    }

    Ok(concat(slices, UnionArgs::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gear_schema() -> PivotSchema {
        PivotSchema::new(["cell", "year"], "gear", "Feff")
    }

    #[test]
    fn wider_fills_absent_cells_with_null() {
        let long = df![
            "cell" => ["A1", "A1", "A2"],
            "year" => [2020, 2020, 2020],
            "gear" => ["OTB", "TBB", "OTB"],
            "Feff" => [0.5, 0.25, 1.0],
        ]
        .unwrap();
        let gears = vec!["OTB".to_string(), "TBB".to_string()];

        let wide = pivot_wider(long.lazy(), &gear_schema(), &gears)
            .sort_by_exprs([col("cell")], SortMultipleOptions::default())
            .collect()
            .unwrap();

        assert_eq!(wide.height(), 2);
        let tbb = wide.column("TBB").unwrap().f64().unwrap();
        assert_eq!(tbb.get(0), Some(0.25));
        assert_eq!(tbb.get(1), None);
    }

    #[test]
    fn longer_emits_one_row_per_name() {
        let wide = df![
            "cell" => ["A1", "A2"],
            "year" => [2020, 2020],
            "OTB" => [Some(0.5), None],
            "TBB" => [Some(0.25), Some(0.75)],
        ]
        .unwrap();
        let gears = vec!["OTB".to_string(), "TBB".to_string()];

        let long = pivot_longer(wide.lazy(), &gear_schema(), &gears)
            .unwrap()
            .collect()
            .unwrap();

        assert_eq!(long.height(), 4);
        assert_eq!(long.column("Feff").unwrap().null_count(), 1);
        assert_eq!(
            long.get_column_names_str(),
            vec!["cell", "year", "gear", "Feff"]
        );
    }

    #[test]
    fn longer_without_names_is_empty() {
        let wide = df!["cell" => ["A1"], "year" => [2020]].unwrap();
        let long = pivot_longer(wide.lazy(), &gear_schema(), &[])
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(long.height(), 0);
        assert_eq!(long.width(), 4);
    }
}
