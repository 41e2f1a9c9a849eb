//! Gear-efficiency completion: missing (species, age) rows and
//! carry-forward of the last known efficiency along age.

use polars::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::frame::{distinct, null_float};

/// Complete and gap-fill the wide gear-efficiency table.
///
/// With a species table, every (species, age) it carries that the efficiency
/// table lacks is appended with missing efficiencies. The table is then sorted
/// by (species, age) and each gear column is filled forward per species. A
/// gap before a species' first observed efficiency stays missing.
pub fn pad_gear_efficiency(
    efficiency: &DataFrame,
    species: Option<&DataFrame>,
    gears: &[String],
    config: &Config,
) -> Result<DataFrame> {
    let keys = [col(config.species()), col(config.age())];
    let mut column_order: Vec<Expr> = keys.to_vec();
    column_order.extend(gears.iter().map(|g| col(g.as_str())));

    let present = efficiency.clone().lazy().select(column_order.clone());

    let completed = match species {
        Some(species) => {
            let wanted = distinct(
                species
                    .clone()
                    .lazy()
                    .filter(col(config.age()).is_not_null()),
                &[config.species(), config.age()],
            );
            let mut fill = keys.to_vec();
            fill.extend(gears.iter().map(|g| null_float(g)));
            let absent = wanted
                .join(
                    present.clone(),
                    keys.clone(),
                    keys.clone(),
                    JoinArgs::new(JoinType::Anti),
                )
                .select(fill);
            concat([present, absent], UnionArgs::default())?
        }
        None => present,
    };

    let carried: Vec<Expr> = gears
        .iter()
        .map(|g| {
            col(g.as_str())
                .fill_null_with_strategy(FillNullStrategy::Forward(None))
                .over([col(config.species())])
        })
        .collect();
    let df = completed
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .with_columns(carried)
        .collect()?;

    debug!(
        observed_rows = efficiency.height(),
        padded_rows = df.height(),
        missing_after_fill = gears
            .iter()
            .map(|g| df.column(g).map_or(0, |c| c.null_count()))
            .sum::<usize>(),
        "padded gear efficiency"
    );
    Ok(df)
}
