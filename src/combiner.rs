use polars::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::reshape::{pivot_longer, pivot_wider, PivotSchema};
use crate::schema::proxy;

/// Attach per-gear Feff to every species-distribution row.
///
/// Feff is pivoted to one column per gear keyed by (spatial unit, time),
/// left-joined onto the species table and folded back to one row per
/// (species row, gear). Several effort rows for one (gear, cell) are summed
/// first. A gear with no Feff in a cell contributes 0: no recorded effort
/// there, not unknown data.
pub fn combine_species_feff(
    species: &DataFrame,
    feff: &DataFrame,
    gears: &[String],
    config: &Config,
) -> Result<DataFrame> {
    let known: Series = Series::new("known_gears".into(), gears);
    let cell_keys = [col(config.spatial()), col(config.time())];

    let per_cell = feff
        .clone()
        .lazy()
        .filter(col(config.gear()).is_in(lit(known).implode(), false))
        .group_by_stable([col(config.spatial()), col(config.time()), col(config.gear())])
        .agg([col(proxy::FEFF).sum()]);

    let wide = pivot_wider(
        per_cell,
        &PivotSchema::new(
            [config.spatial(), config.time()],
            config.gear(),
            proxy::FEFF,
        ),
        gears,
    );

    let joined = species.clone().lazy().join(
        wide,
        cell_keys.clone(),
        cell_keys,
        JoinArgs::new(JoinType::Left),
    );

    let species_columns: Vec<String> = species
        .get_column_names_str()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let long = pivot_longer(
        joined,
        &PivotSchema::new(species_columns, config.gear(), proxy::FEFF),
        gears,
    )?
    .with_columns([col(proxy::FEFF).fill_null(lit(0.0))])
    .sort_by_exprs(
        [
            col(config.species()),
            col(config.time()),
            col(config.spatial()),
            col(config.age()),
            col(config.gear()),
        ],
        SortMultipleOptions::default(),
    )
    .collect()?;

    debug!(
        species_rows = species.height(),
        gears = gears.len(),
        combined_rows = long.height(),
        "combined species distribution with Feff"
    );
    Ok(long)
}
