//! Effort preparation: aggregation to (gear, spatial unit, time) and
//! completion of the unfished grid.

use polars::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::frame::distinct;

/// Sum swept area per (gear, spatial unit, time).
///
/// Missing swept areas are skipped by the sum. Only the three key columns and
/// the summed swept area survive; groups keep first-seen order, so
/// re-aggregating an already aggregated table returns it unchanged.
pub fn aggregate_effort(effort: &DataFrame, config: &Config) -> Result<DataFrame> {
    let df = effort
        .clone()
        .lazy()
        .group_by_stable([col(config.gear()), col(config.spatial()), col(config.time())])
        .agg([col(config.swept_area()).sum()])
        .collect()?;

    debug!(
        input_rows = effort.height(),
        output_rows = df.height(),
        "aggregated effort"
    );
    Ok(df)
}

/// Expand effort to every (spatial unit × gear × time) combination.
///
/// Spatial units come from the spatial table, gears and times from the effort
/// table. Cells without effort get a swept area of 0. Output is sorted by
/// (spatial unit, gear, time).
pub fn complete_grid(
    effort: &DataFrame,
    spatial: &DataFrame,
    config: &Config,
) -> Result<DataFrame> {
    let units = distinct(
        spatial
            .clone()
            .lazy()
            .filter(col(config.spatial()).is_not_null()),
        &[config.spatial()],
    );
    let observed = effort.clone().lazy();
    let gears = distinct(
        observed.clone().filter(col(config.gear()).is_not_null()),
        &[config.gear()],
    );
    let times = distinct(
        observed.clone().filter(col(config.time()).is_not_null()),
        &[config.time()],
    );

    let keys = [col(config.spatial()), col(config.gear()), col(config.time())];

    let df = units
        .cross_join(gears, None)
        .cross_join(times, None)
        .join(
            observed,
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([col(config.swept_area()).fill_null(lit(0.0))])
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .collect()?;

    debug!(
        observed_rows = effort.height(),
        grid_rows = df.height(),
        "completed effort grid"
    );
    Ok(df)
}

/// Aggregation and grid completion as selected by the caller's flags.
pub fn prepare_effort(
    effort: &DataFrame,
    spatial: &DataFrame,
    config: &Config,
    aggregate: bool,
    fished: bool,
) -> Result<DataFrame> {
    let effort = if aggregate {
        aggregate_effort(effort, config)?
    } else {
        effort.clone()
    };

    if fished {
        Ok(effort)
    } else {
        complete_grid(&effort, spatial, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effort() -> DataFrame {
        df![
            "gear" => ["OTB", "OTB", "TBB", "OTB"],
            "ices_rectangle" => ["A1", "A1", "A1", "A2"],
            "year" => [2020i64, 2020, 2020, 2021],
            "swept_area" => [Some(10.0), Some(5.0), None, Some(2.0)],
            "vessel" => ["v1", "v2", "v3", "v4"],
        ]
        .unwrap()
    }

    fn spatial() -> DataFrame {
        df![
            "ices_rectangle" => ["A1", "A2", "A3"],
            "area" => [100.0, 50.0, 25.0],
        ]
        .unwrap()
    }

    #[test]
    fn aggregation_sums_and_drops_extra_columns() {
        let out = aggregate_effort(&effort(), &Config::default()).unwrap();

        assert_eq!(
            out.get_column_names_str(),
            vec!["gear", "ices_rectangle", "year", "swept_area"]
        );
        assert_eq!(out.height(), 3);
        let swept = out.column("swept_area").unwrap().f64().unwrap();
        assert_eq!(swept.get(0), Some(15.0));
        // An all-missing group sums to zero.
        assert_eq!(swept.get(1), Some(0.0));
        assert_eq!(swept.get(2), Some(2.0));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let config = Config::default();
        let once = aggregate_effort(&effort(), &config).unwrap();
        let twice = aggregate_effort(&once, &config).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn grid_is_full_cross_product() {
        let config = Config::default();
        let aggregated = aggregate_effort(&effort(), &config).unwrap();
        let out = complete_grid(&aggregated, &spatial(), &config).unwrap();

        // 3 units × 2 gears × 2 years
        assert_eq!(out.height(), 12);
        let swept = out.column("swept_area").unwrap().f64().unwrap();
        assert_eq!(swept.null_count(), 0);
        assert_eq!(swept.into_iter().flatten().sum::<f64>(), 17.0);
    }

    #[test]
    fn fished_keeps_only_observed_cells() {
        let config = Config::default();
        let out = prepare_effort(&effort(), &spatial(), &config, true, true).unwrap();
        assert_eq!(out.height(), 3);
    }
}
