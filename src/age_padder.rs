use polars::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::frame::distinct;
use crate::schema::scratch;

/// Complete the species distribution over (spatial unit × age) per
/// (species, year).
///
/// Each species' age range is `[min, max]` of its observed ages. Within every
/// (species, year) group the spatial units observed in that group are crossed
/// with the full age range, and cells absent from the observations get a
/// relative abundance of 0. Rows with a missing age, spatial unit or year
/// take no part.
pub fn pad_species_ages(species: &DataFrame, config: &Config) -> Result<DataFrame> {
    let observed = species
        .clone()
        .lazy()
        .filter(
            col(config.age())
                .is_not_null()
                .and(col(config.spatial()).is_not_null())
                .and(col(config.time()).is_not_null()),
        );

    let ranges = observed
        .clone()
        .group_by_stable([col(config.species())])
        .agg([
            col(config.age()).min().alias(scratch::AGE_MIN),
            col(config.age()).max().alias(scratch::AGE_MAX),
        ])
        .collect()?;
    let ages = age_grid(&ranges, config)?;

    let cells = distinct(
        observed.clone(),
        &[config.species(), config.time(), config.spatial()],
    );
    let keys = [
        col(config.species()),
        col(config.time()),
        col(config.spatial()),
        col(config.age()),
    ];
    let column_order: Vec<Expr> = species
        .get_column_names_str()
        .into_iter()
        .map(col)
        .collect();

    let df = cells
        .join(
            ages.lazy(),
            [col(config.species())],
            [col(config.species())],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            observed,
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([col(config.abundance()).fill_null(lit(0.0))])
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .select(column_order)
        .collect()?;

    debug!(
        observed_rows = species.height(),
        padded_rows = df.height(),
        species = ranges.height(),
        "padded species ages"
    );
    Ok(df)
}

/// One (species, age) row for every age in each species' range.
fn age_grid(ranges: &DataFrame, config: &Config) -> Result<DataFrame> {
    let names = ranges.column(config.species())?.str()?;
    let mins = ranges.column(scratch::AGE_MIN)?.i64()?;
    let maxs = ranges.column(scratch::AGE_MAX)?.i64()?;

    let mut species_out: Vec<String> = Vec::new();
    let mut ages_out: Vec<i64> = Vec::new();
    for ((name, min), max) in names.into_iter().zip(mins).zip(maxs) {
        let (Some(name), Some(min), Some(max)) = (name, min, max) else {
            continue;
        };
        for age in min..=max {
            species_out.push(name.to_string());
            ages_out.push(age);
        }
    }

    Ok(DataFrame::new(vec![
        Column::new(config.species().into(), species_out),
        Column::new(config.age().into(), ages_out),
    ])?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn species() -> DataFrame {
        df![
            "species" => ["cod", "cod", "cod", "plaice"],
            "age" => [Some(1i64), Some(4), Some(2), None],
            "ices_rectangle" => ["A1", "A2", "A1", "A1"],
            "year" => [2020i64, 2020, 2021, 2020],
            "R" => [0.6, 0.4, 1.0, 0.3],
        ]
        .unwrap()
    }

    fn rows_for(df: &DataFrame, year: i64) -> Vec<(String, i64, f64)> {
        let cells = df.column("ices_rectangle").unwrap().str().unwrap();
        let ages = df.column("age").unwrap().i64().unwrap();
        let years = df.column("year").unwrap().i64().unwrap();
        let r = df.column("R").unwrap().f64().unwrap();
        (0..df.height())
            .filter(|&i| years.get(i) == Some(year))
            .map(|i| {
                (
                    cells.get(i).unwrap().to_string(),
                    ages.get(i).unwrap(),
                    r.get(i).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn every_group_covers_the_species_age_range() {
        let out = pad_species_ages(&species(), &Config::default()).unwrap();

        // 2020: {A1, A2} × ages 1..=4; 2021: {A1} × ages 1..=4.
        assert_eq!(out.height(), 12);
        for year in [2020, 2021] {
            let ages: BTreeSet<i64> = rows_for(&out, year).iter().map(|r| r.1).collect();
            assert_eq!(ages, (1..=4).collect());
        }
    }

    #[test]
    fn absent_cells_are_zero_filled() {
        let out = pad_species_ages(&species(), &Config::default()).unwrap();
        let rows = rows_for(&out, 2020);

        assert!(rows.contains(&("A1".to_string(), 1, 0.6)));
        assert!(rows.contains(&("A2".to_string(), 4, 0.4)));
        assert!(rows.contains(&("A1".to_string(), 4, 0.0)));
        assert!(rows.contains(&("A2".to_string(), 2, 0.0)));
        assert_eq!(out.column("R").unwrap().null_count(), 0);
    }

    #[test]
    fn species_without_ages_is_dropped() {
        let out = pad_species_ages(&species(), &Config::default()).unwrap();
        let names: BTreeSet<&str> = out
            .column("species")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(names, BTreeSet::from(["cod"]));
    }

    #[test]
    fn rows_with_missing_cell_keys_are_excluded() {
        let species = df![
            "species" => ["cod", "cod", "cod"],
            "age" => [1i64, 2, 3],
            "ices_rectangle" => [Some("A1"), None, Some("A1")],
            "year" => [Some(2020i64), Some(2020), None],
            "R" => [0.7, 0.2, 0.1],
        ]
        .unwrap();

        let out = pad_species_ages(&species, &Config::default()).unwrap();
        assert_eq!(out.column("ices_rectangle").unwrap().null_count(), 0);
        assert_eq!(out.column("year").unwrap().null_count(), 0);
        // Age range comes from complete rows only: just age 1 in A1/2020.
        assert_eq!(rows_for(&out, 2020), vec![("A1".to_string(), 1, 0.7)]);
    }

    #[test]
    fn keeps_input_column_order() {
        let out = pad_species_ages(&species(), &Config::default()).unwrap();
        assert_eq!(
            out.get_column_names_str(),
            species().get_column_names_str()
        );
    }
}
