//! The validated input bundle.

use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::info;

use crate::availability::{self, ProxyKind};
use crate::calculator::{self, ProxyRequest, ProxyResult};
use crate::config::Config;
use crate::effort::prepare_effort;
use crate::error::{MissingColumn, ProxyError, Result};
use crate::feff;
use crate::frame::{as_float, as_int, distinct, key_string, missing_columns, string_values};

/// Effort, spatial grid and the optional species distribution and gear
/// efficiency tables, with the `Config` that names their columns.
///
/// Role-mapped columns are cast to canonical dtypes on construction (string
/// keys trimmed, time and age as Int64, measurements as Float64). The tables
/// are never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SurveyDataset {
    effort: DataFrame,
    spatial: DataFrame,
    species: Option<DataFrame>,
    gear_efficiency: Option<DataFrame>,
    gears: Vec<String>,
    config: Config,
}

impl SurveyDataset {
    /// Build a dataset. Empty optional tables are treated as absent.
    pub fn new(
        effort: DataFrame,
        spatial: DataFrame,
        species: Option<DataFrame>,
        gear_efficiency: Option<DataFrame>,
        config: Config,
    ) -> Result<Self> {
        if effort.height() == 0 {
            return Err(ProxyError::InvalidDataset("effort table is empty".into()));
        }
        if spatial.height() == 0 {
            return Err(ProxyError::InvalidDataset("spatial table is empty".into()));
        }
        let species = species.filter(|df| df.height() > 0);
        let gear_efficiency = gear_efficiency.filter(|df| df.height() > 0);

        let mut missing: Vec<MissingColumn> = Vec::new();
        missing.extend(missing_columns(
            &effort,
            "effort",
            &[
                config.gear(),
                config.spatial(),
                config.time(),
                config.swept_area(),
            ],
        ));
        missing.extend(missing_columns(
            &spatial,
            "spatial",
            &[config.spatial(), config.area()],
        ));
        if let Some(df) = &species {
            missing.extend(missing_columns(
                df,
                "species",
                &[
                    config.species(),
                    config.age(),
                    config.spatial(),
                    config.time(),
                    config.abundance(),
                ],
            ));
        }
        if let Some(df) = &gear_efficiency {
            missing.extend(missing_columns(
                df,
                "gear_efficiency",
                &[config.species(), config.age()],
            ));
        }
        if !missing.is_empty() {
            return Err(ProxyError::MissingColumns(missing));
        }

        let effort = effort
            .lazy()
            .with_columns([
                key_string(config.gear()),
                key_string(config.spatial()),
                as_int(config.time()),
                as_float(config.swept_area()),
            ])
            .collect()?;
        let spatial = spatial
            .lazy()
            .with_columns([key_string(config.spatial()), as_float(config.area())])
            .collect()?;
        let species = species
            .map(|df| {
                df.lazy()
                    .with_columns([
                        key_string(config.species()),
                        as_int(config.age()),
                        key_string(config.spatial()),
                        as_int(config.time()),
                        as_float(config.abundance()),
                    ])
                    .collect()
            })
            .transpose()?;
        let gear_efficiency = gear_efficiency
            .map(|df| {
                let mut exprs = vec![key_string(config.species()), as_int(config.age())];
                exprs.extend(
                    efficiency_gear_columns(&df, &config)
                        .iter()
                        .map(|gear| as_float(gear)),
                );
                df.lazy().with_columns(exprs).collect()
            })
            .transpose()?;

        let gears = string_values(
            &distinct(
                effort
                    .clone()
                    .lazy()
                    .filter(col(config.gear()).is_not_null()),
                &[config.gear()],
            )
            .collect()?,
            config.gear(),
        )?;

        info!(
            effort_rows = effort.height(),
            spatial_units = spatial.height(),
            species_rows = species.as_ref().map_or(0, |df| df.height()),
            gear_efficiency_rows = gear_efficiency.as_ref().map_or(0, |df| df.height()),
            gears = gears.len(),
            "survey dataset ready"
        );

        Ok(Self {
            effort,
            spatial,
            species,
            gear_efficiency,
            gears,
            config,
        })
    }

    pub fn effort(&self) -> &DataFrame {
        &self.effort
    }

    pub fn spatial(&self) -> &DataFrame {
        &self.spatial
    }

    pub fn species(&self) -> Option<&DataFrame> {
        self.species.as_ref()
    }

    pub fn gear_efficiency(&self) -> Option<&DataFrame> {
        self.gear_efficiency.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gears observed in the effort table, first-seen order.
    pub fn gears(&self) -> &[String] {
        &self.gears
    }

    pub fn has_species(&self) -> bool {
        self.species.is_some()
    }

    pub fn has_gear_efficiency(&self) -> bool {
        self.gear_efficiency.is_some()
    }

    /// Proxy kinds this dataset can produce.
    pub fn computable_proxies(&self) -> BTreeSet<ProxyKind> {
        availability::computable(self.has_species(), self.has_gear_efficiency())
    }

    /// Gear columns of the wide efficiency table (empty without one).
    pub fn efficiency_gears(&self) -> Vec<String> {
        self.gear_efficiency
            .as_ref()
            .map(|df| efficiency_gear_columns(df, &self.config))
            .unwrap_or_default()
    }

    /// Feff over the prepared effort table.
    pub fn compute_feff(&self, aggregate: bool, fished: bool) -> Result<DataFrame> {
        let effort = prepare_effort(&self.effort, &self.spatial, &self.config, aggregate, fished)?;
        feff::compute_feff(&effort, &self.spatial, &self.config)
    }

    pub fn compute_proxies(&self, request: &ProxyRequest) -> Result<ProxyResult> {
        calculator::compute_proxies(self, request)
    }
}

/// Every efficiency column that is not the species or age key.
fn efficiency_gear_columns(df: &DataFrame, config: &Config) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .filter(|name| *name != config.species() && *name != config.age())
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effort() -> DataFrame {
        df![
            "gear" => [" OTB", "TBB"],
            "ices_rectangle" => ["A1", "A2"],
            "year" => [2020i32, 2020],
            "swept_area" => [50i32, 10],
        ]
        .unwrap()
    }

    fn spatial() -> DataFrame {
        df!["ices_rectangle" => ["A1", "A2"], "area" => [100.0, 20.0]].unwrap()
    }

    #[test]
    fn empty_effort_is_rejected() {
        let empty = effort().head(Some(0));
        let err = SurveyDataset::new(empty, spatial(), None, None, Config::default()).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidDataset(_)));
        assert!(err.to_string().contains("effort"));
    }

    #[test]
    fn empty_spatial_is_rejected() {
        let err = SurveyDataset::new(
            effort(),
            spatial().head(Some(0)),
            None,
            None,
            Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("spatial table is empty"));
    }

    #[test]
    fn columns_are_normalised() {
        let dataset =
            SurveyDataset::new(effort(), spatial(), None, None, Config::default()).unwrap();

        assert_eq!(dataset.gears(), ["OTB".to_string(), "TBB".to_string()]);
        let effort = dataset.effort();
        assert_eq!(effort.column("year").unwrap().dtype(), &DataType::Int64);
        assert_eq!(effort.column("swept_area").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn empty_species_table_counts_as_absent() {
        let species = df![
            "species" => ["cod"],
            "age" => [1i64],
            "ices_rectangle" => ["A1"],
            "year" => [2020i64],
            "R" => [0.5],
        ]
        .unwrap()
        .head(Some(0));

        let dataset =
            SurveyDataset::new(effort(), spatial(), Some(species), None, Config::default())
                .unwrap();
        assert!(!dataset.has_species());
        assert_eq!(dataset.computable_proxies(), availability::computable(false, false));
    }

    #[test]
    fn species_table_missing_columns() {
        let species = df!["species" => ["cod"], "age" => [1i64]].unwrap();
        let err = SurveyDataset::new(effort(), spatial(), Some(species), None, Config::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing columns: species.ices_rectangle, species.year, species.R"
        );
    }

    #[test]
    fn efficiency_gears_exclude_keys() {
        let efficiency = df![
            "species" => ["cod"],
            "age" => [1i64],
            "OTB" => [0.4],
            "TBB" => [0.2],
        ]
        .unwrap();
        let dataset = SurveyDataset::new(
            effort(),
            spatial(),
            None,
            Some(efficiency),
            Config::default(),
        )
        .unwrap();
        assert_eq!(dataset.efficiency_gears(), vec!["OTB", "TBB"]);
    }
}
