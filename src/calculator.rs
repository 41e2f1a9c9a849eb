//! Proxy orchestration.
//!
//! A request is resolved against what the dataset can compute, Feff is always
//! derived first, and one of three paths finishes the job:
//!
//! * Feff only: the Feff table is the result.
//! * Fgear: Feff merged with long-form gear efficiency by gear.
//! * Species: Feff spread over the padded species distribution (Fdist) and,
//!   with gear efficiency, weighted by it (Frealised).

use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::{debug, info};

use crate::age_padder::pad_species_ages;
use crate::availability::{self, display_set, ProxyKind};
use crate::combiner::combine_species_feff;
use crate::dataset::SurveyDataset;
use crate::error::Result;
use crate::gear_efficiency::pad_gear_efficiency;
use crate::reshape::{pivot_longer, PivotSchema};
use crate::schema::efficiency::EFFICIENCY;
use crate::schema::proxy;

/// Which proxies to compute and how to prepare the effort table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub proxies: BTreeSet<ProxyKind>,
    /// Sum swept area per (gear, spatial unit, time) first.
    pub aggregate: bool,
    /// Keep only observed effort cells; `false` completes the grid with zeros.
    pub fished: bool,
}

impl Default for ProxyRequest {
    fn default() -> Self {
        Self {
            proxies: ProxyKind::ALL.into_iter().collect(),
            aggregate: true,
            fished: true,
        }
    }
}

impl ProxyRequest {
    pub fn new(proxies: impl IntoIterator<Item = ProxyKind>) -> Self {
        Self {
            proxies: proxies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn aggregate(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn fished(mut self, fished: bool) -> Self {
        self.fished = fished;
        self
    }
}

/// The derived table and the proxy columns it carries.
#[derive(Debug, Clone)]
pub struct ProxyResult {
    pub table: DataFrame,
    pub proxies: BTreeSet<ProxyKind>,
}

/// Branch taken once availability is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProxyPath {
    FeffOnly,
    Fgear,
    Species { realised: bool },
}

impl ProxyPath {
    fn select(resolved: &BTreeSet<ProxyKind>) -> Self {
        if resolved.contains(&ProxyKind::Fgear) {
            ProxyPath::Fgear
        } else if resolved.contains(&ProxyKind::Fdist) || resolved.contains(&ProxyKind::Frealised)
        {
            ProxyPath::Species {
                realised: resolved.contains(&ProxyKind::Frealised),
            }
        } else {
            ProxyPath::FeffOnly
        }
    }
}

pub fn compute_proxies(dataset: &SurveyDataset, request: &ProxyRequest) -> Result<ProxyResult> {
    let resolved = availability::resolve(
        &request.proxies,
        dataset.has_species(),
        dataset.has_gear_efficiency(),
    )?;
    let path = ProxyPath::select(&resolved);
    info!(
        requested = %display_set(&request.proxies),
        resolved = %display_set(&resolved),
        ?path,
        "resolved proxy request"
    );

    let feff = dataset.compute_feff(request.aggregate, request.fished)?;

    let (mut table, mut computed) = match (path, dataset.species(), dataset.gear_efficiency()) {
        (ProxyPath::Fgear, _, Some(efficiency)) => (
            fgear(dataset, &feff, efficiency)?,
            BTreeSet::from([ProxyKind::Feff, ProxyKind::Fgear]),
        ),
        (ProxyPath::Species { realised }, Some(species), efficiency) => {
            species_path(dataset, &feff, species, efficiency.filter(|_| realised))?
        }
        _ => (feff, BTreeSet::from([ProxyKind::Feff])),
    };

    if !request.proxies.contains(&ProxyKind::Feff) && computed.len() > 1 {
        table = table.drop(proxy::FEFF)?;
        computed.remove(&ProxyKind::Feff);
    }

    debug!(rows = table.height(), columns = table.width(), "proxy result ready");
    Ok(ProxyResult {
        table,
        proxies: computed,
    })
}

/// `Fgear = Feff × Efficiency`, merged by gear.
fn fgear(dataset: &SurveyDataset, feff: &DataFrame, efficiency: &DataFrame) -> Result<DataFrame> {
    let config = dataset.config();
    let gears = dataset.efficiency_gears();
    let long = pivot_longer(
        efficiency.clone().lazy(),
        &PivotSchema::new(
            [config.species(), config.age()],
            config.gear(),
            EFFICIENCY,
        ),
        &gears,
    )?;

    let df = feff
        .clone()
        .lazy()
        .join(
            long,
            [col(config.gear())],
            [col(config.gear())],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([(col(proxy::FEFF) * col(EFFICIENCY)).alias(proxy::FGEAR)])
        .collect()?;
    Ok(df)
}

/// `Fdist = Feff × R`, and `Frealised = Fdist × Efficiency` when efficiency
/// is supplied.
fn species_path(
    dataset: &SurveyDataset,
    feff: &DataFrame,
    species: &DataFrame,
    efficiency: Option<&DataFrame>,
) -> Result<(DataFrame, BTreeSet<ProxyKind>)> {
    let config = dataset.config();
    let padded = pad_species_ages(species, config)?;
    let combined = combine_species_feff(&padded, feff, dataset.gears(), config)?
        .lazy()
        .with_columns([(col(proxy::FEFF) * col(config.abundance())).alias(proxy::FDIST)]);

    let Some(efficiency) = efficiency else {
        return Ok((
            combined.collect()?,
            BTreeSet::from([ProxyKind::Feff, ProxyKind::Fdist]),
        ));
    };

    let gears = dataset.efficiency_gears();
    let padded_efficiency = pad_gear_efficiency(efficiency, Some(&padded), &gears, config)?;
    let long = pivot_longer(
        padded_efficiency.lazy(),
        &PivotSchema::new(
            [config.species(), config.age()],
            config.gear(),
            EFFICIENCY,
        ),
        &gears,
    )?;
    let keys = [col(config.species()), col(config.age()), col(config.gear())];

    let df = combined
        .join(long, keys.clone(), keys, JoinArgs::new(JoinType::Left))
        .with_columns([
            (col(proxy::FDIST) * col(EFFICIENCY)).alias(proxy::FREALISED)
        ])
        .collect()?;
    Ok((
        df,
        BTreeSet::from([ProxyKind::Feff, ProxyKind::Fdist, ProxyKind::Frealised]),
    ))
}
