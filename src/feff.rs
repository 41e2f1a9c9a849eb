use polars::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::frame::{as_float, require_columns};
use crate::schema::proxy;

/// Effort-based proxy: `Feff = swept_area / area`.
///
/// Effort rows are left-joined onto the spatial areas by spatial unit. Rows
/// without a matching unit, or with a zero, negative or non-finite area, get
/// a missing Feff rather than an infinite or negative one.
pub fn compute_feff(effort: &DataFrame, spatial: &DataFrame, config: &Config) -> Result<DataFrame> {
    let effort_required = [
        config.gear(),
        config.spatial(),
        config.time(),
        config.swept_area(),
    ];
    let spatial_required = [config.spatial(), config.area()];
    require_columns(&[
        (effort, "effort", &effort_required[..]),
        (spatial, "spatial", &spatial_required[..]),
    ])?;

    let ratio = as_float(config.swept_area()) / col(config.area());

    let df = effort
        .clone()
        .lazy()
        .join(
            spatial
                .clone()
                .lazy()
                .select([col(config.spatial()), as_float(config.area())]),
            [col(config.spatial())],
            [col(config.spatial())],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([when(
            col(config.area())
                .gt(lit(0.0))
                .and(ratio.clone().is_finite()),
        )
        .then(ratio)
        .otherwise(lit(NULL).cast(DataType::Float64))
        .alias(proxy::FEFF)])
        .collect()?;

    debug!(
        rows = df.height(),
        missing = df.column(proxy::FEFF)?.null_count(),
        "computed Feff"
    );
    Ok(df)
}
