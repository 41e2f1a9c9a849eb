//! Fishing-mortality and fishing-effort proxies for stock-survey analysis.
//!
//! Combines trawl effort, the spatial reference grid and, when available, a
//! species distribution and gear-specific efficiencies into the Feff, Fgear,
//! Fdist and Frealised proxies.

pub mod age_padder;
pub mod availability;
pub mod calculator;
pub mod combiner;
pub mod config;
pub mod dataset;
pub mod effort;
pub mod error;
pub mod feff;
mod frame;
pub mod gear_efficiency;
pub mod reshape;
pub mod schema;

#[cfg(feature = "python")]
mod python;

pub use availability::ProxyKind;
pub use calculator::{compute_proxies, ProxyRequest, ProxyResult};
pub use config::{ColumnRole, Config, ConfigBuilder};
pub use dataset::SurveyDataset;
pub use error::{MissingColumn, ProxyError, Result};
pub use feff::compute_feff;
