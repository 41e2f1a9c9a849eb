use std::collections::HashMap;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::availability::ProxyKind;
use crate::calculator::ProxyRequest;
use crate::config::Config;
use crate::dataset::SurveyDataset;
use crate::error::ProxyError;
use crate::schema;

#[pyclass(name = "SurveyDataset", frozen)]
pub struct PySurveyDataset {
    inner: SurveyDataset,
}

#[pymethods]
impl PySurveyDataset {
    /// Bundle the survey tables.
    ///
    /// `config` maps option names (gear_field, spatial_field, time_field,
    /// area_field, swept_area_field, species_field, age_field, abundance_field)
    /// to column names; unspecified options keep their defaults.
    #[new]
    #[pyo3(signature = (effort, spatial, species=None, gear_efficiency=None, config=None))]
    fn new(
        effort: PyDataFrame,
        spatial: PyDataFrame,
        species: Option<PyDataFrame>,
        gear_efficiency: Option<PyDataFrame>,
        config: Option<HashMap<String, String>>,
    ) -> PyResult<Self> {
        let config = match config {
            Some(overrides) => Config::with_overrides(&overrides)?,
            None => Config::default(),
        };
        let inner = SurveyDataset::new(
            effort.0,
            spatial.0,
            species.map(|df| df.0),
            gear_efficiency.map(|df| df.0),
            config,
        )?;
        Ok(Self { inner })
    }

    #[pyo3(signature = (aggregate=true, fished=true))]
    fn compute_feff(&self, aggregate: bool, fished: bool) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.compute_feff(aggregate, fished)?))
    }

    /// Compute the requested proxies (all four when `proxies` is None).
    #[pyo3(signature = (proxies=None, aggregate=true, fished=true))]
    fn compute_proxies(
        &self,
        proxies: Option<Vec<String>>,
        aggregate: bool,
        fished: bool,
    ) -> PyResult<PyDataFrame> {
        let mut request = ProxyRequest::default().aggregate(aggregate).fished(fished);
        if let Some(names) = proxies {
            request.proxies = names
                .iter()
                .map(|name| name.parse::<ProxyKind>())
                .collect::<Result<_, ProxyError>>()?;
        }
        let result = self.inner.compute_proxies(&request)?;
        Ok(PyDataFrame(result.table))
    }

    #[getter]
    fn computable_proxies(&self) -> Vec<String> {
        self.inner
            .computable_proxies()
            .into_iter()
            .map(|kind| kind.to_string())
            .collect()
    }

    #[getter]
    fn gears(&self) -> Vec<String> {
        self.inner.gears().to_vec()
    }
}

/// Export proxy column names as a Python submodule
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let proxy = PyModule::new(m.py(), "proxy")?;
    proxy.add("FEFF", schema::proxy::FEFF)?;
    proxy.add("FGEAR", schema::proxy::FGEAR)?;
    proxy.add("FDIST", schema::proxy::FDIST)?;
    proxy.add("FREALISED", schema::proxy::FREALISED)?;
    proxy.add("EFFICIENCY", schema::efficiency::EFFICIENCY)?;
    m.add_submodule(&proxy)?;
    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySurveyDataset>()?;
    add_schema_exports(m)?;
    Ok(())
}
