use std::fmt;

use thiserror::Error;

/// A required column that an input table does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub table: &'static str,
    pub column: String,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing columns: {}", join_display(.0))]
    MissingColumns(Vec<MissingColumn>),

    #[error("No computable proxy: requested [{requested}], computable from the dataset [{available}]")]
    NoComputableProxy { requested: String, available: String },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown proxy: '{0}'. Must be one of Feff, Fgear, Fdist, Frealised")]
    UnknownProxy(String),

    #[error("Unknown column role: '{0}'")]
    UnknownRole(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "python")]
impl From<ProxyError> for pyo3::PyErr {
    fn from(err: ProxyError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};
        match err {
            ProxyError::Polars(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
