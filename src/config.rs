//! Role → column-name mapping.
//!
//! Every table handed to the engine is addressed through a `Config`, so callers
//! keep their own column names. A `Config` is validated once when built and is
//! never mutated afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};
use crate::schema::defaults;

/// Logical column roles understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Gear,
    Spatial,
    Time,
    Area,
    SweptArea,
    Species,
    Age,
    Abundance,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 8] = [
        ColumnRole::Gear,
        ColumnRole::Spatial,
        ColumnRole::Time,
        ColumnRole::Area,
        ColumnRole::SweptArea,
        ColumnRole::Species,
        ColumnRole::Age,
        ColumnRole::Abundance,
    ];

    /// The option name used in TOML documents and binding overrides.
    pub fn option_name(self) -> &'static str {
        match self {
            ColumnRole::Gear => "gear_field",
            ColumnRole::Spatial => "spatial_field",
            ColumnRole::Time => "time_field",
            ColumnRole::Area => "area_field",
            ColumnRole::SweptArea => "swept_area_field",
            ColumnRole::Species => "species_field",
            ColumnRole::Age => "age_field",
            ColumnRole::Abundance => "abundance_field",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

impl FromStr for ColumnRole {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        ColumnRole::ALL
            .into_iter()
            .find(|role| role.option_name() == s)
            .ok_or_else(|| ProxyError::UnknownRole(s.to_string()))
    }
}

/// Physical column names for each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fishing gear code
    pub gear_field: String,
    /// Spatial unit identifier (ICES statistical rectangle by default)
    pub spatial_field: String,
    /// Survey year
    pub time_field: String,
    /// Spatial unit area
    pub area_field: String,
    /// Swept area of the effort observation
    pub swept_area_field: String,
    /// Species identifier
    pub species_field: String,
    /// Age class in the species distribution and gear-efficiency tables
    pub age_field: String,
    /// Relative abundance in the species distribution table
    pub abundance_field: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gear_field: defaults::GEAR.to_string(),
            spatial_field: defaults::SPATIAL.to_string(),
            time_field: defaults::TIME.to_string(),
            area_field: defaults::AREA.to_string(),
            swept_area_field: defaults::SWEPT_AREA.to_string(),
            species_field: defaults::SPECIES.to_string(),
            age_field: defaults::AGE.to_string(),
            abundance_field: defaults::ABUNDANCE.to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Parse a TOML document; keys left out take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `option_name → column` overrides on top of the defaults.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self> {
        let mut builder = ConfigBuilder::new();
        for (option, column) in overrides {
            let role: ColumnRole = option.parse()?;
            builder = builder.column(role, column.clone());
        }
        builder.build()
    }

    pub fn column(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Gear => &self.gear_field,
            ColumnRole::Spatial => &self.spatial_field,
            ColumnRole::Time => &self.time_field,
            ColumnRole::Area => &self.area_field,
            ColumnRole::SweptArea => &self.swept_area_field,
            ColumnRole::Species => &self.species_field,
            ColumnRole::Age => &self.age_field,
            ColumnRole::Abundance => &self.abundance_field,
        }
    }

    pub fn gear(&self) -> &str {
        &self.gear_field
    }

    pub fn spatial(&self) -> &str {
        &self.spatial_field
    }

    pub fn time(&self) -> &str {
        &self.time_field
    }

    pub fn area(&self) -> &str {
        &self.area_field
    }

    pub fn swept_area(&self) -> &str {
        &self.swept_area_field
    }

    pub fn species(&self) -> &str {
        &self.species_field
    }

    pub fn age(&self) -> &str {
        &self.age_field
    }

    pub fn abundance(&self) -> &str {
        &self.abundance_field
    }

    fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for role in ColumnRole::ALL {
            let name = self.column(role);
            if name.trim().is_empty() {
                return Err(ProxyError::InvalidConfig(format!(
                    "{role} must name a column"
                )));
            }
            if !seen.insert(name) {
                return Err(ProxyError::InvalidConfig(format!(
                    "column '{name}' is mapped to more than one role"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `Config`; unset roles keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, role: ColumnRole, name: impl Into<String>) -> Self {
        let name = name.into();
        match role {
            ColumnRole::Gear => self.config.gear_field = name,
            ColumnRole::Spatial => self.config.spatial_field = name,
            ColumnRole::Time => self.config.time_field = name,
            ColumnRole::Area => self.config.area_field = name,
            ColumnRole::SweptArea => self.config.swept_area_field = name,
            ColumnRole::Species => self.config.species_field = name,
            ColumnRole::Age => self.config.age_field = name,
            ColumnRole::Abundance => self.config.abundance_field = name,
        }
        self
    }

    pub fn gear_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::Gear, name)
    }

    pub fn spatial_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::Spatial, name)
    }

    pub fn time_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::Time, name)
    }

    pub fn area_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::Area, name)
    }

    pub fn swept_area_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::SweptArea, name)
    }

    pub fn species_field(self, name: impl Into<String>) -> Self {
        self.column(ColumnRole::Species, name)
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spatial(), "ices_rectangle");
        assert_eq!(config.abundance(), "R");
    }

    #[test]
    fn toml_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml_str(
            r#"
            gear_field = "gear_type"
            time_field = "Year"
            "#,
        )
        .unwrap();
        assert_eq!(config.gear(), "gear_type");
        assert_eq!(config.time(), "Year");
        assert_eq!(config.swept_area(), "swept_area");
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Config::builder()
            .gear_field("area")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidConfig(_)));
    }

    #[test]
    fn empty_column_is_rejected() {
        let err = Config::builder().species_field("  ").build().unwrap_err();
        assert!(err.to_string().contains("species_field"));
    }

    #[test]
    fn overrides_parse_option_names() {
        let mut overrides = HashMap::new();
        overrides.insert("spatial_field".to_string(), "StatRec".to_string());
        let config = Config::with_overrides(&overrides).unwrap();
        assert_eq!(config.spatial(), "StatRec");

        overrides.insert("depth_field".to_string(), "depth".to_string());
        assert!(matches!(
            Config::with_overrides(&overrides),
            Err(ProxyError::UnknownRole(_))
        ));
    }
}
