//! TOML fixture file format
//!
//! ```toml
//! [logging]
//! verbosity = 1
//!
//! [[packages]]
//! name = "foobar"
//!
//! [packages.entry-points.foobar]
//! foo = "pkgx:Thing.method [foo, bar]"
//! ```
//!
//! Entry point values are kept as raw strings here; turning them into
//! descriptors is left to the core crate.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the fixture file to load
pub const FIXTURES_ENV_VAR: &str = "EPTEST_FIXTURES";

/// Error type for fixture configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// The fixture file could not be read
    Io(PathBuf, std::io::Error),
    /// The fixture content is not valid TOML or does not fit the schema
    Parse(String),
    /// An entry point table holds something other than `name = "value"` pairs
    InvalidEntryPoints { package: String, group: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, err) => {
                write!(f, "Failed to read fixture file {}: {}", path.display(), err)
            }
            ConfigError::Parse(msg) => write!(f, "Failed to parse fixture file: {}", msg),
            ConfigError::InvalidEntryPoints { package, group } => write!(
                f,
                "Entry point group '{}' of package '{}' must map names to strings",
                group, package
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Logging settings applied when a fixture file is loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 0 = warnings only, 1 = debug, 2 = trace
    #[serde(default)]
    pub verbosity: u8,
    /// Log file location; the logger default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// One fake package declared in a fixture file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageFixture {
    pub name: String,
    /// Group name -> table of entry point name -> value
    #[serde(default, rename = "entry-points")]
    pub entry_points: toml::Table,
}

impl PackageFixture {
    /// Entry points as `(group, name, value)` triples in declaration order
    pub fn entry_point_values(&self) -> Result<Vec<(String, String, String)>, ConfigError> {
        let mut values = Vec::new();

        for (group, table) in &self.entry_points {
            let invalid = || ConfigError::InvalidEntryPoints {
                package: self.name.clone(),
                group: group.clone(),
            };

            let table = table.as_table().ok_or_else(invalid)?;
            for (name, value) in table {
                let value = value.as_str().ok_or_else(invalid)?;
                values.push((group.clone(), name.clone(), value.to_string()));
            }
        }

        Ok(values)
    }
}

/// Top-level fixture file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub packages: Vec<PackageFixture>,
}

impl FixtureConfig {
    /// Parse fixture content
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a fixture file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&content)
    }

    /// Load the fixture file named by `EPTEST_FIXTURES`.
    ///
    /// An unset variable is not an error: it yields an empty configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        match resolve_fixture_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Look up a declared package by name
    pub fn package(&self, name: &str) -> Option<&PackageFixture> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Fixture file path from the environment, if set and non-empty
pub fn resolve_fixture_path() -> Option<PathBuf> {
    std::env::var_os(FIXTURES_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
