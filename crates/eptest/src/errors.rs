use eptest_config::ConfigError;
use thiserror::Error;

/// Errors raised while loading the object an entry point refers to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("No module named '{0}'")]
    Resolution(String),

    #[error("'{owner}' has no attribute '{attribute}'")]
    Attribute { owner: String, attribute: String },
}

/// Errors raised when a registry is activated or deactivated out of order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("registry is already active in this discovery chain")]
    AlreadyActive,

    #[error("registry is not active in this discovery chain")]
    NotActive,
}

/// Errors raised when parsing an entry point value such as `module:attr [extra]`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryPointError {
    #[error("Invalid entry point value '{value}' for '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("Invalid entry point line: {0}")]
    InvalidLine(String),
}

/// Errors raised while building packages from fixture files or pyproject metadata
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to parse pyproject.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("pyproject.toml has no [project] name")]
    MissingProjectName,

    #[error("Package '{package}': {source}")]
    EntryPoint {
        package: String,
        #[source]
        source: EntryPointError,
    },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
