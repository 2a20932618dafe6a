//! Fixture configuration for eptest
//!
//! A fixture file declares fake packages and their entry points in TOML so a
//! whole test environment can be described once and loaded into a registry.

pub mod fixture;

pub use fixture::{
    resolve_fixture_path, ConfigError, FixtureConfig, LoggingConfig, PackageFixture,
    FIXTURES_ENV_VAR,
};
