//! Populate registries from fixture configuration

use crate::entry_point::EntryPointDescriptor;
use crate::errors::FixtureError;
use crate::package::PackageRecord;
use crate::registry::DiscoveryRegistry;
use eptest_config::{FixtureConfig, LoggingConfig, PackageFixture};
use eptest_logger as logger;

/// Build a package record from its fixture declaration
pub fn package_from_fixture(fixture: &PackageFixture) -> Result<PackageRecord, FixtureError> {
    let mut package = PackageRecord::new(fixture.name.as_str());
    for (group, name, value) in fixture.entry_point_values()? {
        let descriptor = EntryPointDescriptor::parse(name, group, &value).map_err(|source| {
            FixtureError::EntryPoint {
                package: fixture.name.clone(),
                source,
            }
        })?;
        package.add_entry_point(descriptor);
    }
    Ok(package)
}

/// Add every package declared in `config` to `registry`
pub fn load_into(registry: &DiscoveryRegistry, config: &FixtureConfig) -> Result<(), FixtureError> {
    // Parse everything first so a bad fixture leaves the registry untouched.
    let packages = config
        .packages
        .iter()
        .map(package_from_fixture)
        .collect::<Result<Vec<_>, _>>()?;

    let count = packages.len();
    logger::debug(&format!("Loading {} fixture packages", count));
    for package in packages {
        logger::trace(&format!("Registering fixture package '{}'", package.name()));
        registry.add_package(package);
    }
    logger::info(&format!("Loaded {} fixture packages", count));
    Ok(())
}

/// A new, inactive registry holding the packages declared in `config`
pub fn registry_from_config(config: &FixtureConfig) -> Result<DiscoveryRegistry, FixtureError> {
    let registry = DiscoveryRegistry::new();
    load_into(&registry, config)?;
    Ok(registry)
}

/// Registry built from the fixture file named by `EPTEST_FIXTURES`, with logging
/// configured from its `[logging]` table
pub fn registry_from_env() -> Result<DiscoveryRegistry, FixtureError> {
    let config = FixtureConfig::from_env()?;
    if eptest_config::resolve_fixture_path().is_some() {
        init_logging(&config.logging)?;
    }
    registry_from_config(&config)
}

/// Configure the logger from a `[logging]` table
pub fn init_logging(config: &LoggingConfig) -> Result<(), FixtureError> {
    logger::init_with_verbosity(config.verbosity, config.log_file.as_deref()).map_err(|e| {
        logger::error(&format!("Failed to initialize fixture logging: {}", e));
        FixtureError::Logging(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_point::Criteria;
    use crate::package::DiscoveryContext;

    const FIXTURE: &str = r#"
[[packages]]
name = "foobar"

[packages.entry-points.foobar]
foo = "pkgx [foo, bar]"
bar = "pkgx.sub:Thing.method"

[[packages]]
name = "zazz"
"#;

    #[test]
    fn test_registry_from_config() {
        let config = FixtureConfig::from_toml_str(FIXTURE).unwrap_or_else(|_| unreachable!());
        let registry = registry_from_config(&config).unwrap_or_else(|_| unreachable!());

        assert_eq!(registry.package_names(), vec!["foobar".to_string(), "zazz".to_string()]);
        assert!(!registry.is_active());
        assert_eq!(registry.query_packages(&DiscoveryContext::new()).len(), 2);

        let eps = registry.query_entry_points(&Criteria::new().group("foobar"));
        assert_eq!(eps.len(), 2);
        assert!(eps
            .get("bar")
            .is_some_and(|ep| ep.target() == "pkgx.sub" && ep.attr_path() == Some("Thing.method")));
    }

    #[test]
    fn test_bad_fixture_leaves_registry_untouched() {
        let content = r#"
[[packages]]
name = "good"

[[packages]]
name = "bad"

[packages.entry-points.group]
broken = "not a target"
"#;
        let config = FixtureConfig::from_toml_str(content).unwrap_or_else(|_| unreachable!());
        let registry = DiscoveryRegistry::new();

        let result = load_into(&registry, &config);
        assert!(matches!(
            result,
            Err(FixtureError::EntryPoint { ref package, .. }) if package == "bad"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_init_logging_with_explicit_file() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let logging = LoggingConfig {
            verbosity: 0,
            log_file: Some(dir.path().join("eptest.log")),
        };
        assert!(init_logging(&logging).is_ok());
        assert_eq!(logger::get_log_path(), logging.log_file);

        let config = FixtureConfig::from_toml_str(FIXTURE).unwrap_or_else(|_| unreachable!());
        assert!(registry_from_config(&config).is_ok());
        let written = std::fs::read_to_string(dir.path().join("eptest.log")).unwrap_or_default();
        assert!(written.contains("Loaded 2 fixture packages"));
        logger::close();
    }

    #[test]
    fn test_init_logging_failure_is_reported() {
        let Ok(file) = tempfile::NamedTempFile::new() else {
            return;
        };
        // A regular file cannot be the parent of the log file.
        let logging = LoggingConfig {
            verbosity: 0,
            log_file: Some(file.path().join("nested").join("eptest.log")),
        };
        assert!(matches!(init_logging(&logging), Err(FixtureError::Logging(_))));
    }
}
