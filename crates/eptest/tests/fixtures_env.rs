//! Building a registry from the fixture file named in the environment
//!
//! Kept in its own test binary: it sets `EPTEST_FIXTURES` and reconfigures
//! the process-wide logger.

use eptest::fixtures::registry_from_env;
use eptest::{Criteria, FixtureError};
use eptest_config::FIXTURES_ENV_VAR;
use eptest_logger as logger;
use std::fs;

#[test]
fn test_registry_from_env() {
    std::env::remove_var(FIXTURES_ENV_VAR);
    let registry = registry_from_env().unwrap_or_else(|_| unreachable!());
    assert!(registry.is_empty());
    assert!(logger::get_log_path().is_none());

    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let log_file = dir.path().join("logs").join("eptest.log");
    let fixture = dir.path().join("fixtures.toml");
    let content = format!(
        r#"
[logging]
verbosity = 0
log_file = "{}"

[[packages]]
name = "env-package"

[packages.entry-points."env.plugins"]
plugin = "env_package:Plugin"
"#,
        log_file.display().to_string().replace('\\', "\\\\")
    );
    if fs::write(&fixture, content).is_err() {
        return;
    }

    std::env::set_var(FIXTURES_ENV_VAR, &fixture);
    let registry = registry_from_env();
    std::env::remove_var(FIXTURES_ENV_VAR);

    let registry = registry.unwrap_or_else(|_| unreachable!());
    assert_eq!(registry.package_names(), vec!["env-package".to_string()]);
    assert!(!registry.is_active());
    let eps = registry.query_entry_points(&Criteria::new().group("env.plugins"));
    assert!(eps.get("plugin").is_some_and(|ep| ep.value() == "env_package:Plugin"));

    assert_eq!(logger::get_log_path(), Some(log_file.clone()));
    let written = fs::read_to_string(&log_file).unwrap_or_default();
    assert!(written.contains("Loaded 1 fixture packages"));
    logger::close();

    std::env::set_var(FIXTURES_ENV_VAR, dir.path().join("missing.toml"));
    let missing = registry_from_env();
    std::env::remove_var(FIXTURES_ENV_VAR);
    assert!(matches!(missing, Err(FixtureError::Config(_))));
}
