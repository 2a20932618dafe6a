//! pyproject.toml entry point parser (PEP 621)
//!
//! Reads `[project.entry-points.<group>]` tables plus the `[project.scripts]`
//! and `[project.gui-scripts]` shortcuts, which map to the `console_scripts`
//! and `gui_scripts` groups.

use crate::entry_point::EntryPointDescriptor;
use crate::errors::{EntryPointError, FixtureError};
use crate::package::PackageRecord;
use eptest_logger as logger;

/// Build a package record from pyproject.toml content
pub fn package_from_pyproject(content: &str) -> Result<PackageRecord, FixtureError> {
    let parsed: toml::Value = toml::from_str(content)?;
    let project = parsed.get("project");

    let name = project
        .and_then(|project| project.get("name"))
        .and_then(toml::Value::as_str)
        .ok_or(FixtureError::MissingProjectName)?;

    let mut package = PackageRecord::new(name);
    let Some(project) = project else {
        return Ok(package);
    };

    let mut tables: Vec<(&str, &toml::Table)> = Vec::new();
    if let Some(scripts) = project.get("scripts").and_then(toml::Value::as_table) {
        tables.push(("console_scripts", scripts));
    }
    if let Some(scripts) = project.get("gui-scripts").and_then(toml::Value::as_table) {
        tables.push(("gui_scripts", scripts));
    }
    if let Some(entry_points) = project.get("entry-points").and_then(toml::Value::as_table) {
        for (group, values) in entry_points {
            let Some(table) = values.as_table() else {
                logger::warn(&format!(
                    "Skipping entry point group '{}' in pyproject.toml: not a table",
                    group
                ));
                continue;
            };
            tables.push((group.as_str(), table));
        }
    }

    for (group, table) in tables {
        for (ep_name, target) in table {
            let Some(target) = target.as_str() else {
                return Err(FixtureError::EntryPoint {
                    package: name.to_string(),
                    source: EntryPointError::InvalidValue {
                        name: ep_name.clone(),
                        value: target.to_string(),
                    },
                });
            };
            let descriptor = EntryPointDescriptor::parse(ep_name.as_str(), group, target)
                .map_err(|source| FixtureError::EntryPoint {
                    package: name.to_string(),
                    source,
                })?;
            package.add_entry_point(descriptor);
        }
    }

    logger::debug(&format!(
        "Parsed {} entry points for '{}' from pyproject.toml",
        package.entry_points().len(),
        name
    ));
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_point::Criteria;

    #[test]
    fn test_package_from_pyproject() {
        let content = r#"
[project]
name = "acme-grid"
version = "0.1.0"

[project.scripts]
acme = "acme_grid.cli:main"

[project.gui-scripts]
acme-gui = "acme_grid.gui:run"

[project.entry-points."app.plugins"]
grid = "acme_grid:GridParser"

[project.entry-points."app.transforms"]
add-pcm-defaults = "acme_grid.sysmod:add_pcm_defaults [pcm]"
"#;
        let package = package_from_pyproject(content).unwrap_or_else(|_| unreachable!());
        assert_eq!(package.name(), "acme-grid");
        assert_eq!(package.entry_points().len(), 4);

        let scripts = package
            .entry_points()
            .select(&Criteria::new().group("console_scripts"));
        assert!(scripts.get("acme").is_some_and(|ep| ep.value() == "acme_grid.cli:main"));

        let gui = package.entry_points().select(&Criteria::new().group("gui_scripts"));
        assert_eq!(gui.len(), 1);

        let transforms = package
            .entry_points()
            .select(&Criteria::new().group("app.transforms"));
        assert!(transforms
            .get("add-pcm-defaults")
            .is_some_and(|ep| ep.extras() == ["pcm"]));
    }

    #[test]
    fn test_missing_project_name() {
        let result = package_from_pyproject("[tool.other]\nkey = 1\n");
        assert!(matches!(result, Err(FixtureError::MissingProjectName)));
    }

    #[test]
    fn test_invalid_toml() {
        let result = package_from_pyproject("not valid toml {{{");
        assert!(matches!(result, Err(FixtureError::Toml(_))));
    }

    #[test]
    fn test_invalid_entry_point_value() {
        let content = r#"
[project]
name = "broken"

[project.entry-points.group]
bad = "not a target"
"#;
        let result = package_from_pyproject(content);
        assert!(matches!(
            result,
            Err(FixtureError::EntryPoint { ref package, .. }) if package == "broken"
        ));
    }

    #[test]
    fn test_non_string_entry_point_value() {
        let content = r#"
[project]
name = "numeric"

[project.scripts]
ok = "numeric.cli:main"

[project.entry-points.group]
bad = 3
"#;
        let result = package_from_pyproject(content);
        assert!(matches!(
            result,
            Err(FixtureError::EntryPoint {
                ref package,
                source: EntryPointError::InvalidValue { ref name, ref value },
            }) if package == "numeric" && name == "bad" && value == "3"
        ));
    }

    #[test]
    fn test_project_without_entry_points() {
        let package = package_from_pyproject("[project]\nname = \"bare\"\n");
        assert!(package.is_ok_and(|p| p.entry_points().is_empty()));
    }
}
