//! Entry point metadata parsing
//!
//! Builds descriptors and packages from the two formats packages ship their
//! entry points in:
//! - entry_points.txt files (INI-style, one section per group)
//! - pyproject.toml files (`[project.entry-points.*]`, `[project.scripts]`)

pub mod parser;
pub mod pyproject;
