//! Fake installed packages

use crate::collection::EntryPointCollection;
use crate::entry_point::EntryPointDescriptor;
use crate::errors::EntryPointError;
use crate::metadata::parser::parse_entry_points_txt;

/// Lookup context passed down a discovery chain.
///
/// Mirrors the shape of real discovery queries (an optional distribution
/// name and search path); providers are free to ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryContext {
    pub name: Option<String>,
    pub path: Vec<String>,
}

impl DiscoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context restricted to one distribution name
    pub fn named(name: impl Into<String>) -> Self {
        DiscoveryContext {
            name: Some(name.into()),
            path: Vec::new(),
        }
    }
}

/// A named package owning its entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    name: String,
    entry_points: EntryPointCollection,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        PackageRecord {
            name: name.into(),
            entry_points: EntryPointCollection::new(),
        }
    }

    /// Build a package from `entry_points.txt` content
    pub fn from_entry_points_txt(
        name: impl Into<String>,
        content: &str,
    ) -> Result<Self, EntryPointError> {
        let mut package = PackageRecord::new(name);
        package
            .entry_points
            .extend(parse_entry_points_txt(content)?);
        Ok(package)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with runs of `-`, `_` and `.` collapsed to `_`, lowercased
    pub fn normalized_name(&self) -> String {
        let mut normalized = String::with_capacity(self.name.len());
        let mut in_separator = false;
        for c in self.name.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !in_separator {
                    normalized.push('_');
                }
                in_separator = true;
            } else {
                normalized.extend(c.to_lowercase());
                in_separator = false;
            }
        }
        normalized
    }

    pub fn entry_points(&self) -> &EntryPointCollection {
        &self.entry_points
    }

    pub fn add_entry_point(&mut self, descriptor: EntryPointDescriptor) {
        self.entry_points.add(descriptor);
    }

    /// Builder form of [`add_entry_point`](Self::add_entry_point)
    pub fn with_entry_point(mut self, descriptor: EntryPointDescriptor) -> Self {
        self.add_entry_point(descriptor);
        self
    }

    /// Whether this package answers a lookup; every context matches
    pub fn matches(&self, _context: &DiscoveryContext) -> bool {
        true
    }
}
