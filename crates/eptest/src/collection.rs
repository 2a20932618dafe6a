//! Ordered entry point storage with name enumeration and selection

use crate::entry_point::{Criteria, EntryPointDescriptor};
use ahash::AHashSet;
use std::collections::BTreeSet;

/// Entry points of one package, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointCollection {
    entries: Vec<EntryPointDescriptor>,
}

impl EntryPointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor. Duplicates are kept.
    pub fn add(&mut self, descriptor: EntryPointDescriptor) {
        self.entries.push(descriptor);
    }

    /// Distinct entry point names
    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.iter().map(EntryPointDescriptor::name).collect()
    }

    /// Distinct groups present in the collection
    pub fn groups(&self) -> BTreeSet<&str> {
        self.entries.iter().map(EntryPointDescriptor::group).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntryPointDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, descriptor: &EntryPointDescriptor) -> bool {
        self.entries.contains(descriptor)
    }

    /// First descriptor with the given name
    pub fn get(&self, name: &str) -> Option<&EntryPointDescriptor> {
        self.entries.iter().find(|ep| ep.name() == name)
    }

    /// Descriptors matching every criteria pair, each identity kept once.
    ///
    /// The result is a new collection; `self` is left untouched.
    pub fn select(&self, criteria: &Criteria) -> EntryPointCollection {
        let mut seen = AHashSet::new();
        self.entries
            .iter()
            .filter(|ep| ep.matches(criteria))
            .filter(|ep| seen.insert(*ep))
            .cloned()
            .collect()
    }
}

impl FromIterator<EntryPointDescriptor> for EntryPointCollection {
    fn from_iter<I: IntoIterator<Item = EntryPointDescriptor>>(iter: I) -> Self {
        EntryPointCollection {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<EntryPointDescriptor> for EntryPointCollection {
    fn extend<I: IntoIterator<Item = EntryPointDescriptor>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for EntryPointCollection {
    type Item = EntryPointDescriptor;
    type IntoIter = std::vec::IntoIter<EntryPointDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntryPointCollection {
    type Item = &'a EntryPointDescriptor;
    type IntoIter = std::slice::Iter<'a, EntryPointDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> EntryPointCollection {
        let mut eps = EntryPointCollection::new();
        eps.add(EntryPointDescriptor::new("grid", "app.plugins", "acme_grid").with_attr("GridParser"));
        eps.add(EntryPointDescriptor::new("add-pcm", "app.transforms", "acme_grid.sysmod").with_attr("add_pcm"));
        eps.add(EntryPointDescriptor::new("grid", "app.plugins", "acme_grid_v2").with_attr("GridParser"));
        eps
    }

    #[test]
    fn test_iteration_keeps_insertion_order_and_restarts() {
        let eps = collection();
        let first: Vec<_> = eps.iter().map(|ep| ep.target()).collect();
        let second: Vec<_> = (&eps).into_iter().map(|ep| ep.target()).collect();
        assert_eq!(first, vec!["acme_grid", "acme_grid.sysmod", "acme_grid_v2"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_names_are_distinct() {
        let eps = collection();
        assert_eq!(eps.len(), 3);
        assert_eq!(eps.names().into_iter().collect::<Vec<_>>(), vec!["add-pcm", "grid"]);
        assert_eq!(eps.groups().len(), 2);
    }

    #[test]
    fn test_select_empty_criteria_returns_everything() {
        let eps = collection();
        let all = eps.select(&Criteria::new());
        assert_eq!(all, eps);
    }

    #[test]
    fn test_select_keeps_duplicate_names_with_different_targets() {
        let eps = collection();
        let selected = eps.select(&Criteria::new().group("app.plugins").name("grid"));
        assert_eq!(selected.len(), 2);
        assert_eq!(eps.len(), 3);
    }

    #[test]
    fn test_select_collapses_identical_descriptors() {
        let mut eps = EntryPointCollection::new();
        let ep = EntryPointDescriptor::new("foo", "g", "pkgx");
        eps.add(ep.clone());
        eps.add(ep.clone());
        assert_eq!(eps.len(), 2);

        let selected = eps.select(&Criteria::new().group("g"));
        assert_eq!(selected.len(), 1);
        assert!(selected.contains(&ep));
    }

    #[test]
    fn test_select_no_match() {
        let eps = collection();
        assert!(eps.select(&Criteria::new().group("console_scripts")).is_empty());
        assert!(eps.get("grid").is_some_and(|ep| ep.target() == "acme_grid"));
        assert!(eps.get("missing").is_none());
    }
}
