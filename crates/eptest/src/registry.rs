//! Test registry of fake installed packages
//!
//! A [`DiscoveryRegistry`] owns a name-keyed set of [`PackageRecord`]s and,
//! once activated, sits at the tail of a [`DiscoveryChain`] so every host
//! query sees its packages. Lifecycle is explicit: construct, activate, use,
//! deactivate, discard. [`DiscoveryRegistry::activate_scoped`] ties
//! deactivation to a guard instead.

use crate::chain::{ChainHandle, DiscoveryChain, DiscoveryProvider, ProviderRef};
use crate::collection::EntryPointCollection;
use crate::entry_point::Criteria;
use crate::errors::StateError;
use crate::package::{DiscoveryContext, PackageRecord};
use ahash::AHashSet;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct RegistryState {
    packages: RwLock<BTreeMap<String, Arc<PackageRecord>>>,
}

impl DiscoveryProvider for RegistryState {
    fn find_distributions(&self, context: &DiscoveryContext) -> Vec<Arc<PackageRecord>> {
        self.packages
            .read()
            .values()
            .filter(|package| package.matches(context))
            .cloned()
            .collect()
    }
}

/// Name-keyed set of fake packages that can join a discovery chain
#[derive(Debug, Default)]
pub struct DiscoveryRegistry {
    state: Arc<RegistryState>,
    chains: Mutex<Vec<ChainHandle>>,
}

impl DiscoveryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle under which this registry appears in a chain
    pub fn as_provider(&self) -> ProviderRef {
        self.state.clone()
    }

    /// Append this registry to the process-wide discovery chain
    pub fn activate(&self) -> Result<(), StateError> {
        self.activate_in(DiscoveryChain::global())
    }

    /// Append this registry to `chain`
    pub fn activate_in(&self, chain: &DiscoveryChain) -> Result<(), StateError> {
        let provider = self.as_provider();
        if chain.contains(&provider) {
            return Err(StateError::AlreadyActive);
        }
        chain.append(provider);
        self.chains.lock().push(chain.handle());
        info!("Activated registry with {} packages", self.len());
        Ok(())
    }

    /// Remove this registry from the process-wide discovery chain
    pub fn deactivate(&self) -> Result<(), StateError> {
        self.deactivate_in(DiscoveryChain::global())
    }

    /// Remove this registry from `chain`
    pub fn deactivate_in(&self, chain: &DiscoveryChain) -> Result<(), StateError> {
        if !chain.remove(&self.as_provider()) {
            return Err(StateError::NotActive);
        }
        self.chains.lock().retain(|handle| !handle.refers_to(chain));
        info!("Deactivated registry");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active_in(DiscoveryChain::global())
    }

    pub fn is_active_in(&self, chain: &DiscoveryChain) -> bool {
        chain.contains(&self.as_provider())
    }

    /// Activate in the process-wide chain until the returned guard is dropped
    pub fn activate_scoped(&self) -> Result<ActiveRegistry<'_>, StateError> {
        self.activate_scoped_in(DiscoveryChain::global())
    }

    /// Activate in `chain` until the returned guard is dropped
    pub fn activate_scoped_in<'a>(
        &'a self,
        chain: &'a DiscoveryChain,
    ) -> Result<ActiveRegistry<'a>, StateError> {
        self.activate_in(chain)?;
        Ok(ActiveRegistry {
            registry: self,
            chain,
        })
    }

    /// Remove every package. Activation is unaffected.
    pub fn clear(&self) {
        self.state.packages.write().clear();
        debug!("Cleared registry");
    }

    /// Register `package` under its name, replacing any previous one
    pub fn add_package(&self, package: PackageRecord) {
        let name = package.name().to_string();
        let previous = self
            .state
            .packages
            .write()
            .insert(name.clone(), Arc::new(package));
        if previous.is_some() {
            debug!("Replaced package '{}'", name);
        } else {
            debug!("Added package '{}'", name);
        }
    }

    /// Remove the package called `name`; absent names are ignored
    pub fn remove_package(&self, name: &str) {
        if self.state.packages.write().remove(name).is_some() {
            debug!("Removed package '{}'", name);
        }
    }

    pub fn package(&self, name: &str) -> Option<Arc<PackageRecord>> {
        self.state.packages.read().get(name).cloned()
    }

    pub fn contains_package(&self, name: &str) -> bool {
        self.state.packages.read().contains_key(name)
    }

    /// Registered package names in sorted order
    pub fn package_names(&self) -> Vec<String> {
        self.state.packages.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.packages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.packages.read().is_empty()
    }

    /// All registered packages; the context is passed to each package's `matches`
    pub fn query_packages(&self, context: &DiscoveryContext) -> Vec<Arc<PackageRecord>> {
        self.state.find_distributions(context)
    }

    /// Entry points across all registered packages that match `criteria`
    pub fn query_entry_points(&self, criteria: &Criteria) -> EntryPointCollection {
        let packages = self.state.packages.read();
        let mut seen = AHashSet::new();
        packages
            .values()
            .flat_map(|package| package.entry_points().iter())
            .filter(|ep| ep.matches(criteria))
            .filter(|ep| seen.insert(*ep))
            .cloned()
            .collect()
    }
}

impl Drop for DiscoveryRegistry {
    fn drop(&mut self) {
        let provider = self.as_provider();
        for handle in self.chains.get_mut().drain(..) {
            if handle.remove(&provider) {
                warn!("Registry dropped while active; removed it from a discovery chain");
            }
        }
    }
}

/// Guard returned by [`DiscoveryRegistry::activate_scoped`]
#[derive(Debug)]
pub struct ActiveRegistry<'a> {
    registry: &'a DiscoveryRegistry,
    chain: &'a DiscoveryChain,
}

impl Deref for ActiveRegistry<'_> {
    type Target = DiscoveryRegistry;

    fn deref(&self) -> &DiscoveryRegistry {
        self.registry
    }
}

impl Drop for ActiveRegistry<'_> {
    fn drop(&mut self) {
        match self.registry.deactivate_in(self.chain) {
            Ok(()) => {}
            Err(StateError::NotActive) => {
                debug!("Scoped registry was already deactivated");
            }
            Err(err) => debug!("Scoped deactivation failed: {}", err),
        }
    }
}
