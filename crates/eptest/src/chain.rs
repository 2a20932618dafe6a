//! Host discovery chain
//!
//! An ordered list of [`DiscoveryProvider`]s consulted front to back by the
//! host query surface ([`discover`], [`entry_points`]). Real providers sit at
//! the front; test registries append themselves at the tail so anything
//! genuinely installed keeps precedence.
//!
//! Membership is by identity: the same provider handle appended twice is two
//! entries, and removal drops the first occurrence.

use crate::collection::EntryPointCollection;
use crate::entry_point::Criteria;
use crate::package::{DiscoveryContext, PackageRecord};
use crate::symbols::SymbolRef;
use ahash::AHashSet;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// A member of the discovery chain
pub trait DiscoveryProvider: Send + Sync {
    /// Packages this provider knows about for the given lookup context
    fn find_distributions(&self, context: &DiscoveryContext) -> Vec<Arc<PackageRecord>>;

    /// Module-loading hook; providers that only describe packages never handle it
    fn find_spec(&self, _fullname: &str, _path: Option<&[String]>) -> Option<SymbolRef> {
        None
    }

    /// Drop any cached lookups
    fn invalidate_caches(&self) {}
}

/// Shared handle to a provider in the chain
pub type ProviderRef = Arc<dyn DiscoveryProvider>;

static GLOBAL_CHAIN: Lazy<DiscoveryChain> = Lazy::new(DiscoveryChain::new);

type Providers = RwLock<Vec<ProviderRef>>;

#[derive(Default)]
pub struct DiscoveryChain {
    providers: Arc<Providers>,
}

impl fmt::Debug for DiscoveryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryChain")
            .field("providers", &self.len())
            .finish()
    }
}

/// Identity comparison on the data pointer only
fn same_provider(a: &ProviderRef, b: &ProviderRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

fn remove_first(providers: &Providers, provider: &ProviderRef) -> bool {
    let mut providers = providers.write();
    let Some(index) = providers.iter().position(|p| same_provider(p, provider)) else {
        return false;
    };
    providers.remove(index);
    debug!("Removed provider from discovery chain ({} left)", providers.len());
    true
}

/// Non-owning reference to a chain
#[derive(Clone)]
pub(crate) struct ChainHandle(Weak<Providers>);

impl ChainHandle {
    pub(crate) fn refers_to(&self, chain: &DiscoveryChain) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&chain.providers))
    }

    /// Remove the first occurrence of `provider` if the chain still exists
    pub(crate) fn remove(&self, provider: &ProviderRef) -> bool {
        self.0
            .upgrade()
            .is_some_and(|providers| remove_first(&providers, provider))
    }
}

impl fmt::Debug for ChainHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChainHandle")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl DiscoveryChain {
    /// An empty, standalone chain
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide chain used by [`discover`] and [`entry_points`]
    pub fn global() -> &'static DiscoveryChain {
        &GLOBAL_CHAIN
    }

    /// Add a provider at the tail
    pub fn append(&self, provider: ProviderRef) {
        let mut providers = self.providers.write();
        providers.push(provider);
        debug!("Appended provider to discovery chain ({} total)", providers.len());
    }

    /// Remove the first occurrence of `provider`. Returns false when absent.
    pub fn remove(&self, provider: &ProviderRef) -> bool {
        remove_first(&self.providers, provider)
    }

    pub(crate) fn handle(&self) -> ChainHandle {
        ChainHandle(Arc::downgrade(&self.providers))
    }

    pub fn contains(&self, provider: &ProviderRef) -> bool {
        self.occurrences(provider) > 0
    }

    /// How many times `provider` appears in the chain
    pub fn occurrences(&self, provider: &ProviderRef) -> usize {
        self.providers
            .read()
            .iter()
            .filter(|p| same_provider(p, provider))
            .count()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Snapshot of the providers in consultation order
    pub fn providers(&self) -> Vec<ProviderRef> {
        self.providers.read().clone()
    }

    /// Every package reported by every provider, front to back
    pub fn discover(&self, context: &DiscoveryContext) -> Vec<Arc<PackageRecord>> {
        // Providers are called on a snapshot so they may touch the chain themselves.
        let packages: Vec<_> = self
            .providers()
            .iter()
            .flat_map(|provider| provider.find_distributions(context))
            .collect();
        trace!("Discovered {} packages", packages.len());
        packages
    }

    /// Entry points matching `criteria` across all discovered packages.
    ///
    /// Packages are deduplicated by normalized name before selection; the
    /// first provider to report a name shadows later ones. Identical
    /// descriptors reported by different packages appear once.
    pub fn entry_points(&self, criteria: &Criteria) -> EntryPointCollection {
        let packages = self.discover(&DiscoveryContext::new());
        let mut names = AHashSet::new();
        let mut seen = AHashSet::new();
        let mut selected = EntryPointCollection::new();

        for package in &packages {
            if !names.insert(package.normalized_name()) {
                trace!("Skipping shadowed package '{}'", package.name());
                continue;
            }
            selected.extend(
                package
                    .entry_points()
                    .iter()
                    .filter(|ep| ep.matches(criteria))
                    .filter(|ep| seen.insert(*ep))
                    .cloned(),
            );
        }

        selected
    }

    /// First provider that handles `fullname`
    pub fn find_spec(&self, fullname: &str, path: Option<&[String]>) -> Option<SymbolRef> {
        self.providers()
            .iter()
            .find_map(|provider| provider.find_spec(fullname, path))
    }

    pub fn invalidate_caches(&self) {
        for provider in self.providers() {
            provider.invalidate_caches();
        }
    }
}

/// Enumerate installed packages through the process-wide chain
pub fn discover(context: &DiscoveryContext) -> Vec<Arc<PackageRecord>> {
    DiscoveryChain::global().discover(context)
}

/// Enumerate entry points through the process-wide chain
pub fn entry_points(criteria: &Criteria) -> EntryPointCollection {
    DiscoveryChain::global().entry_points(criteria)
}
