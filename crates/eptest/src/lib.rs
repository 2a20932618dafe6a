//! Fake installed packages for plugin discovery tests
//!
//! Tests describe packages and their entry points in memory, register them in
//! a [`DiscoveryRegistry`], and activate it. From then on the host query
//! surface ([`discover`], [`entry_points`]) reports them alongside whatever
//! the other providers of the [`DiscoveryChain`] know about, until the
//! registry is deactivated.
//!
//! ```
//! use eptest::{entry_points, Criteria, DiscoveryRegistry, EntryPointDescriptor, PackageRecord};
//!
//! let registry = DiscoveryRegistry::new();
//! let ep = EntryPointDescriptor::new("foo", "doc.example", "pkgx").with_extras(["foo", "bar"]);
//! registry.add_package(PackageRecord::new("doc-example").with_entry_point(ep.clone()));
//!
//! let active = registry.activate_scoped().unwrap();
//! assert!(entry_points(&Criteria::new().group("doc.example")).contains(&ep));
//! drop(active);
//! assert!(entry_points(&Criteria::new().group("doc.example")).is_empty());
//! ```

pub mod chain;
pub mod collection;
pub mod entry_point;
pub mod errors;
pub mod fixtures;
pub mod metadata;
pub mod package;
pub mod registry;
pub mod symbols;

pub use chain::{discover, entry_points, DiscoveryChain, DiscoveryProvider, ProviderRef};
pub use collection::EntryPointCollection;
pub use entry_point::{Criteria, EntryPointDescriptor};
pub use errors::{EntryPointError, FixtureError, LoadError, StateError};
pub use package::{DiscoveryContext, PackageRecord};
pub use registry::{ActiveRegistry, DiscoveryRegistry};
pub use symbols::{Namespace, Symbol, SymbolRef, SymbolResolver, SymbolTable, Value};
