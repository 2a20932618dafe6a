//! Entry point descriptors and attribute matching
//!
//! A descriptor names a loadable symbol (`target`), an optional dotted
//! attribute path walked after loading, and a set of extras. Its canonical
//! `value` rendering is `target[:attr.path][ [extra1, extra2]]`, the same
//! text that appears on the right-hand side of an `entry_points.txt` line.

use crate::errors::{EntryPointError, LoadError};
use crate::symbols::{Symbol, SymbolRef, SymbolResolver, SymbolTable};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Conjunctive exact-match filter over descriptor attributes.
///
/// Recognized keys are `name`, `group`, `value`, `target` (alias `module`)
/// and `attr_path` (alias `attr`). Any other key never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pairs: BTreeMap<String, String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.insert(key.into(), value.into());
        self
    }

    pub fn group(self, group: impl Into<String>) -> Self {
        self.with("group", group)
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.with("name", name)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Criteria {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One loadable symbol exposed by a package
#[derive(Debug, Clone)]
pub struct EntryPointDescriptor {
    name: String,
    group: String,
    target: String,
    attr_path: Option<String>,
    extras: SmallVec<[String; 2]>,
    value: String,
}

impl EntryPointDescriptor {
    /// Create a descriptor pointing at `target` with no attribute path or extras
    pub fn new(name: impl Into<String>, group: impl Into<String>, target: impl Into<String>) -> Self {
        let mut ep = EntryPointDescriptor {
            name: name.into(),
            group: group.into(),
            target: target.into(),
            attr_path: None,
            extras: SmallVec::new(),
            value: String::new(),
        };
        ep.render_value();
        ep
    }

    /// Set the dotted attribute path. An empty path means none.
    pub fn with_attr(mut self, attr_path: impl Into<String>) -> Self {
        let attr_path = attr_path.into();
        self.attr_path = (!attr_path.is_empty()).then_some(attr_path);
        self.render_value();
        self
    }

    /// Set the extras. Repeated extras are kept once, in first-seen order.
    pub fn with_extras<I, S>(mut self, extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: SmallVec<[String; 2]> = SmallVec::new();
        for extra in extras {
            let extra = extra.into();
            if !unique.contains(&extra) {
                unique.push(extra);
            }
        }
        self.extras = unique;
        self.render_value();
        self
    }

    /// Build a descriptor from its textual value, e.g. `pkgx.sub:Thing.method [foo, bar]`
    pub fn parse(
        name: impl Into<String>,
        group: impl Into<String>,
        value: &str,
    ) -> Result<Self, EntryPointError> {
        let name = name.into();
        let invalid = || EntryPointError::InvalidValue {
            name: name.clone(),
            value: value.to_string(),
        };

        let (target, attr_path, extras) = split_value(value).ok_or_else(invalid)?;
        if name.trim().is_empty() {
            return Err(invalid());
        }

        Ok(EntryPointDescriptor::new(name.clone(), group, target)
            .with_attr(attr_path.unwrap_or_default())
            .with_extras(extras))
    }

    fn render_value(&mut self) {
        let mut value = self.target.clone();
        if let Some(attr_path) = &self.attr_path {
            value.push(':');
            value.push_str(attr_path);
        }
        if !self.extras.is_empty() {
            value.push_str(&format!(" [{}]", self.extras.join(", ")));
        }
        self.value = value;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Fully-qualified path of the symbol loaded first
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn attr_path(&self) -> Option<&str> {
        self.attr_path.as_deref()
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// Canonical rendering of target, attribute path and extras
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Attribute lookup used by [`matches`](Self::matches)
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(self.name.as_str()),
            "group" => Some(self.group.as_str()),
            "value" => Some(self.value.as_str()),
            "target" | "module" => Some(self.target.as_str()),
            "attr_path" | "attr" => Some(self.attr_path.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// True when every criteria pair equals the corresponding attribute
    pub fn matches(&self, criteria: &Criteria) -> bool {
        criteria
            .iter()
            .all(|(key, expected)| self.attribute(key) == Some(expected))
    }

    /// Load the target from the process-wide symbol table and walk the attribute path
    pub fn load(&self) -> Result<SymbolRef, LoadError> {
        self.load_with(SymbolTable::global())
    }

    /// Load the target through `resolver` and walk the attribute path
    pub fn load_with(&self, resolver: &dyn SymbolResolver) -> Result<SymbolRef, LoadError> {
        debug!("Loading entry point '{}' = {}", self.name, self.value);
        let mut object = resolver.resolve(&self.target)?;

        let Some(attr_path) = &self.attr_path else {
            return Ok(object);
        };

        let mut walked = self.target.clone();
        let mut separator = ':';
        for segment in attr_path.split('.') {
            object = object
                .member(segment)
                .ok_or_else(|| LoadError::Attribute {
                    owner: walked.clone(),
                    attribute: segment.to_string(),
                })?;
            walked.push(separator);
            walked.push_str(segment);
            separator = '.';
        }

        Ok(object)
    }

    fn key(&self) -> (&str, &str, &str) {
        (self.name.as_str(), self.value.as_str(), self.group.as_str())
    }
}

impl PartialEq for EntryPointDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntryPointDescriptor {}

impl Hash for EntryPointDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for EntryPointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Split `module[:attr] [extras]` into its parts
fn split_value(value: &str) -> Option<(&str, Option<&str>, Vec<&str>)> {
    let value = value.trim().trim_matches('"').trim_matches('\'').trim();

    let (head, extras) = match value.find('[') {
        Some(idx) => {
            let inner = value[idx + 1..].trim_end().strip_suffix(']')?;
            if inner.contains(['[', ']']) {
                return None;
            }
            let extras = inner
                .split(',')
                .map(str::trim)
                .filter(|extra| !extra.is_empty())
                .collect::<Vec<_>>();
            if !extras.iter().all(|extra| is_extra_token(extra)) {
                return None;
            }
            (value[..idx].trim_end(), extras)
        }
        None => (value, Vec::new()),
    };

    let (target, attr_path) = match head.split_once(':') {
        Some((target, attr_path)) => (target.trim(), Some(attr_path.trim())),
        None => (head, None),
    };

    if !is_dotted_path(target) || !attr_path.map_or(true, is_dotted_path) {
        return None;
    }

    Some((target, attr_path, extras))
}

fn is_dotted_path(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

fn is_extra_token(s: &str) -> bool {
    s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}
