//! Value resolution against a canonical option tree
//!
//! Callers hold raw keys (`"fr"`, `42`, `["a", "b"]`); the dropdown widget
//! wants the matching [`CanonicalOption`] records. [`resolve`] bridges the two.
//!
//! # Search order
//!
//! Lookup of a single key is an explicit two-pass search:
//!
//! 1. every group, in order, and within it every option in order
//!    (nested groups are searched depth-first);
//! 2. the top-level leaves, in order.
//!
//! The first leaf whose key equals the raw value wins. A grouped leaf
//! therefore beats a top-level leaf carrying the same key.

use std::sync::Arc;

use serde_json::Value;

use super::options::{leaves, CanonicalOption};

type ExtractFn = Arc<dyn Fn(&CanonicalOption) -> Value + Send + Sync>;

/// Derives the identity key of an option
///
/// The default reads the `value` field. The same extractor is used for
/// matching and for building change events.
#[derive(Clone, Default)]
pub struct KeyExtractor {
    extract: Option<ExtractFn>,
}

impl KeyExtractor {
    /// Key extractor backed by a custom function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CanonicalOption) -> Value + Send + Sync + 'static,
    {
        Self {
            extract: Some(Arc::new(f)),
        }
    }

    /// Key extractor reading an extra field of the option
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |opt| opt.extra.get(&name).cloned().unwrap_or(Value::Null))
    }

    /// Whether this is the default `value` extractor
    pub fn is_default(&self) -> bool {
        self.extract.is_none()
    }

    /// Extract the key of an option
    pub fn key(&self, option: &CanonicalOption) -> Value {
        match &self.extract {
            Some(f) => f(option),
            None => option.value.clone(),
        }
    }

    fn matches(&self, option: &CanonicalOption, raw: &Value) -> bool {
        match &self.extract {
            Some(f) => f(option) == *raw,
            None => option.value == *raw,
        }
    }
}

impl std::fmt::Debug for KeyExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyExtractor")
            .field("custom", &self.extract.is_some())
            .finish()
    }
}

/// The canonical record(s) matching a caller's raw value
///
/// `None` entries mark raw keys that matched nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResolvedValue {
    /// No selection
    #[default]
    Empty,
    /// Scalar mode
    Single(Option<CanonicalOption>),
    /// Multi mode, in the order of the raw sequence
    Multi(Vec<Option<CanonicalOption>>),
}

impl ResolvedValue {
    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        matches!(self, ResolvedValue::Empty)
    }

    /// Matched records, skipping unmatched entries
    pub fn matched(&self) -> Vec<&CanonicalOption> {
        match self {
            ResolvedValue::Empty => Vec::new(),
            ResolvedValue::Single(opt) => opt.iter().collect(),
            ResolvedValue::Multi(opts) => opts.iter().flatten().collect(),
        }
    }

    /// Number of raw entries that did not resolve
    pub fn unmatched_count(&self) -> usize {
        match self {
            ResolvedValue::Empty => 0,
            ResolvedValue::Single(opt) => usize::from(opt.is_none()),
            ResolvedValue::Multi(opts) => opts.iter().filter(|o| o.is_none()).count(),
        }
    }

    /// Labels of the matched records, for display
    pub fn labels(&self) -> Vec<&str> {
        self.matched().into_iter().map(|o| o.label.as_str()).collect()
    }

    /// Keys of the resolved value, shaped like the value itself
    ///
    /// `Empty` gives `Null`; unmatched entries give `Null`.
    pub fn keys(&self, key: &KeyExtractor) -> Value {
        match self {
            ResolvedValue::Empty => Value::Null,
            ResolvedValue::Single(opt) => opt.as_ref().map_or(Value::Null, |o| key.key(o)),
            ResolvedValue::Multi(opts) => Value::Array(
                opts.iter()
                    .map(|o| o.as_ref().map_or(Value::Null, |o| key.key(o)))
                    .collect(),
            ),
        }
    }
}

/// Resolve a raw value against a canonical tree
///
/// The multiplicity of the result follows `multiple`, not the shape of
/// `raw`: in multi mode a scalar is treated as a one-element sequence; in
/// scalar mode a sequence is looked up as a single key.
pub fn resolve(
    raw: Option<&Value>,
    options: &[CanonicalOption],
    key: &KeyExtractor,
    multiple: bool,
) -> ResolvedValue {
    let raw = match raw {
        None | Some(Value::Null) => return ResolvedValue::Empty,
        Some(raw) => raw,
    };

    if multiple {
        let entries = match raw {
            Value::Array(items) => items
                .iter()
                .map(|v| find_option(v, options, key).cloned())
                .collect(),
            scalar => vec![find_option(scalar, options, key).cloned()],
        };
        ResolvedValue::Multi(entries)
    } else {
        ResolvedValue::Single(find_option(raw, options, key).cloned())
    }
}

/// Find the option whose key equals `raw`, using the two-pass search order
pub fn find_option<'a>(
    raw: &Value,
    options: &'a [CanonicalOption],
    key: &KeyExtractor,
) -> Option<&'a CanonicalOption> {
    let found = find_in_groups(raw, options, key).or_else(|| find_top_level(raw, options, key));
    if found.is_none() {
        tracing::debug!("select: value {} matched no option", raw);
    }
    found
}

fn find_in_groups<'a>(
    raw: &Value,
    options: &'a [CanonicalOption],
    key: &KeyExtractor,
) -> Option<&'a CanonicalOption> {
    options
        .iter()
        .filter(|node| node.is_group())
        .find_map(|group| leaves(group.children()).find(|leaf| key.matches(leaf, raw)))
}

fn find_top_level<'a>(
    raw: &Value,
    options: &'a [CanonicalOption],
    key: &KeyExtractor,
) -> Option<&'a CanonicalOption> {
    options
        .iter()
        .filter(|node| !node.is_group())
        .find(|leaf| key.matches(leaf, raw))
}
