//
// Where variable values come from. The engine never reaches for these on its
// own; callers hand a `Lookup` to `Expression::resolve` or `evaluate_with`.
//

use std::collections::{BTreeMap, HashMap};

///
/// A source of configuration text keyed by variable name.
///
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

impl<T: Lookup + ?Sized> Lookup for Box<T> {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

///
/// A [`Lookup`] backed by a closure. See [`from_fn`].
///
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

///
/// Use a closure as a [`Lookup`].
///
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    FromFn(f)
}

impl<F: Fn(&str) -> Option<String>> Lookup for FromFn<F> {
    fn lookup(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }
}

///
/// Sources tried in order; the first that knows a name wins.
///
#[derive(Default)]
pub struct Layered {
    sources: Vec<Box<dyn Lookup + Send + Sync>>,
}

impl Layered {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, source: impl Lookup + Send + Sync + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: impl Lookup + Send + Sync + 'static) {
        self.sources.push(Box::new(source));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Lookup for Layered {
    fn lookup(&self, name: &str) -> Option<String> {
        self.sources.iter().enumerate().find_map(|(layer, source)| {
            let found = source.lookup(name)?;
            tracing::trace!(name, layer, "resolved");
            Some(found)
        })
    }
}

///
/// In-memory values, e.g. assignments made at runtime.
///
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<String, String>,
}

impl MapSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Lookup for MapSource {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

///
/// The process environment.
///
/// `Configured.Property` is read from `CONFIGURED_PROPERTY`, or from
/// `PREFIX_CONFIGURED_PROPERTY` when a prefix is set.
///
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    #[must_use]
    pub fn key(&self, name: &str) -> String {
        let key: String = name
            .chars()
            .map(|c| match c {
                '.' | '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        match &self.prefix {
            Some(prefix) => format!("{}_{key}", prefix.to_ascii_uppercase()),
            None => key,
        }
    }
}

impl Lookup for EnvSource {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(self.key(name)).ok()
    }
}
