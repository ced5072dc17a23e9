//! Asynchronous option loading
//!
//! In async mode the select does not own its option list: options are fetched
//! on demand through a caller-supplied [`OptionsLoader`], and the current
//! value is passed through to the dropdown untouched because the caller
//! already holds the full selected record.
//!
//! # Caching
//!
//! Results can be cached by exact query text. Caching is controlled by a
//! [`CacheToken`]: while the token stays the same, repeated queries are
//! served from the cache; any change of token (including switching caching
//! off with `None`) drops every cached result. There is no size bound.
//!
//! Overlapping loads are allowed and are not cancelled. A load that finishes
//! after the token changed is handed back to its caller but not cached.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use super::options::{normalize, CallerOption, CanonicalOption};
use crate::error::{LoadError, Result, SelectError};

/// Boxed future returned by a loader
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Future of a single loader invocation
pub type LoadFuture = BoxFuture<std::result::Result<Vec<CallerOption>, LoadError>>;

type LoadFn = Arc<dyn Fn(String) -> LoadFuture + Send + Sync>;

/// Caller-supplied asynchronous query function
#[derive(Clone)]
pub struct OptionsLoader {
    load: LoadFn,
}

impl OptionsLoader {
    /// Wrap an async function `query -> Result<Vec<CallerOption>, E>`
    pub fn new<F, Fut, E>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<CallerOption>, E>> + Send + 'static,
        E: Into<LoadError>,
    {
        Self {
            load: Arc::new(move |query: String| -> LoadFuture {
                let fut = f(query);
                Box::pin(async move { fut.await.map_err(Into::into) })
            }),
        }
    }

    /// Start a query
    pub fn call(&self, query: String) -> LoadFuture {
        (self.load)(query)
    }
}

impl std::fmt::Debug for OptionsLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OptionsLoader")
    }
}

/// Caller-controlled cache invalidation token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheToken(u64);

impl CacheToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

struct GatewayInner {
    loader: Option<OptionsLoader>,
    token: Option<CacheToken>,
    /// Bumped on every invalidation so in-flight loads can detect staleness
    generation: u64,
    entries: FxHashMap<String, Vec<CanonicalOption>>,
    loader_calls: usize,
}

enum Pending {
    Cached(Vec<CanonicalOption>),
    Fetch {
        future: LoadFuture,
        generation: u64,
    },
}

/// Async-mode option source with an optional query cache
///
/// Cloning yields another handle to the same loader and cache.
#[derive(Clone)]
pub struct AsyncOptionsGateway {
    inner: Arc<Mutex<GatewayInner>>,
}

impl AsyncOptionsGateway {
    /// Create a gateway with an optional loader and cache token
    pub fn new(loader: Option<OptionsLoader>, token: Option<CacheToken>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GatewayInner {
                loader,
                token,
                generation: 0,
                entries: FxHashMap::default(),
                loader_calls: 0,
            })),
        }
    }

    /// Replace the loader. Cached results are kept.
    pub fn set_loader(&self, loader: Option<OptionsLoader>) {
        self.inner.lock().unwrap().loader = loader;
    }

    /// Apply the caller's cache token
    ///
    /// Returns true if the token changed and the cache was cleared.
    pub fn set_cache_token(&self, token: Option<CacheToken>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.token == token {
            return false;
        }
        tracing::debug!(
            "select async: cache token {:?} -> {:?}, dropping {} cached queries",
            inner.token,
            token,
            inner.entries.len()
        );
        inner.token = token;
        inner.generation += 1;
        inner.entries.clear();
        true
    }

    /// The current cache token
    pub fn cache_token(&self) -> Option<CacheToken> {
        self.inner.lock().unwrap().token
    }

    /// Load options for `query`, from the cache when possible
    pub async fn load(&self, query: &str) -> Result<Vec<CanonicalOption>> {
        match self.begin(query)? {
            Pending::Cached(options) => Ok(options),
            Pending::Fetch { future, generation } => {
                let loaded = future.await.map_err(SelectError::Load)?;
                let options = normalize(&loaded);
                self.finish(query, generation, &options);
                Ok(options)
            }
        }
    }

    /// A cached result, if caching is on and the query was seen
    pub fn cached(&self, query: &str) -> Option<Vec<CanonicalOption>> {
        let inner = self.inner.lock().unwrap();
        inner.token.and(inner.entries.get(query).cloned())
    }

    /// Number of cached queries
    pub fn cached_queries(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Number of times the loader has been invoked
    pub fn loader_calls(&self) -> usize {
        self.inner.lock().unwrap().loader_calls
    }

    fn begin(&self, query: &str) -> Result<Pending> {
        let mut inner = self.inner.lock().unwrap();
        if inner.token.is_some() {
            if let Some(hit) = inner.entries.get(query) {
                tracing::trace!("select async: cache hit for {:?}", query);
                return Ok(Pending::Cached(hit.clone()));
            }
        }
        let loader = inner.loader.clone().ok_or(SelectError::LoaderMissing)?;
        inner.loader_calls += 1;
        tracing::trace!("select async: loading {:?}", query);
        Ok(Pending::Fetch {
            future: loader.call(query.to_string()),
            generation: inner.generation,
        })
    }

    fn finish(&self, query: &str, generation: u64, options: &[CanonicalOption]) {
        let mut inner = self.inner.lock().unwrap();
        if inner.token.is_none() {
            return;
        }
        if inner.generation != generation {
            tracing::debug!("select async: discarding stale result for {:?}", query);
            return;
        }
        inner.entries.insert(query.to_string(), options.to_vec());
    }
}

impl std::fmt::Debug for AsyncOptionsGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("AsyncOptionsGateway")
            .field("has_loader", &inner.loader.is_some())
            .field("token", &inner.token)
            .field("cached_queries", &inner.entries.len())
            .finish()
    }
}
