//! Mock registry: canned responses that replace live execution.

use crate::response::HttpResponse;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::RwLock;

/// Lookup table consulted before every real call.
///
/// A hit fully replaces network execution: no transaction is constructed, no
/// compliance check runs, and the timing is whatever the canned response
/// carries (typically zeros). Matching is exact on the (method, url) pair:
/// no wildcards, no partial matches.
pub trait MockRegistry: Send + Sync {
    /// Returns the canned response for this exact (method, url), if any.
    fn find(&self, method: &Method, url: &str) -> Option<HttpResponse>;
}

/// In-memory registry keyed by exact (method, url).
///
/// Registering the same pair twice replaces the earlier entry.
#[derive(Default)]
pub struct StaticMockRegistry {
    entries: RwLock<HashMap<(Method, String), HttpResponse>>,
}

impl StaticMockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned response under its own (method, url).
    pub fn register(&self, response: HttpResponse) {
        let key = (response.method().clone(), response.url().to_string());
        self.entries
            .write()
            .expect("mock registry lock poisoned")
            .insert(key, response);
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("mock registry lock poisoned")
            .len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MockRegistry for StaticMockRegistry {
    fn find(&self, method: &Method, url: &str) -> Option<HttpResponse> {
        self.entries
            .read()
            .expect("mock registry lock poisoned")
            .get(&(method.clone(), url.to_string()))
            .cloned()
    }
}
