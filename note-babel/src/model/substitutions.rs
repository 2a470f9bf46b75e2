//! Blob-URL substitution table.
//!
//! Images pasted into the editor reference short-lived `blob:` object URLs.
//! The editing surface records a durable `data:` URL for each of them here,
//! and the HTML serializer resolves `blob:` images through this table when a
//! note is saved.

use std::collections::{BTreeSet, HashMap};
use url::Url;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
    resolved: HashMap<String, String>,
    pending: BTreeSet<String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `blob:` URL seen while parsing, awaiting its data URL.
    pub fn register_blob(&mut self, blob_url: &str) {
        if !self.resolved.contains_key(blob_url) {
            self.pending.insert(blob_url.to_string());
        }
    }

    /// Supply the durable URL for a blob URL.
    pub fn provide(&mut self, blob_url: impl Into<String>, data_url: impl Into<String>) {
        let blob_url = blob_url.into();
        self.pending.remove(&blob_url);
        self.resolved.insert(blob_url, data_url.into());
    }

    pub fn resolve(&self, blob_url: &str) -> Option<&str> {
        self.resolved.get(blob_url).map(String::as_str)
    }

    /// Blob URLs registered but not yet provided.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.pending.is_empty()
    }
}

impl FromIterator<(String, String)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = Substitutions::new();
        for (blob_url, data_url) in iter {
            table.provide(blob_url, data_url);
        }
        table
    }
}

/// True for `blob:` object URLs.
pub fn is_blob_url(raw: &str) -> bool {
    has_scheme(raw, "blob")
}

/// True for inline `data:` URLs.
pub fn is_data_url(raw: &str) -> bool {
    has_scheme(raw, "data")
}

fn has_scheme(raw: &str, scheme: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => url.scheme() == scheme,
        Err(_) => false,
    }
}
