//! Cache implementations
//!
//! - `RedbCache`: embedded persistent cache for upstream responses

mod redb_cache;

pub use redb_cache::RedbCache;

/// Generate a cache key from components using blake3 hash
///
/// Keys have a fixed length regardless of how long the inputs are.
#[must_use]
pub fn generate_cache_key(prefix: &str, components: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for component in components {
        hasher.update(component.as_bytes());
        hasher.update(b"|"); // Separator to avoid collisions
    }
    let hash = hasher.finalize();
    format!("{}:{}", prefix, hash.to_hex())
}

/// Cache key for one upstream request URL
///
/// Identical URLs share an entry, so a rerun inside the TTL is served
/// locally.
#[must_use]
pub fn response_cache_key(url: &str) -> String {
    generate_cache_key("openmeteo", &[url])
}
