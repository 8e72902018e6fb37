//! HTTP Client Pool for maintaining persistent connections per base URL.
//!
//! One `reqwest::Client` is kept per base URL so that a long discussion (a dozen or more
//! generative calls per run) reuses TCP and TLS sessions instead of reconnecting on
//! every turn.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Global HTTP client pool, lazily initialized on first access.
static HTTP_CLIENT_POOL: Lazy<Mutex<HashMap<String, reqwest::Client>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Get or create a shared HTTP client for the given base URL.
///
/// # Arguments
/// * `base_url` - The base URL for which to get/create an HTTP client
///
/// # Returns
/// A cloned reqwest::Client configured for persistent connections
pub fn get_http_client(base_url: &str) -> reqwest::Client {
    let mut pool = HTTP_CLIENT_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(client) = pool.get(base_url) {
        return client.clone();
    }

    // no whole-request timeout: streamed answers have no fixed length
    let client = reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|err| {
            log::warn!(
                "boardroom::clients::http_pool: falling back to default client: {}",
                err
            );
            reqwest::Client::new()
        });

    pool.insert(base_url.to_string(), client.clone());
    client
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_pool_caches_per_base_url() {
        let url = "https://generativelanguage.googleapis.com/v1beta/";
        let _client1 = get_http_client(url);
        let _client2 = get_http_client(url);

        let other = "http://127.0.0.1:9/";
        let _client3 = get_http_client(other);

        let pool = HTTP_CLIENT_POOL.lock().unwrap();
        assert!(pool.contains_key(url));
        assert!(pool.contains_key(other));
    }
}
