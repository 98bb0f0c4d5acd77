//! Names — display-name lookup for simulated remote participants.
//!
//! DESIGN
//! ======
//! [`NameProvider`] is the only seam the conversation state depends on. It is
//! shared read-only behind an `Arc` and has no mutable state. The HTTP
//! implementation lives in [`http`]; [`WithFallbackNames`] wraps any provider
//! and substitutes a name from [`FALLBACK_NAMES`] when the lookup fails.
//! A service that answers with an empty roster is not a failure: the
//! participant is shown as [`ANONYMOUS_NAME`].

pub mod http;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use http::HttpNameProvider;

/// Identity shown when the names service has nobody to offer.
pub const ANONYMOUS_NAME: &str = "Unknown User";

/// Substitutes used when the names service is unreachable.
pub const FALLBACK_NAMES: [&str; 10] = [
    "Miss Alice Bradtke",
    "Lora Prosacco",
    "Cindy Langosh MD",
    "Timmy Hauck",
    "Alice Stoltenberg",
    "Jacob Denesik V",
    "Elizabeth Tillman",
    "Roy Hane",
    "Melvin Bergstrom",
    "Jennie Hahn",
];

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by name lookups.
#[derive(Debug, thiserror::Error)]
pub enum NameError {
    /// The HTTP request to the names service failed.
    #[error("names request failed: {0}")]
    Request(String),

    /// The names service returned a non-success HTTP status.
    #[error("names response error: status {status}")]
    Response { status: u16, body: String },

    /// The names service response body could not be deserialized.
    #[error("names response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl NameError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// One entry of the names service roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub name: String,
    pub id: String,
}

/// Asynchronous display-name lookup.
#[async_trait::async_trait]
pub trait NameProvider: Send + Sync {
    /// Produce a display name for a participant.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] if the lookup fails. Callers are expected to
    /// recover locally rather than surface the error.
    async fn request_name(&self) -> Result<String, NameError>;
}

// =============================================================================
// FALLBACK ADAPTER
// =============================================================================

/// Wraps a provider and answers with a random [`FALLBACK_NAMES`] entry when
/// the inner lookup fails.
pub struct WithFallbackNames<P> {
    inner: P,
}

impl<P: NameProvider> WithFallbackNames<P> {
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<P: NameProvider> NameProvider for WithFallbackNames<P> {
    async fn request_name(&self) -> Result<String, NameError> {
        match self.inner.request_name().await {
            Ok(name) => Ok(name),
            Err(e) => {
                let name = random_fallback_name();
                warn!(error = %e, retryable = e.retryable(), fallback = name, "name lookup failed; using fallback name");
                Ok(name.to_string())
            }
        }
    }
}

/// Pick one of [`FALLBACK_NAMES`] uniformly at random.
#[must_use]
pub fn random_fallback_name() -> &'static str {
    FALLBACK_NAMES.choose(&mut rand::rng()).copied().unwrap_or(FALLBACK_NAMES[0])
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
