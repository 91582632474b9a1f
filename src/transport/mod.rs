pub mod session;

pub use session::JsonSession;

use serde_json::Value;

/// Errors from a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Status { status: u16, message: Option<String> },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("authentication declined")]
    AuthenticationDeclined,
}

/// Username/password credentials supplied in answer to a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Answers authentication challenges from the server.
///
/// Invoked synchronously when an exchange receives a challenge; returning
/// `None` declines it and fails the exchange with
/// [`TransportError::AuthenticationDeclined`].
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self, host: &str, realm: Option<&str>) -> Option<Credentials>;
}

/// A single JSON-over-HTTP request/response exchange.
///
/// `query` is an idempotent, body-less fetch; `submit` carries a body and is
/// not idempotent. Each invocation performs exactly one underlying network
/// exchange and never retries. Implementations include:
/// - [`JsonSession`] — the production reqwest-backed transport
/// - scripted fakes in the store's tests
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    async fn query(&self, path: &str) -> Result<Value, TransportError>;

    async fn submit(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    /// Whether an exchange is currently in flight. Callers use this to gate
    /// duplicate submissions of the same draft.
    fn is_in_flight(&self) -> bool;
}
