use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::header;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::Config;

use super::{CredentialProvider, Credentials, Transport, TransportError};

/// The production transport: JSON exchanges over a shared reqwest client.
///
/// Credentials supplied in answer to a challenge are remembered and sent
/// preemptively on subsequent exchanges in the same session.
pub struct JsonSession {
    http: reqwest::Client,
    base_url: String,
    provider: Option<Arc<dyn CredentialProvider>>,
    last_credentials: Mutex<Option<Credentials>>,
    in_flight: AtomicUsize,
}

impl JsonSession {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.idle_timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            provider: None,
            last_credentials: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
        })
    }

    pub fn with_credential_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        credentials: Option<&Credentials>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(credentials) = credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        builder
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        // The guard keeps the count accurate even when the caller drops
        // the future before the exchange completes.
        let _guard = InFlightGuard::enter(&self.in_flight);
        self.exchange_inner(method, path, body).await
    }

    async fn exchange_inner(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let url = self.url_for(path);
        tracing::debug!(%method, %url, "sending JSON exchange");

        let remembered = self.last_credentials.lock().await.clone();
        let mut response = self
            .request(&method, &url, body.as_ref(), remembered.as_ref())
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Challenge round: resolving credentials and replaying them
            // completes the same logical exchange. It is not a retry.
            let realm = realm_from(response.headers().get(header::WWW_AUTHENTICATE));
            let host = reqwest::Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_owned))
                .unwrap_or_default();

            let provider = self
                .provider
                .as_ref()
                .ok_or(TransportError::AuthenticationDeclined)?;
            tracing::info!(%host, "authenticating HTTP exchange");
            let credentials = provider
                .credentials(&host, realm.as_deref())
                .ok_or(TransportError::AuthenticationDeclined)?;

            response = self
                .request(&method, &url, body.as_ref(), Some(&credentials))
                .send()
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            *self.last_credentials.lock().await = Some(credentials);
        }

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(extract_error_message);
            tracing::warn!(%status, %url, "exchange failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }
}

impl Transport for JsonSession {
    async fn query(&self, path: &str) -> Result<Value, TransportError> {
        self.exchange(Method::GET, path, None).await
    }

    async fn submit(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.exchange(Method::POST, path, Some(body)).await
    }

    fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Increments an exchange counter for its lifetime, decrementing on drop.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Pulls a human-readable message out of a structured error body.
fn extract_error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Extracts the realm from a `WWW-Authenticate` header, if present.
fn realm_from(header: Option<&header::HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?;
    let (_, rest) = value.split_once("realm=\"")?;
    let (realm, _) = rest.split_once('"')?;
    Some(realm.to_owned())
}
