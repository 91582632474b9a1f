use std::time::Duration;

/// Client-side configuration for the sync core.
///
/// `base_url` is the root of the incident management API; all request paths
/// are resolved relative to it.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/ims/api".into(),
            user_agent: concat!("incidents/", env!("CARGO_PKG_VERSION")).into(),
            idle_timeout: Duration::from_secs(30),
        }
    }
}
