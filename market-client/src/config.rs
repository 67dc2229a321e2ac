//! Client configuration
//!
//! The console talks to two backend groups that disagree on the auth
//! header: the newer API expects `Authorization: Bearer <token>`, the
//! legacy one the raw token. Each group is configured explicitly.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Backend group an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiGroup {
    /// Newer API (auth, affiliates, members, vendors, orders)
    Primary,
    /// Older API (vouchers, inventory, redemptions)
    Legacy,
}

/// How the session token is placed in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: <token>`
    Raw,
}

impl AuthScheme {
    pub fn header_value(self, token: &str) -> String {
        match self {
            AuthScheme::Bearer => format!("Bearer {}", token),
            AuthScheme::Raw => token.to_string(),
        }
    }
}

/// Base URL and header convention of one backend group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointGroup {
    pub base_url: String,
    pub auth_scheme: AuthScheme,
}

impl EndpointGroup {
    pub fn new(base_url: impl Into<String>, auth_scheme: AuthScheme) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_scheme,
        }
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Default delay between a successful submit and the modal closing
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(600);

/// Client configuration for the marketplace backends
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub primary: EndpointGroup,
    pub legacy: EndpointGroup,

    /// Request timeout in seconds
    pub timeout: u64,

    /// File holding the persisted session token
    pub token_file: PathBuf,

    /// Delay before a successful form closes itself
    pub close_delay: Duration,
}

impl ClientConfig {
    /// Both groups on one base URL, legacy group using the raw header
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            primary: EndpointGroup::new(base_url.clone(), AuthScheme::Bearer),
            legacy: EndpointGroup::new(base_url, AuthScheme::Raw),
            timeout: 30,
            token_file: PathBuf::from(".market/session.json"),
            close_delay: DEFAULT_CLOSE_DELAY,
        }
    }

    /// Read configuration from `MARKET_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("MARKET_API_URL")
            .map_err(|_| ClientError::Config("MARKET_API_URL is not set".into()))?;
        let mut config = Self::new(base_url);

        if let Ok(legacy) = std::env::var("MARKET_LEGACY_API_URL") {
            config = config.with_group(ApiGroup::Legacy, EndpointGroup::new(legacy, AuthScheme::Raw));
        }
        if let Ok(secs) = std::env::var("MARKET_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| ClientError::Config(format!("MARKET_TIMEOUT_SECS: invalid value '{}'", secs)))?;
            config = config.with_timeout(secs);
        }
        if let Ok(path) = std::env::var("MARKET_TOKEN_FILE") {
            config = config.with_token_file(path);
        }
        Ok(config)
    }

    /// Replace one backend group
    pub fn with_group(mut self, group: ApiGroup, endpoint: EndpointGroup) -> Self {
        match group {
            ApiGroup::Primary => self.primary = endpoint,
            ApiGroup::Legacy => self.legacy = endpoint,
        }
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn group(&self, group: ApiGroup) -> &EndpointGroup {
        match group {
            ApiGroup::Primary => &self.primary,
            ApiGroup::Legacy => &self.legacy,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
