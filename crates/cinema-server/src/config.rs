//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server starts with zero configuration
//! for local development. Without admin credentials every credentialed
//! endpoint is closed.

use std::net::SocketAddr;

use cinema_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Human-readable name for this instance, reported by `/health`.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Cinema Catalog"`
    pub instance_name: String,

    /// Admin email accepted by create and relation endpoints.
    /// Env: `ADMIN_EMAIL`
    pub admin_email: Option<String>,

    /// Admin password accepted by create and relation endpoints.
    /// Env: `ADMIN_PASSWORD`
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("instance_name", &self.instance_name)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            instance_name: "Cinema Catalog".to_string(),
            admin_email: None,
            admin_password: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        if let Some(email) = lookup("ADMIN_EMAIL") {
            if !email.trim().is_empty() {
                config.admin_email = Some(email.trim().to_string());
            }
        }

        if let Some(password) = lookup("ADMIN_PASSWORD") {
            if !password.is_empty() {
                config.admin_password = Some(password);
            }
        }

        config
    }

    /// True when both halves of the admin pair are configured.
    pub fn admin_enabled(&self) -> bool {
        self.admin_email.is_some() && self.admin_password.is_some()
    }
}
