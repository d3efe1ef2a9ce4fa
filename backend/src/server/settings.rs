//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from `APPROVALS_*` environment variables, CLI flags
//! or a config file. Unset fields fall back to the defaults below.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use approvals::domain::EmailAddress;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_MAIL_FROM: &str = "no-reply@approvals.invalid";
const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 3000;
const DEFAULT_CALLBACK_URL: &str = "http://localhost:8080/auth/google/callback";

/// Problems found while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid URL for {field}: {source}")]
    Url {
        field: &'static str,
        source: url::ParseError,
    },
    #[error("invalid email for {field}: {value:?}")]
    Email { field: &'static str, value: String },
    #[error("google_client_id and google_client_secret must be set together")]
    PartialGoogleCredentials,
    #[error("google_client_id and google_client_secret are required in release builds")]
    MissingGoogleCredentials,
}

/// Raw settings as configured.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APPROVALS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Debug builds run on in-memory stores without it.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Email granted approver rights on its first login.
    pub admin_email: Option<String>,
    /// Browser front-end origin; used for CORS and login redirects.
    pub frontend_url: Option<String>,
    /// HTTP mail relay endpoint. Emails are only logged when unset.
    pub mail_relay_url: Option<String>,
    /// Bearer key for the mail relay.
    pub mail_api_key: Option<String>,
    /// Sender address.
    pub mail_from: Option<String>,
    /// Per-recipient send timeout in milliseconds.
    pub notification_timeout_ms: Option<u64>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    /// OAuth2 redirect URL registered with Google.
    pub google_redirect_url: Option<String>,
}

/// Google OAuth2 client credentials.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    pub client_id: String,
    pub client_secret: String,
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::Url { field, source })
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Operator-supplied addresses must at least name a mail domain.
fn parse_address(field: &'static str, raw: &str) -> Result<EmailAddress, SettingsError> {
    let invalid = || SettingsError::Email {
        field,
        value: raw.to_owned(),
    };
    match raw.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            EmailAddress::new(raw).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Configured pool ceiling; zero is treated as unset.
    pub fn database_max_connections(&self) -> Option<u32> {
        self.database_max_connections.filter(|max| *max > 0)
    }

    pub fn admin_email(&self) -> Result<Option<EmailAddress>, SettingsError> {
        non_blank(self.admin_email.as_ref())
            .map(|raw| parse_address("admin_email", raw))
            .transpose()
    }

    pub fn frontend_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "frontend_url",
            non_blank(self.frontend_url.as_ref()).unwrap_or(DEFAULT_FRONTEND_URL),
        )
    }

    pub fn mail_relay_url(&self) -> Result<Option<Url>, SettingsError> {
        non_blank(self.mail_relay_url.as_ref())
            .map(|raw| parse_url("mail_relay_url", raw))
            .transpose()
    }

    pub fn mail_api_key(&self) -> Option<String> {
        non_blank(self.mail_api_key.as_ref()).map(str::to_owned)
    }

    pub fn mail_from(&self) -> Result<EmailAddress, SettingsError> {
        let raw = non_blank(self.mail_from.as_ref()).unwrap_or(DEFAULT_MAIL_FROM);
        parse_address("mail_from", raw)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(
            self.notification_timeout_ms
                .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT_MS),
        )
    }

    /// Callback URL handed to the identity provider.
    pub fn google_redirect_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "google_redirect_url",
            non_blank(self.google_redirect_url.as_ref()).unwrap_or(DEFAULT_CALLBACK_URL),
        )
    }

    /// Google credentials, or `None` to use the fixture provider.
    pub fn google_client(&self) -> Result<Option<GoogleClient>, SettingsError> {
        match (
            non_blank(self.google_client_id.as_ref()),
            non_blank(self.google_client_secret.as_ref()),
        ) {
            (Some(client_id), Some(client_secret)) => Ok(Some(GoogleClient {
                client_id: client_id.to_owned(),
                client_secret: client_secret.to_owned(),
            })),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialGoogleCredentials),
        }
    }

    /// Google credentials for builds that must not fall back to the fixture
    /// provider.
    pub fn required_google_client(&self) -> Result<GoogleClient, SettingsError> {
        self.google_client()?
            .ok_or(SettingsError::MissingGoogleCredentials)
    }
}
