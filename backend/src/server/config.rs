//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use approvals::domain::EmailAddress;
use approvals::outbound::persistence::DbPool;

use super::settings::GoogleClient;

/// How notification emails leave the process.
#[derive(Debug, Clone)]
pub enum MailDelivery {
    /// Post to an HTTP relay.
    Relay {
        endpoint: Url,
        from: EmailAddress,
        api_key: Option<String>,
    },
    /// Only log emails.
    Log,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) frontend_url: Url,
    pub(crate) callback_url: Url,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admin_email: Option<EmailAddress>,
    pub(crate) mail: MailDelivery,
    pub(crate) notification_timeout: Duration,
    pub(crate) google: Option<GoogleClient>,
    pub(crate) fixture_login: bool,
}

impl ServerConfig {
    /// Configuration with in-memory stores, log-only mail and the fixture
    /// identity provider. The fixture provider is only permitted in debug
    /// builds.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, frontend_url: Url, callback_url: Url) -> Self {
        Self {
            bind_addr,
            frontend_url,
            callback_url,
            db_pool: None,
            admin_email: None,
            mail: MailDelivery::Log,
            notification_timeout: Duration::from_secs(3),
            google: None,
            fixture_login: cfg!(debug_assertions),
        }
    }

    /// Use the Diesel repositories over `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_admin_email(mut self, admin_email: Option<EmailAddress>) -> Self {
        self.admin_email = admin_email;
        self
    }

    #[must_use]
    pub fn with_mail(mut self, mail: MailDelivery, timeout: Duration) -> Self {
        self.mail = mail;
        self.notification_timeout = timeout;
        self
    }

    /// Sign in through Google instead of the fixture provider.
    #[must_use]
    pub fn with_google(mut self, google: Option<GoogleClient>) -> Self {
        self.google = google;
        self
    }

    /// Permit or forbid the fixture provider when Google is not configured.
    #[must_use]
    pub fn with_fixture_login(mut self, allowed: bool) -> Self {
        self.fixture_login = allowed;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
