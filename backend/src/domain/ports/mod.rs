//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod identity_resolver;
mod mail_transport;
mod notification_dispatcher;
mod request_lifecycle;
mod request_repository;
mod user_repository;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use identity_resolver::MockIdentityResolver;
pub use identity_resolver::IdentityResolver;
#[cfg(test)]
pub use mail_transport::MockMailTransport;
pub use mail_transport::{MailTransport, MailTransportError};
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::NotificationDispatcher;
#[cfg(test)]
pub use request_lifecycle::MockRequestLifecycle;
pub use request_lifecycle::RequestLifecycle;
#[cfg(test)]
pub use request_repository::MockRequestRepository;
pub use request_repository::{RequestRepository, RequestRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
