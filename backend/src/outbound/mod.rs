//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: in-process repositories for tests and database-less debug runs.
//! - **mail**: HTTP mail relay and a log-only transport.
//! - **identity**: Google OAuth2 identity provider.

pub mod identity;
pub mod mail;
pub mod memory;
pub mod persistence;
