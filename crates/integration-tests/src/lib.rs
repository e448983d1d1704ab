//! Integration tests for Filament Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! docker compose up -d postgres
//! cargo run -p filament-shop-cli -- migrate
//!
//! # Start the storefront in another terminal
//! cargo run -p filament-shop-storefront
//!
//! # Run the ignored tests
//! cargo test -p filament-shop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - HTTP tests against a running storefront
//! - `postgres_store` - Store tests against a migrated database
//!
//! The storefront trusts identity headers set by the fronting proxy, so these
//! tests impersonate callers by sending the same headers.

use reqwest::{Client, RequestBuilder};
use secrecy::SecretString;
use uuid::Uuid;

/// Group name that grants the admin role.
pub const ADMIN_GROUP: &str = "ADMINS";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Database URL for store tests, with fallback to generic `DATABASE_URL`.
#[must_use]
pub fn database_url() -> Option<SecretString> {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// An email address no other test run will use.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.filament.shop", Uuid::new_v4().simple())
}

/// Who the request claims to come from.
#[derive(Debug, Clone)]
pub enum Caller {
    Guest,
    Customer(String),
    Admin(String),
}

/// Thin wrapper that adds identity headers to storefront requests.
#[derive(Debug, Clone)]
pub struct Storefront {
    client: Client,
    base_url: String,
}

impl Storefront {
    /// Client for the storefront at [`storefront_base_url`].
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            base_url: storefront_base_url(),
        }
    }

    #[must_use]
    pub fn get(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.with_identity(self.client.get(self.url(path)), caller)
    }

    #[must_use]
    pub fn post(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.with_identity(self.client.post(self.url(path)), caller)
    }

    #[must_use]
    pub fn put(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.with_identity(self.client.put(self.url(path)), caller)
    }

    #[must_use]
    pub fn delete(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.with_identity(self.client.delete(self.url(path)), caller)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    #[allow(clippy::unused_self)]
    fn with_identity(&self, builder: RequestBuilder, caller: &Caller) -> RequestBuilder {
        match caller {
            Caller::Guest => builder,
            Caller::Customer(email) => builder
                .header("x-auth-email", email)
                .header("x-auth-groups", "customers"),
            Caller::Admin(email) => builder
                .header("x-auth-email", email)
                .header("x-auth-groups", ADMIN_GROUP),
        }
    }
}
