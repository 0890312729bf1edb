//! RookieShop back-office client core
//!
//! A gateway client for the RookieShop REST API with bearer authentication
//! and silent session renewal, typed domain services, a request-lifecycle
//! store with one slice per resource, pagination helpers and the admin role
//! guard.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod models;
pub mod services;
pub mod store;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::{AuthState, Identity, Navigator, OidcIdentity};
use crate::config::{ClientOptions, OidcSettings};
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::guard::RoleGuard;
use crate::models::Image;
use crate::store::{Services, Store};

/// The main entry point of the back-office client
pub struct RookieShop {
    options: ClientOptions,
    api: Arc<ApiClient>,
    store: Store,
}

impl RookieShop {
    /// Create a client that authenticates through `identity`
    ///
    /// # Example
    ///
    /// ```
    /// use rookie_shop_admin::{RookieShop, config::ClientOptions, auth::StaticIdentity};
    /// use std::sync::Arc;
    ///
    /// let identity = Arc::new(StaticIdentity::new(Some("token".into()), "roles"));
    /// let shop = RookieShop::new(ClientOptions::default(), identity).unwrap();
    /// ```
    pub fn new(options: ClientOptions, identity: Arc<dyn Identity>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Self::new_with_client(options, builder.build()?, identity)
    }

    /// Create a client over an existing HTTP client
    pub fn new_with_client(
        options: ClientOptions,
        http_client: Client,
        identity: Arc<dyn Identity>,
    ) -> Result<Self> {
        options.validate()?;

        let api = Arc::new(ApiClient::new(&options.api_url, http_client, identity)?);
        let store = Store::new(Services::api(api.clone(), &options.routes), &options);

        Ok(Self {
            options,
            api,
            store,
        })
    }

    /// Create a client backed by an OpenID Connect identity sharing the
    /// same HTTP client
    pub fn with_oidc(
        options: ClientOptions,
        settings: OidcSettings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<(Self, Arc<OidcIdentity>)> {
        settings.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let identity = Arc::new(OidcIdentity::new(settings, http_client.clone(), navigator));
        let shop = Self::new_with_client(options, http_client, identity.clone())?;
        Ok((shop, identity))
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn identity(&self) -> &Arc<dyn Identity> {
        self.api.identity()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// A guard requiring the configured role
    pub fn guard(&self) -> RoleGuard {
        RoleGuard::new(&self.options.required_role)
    }

    /// Address of an image's binary content
    pub fn image_url(&self, image: &Image) -> String {
        image.content_url(&self.options.api_url, &self.options.routes)
    }

    /// Drop all cached state whenever the identity signs out. Runs until
    /// the identity's state channel closes.
    pub async fn sync_with_identity(&self) {
        let mut states = self.identity().subscribe();

        loop {
            let signed_out = *states.borrow_and_update() == AuthState::SignedOut;
            if signed_out {
                log::info!("Signed out, clearing back-office state");
                self.store.reset();
            }

            if states.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthState, Identity, Navigator, OidcIdentity, StaticIdentity};
    pub use crate::config::{ClientOptions, OidcSettings};
    pub use crate::error::{Error, Result};
    pub use crate::guard::{GuardDecision, RoleGuard};
    pub use crate::models::*;
    pub use crate::store::{PageFetcher, PagedResource, RequestStatus, Store};
    pub use crate::RookieShop;
}
