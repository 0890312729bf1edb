//! Configuration options for the back-office client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Paths of each REST resource, relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoutes {
    pub categories: String,
    pub products: String,
    pub image_gallery: String,
    pub customers: String,
    pub stock_items: String,
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self {
            categories: "/product-catalog/api/categories".to_string(),
            products: "/product-catalog/api/products".to_string(),
            image_gallery: "/product-catalog/api/image-gallery".to_string(),
            customers: "/identity/api/customers".to_string(),
            stock_items: "/shopping/api/stock-items".to_string(),
        }
    }
}

/// Initial page size of each paged slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub products: u32,
    pub customers: u32,
    pub images: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            products: 8,
            customers: 10,
            images: 12,
        }
    }
}

/// Configuration options for the back-office client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the REST gateway
    pub api_url: String,

    /// Resource paths
    pub routes: ApiRoutes,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Initial page sizes
    pub page_sizes: PageSizes,

    /// Ignore fetch-page responses overtaken by a newer fetch of the same slice
    pub discard_stale_pages: bool,

    /// Role the signed-in user must carry to use the back office
    pub required_role: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5027".to_string(),
            routes: ApiRoutes::default(),
            request_timeout: Some(Duration::from_secs(30)),
            page_sizes: PageSizes::default(),
            discard_stale_pages: false,
            required_role: "admin".to_string(),
        }
    }
}

impl ClientOptions {
    /// Read the API URL from `ROOKIE_SHOP_API_URL`, keeping every other default.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("ROOKIE_SHOP_API_URL").map_err(|_| {
            Error::config("ROOKIE_SHOP_API_URL environment variable not found")
        })?;

        let options = Self::default().with_api_url(&api_url);
        options.validate()?;
        Ok(options)
    }

    /// Check that the API URL parses and the role is not empty.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_url)?;
        if self.required_role.trim().is_empty() {
            return Err(Error::config("required_role cannot be empty"));
        }
        Ok(())
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the resource routes
    pub fn with_routes(mut self, value: ApiRoutes) -> Self {
        self.routes = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the initial page sizes
    pub fn with_page_sizes(mut self, value: PageSizes) -> Self {
        self.page_sizes = value;
        self
    }

    /// Set whether overtaken fetch-page responses are dropped
    pub fn with_discard_stale_pages(mut self, value: bool) -> Self {
        self.discard_stale_pages = value;
        self
    }

    /// Set the role required by the guard
    pub fn with_required_role(mut self, value: &str) -> Self {
        self.required_role = value.to_string();
        self
    }
}

/// OpenID Connect settings of the identity provider
#[derive(Debug, Clone)]
pub struct OidcSettings {
    pub authority: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: String,
    pub scope: String,

    /// Claim holding the user's roles. Either a top-level array or
    /// `realm_access.roles` when absent at the top level.
    pub roles_claim: String,

    /// Token endpoint override; derived from the authority when unset
    pub token_endpoint: Option<String>,

    /// Authorization endpoint override; derived from the authority when unset
    pub authorization_endpoint: Option<String>,

    /// End-session endpoint override; derived from the authority when unset
    pub end_session_endpoint: Option<String>,
}

impl Default for OidcSettings {
    fn default() -> Self {
        Self {
            authority: "http://localhost:8080/realms/rookie-shop".to_string(),
            client_id: "rookie-shop-back-office-spa".to_string(),
            redirect_uri: "http://localhost:5173/callback".to_string(),
            post_logout_redirect_uri: "http://localhost:5173/".to_string(),
            scope: "openid profile".to_string(),
            roles_claim: "roles".to_string(),
            token_endpoint: None,
            authorization_endpoint: None,
            end_session_endpoint: None,
        }
    }
}

impl OidcSettings {
    /// Build settings from `ROOKIE_SHOP_OIDC_*` variables over the defaults.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(authority) = std::env::var("ROOKIE_SHOP_OIDC_AUTHORITY") {
            settings.authority = authority;
        }
        if let Ok(client_id) = std::env::var("ROOKIE_SHOP_OIDC_CLIENT_ID") {
            settings.client_id = client_id;
        }
        if let Ok(redirect_uri) = std::env::var("ROOKIE_SHOP_OIDC_REDIRECT_URI") {
            settings.redirect_uri = redirect_uri;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.authority)?;
        Url::parse(&self.redirect_uri)?;
        if self.client_id.is_empty() {
            return Err(Error::config("client_id cannot be empty"));
        }
        Ok(())
    }

    pub fn token_endpoint(&self) -> String {
        self.token_endpoint
            .clone()
            .unwrap_or_else(|| self.endpoint("token"))
    }

    pub fn authorization_endpoint(&self) -> String {
        self.authorization_endpoint
            .clone()
            .unwrap_or_else(|| self.endpoint("auth"))
    }

    pub fn end_session_endpoint(&self) -> String {
        self.end_session_endpoint
            .clone()
            .unwrap_or_else(|| self.endpoint("logout"))
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/protocol/openid-connect/{}",
            self.authority.trim_end_matches('/'),
            name
        )
    }

    /// Set the authority
    pub fn with_authority(mut self, value: &str) -> Self {
        self.authority = value.to_string();
        self
    }

    /// Set the client id
    pub fn with_client_id(mut self, value: &str) -> Self {
        self.client_id = value.to_string();
        self
    }

    /// Set the roles claim
    pub fn with_roles_claim(mut self, value: &str) -> Self {
        self.roles_claim = value.to_string();
        self
    }

    /// Set the token endpoint
    pub fn with_token_endpoint(mut self, value: &str) -> Self {
        self.token_endpoint = Some(value.to_string());
        self
    }
}
