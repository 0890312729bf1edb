//! Types for authentication state and navigation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Mutex;
use url::Url;

/// Token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token
    pub access_token: String,

    /// The refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// The ID token
    #[serde(default)]
    pub id_token: Option<String>,

    /// The token type
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error body returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The signed-in user as seen through the access token claims
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Principal {
    pub subject: String,
    pub username: Option<String>,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Authentication state published by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Not settled yet (initial load, callback in progress)
    Loading,
    SignedOut,
    SignedIn(Principal),
}

impl AuthState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, AuthState::Loading)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthState::SignedIn(principal) => Some(principal),
            _ => None,
        }
    }
}

/// Where the host application should take the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Interactive sign-in at the identity provider
    SignIn(Url),
    /// End-session endpoint of the identity provider
    SignOut(Url),
    /// The "not allowed" screen
    Unauthorized,
    Home,
}

/// Host-side navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Navigator that only logs and remembers where it was sent.
#[derive(Debug, Default)]
pub struct LogNavigator {
    history: Mutex<Vec<Destination>>,
}

impl LogNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination navigated to so far, oldest first.
    pub fn history(&self) -> Vec<Destination> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, destination: Destination) {
        match &destination {
            Destination::SignIn(url) | Destination::SignOut(url) => {
                log::info!("Navigating to {}", url)
            }
            other => log::info!("Navigating to {:?}", other),
        }

        if let Ok(mut history) = self.history.lock() {
            history.push(destination);
        }
    }
}
