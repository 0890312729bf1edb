//! Identity collaborator: access tokens, silent renewal and sign-in redirects

mod session;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use url::Url;

use crate::config::OidcSettings;
use crate::error::{Error, Result};

pub use session::*;
pub use types::*;

/// Source of bearer credentials for the gateway client
#[async_trait]
pub trait Identity: Send + Sync {
    /// The current access token, if any
    async fn access_token(&self) -> Option<String>;

    /// Renew the session without user interaction.
    ///
    /// `Ok(None)` means no renewal was possible (e.g. no refresh token).
    async fn sign_in_silent(&self) -> Result<Option<String>>;

    /// Send the user to the interactive sign-in page.
    async fn sign_in_redirect(&self) -> Result<()>;

    /// The current authentication state
    fn state(&self) -> AuthState;

    /// Receive every authentication state change
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}

/// OpenID Connect identity backed by the provider's token endpoint
pub struct OidcIdentity {
    settings: OidcSettings,
    http_client: Client,
    session: Arc<RwLock<Option<Session>>>,
    state: watch::Sender<AuthState>,
    navigator: Arc<dyn Navigator>,
}

impl OidcIdentity {
    /// Create a new identity in the `Loading` state.
    ///
    /// The host settles it with [`OidcIdentity::set_session`] or
    /// [`OidcIdentity::exchange_code`].
    pub fn new(settings: OidcSettings, http_client: Client, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);

        Self {
            settings,
            http_client,
            session: Arc::new(RwLock::new(None)),
            state,
            navigator,
        }
    }

    pub fn settings(&self) -> &OidcSettings {
        &self.settings
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.session
            .read()
            .map(|session| session.clone())
            .unwrap_or_default()
    }

    /// Install a session obtained elsewhere, or settle as signed out with `None`.
    pub fn set_session(&self, session: Option<Session>) -> Result<()> {
        match session {
            Some(session) => {
                let principal = session.principal(&self.settings.roles_claim)?;
                self.store_session(Some(session));
                log::info!("Signed in as {}", principal.subject);
                self.publish(AuthState::SignedIn(principal));
            }
            None => {
                self.store_session(None);
                self.publish(AuthState::SignedOut);
            }
        }
        Ok(())
    }

    /// Build the authorization-code sign-in URL for the given `state` value.
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.settings.authorization_endpoint())?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scope)
            .append_pair("state", state);
        Ok(url)
    }

    /// Complete the sign-in callback by exchanging the authorization code.
    pub async fn exchange_code(&self, code: &str) -> Result<Session> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("client_id", self.settings.client_id.as_str()),
        ];

        match self.request_token(&params).await {
            Ok(session) => {
                self.set_session(Some(session.clone()))?;
                Ok(session)
            }
            Err(err) => {
                self.set_session(None)?;
                Err(err)
            }
        }
    }

    /// Sign out locally and send the user to the provider's end-session page.
    pub fn sign_out(&self) -> Result<()> {
        let id_token = self.get_session().and_then(|session| session.id_token);

        let mut url = Url::parse(&self.settings.end_session_endpoint())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.settings.client_id)
                .append_pair(
                    "post_logout_redirect_uri",
                    &self.settings.post_logout_redirect_uri,
                );
            if let Some(id_token) = &id_token {
                query.append_pair("id_token_hint", id_token);
            }
        }

        self.set_session(None)?;
        log::info!("Signed out");
        self.navigator.navigate(Destination::SignOut(url));
        Ok(())
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<Session> {
        let url = self.settings.token_endpoint();
        log::debug!("POST {}", url);

        let response = self.http_client.post(&url).form(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            let message = match serde_json::from_str::<TokenErrorResponse>(&text) {
                Ok(body) => match body.error_description {
                    Some(description) => format!("{}: {}", body.error, description),
                    None => body.error,
                },
                Err(_) => format!("Token request failed with status {}: {}", status, text),
            };
            return Err(Error::Auth(message));
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(Session::from(token))
    }

    fn store_session(&self, session: Option<Session>) {
        if let Ok(mut current) = self.session.write() {
            *current = session;
        }
    }

    fn publish(&self, state: AuthState) {
        self.state.send_replace(state);
    }
}

#[async_trait]
impl Identity for OidcIdentity {
    async fn access_token(&self) -> Option<String> {
        self.get_session().map(|session| session.access_token)
    }

    async fn sign_in_silent(&self) -> Result<Option<String>> {
        let refresh_token = match self.get_session().and_then(|s| s.refresh_token) {
            Some(token) => token,
            None => return Ok(None),
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.settings.client_id.as_str()),
        ];

        match self.request_token(&params).await {
            Ok(mut session) => {
                if session.refresh_token.is_none() {
                    session.refresh_token = Some(refresh_token);
                }
                let access_token = session.access_token.clone();
                self.set_session(Some(session))?;
                log::info!("Session renewed silently");
                Ok(Some(access_token))
            }
            Err(err) => {
                log::warn!("Silent renewal failed: {}", err);
                self.set_session(None)?;
                Err(err)
            }
        }
    }

    async fn sign_in_redirect(&self) -> Result<()> {
        let state = uuid::Uuid::new_v4().to_string();
        let url = self.authorization_url(&state)?;
        log::warn!("Redirecting to interactive sign-in");
        self.navigator.navigate(Destination::SignIn(url));
        Ok(())
    }

    fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

/// Identity with a fixed bearer token and no renewal
pub struct StaticIdentity {
    token: Option<String>,
    state: watch::Sender<AuthState>,
}

impl StaticIdentity {
    /// Use `token` for every request. When it is a JWT its claims populate
    /// the principal; an opaque token yields a principal without roles.
    pub fn new(token: Option<String>, roles_claim: &str) -> Self {
        let state = match &token {
            Some(token) => {
                let principal = decode_claims(token)
                    .map(|claims| session::principal_from_claims(&claims, roles_claim))
                    .unwrap_or_default();
                AuthState::SignedIn(principal)
            }
            None => AuthState::SignedOut,
        };
        let (state, _) = watch::channel(state);

        Self { token, state }
    }

    /// No credentials at all
    pub fn anonymous() -> Self {
        Self::new(None, "roles")
    }
}

#[async_trait]
impl Identity for StaticIdentity {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }

    async fn sign_in_silent(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn sign_in_redirect(&self) -> Result<()> {
        log::warn!("Interactive sign-in requested but the token is static");
        Ok(())
    }

    fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
