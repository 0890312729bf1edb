//! Admin role gate for the back-office screens
//!
//! This is a navigation gate only. The API authorizes every request on its
//! own.

use crate::auth::{AuthState, Destination, Identity, Navigator};
use crate::error::Result;

/// Outcome of evaluating an authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity still loading, render nothing
    Wait,
    /// Signed out, send to interactive sign-in
    SignIn,
    /// Signed in without the required role
    Unauthorized,
    Allow,
}

pub struct RoleGuard {
    required_role: String,
    last: Option<GuardDecision>,
}

impl RoleGuard {
    pub fn new(required_role: &str) -> Self {
        Self {
            required_role: required_role.to_string(),
            last: None,
        }
    }

    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// The decision acted on most recently
    pub fn last(&self) -> Option<GuardDecision> {
        self.last
    }

    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        match state {
            AuthState::Loading => GuardDecision::Wait,
            AuthState::SignedOut => GuardDecision::SignIn,
            AuthState::SignedIn(principal) if principal.has_role(&self.required_role) => {
                GuardDecision::Allow
            }
            AuthState::SignedIn(_) => GuardDecision::Unauthorized,
        }
    }

    /// Evaluate `state` and act on the decision when it differs from the
    /// previous one.
    pub async fn on_state_change(
        &mut self,
        state: &AuthState,
        identity: &dyn Identity,
        navigator: &dyn Navigator,
    ) -> Result<GuardDecision> {
        let decision = self.evaluate(state);
        if self.last == Some(decision) {
            return Ok(decision);
        }
        self.last = Some(decision);

        match decision {
            GuardDecision::SignIn => identity.sign_in_redirect().await?,
            GuardDecision::Unauthorized => {
                log::warn!("Signed-in user lacks the {} role", self.required_role);
                navigator.navigate(Destination::Unauthorized);
            }
            GuardDecision::Wait | GuardDecision::Allow => {}
        }

        Ok(decision)
    }

    /// Re-evaluate on every identity state change until the state channel
    /// closes.
    pub async fn watch(&mut self, identity: &dyn Identity, navigator: &dyn Navigator) -> Result<()> {
        let mut states = identity.subscribe();

        loop {
            let state = states.borrow_and_update().clone();
            self.on_state_change(&state, identity, navigator).await?;

            if states.changed().await.is_err() {
                return Ok(());
            }
        }
    }
}
