use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use rookie_shop_admin::auth::{
    AuthState, Destination, Identity, LogNavigator, Principal, Session,
};
use rookie_shop_admin::config::{ClientOptions, OidcSettings};
use rookie_shop_admin::error::Result;
use rookie_shop_admin::guard::{GuardDecision, RoleGuard};
use rookie_shop_admin::RookieShop;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_test::assert_ok;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "/realms/rookie-shop/protocol/openid-connect/token";

fn jwt(subject: &str, roles: &[&str]) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": subject, "roles": roles, "exp": 4102444800u64 }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

fn settings(server: &MockServer) -> OidcSettings {
    OidcSettings::default().with_authority(&format!("{}/realms/rookie-shop", server.uri()))
}

/// Identity whose state is pushed by the test and whose channel can be closed
struct ScriptedIdentity {
    sender: Mutex<Option<watch::Sender<AuthState>>>,
    receiver: watch::Receiver<AuthState>,
}

impl ScriptedIdentity {
    fn new() -> Self {
        let (sender, receiver) = watch::channel(AuthState::Loading);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    fn push(&self, state: AuthState) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            sender.send_replace(state);
        }
    }

    fn close(&self) {
        self.sender.lock().unwrap().take();
    }
}

#[async_trait]
impl Identity for ScriptedIdentity {
    async fn access_token(&self) -> Option<String> {
        None
    }

    async fn sign_in_silent(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn sign_in_redirect(&self) -> Result<()> {
        Ok(())
    }

    fn state(&self) -> AuthState {
        self.receiver.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.receiver.clone()
    }
}

fn customer(subject: &str) -> AuthState {
    AuthState::SignedIn(Principal {
        subject: subject.into(),
        username: None,
        roles: ["customer".to_string()].into_iter().collect(),
    })
}

#[tokio::test]
async fn test_guard_watch_acts_once_per_decision() {
    let identity = ScriptedIdentity::new();
    let navigator = LogNavigator::new();
    let mut guard = RoleGuard::new("admin");

    let script = async {
        for state in [customer("1"), customer("2")] {
            tokio::task::yield_now().await;
            identity.push(state);
        }
        tokio::task::yield_now().await;
        identity.close();
    };

    let (watched, ()) = tokio::join!(guard.watch(&identity, &navigator), script);

    assert_ok!(watched);
    assert_eq!(navigator.history(), vec![Destination::Unauthorized]);
    assert_eq!(guard.last(), Some(GuardDecision::Unauthorized));
}

#[tokio::test]
async fn test_sign_out_resets_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Books", "description": "Paper" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let navigator = Arc::new(LogNavigator::new());
    let options = ClientOptions::default().with_api_url(&mock_server.uri());
    let (shop, identity) =
        RookieShop::with_oidc(options, settings(&mock_server), navigator.clone()).unwrap();
    identity
        .set_session(Some(Session::new(jwt("7", &["admin"]), None, Some(300))))
        .unwrap();

    shop.store().fetch_categories().await.unwrap();
    assert_eq!(shop.store().categories().categories.len(), 1);

    let mut revisions = shop.store().subscribe();
    revisions.borrow_and_update();

    let signed_out = async {
        identity.sign_out().unwrap();
        revisions.changed().await.unwrap();
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        tokio::select! {
            _ = shop.sync_with_identity() => panic!("identity channel closed"),
            _ = signed_out => {}
        }
    })
    .await
    .unwrap();

    assert!(shop.store().categories().categories.is_empty());
    assert!(matches!(
        navigator.history().last(),
        Some(Destination::SignOut(_))
    ));
}

#[tokio::test]
async fn test_exchange_code_signs_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=code-123"))
        .and(body_string_contains("client_id=rookie-shop-back-office-spa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": jwt("9", &["admin"]),
            "refresh_token": "refresh-1",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::default().with_api_url(&mock_server.uri());
    let (shop, identity) = RookieShop::with_oidc(
        options,
        settings(&mock_server),
        Arc::new(LogNavigator::new()),
    )
    .unwrap();
    assert_eq!(identity.state(), AuthState::Loading);

    let session = assert_ok!(identity.exchange_code("code-123").await);

    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    let state = shop.identity().state();
    let principal = state.principal().unwrap();
    assert_eq!(principal.subject, "9");
    assert_eq!(shop.guard().evaluate(&state), GuardDecision::Allow);
}

#[tokio::test]
async fn test_rejected_code_settles_signed_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Code not valid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::default().with_api_url(&mock_server.uri());
    let (_, identity) = RookieShop::with_oidc(
        options,
        settings(&mock_server),
        Arc::new(LogNavigator::new()),
    )
    .unwrap();

    assert!(identity.exchange_code("used").await.is_err());
    assert_eq!(identity.state(), AuthState::SignedOut);
}
