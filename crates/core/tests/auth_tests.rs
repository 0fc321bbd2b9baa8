// ═══════════════════════════════════════════════════════════════════
// Auth Tests — HttpAuthClient against a mock server, TokenStore
// ═══════════════════════════════════════════════════════════════════

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trade_journal_core::auth::client::HttpAuthClient;
use trade_journal_core::auth::token_store::TokenStore;
use trade_journal_core::auth::traits::AuthApi;
use trade_journal_core::errors::CoreError;
use trade_journal_core::models::settings::JournalConfig;
use trade_journal_core::models::user::{LoginPayload, RegisterPayload};
use trade_journal_core::storage::kv::MemoryKeyValueStore;
use trade_journal_core::storage::traits::KeyValueStore;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: &str, store: &MemoryKeyValueStore) -> HttpAuthClient {
    let config = JournalConfig {
        api_base_url: base_url.to_string(),
        ..JournalConfig::default()
    };
    let tokens = Arc::new(TokenStore::new(Arc::new(store.clone())));
    HttpAuthClient::new(&config, tokens).unwrap()
}

fn credentials() -> LoginPayload {
    LoginPayload {
        email: "ann@example.com".into(),
        password: "pw12345".into(),
        remember_me: true,
    }
}

fn registration() -> RegisterPayload {
    RegisterPayload {
        name: "Ann".into(),
        email: "ann@example.com".into(),
        password: "pw12345".into(),
    }
}

fn auth_parts(err: CoreError) -> (String, String) {
    match err {
        CoreError::Auth { code, message } => (code, message),
        other => panic!("expected auth error, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════
// login / logout
// ═══════════════════════════════════════════════════════════════════

mod session {
    use super::*;

    #[tokio::test]
    async fn login_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_partial_json(json!({ "email": "ann@example.com", "rememberMe": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryKeyValueStore::new();
        let client = client_for(&server.uri(), &store);
        assert!(!client.is_authenticated());

        let token = client.login(&credentials()).await.unwrap();
        assert_eq!(token, "tok-1");
        assert!(client.is_authenticated());
        assert_eq!(store.get("bearer_token").unwrap().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn login_rejected_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
            .mount(&server)
            .await;

        let store = MemoryKeyValueStore::new();
        let client = client_for(&server.uri(), &store);
        let (code, message) = auth_parts(client.login(&credentials()).await.unwrap_err());

        assert_eq!(code, "unauthorized");
        assert_eq!(message, "Bad credentials");
        assert!(!client.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn login_rejected_without_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Account locked" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_partial_json(json!({ "email": "bob@example.com" })))
            .respond_with(ResponseTemplate::new(429))
            .with_priority(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());

        let (code, message) = auth_parts(client.login(&credentials()).await.unwrap_err());
        assert_eq!((code.as_str(), message.as_str()), ("forbidden", "Account locked"));

        let bob = LoginPayload {
            email: "bob@example.com".into(),
            ..credentials()
        };
        let (code, message) = auth_parts(client.login(&bob).await.unwrap_err());
        assert_eq!(code, "rate_limited");
        assert_eq!(message, "Invalid email or password");
    }

    #[tokio::test]
    async fn login_success_without_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        let err = client.login(&credentials()).await.unwrap_err();
        assert_eq!(err.auth_code(), Some("missing_token"));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_token_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryKeyValueStore::new();
        store.set("bearer_token", "stale").unwrap();
        let client = client_for(&server.uri(), &store);
        assert!(client.is_authenticated());

        client.logout().await.unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(store.get("bearer_token").unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_token_when_server_unreachable() {
        let store = MemoryKeyValueStore::new();
        store.set("bearer_token", "stale").unwrap();
        // nothing listens on the discard port
        let client = client_for("http://127.0.0.1:9", &store);

        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert!(!client.is_authenticated());
    }
}

// ═══════════════════════════════════════════════════════════════════
// register
// ═══════════════════════════════════════════════════════════════════

mod register {
    use super::*;

    #[tokio::test]
    async fn returns_created_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_partial_json(json!({ "name": "Ann", "email": "ann@example.com" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": 7, "name": "Ann", "email": "ann@example.com" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        let user = client.register(&registration()).await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "ann@example.com");
        // registering does not log in
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        let (code, message) = auth_parts(client.register(&registration()).await.unwrap_err());
        assert_eq!(code, "conflict");
        assert_eq!(message, "Registration failed");
    }

    #[tokio::test]
    async fn server_error_code_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": { "code": "email_taken", "message": "Email already registered" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        let err = client.register(&registration()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authentication failed (email_taken): Email already registered"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// me
// ═══════════════════════════════════════════════════════════════════

mod me {
    use super::*;

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/me"))
            .and(header("Authorization", "Bearer tok-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "name": "Ann", "email": "ann@example.com",
                "createdAt": "2025-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryKeyValueStore::new();
        store.set("bearer_token", "tok-9").unwrap();
        let client = client_for(&server.uri(), &store);

        let profile = client.me().await.unwrap().unwrap();
        assert_eq!(profile.id, 3);
        assert!(profile.created_at.is_some());
    }

    #[tokio::test]
    async fn unauthorized_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        assert_eq!(client.me().await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/me"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        let (code, message) = auth_parts(client.me().await.unwrap_err());
        assert_eq!(code, "server_error");
        assert_eq!(message, "Failed to load profile");
    }

    #[tokio::test]
    async fn unreadable_profile_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), &MemoryKeyValueStore::new());
        assert_eq!(client.me().await.unwrap(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// TokenStore
// ═══════════════════════════════════════════════════════════════════

mod token_store {
    use super::*;

    fn store_with_counter() -> (TokenStore, MemoryKeyValueStore, Arc<AtomicUsize>) {
        let kv = MemoryKeyValueStore::new();
        let tokens = TokenStore::new(Arc::new(kv.clone()));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        tokens.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (tokens, kv, hits)
    }

    #[test]
    fn reads_mirror_lazily() {
        let (tokens, kv, _) = store_with_counter();
        assert_eq!(tokens.get(), None);
        kv.set("bearer_token", "abc").unwrap();
        assert_eq!(tokens.get().as_deref(), Some("abc"));
        assert!(tokens.is_authenticated());
    }

    #[test]
    fn empty_mirror_value_means_logged_out() {
        let (tokens, kv, _) = store_with_counter();
        kv.set("bearer_token", "").unwrap();
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn set_notifies_only_on_change() {
        let (tokens, kv, hits) = store_with_counter();
        tokens.set(Some("a")).unwrap();
        tokens.set(Some("a")).unwrap();
        tokens.set(None).unwrap();
        tokens.set(None).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(kv.get("bearer_token").unwrap(), None);
    }

    #[test]
    fn external_change_is_picked_up() {
        let (tokens, kv, hits) = store_with_counter();
        tokens.set(Some("mine")).unwrap();

        kv.set("bearer_token", "theirs").unwrap();
        assert!(!tokens.handle_storage_change("forex-trades"));
        assert!(tokens.handle_storage_change("bearer_token"));
        assert_eq!(tokens.get().as_deref(), Some("theirs"));

        kv.remove("bearer_token").unwrap();
        assert!(tokens.handle_storage_change("bearer_token"));
        assert!(!tokens.is_authenticated());
        // nothing changed since the last signal
        assert!(!tokens.handle_storage_change("bearer_token"));

        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn debug_hides_token() {
        let (tokens, _, _) = store_with_counter();
        tokens.set(Some("super-secret")).unwrap();
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("present: true"));
    }

    #[test]
    fn custom_key() {
        let kv = MemoryKeyValueStore::new();
        let tokens = TokenStore::with_key(Arc::new(kv.clone()), "jwt");
        tokens.set(Some("x")).unwrap();
        assert_eq!(tokens.key(), "jwt");
        assert_eq!(kv.get("jwt").unwrap().as_deref(), Some("x"));
    }
}
