use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::settings::JournalConfig;
use crate::models::user::{LoginPayload, LoginResponse, RegisterPayload, RegisteredUser, UserProfile};

use super::token_store::TokenStore;
use super::traits::AuthApi;

/// HTTP client for the account API.
///
/// - `POST /api/auth/register`, `POST /api/auth/login`, `POST /api/auth/logout`
/// - `GET /api/me` with `Authorization: Bearer <token>`
///
/// The refresh token lives in an HTTP-only cookie, so native builds keep a
/// cookie store. Failures are reported once; nothing is retried.
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl HttpAuthClient {
    pub fn new(config: &JournalConfig, tokens: Arc<TokenStore>) -> Result<Self, CoreError> {
        config.validate()?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .cookie_store(true);
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// ── Error body shapes ───────────────────────────────────────────────

/// `{"error":{"code":..,"message":..}}`, `{"error":"..."}` or `{"message":"..."}`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detail {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

fn status_code_name(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "bad_request".into(),
        401 => "unauthorized".into(),
        403 => "forbidden".into(),
        404 => "not_found".into(),
        409 => "conflict".into(),
        422 => "unprocessable".into(),
        429 => "rate_limited".into(),
        500..=599 => "server_error".into(),
        other => format!("http_{other}"),
    }
}

/// Turn a non-success response into `CoreError::Auth`, preferring the
/// server's code and message over the status-derived ones.
async fn auth_error(resp: Response, fallback_message: &str) -> CoreError {
    let status = resp.status();
    let body: ErrorBody = resp.json().await.unwrap_or_default();

    let (code, detail_message) = match body.error {
        Some(ErrorField::Detail { code, message }) => (code, message),
        Some(ErrorField::Text(text)) => (None, Some(text)),
        None => (None, None),
    };

    CoreError::Auth {
        code: code.unwrap_or_else(|| status_code_name(status)),
        message: body
            .message
            .or(detail_message)
            .unwrap_or_else(|| fallback_message.to_string()),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AuthApi for HttpAuthClient {
    async fn register(&self, payload: &RegisterPayload) -> Result<RegisteredUser, CoreError> {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = auth_error(resp, "Registration failed").await;
            warn!(error = %err, "registration rejected");
            return Err(err);
        }

        let user: RegisteredUser = resp.json().await.map_err(|e| {
            CoreError::Deserialization(format!("Unexpected registration response: {e}"))
        })?;
        info!(user_id = user.id, "account registered");
        Ok(user)
    }

    async fn login(&self, payload: &LoginPayload) -> Result<String, CoreError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = auth_error(resp, "Invalid email or password").await;
            warn!(error = %err, "login rejected");
            return Err(err);
        }

        let body: LoginResponse = resp.json().await.map_err(|_| CoreError::Auth {
            code: "missing_token".into(),
            message: "Login response did not contain an access token".into(),
        })?;
        self.tokens.set(Some(&body.access_token))?;
        info!(remember_me = payload.remember_me, "logged in");
        Ok(body.access_token)
    }

    async fn logout(&self) -> Result<(), CoreError> {
        let sent = self.client.post(self.url("/api/auth/logout")).send().await;

        // Local session ends regardless of what the server said.
        self.tokens.set(None)?;
        info!("logged out");

        sent.map(|_| ()).map_err(CoreError::from)
    }

    async fn me(&self) -> Result<Option<UserProfile>, CoreError> {
        let mut request = self.client.get(self.url("/api/me"));
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(auth_error(resp, "Failed to load profile").await);
        }

        // An unreadable body is treated like "no user"
        Ok(resp.json::<UserProfile>().await.ok())
    }

    fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }
}
