use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::user::{LoginPayload, RegisterPayload, RegisteredUser, UserProfile};

/// Remote account service consumed by the presentation layer.
///
/// The ledger never talks to it; it only matters to the UI whether the
/// caller is authenticated.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AuthApi: Send + Sync {
    /// Create an account. Duplicate e-mails fail with an auth error (code `conflict`
    /// unless the server supplies its own).
    async fn register(&self, payload: &RegisterPayload) -> Result<RegisteredUser, CoreError>;

    /// Exchange credentials for an access token, which is stored for later calls.
    async fn login(&self, payload: &LoginPayload) -> Result<String, CoreError>;

    /// End the session. The stored token is cleared even if the request fails.
    async fn logout(&self) -> Result<(), CoreError>;

    /// Current user, or `None` when the server answers 401.
    async fn me(&self) -> Result<Option<UserProfile>, CoreError>;

    /// Whether an access token is currently held.
    fn is_authenticated(&self) -> bool;
}
