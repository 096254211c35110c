use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiClient;
use crate::http::mutation::MutationError;
use crate::http::transport::HttpTransport;
use crate::persistence::{StorageAdapter, StorageBackend};

/// Storage key for the persisted workspace session.
pub const SESSION_STORAGE_KEY: &str = "workspaceToken";

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("no wallet provider available")]
    Unavailable,
    #[error("wallet provider rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Backend(#[from] MutationError),
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

/// Narrow interface to the external wallet capability. The signing UX itself
/// lives outside this crate.
pub trait WalletProvider {
    fn request_accounts(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, ProviderError>> + Send;

    fn sign_message(
        &mut self,
        address: &str,
        message: &str,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug, Clone)]
pub enum AuthIntent {
    Login,
    CreateWorkspace {
        name: String,
        notification_email: Option<String>,
    },
}

/// Issued workspace session. Aliases accept the wire spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "tokenType")]
    pub token_type: String,
}

/// Where the token ended up after a successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCarrier {
    /// Persisted under [`SESSION_STORAGE_KEY`].
    Stored,
    /// Storage rejected writes; the caller must carry the token as a URL
    /// query parameter on the next navigation instead.
    QueryParam,
}

#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub session: AuthSession,
    pub carrier: TokenCarrier,
}

/// The exact text the wallet signs. The backend verifies the signature over
/// this message, so the template is fixed.
pub fn auth_message(intent: &AuthIntent, address: &str) -> String {
    match intent {
        AuthIntent::Login => format!(
            "Sign this message to access your campaign workspace.\n\nWallet: {address}"
        ),
        AuthIntent::CreateWorkspace { name, .. } => format!(
            "Sign this message to create the workspace \"{name}\".\n\nWallet: {address}"
        ),
    }
}

/// Orchestrates connect -> sign -> token exchange -> persist.
pub struct AuthHandshake<T, P, B> {
    api: ApiClient<T>,
    provider: P,
    storage: StorageAdapter<B>,
}

impl<T, P, B> AuthHandshake<T, P, B>
where
    T: HttpTransport,
    P: WalletProvider,
    B: StorageBackend,
{
    pub fn new(api: ApiClient<T>, provider: P, storage: StorageAdapter<B>) -> Self {
        Self {
            api,
            provider,
            storage,
        }
    }

    /// First account reported by the provider.
    pub async fn connect(&mut self) -> Result<String, ProviderError> {
        let accounts = self.provider.request_accounts().await?;
        accounts.into_iter().next().ok_or(ProviderError::Unavailable)
    }

    /// Signs the intent message and exchanges the signature for a session.
    ///
    /// Nothing is persisted on failure. On success the session is stored, or
    /// handed back with a [`TokenCarrier::QueryParam`] marker when storage
    /// is unavailable.
    pub async fn authenticate(
        &mut self,
        address: &str,
        intent: AuthIntent,
    ) -> Result<AuthOutcome, AuthError> {
        let message = auth_message(&intent, address);
        let signature = self.provider.sign_message(address, &message).await?;

        let mut body = serde_json::Map::new();
        body.insert("message".to_string(), serde_json::json!(message));
        body.insert("signature".to_string(), serde_json::json!(signature));
        body.insert("owner_address".to_string(), serde_json::json!(address));

        let data = match &intent {
            AuthIntent::Login => {
                self.api
                    .request_access_token(serde_json::Value::Object(body))
                    .await?
            }
            AuthIntent::CreateWorkspace {
                name,
                notification_email,
            } => {
                body.insert("name".to_string(), serde_json::json!(name));
                if let Some(email) = notification_email {
                    body.insert("notification_email".to_string(), serde_json::json!(email));
                }
                self.api
                    .create_workspace(serde_json::Value::Object(body))
                    .await?
            }
        };

        let session: AuthSession = serde_json::from_value(data)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        let carrier = if self.storage.is_available() && self.storage.set(SESSION_STORAGE_KEY, &session)
        {
            TokenCarrier::Stored
        } else {
            log::warn!("[AUTH] storage unavailable, falling back to query-param token");
            TokenCarrier::QueryParam
        };

        log::info!("[AUTH] workspace session issued for {address}");

        Ok(AuthOutcome { session, carrier })
    }

    /// Previously persisted session, if any.
    pub fn stored_session(&self) -> Option<AuthSession> {
        self.storage.get(SESSION_STORAGE_KEY, None)
    }

    /// Drops the persisted session. Returns false when storage rejected the
    /// removal.
    pub fn logout(&mut self) -> bool {
        self.storage.remove(SESSION_STORAGE_KEY)
    }
}
