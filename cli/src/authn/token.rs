//! Access token storage
//!
//! The token lives in `~/.backend-im/token.json` (mode 0600). In memory it is
//! kept as a [`SecretString`] and only exposed to build the bearer header.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CliError;
use crate::storage::layout::StorageLayout;

/// Token file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// An access token loaded from the credential store
#[derive(Debug, Clone)]
pub struct Token {
    access_token: SecretString,
    pub token_type: String,
    pub expires_in: u64,
}

impl Token {
    /// Create a bearer token
    pub fn bearer(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }

    /// The raw token, for the `Authorization` header
    pub fn expose(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// `Authorization` header value
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl From<StoredToken> for Token {
    fn from(stored: StoredToken) -> Self {
        Self {
            access_token: SecretString::from(stored.access_token),
            token_type: stored.token_type,
            expires_in: stored.expires_in,
        }
    }
}

impl From<&Token> for StoredToken {
    fn from(token: &Token) -> Self {
        Self {
            access_token: token.expose().to_string(),
            token_type: token.token_type.clone(),
            expires_in: token.expires_in,
        }
    }
}

/// Persist the token, creating the config directory if needed
pub async fn save_token(layout: &StorageLayout, token: &Token) -> Result<(), CliError> {
    layout.config_dir().create_private().await?;

    let file = layout.token_file();
    file.write_json(&StoredToken::from(token)).await?;
    file.set_permissions_600().await?;

    debug!("Token saved to {}", file.path().display());
    Ok(())
}

/// Load the stored token
pub async fn load_token(layout: &StorageLayout) -> Result<Token, CliError> {
    let file = layout.token_file();
    match file.read_json_opt::<StoredToken>().await {
        Ok(Some(stored)) => Ok(stored.into()),
        Ok(None) => Err(CliError::AuthError(
            "not authenticated - run 'backend-im login' first".to_string(),
        )),
        Err(e) => Err(CliError::AuthError(format!(
            "failed to read token file {}: {}",
            file.path().display(),
            e
        ))),
    }
}

/// Remove the stored token. Succeeds when there is none.
pub async fn delete_token(layout: &StorageLayout) -> Result<(), CliError> {
    layout.token_file().delete().await
}
