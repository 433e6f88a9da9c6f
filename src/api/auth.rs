//! Login/register exchange and session persistence.

use std::sync::Arc;

use reqwest::Method;
use tracing::{info, warn};

use super::client::ApiClient;
use super::credentials::SecureString;
use super::error::Result;
use super::types::{AuthPayload, LoginRequest, RegisterRequest, User};
use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY, USER_KEY};

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: SecureString,
    pub token_type: String,
}

impl From<AuthPayload> for AuthSession {
    fn from(payload: AuthPayload) -> Self {
        Self {
            user: payload.user,
            token: SecureString::new(payload.token),
            token_type: payload.token_type,
        }
    }
}

impl ApiClient {
    /// `POST /login`. On success the token is attached to later requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = self.url("login")?;
        let builder = self
            .request(Method::POST, url)
            .json(&LoginRequest { email, password });
        let payload: AuthPayload = self.send(builder, "Account").await?;
        Ok(self.adopt(payload))
    }

    /// `POST /register`. On success the token is attached to later requests.
    ///
    /// A short password or a mismatched confirmation fails locally with
    /// [`ApiError::Validation`](super::ApiError::Validation) and sends nothing.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<AuthSession> {
        let request = RegisterRequest {
            name,
            email,
            password,
            password_confirmation,
        };
        request.validate()?;

        let url = self.url("register")?;
        let builder = self.request(Method::POST, url).json(&request);
        let payload: AuthPayload = self.send(builder, "Account").await?;
        Ok(self.adopt(payload))
    }

    fn adopt(&self, payload: AuthPayload) -> AuthSession {
        let session = AuthSession::from(payload);
        self.set_token(session.token.clone());
        info!(user_id = session.user.id, "Authenticated");
        session
    }
}

/// Durable copy of the current session (token and user record).
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Nothing is written when the user record cannot be encoded.
    pub fn save(&self, session: &AuthSession) -> std::result::Result<(), StorageError> {
        let user =
            serde_json::to_string(&session.user).map_err(|source| StorageError::Encode {
                key: USER_KEY.to_string(),
                source,
            })?;
        self.storage.set(TOKEN_KEY, session.token.expose())?;
        self.storage.set(USER_KEY, &user)
    }

    /// Stored token, if any.
    pub fn load_token(&self) -> std::result::Result<Option<SecureString>, StorageError> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecureString::new))
    }

    /// Stored user. A record that fails to parse ends the session.
    pub fn load_user(&self) -> std::result::Result<Option<User>, StorageError> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Stored user is corrupt, clearing session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> std::result::Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> AuthSession {
        AuthSession {
            user: User {
                id: 3,
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            },
            token: SecureString::new("tok-1"),
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(store.load_token().unwrap().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load_token().unwrap().unwrap().expose(), "tok-1");
        assert_eq!(store.load_user().unwrap().unwrap().id, 3);

        store.clear().unwrap();
        assert!(store.load_token().unwrap().is_none());
        assert!(store.load_user().unwrap().is_none());
    }

    #[test]
    fn test_saved_user_record_round_trips() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());
        store.save(&session()).unwrap();

        let raw = storage.get(USER_KEY).unwrap().unwrap();
        let user: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(user, session().user);
        assert_eq!(store.load_token().unwrap().unwrap().expose(), "tok-1");
    }

    #[test]
    fn test_encode_error_names_the_key() {
        let source = serde_json::from_str::<User>("{").unwrap_err();
        let err = StorageError::Encode {
            key: USER_KEY.to_string(),
            source,
        };
        assert!(err.to_string().contains("'user'"));
    }

    #[test]
    fn test_corrupt_user_clears_session() {
        let storage = Arc::new(MemoryStore::with_entries([
            (TOKEN_KEY, "tok-1"),
            (USER_KEY, "{broken"),
        ]));
        let store = SessionStore::new(storage.clone());

        assert!(store.load_user().unwrap().is_none());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }
}
