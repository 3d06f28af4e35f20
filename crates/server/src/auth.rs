use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::warn;

use ventura_core::domain::caller::Caller;
use ventura_core::errors::AuthError;
use ventura_db::repositories::SessionRepository;

/// Bearer token from the `Authorization` header, without the scheme.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[derive(Clone)]
pub struct Authenticator {
    sessions: Arc<dyn SessionRepository>,
}

impl Authenticator {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Caller, AuthError> {
        let token = bearer_token(headers)?;
        match self.sessions.find_caller(token).await {
            Ok(Some(caller)) => Ok(caller),
            Ok(None) => Err(AuthError::InvalidToken),
            Err(error) => {
                warn!(
                    event_name = "auth.session.lookup_failed",
                    error = %error,
                    "session lookup failed"
                );
                Err(AuthError::Lookup(error.to_string()))
            }
        }
    }
}
