use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AuthConfig, MAX_TOKEN_TTL_MINUTES};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Bad username or password")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("unknown access token")]
    UnknownToken,
    #[error("access token expired")]
    ExpiredToken,
    #[error("token lifetime of {0} minutes is out of range")]
    InvalidTokenTtl(i64),
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Session {
    identity: String,
    expires_at: DateTime<Utc>,
}

/// Checks the configured credentials and tracks the opaque tokens it issued.
#[derive(Debug)]
pub struct SessionAuthority {
    username: String,
    password: String,
    token_ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionAuthority {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let minutes = config.token_ttl_minutes;
        let token_ttl = Duration::try_minutes(minutes)
            .filter(|_| (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes))
            .ok_or(AuthError::InvalidTokenTtl(minutes))?;

        Ok(Self {
            username: config.username.clone(),
            password: config.password.clone(),
            token_ttl,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        self.login_at(username, password, Utc::now())
    }

    pub(crate) fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        if username != self.username || password != self.password {
            warn!(username, "rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let expires_at = now
            .checked_add_signed(self.token_ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let token = Uuid::new_v4().simple().to_string();

        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                identity: username.to_string(),
                expires_at,
            },
        );
        drop(sessions);

        info!(username, %expires_at, "access token issued");
        Ok(AccessToken {
            access_token: token,
            expires_at,
        })
    }

    /// Resolve a token to the identity it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions.get(token).ok_or(AuthError::UnknownToken)?;
        if session.expires_at <= now {
            sessions.remove(token);
            return Err(AuthError::ExpiredToken);
        }
        Ok(session.identity.clone())
    }
}

/// `POST /api/v1/login`.
pub fn login_router(authority: Arc<SessionAuthority>) -> Router {
    Router::new()
        .route("/api/v1/login", post(login_handler))
        .with_state(authority)
}

pub(crate) async fn login_handler(
    State(authority): State<Arc<SessionAuthority>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match authority.login(&request.username, &request.password) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(error) => {
            let status = match error {
                AuthError::ExpiryOutOfRange => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            };
            let payload = json!({ "msg": error.to_string() });
            (status, Json(payload)).into_response()
        }
    }
}

/// Middleware admitting only requests that carry a live bearer token.
pub async fn require_bearer(
    State(authority): State<Arc<SessionAuthority>>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let verdict = match token {
        Some(token) => authority.verify(token),
        None => Err(AuthError::MissingToken),
    };

    match verdict {
        Ok(_) => next.run(request).await,
        Err(error) => {
            let payload = json!({ "msg": error.to_string() });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
    }
}
