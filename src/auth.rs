use std::future::Future;
use std::pin::Pin;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::web::Data;
use actix_web::{dev, FromRequest, HttpRequest};
use anyhow::{anyhow, Context};
use chrono::LocalResult::Single;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::errors::AuthenticationError;
use crate::model::User;
use crate::startup::AppState;

pub const SESSION_COOKIE: &str = "yanews_session";

/// # Represent the user authenticated by the session cookie
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn from_user(user: &User) -> Self {
        AuthenticatedUser {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
/// # Session claims
struct Claims {
    user: AuthenticatedUser,
    exp: i64,
}

/// # Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionKey {
    key: Hmac<Sha256>,
    ttl: Duration,
    secure: bool,
}

impl SessionKey {
    pub fn new(secret: &Secret<String>, ttl_seconds: i64, secure: bool) -> anyhow::Result<Self> {
        let key = Hmac::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| anyhow!("Invalid session secret: {}", e))?;

        Ok(SessionKey {
            key,
            ttl: Duration::seconds(ttl_seconds),
            secure,
        })
    }

    /// Generate a session token for the given user, expiring at the given date
    pub fn issue_until(
        &self,
        user: &AuthenticatedUser,
        expiration: DateTime<Utc>,
    ) -> Result<String, AuthenticationError> {
        let claims = Claims {
            user: user.clone(),
            exp: expiration.timestamp(),
        };

        Ok(claims.sign_with_key(&self.key)?)
    }

    /// Build the session cookie of a freshly logged in user
    pub fn session_cookie(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Cookie<'static>, AuthenticationError> {
        let token = self.issue_until(user, Utc::now() + self.ttl)?;

        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::seconds(self.ttl.num_seconds()))
            .finish())
    }

    /// Cookie telling the browser to forget the session
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish();
        cookie.make_removal();
        cookie
    }

    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthenticationError> {
        let claims: Claims = token.verify_with_key(&self.key)?;

        let date = if let Single(t) = Utc.timestamp_opt(claims.exp, 0) {
            t
        } else {
            return Err(AuthenticationError::ExpiredSession);
        };

        if date.lt(&Utc::now()) {
            return Err(AuthenticationError::ExpiredSession);
        }
        Ok(claims.user)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthenticationError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    #[tracing::instrument(skip_all, level = "trace")]
    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { extract_authenticated_user(&req).await })
    }
}

/// # Extract the authenticated user from the request, asking for a login otherwise
async fn extract_authenticated_user(
    req: &HttpRequest,
) -> Result<AuthenticatedUser, AuthenticationError> {
    let state = req
        .app_data::<Data<AppState>>()
        .ok_or_else(|| anyhow!("Application state is not registered"))?;

    match session_user(req, state).await? {
        Some(user) => Ok(user),
        None => Err(AuthenticationError::LoginRequired(full_path(req))),
    }
}

/// # Return the user of the session cookie, if any and still valid
async fn session_user(
    req: &HttpRequest,
    state: &AppState,
) -> Result<Option<AuthenticatedUser>, AuthenticationError> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };

    let user = match state.session_key.verify(cookie.value()) {
        Ok(user) => user,
        Err(e) => {
            debug!(?e, "Ignoring invalid session cookie");
            return Ok(None);
        }
    };

    // The account may have been removed since the cookie was issued
    let user = state
        .users
        .get_user_by_id(user.id)
        .await
        .context("Database error")?;

    Ok(user.as_ref().map(AuthenticatedUser::from_user))
}

fn full_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| req.path().to_owned())
}
