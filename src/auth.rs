use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{config::AppConfig, models::AuthState};

/// CredentialProvider
///
/// Read-only access to the credential store: the session token and the advisory role,
/// each either present or absent. The guard never sees the store itself, only the
/// `AuthState` derived from it, so the access rules can be exercised without a request.
///
/// Writes (login, logout, the 7-day expiry) happen in the login flows, never here.
pub trait CredentialProvider {
    fn token(&self) -> Option<&str>;

    fn role(&self) -> Option<&str>;

    /// auth_state
    ///
    /// Classifies the raw values once. Token presence means "non-empty"; role is
    /// reduced to admin / non-admin.
    fn auth_state(&self) -> AuthState {
        AuthState::from_raw(self.token(), self.role())
    }
}

/// CookieCredentials
///
/// The credential store as carried by the request's `Cookie` header.
pub struct CookieCredentials<'a> {
    jar: &'a CookieJar,
    token_cookie: &'a str,
    role_cookie: &'a str,
}

impl<'a> CookieCredentials<'a> {
    pub fn new(jar: &'a CookieJar, token_cookie: &'a str, role_cookie: &'a str) -> Self {
        Self {
            jar,
            token_cookie,
            role_cookie,
        }
    }
}

impl CredentialProvider for CookieCredentials<'_> {
    fn token(&self) -> Option<&str> {
        self.jar.get(self.token_cookie).map(Cookie::value)
    }

    fn role(&self) -> Option<&str> {
        self.jar.get(self.role_cookie).map(Cookie::value)
    }
}

/// StaticCredentials
///
/// Fixed credential values, for callers that already hold them outside a request
/// (tests, tooling).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub token: Option<String>,
    pub role: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<&str>, role: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            role: role.map(str::to_string),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

/// AuthState Extractor Implementation
///
/// Resolves the request's `AuthState` from its cookies, using the cookie names in
/// `AppConfig`. Missing or malformed cookies simply read as absent, so this extractor
/// never rejects: an anonymous request is a valid input to the guard, not an error.
impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let auth = CookieCredentials::new(&jar, &config.token_cookie, &config.role_cookie)
            .auth_state();

        tracing::trace!(has_token = auth.has_token, role = ?auth.role, "resolved credentials");
        Ok(auth)
    }
}
