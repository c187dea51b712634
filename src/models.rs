use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Credential Classification ---

/// Role
///
/// The closed, two-value classification of the advisory role cookie.
/// The raw cookie string is classified exactly once, where it is read (see `auth`);
/// the decision logic only ever sees this enum.
///
/// The role is **never** an authorization grant. It only selects which home page an
/// already-authenticated visitor is bounced to. The backend re-checks every privileged call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    NonAdmin,
}

impl Role {
    /// classify
    ///
    /// Maps a raw role value to a `Role`. Comparison is case-insensitive and ignores
    /// surrounding whitespace. Absent, empty and unknown values are all `NonAdmin`.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::NonAdmin,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// AuthState
///
/// The only view of the credential store the guard receives: whether a session token
/// is present, and the classified role. Built by `auth::CredentialProvider::auth_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthState {
    /// True when the token cookie is present and non-empty. Validity and expiry are
    /// not checked here; stale tokens are rejected by the backend on actual API calls.
    pub has_token: bool,
    pub role: Role,
}

impl AuthState {
    /// from_raw
    ///
    /// Builds the state from raw cookie values as they come out of a credential store.
    pub fn from_raw(token: Option<&str>, role: Option<&str>) -> Self {
        Self {
            has_token: token.is_some_and(|value| !value.trim().is_empty()),
            role: Role::classify(role),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

// --- Guard Output ---

/// QueryParam
///
/// A single ordered query parameter attached to a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Decision
///
/// The result of evaluating the access rules for one request.
/// Exactly one variant is produced for every input; there is no error case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    /// Render the requested path unchanged.
    Allow,
    /// Redirect to `target`; the requested page is not rendered.
    Redirect { target: String },
    /// Redirect to `target` with `params` appended as the query string. Used to carry the
    /// originally requested path and a reason code to the login page.
    RedirectWithQuery {
        target: String,
        params: Vec<QueryParam>,
    },
}

impl Decision {
    pub fn redirect(target: impl Into<String>) -> Self {
        Decision::Redirect {
            target: target.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// location
    ///
    /// Renders the value for the `Location` header, or `None` for `Allow`.
    /// Query values are form-urlencoded, so `/site/profile` is sent as `%2Fsite%2Fprofile`
    /// and decodes back to the original path on the login page.
    pub fn location(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::Redirect { target } => Some(target.clone()),
            Decision::RedirectWithQuery { target, params } => {
                if params.is_empty() {
                    return Some(target.clone());
                }
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params.iter().map(|p| (p.key.as_str(), p.value.as_str())))
                    .finish();
                Some(format!("{target}?{query}"))
            }
        }
    }
}

// --- Access Preview (GET /edge/access) ---

/// AccessQuery
///
/// Query parameters for the access preview endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AccessQuery {
    /// The path the client intends to navigate to.
    pub path: String,
}

/// AccessReport
///
/// What the edge would do with a navigation to `path` given the caller's cookies.
/// Lets client-side transitions reach the same verdict as a full page load.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessReport {
    /// The normalized path that was evaluated.
    pub path: String,
    /// Whether the path falls inside the guard's matcher set at all.
    pub guarded: bool,
    /// Token presence, as seen by the guard.
    pub authenticated: bool,
    pub role: Role,
    pub decision: Decision,
    /// The `Location` a real request would be redirected to, if any.
    pub location: Option<String>,
}
