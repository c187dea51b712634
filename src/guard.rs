//! Route-access decision rules.
//!
//! `decide` is a pure, total function over the normalized path and the credential
//! state. It is a routing convenience that keeps anonymous visitors away from pages
//! that need a session and skips auth pages for visitors who already have one. It is
//! not a security boundary: the backend authorizes every privileged API call itself.

use crate::{
    config::GuardPaths,
    models::{AuthState, Decision, QueryParam},
};

/// decide
///
/// Evaluates the access rules in order; the first matching rule wins.
///
/// 1. Admin auth pages (exact match): authenticated admins go to the admin home.
/// 2. Anything else under the admin prefix: requires a token. Role is not checked.
/// 3. User auth pages: any authenticated visitor is sent home (admin or storefront).
/// 4. Protected storefront pages: anonymous visitors go to the login page, carrying the
///    requested path and a reason code.
/// 5. Everything else is allowed.
///
/// Prefix rules use plain `starts_with`, so `/adminx` counts as an admin page.
pub fn decide(path: &str, auth: &AuthState, paths: &GuardPaths) -> Decision {
    if path == paths.admin_login || path == paths.admin_register {
        return if auth.has_token && auth.role.is_admin() {
            Decision::redirect(&paths.admin_home)
        } else {
            Decision::Allow
        };
    }

    if path.starts_with(&paths.admin_home) {
        return if auth.has_token {
            Decision::Allow
        } else {
            Decision::redirect(&paths.admin_login)
        };
    }

    if path.starts_with(&paths.user_auth_prefix) {
        return match (auth.has_token, auth.role.is_admin()) {
            (true, true) => Decision::redirect(&paths.admin_home),
            (true, false) => Decision::redirect(&paths.user_home),
            (false, _) => Decision::Allow,
        };
    }

    let protected = paths
        .protected_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()));
    if protected && !auth.has_token {
        return Decision::RedirectWithQuery {
            target: paths.user_login.clone(),
            params: vec![
                QueryParam::new("redirect", path),
                QueryParam::new("msg", &paths.need_login_msg),
            ],
        };
    }

    Decision::Allow
}

/// normalize_path
///
/// Brings a raw request path into the form the rules are written against: a leading
/// `/`, no empty segments, and no trailing `/` except for the root itself. Dot segments
/// (including their percent-encoded spellings) are resolved, with `..` clamped at the
/// root, so `/site/catalog/../profile` is judged as `/site/profile`.
pub fn normalize_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" => {}
            s if is_dot(s) => {}
            s if is_dot_dot(s) => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut normalized = String::with_capacity(raw.len() + 1);
    for segment in segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    normalized
}

fn is_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_dot_dot(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}
