use std::{env, time::Duration};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_RENDERER_URL: &str = "http://localhost:3001";
const DEFAULT_RENDERER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// AppConfig
///
/// Holds the edge service's entire configuration state. Immutable once loaded and
/// pulled into handlers and the guard middleware via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and fail-fast behavior.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub listen_addr: String,
    // Base URL of the page renderer every allowed request is forwarded to.
    pub renderer_url: String,
    pub renderer_timeout: Duration,
    // Upper bound for buffered request bodies forwarded to the renderer.
    pub max_body_bytes: usize,
    // Cookie names of the credential store.
    pub token_cookie: String,
    pub role_cookie: String,
    // Paths the access rules redirect between.
    pub paths: GuardPaths,
    // The allow-list of path patterns the guard runs for.
    pub matcher: GuardMatcher,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// GuardPaths
///
/// The fixed set of pages the access rules are written against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardPaths {
    /// Admin home; also the prefix of every admin page.
    pub admin_home: String,
    pub admin_login: String,
    pub admin_register: String,
    /// Storefront home, where authenticated non-admins are sent from the auth pages.
    pub user_home: String,
    pub user_auth_prefix: String,
    pub user_login: String,
    /// Pages that require a session: profile, orders, checkout, new-booking.
    pub protected_prefixes: Vec<String>,
    /// Reason code sent to the login page when a protected page bounced the visitor.
    pub need_login_msg: String,
}

impl Default for GuardPaths {
    fn default() -> Self {
        Self {
            admin_home: "/admin".to_string(),
            admin_login: "/admin/auth/login".to_string(),
            admin_register: "/admin/auth/register".to_string(),
            user_home: "/site".to_string(),
            user_auth_prefix: "/site/auth".to_string(),
            user_login: "/site/auth/login".to_string(),
            protected_prefixes: vec![
                "/site/profile".to_string(),
                "/site/orders".to_string(),
                "/site/checkout".to_string(),
                "/site/new-booking".to_string(),
            ],
            need_login_msg: "needLogin".to_string(),
        }
    }
}

/// GuardMatcher
///
/// The allow-list of path patterns for which the guard is invoked at all. Each root
/// behaves like a `<root>/:path*` pattern: it matches the root itself and anything below
/// it at a segment boundary. Paths outside the set never reach the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardMatcher {
    roots: Vec<String>,
}

impl Default for GuardMatcher {
    fn default() -> Self {
        Self::new([
            "/admin",
            "/site/auth",
            "/site/profile",
            "/site/orders",
            "/site/checkout",
            "/site/new-booking",
        ])
    }
}

impl GuardMatcher {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roots = roots
            .into_iter()
            .map(Into::into)
            .map(|root: String| {
                let trimmed = root.trim().trim_end_matches('/');
                if trimmed.is_empty() || trimmed.starts_with('/') {
                    trimmed.to_string()
                } else {
                    format!("/{trimmed}")
                }
            })
            .collect();
        Self { roots }
    }

    /// parse
    ///
    /// Parses a comma-separated list of roots, e.g. `/admin,/site/auth`.
    /// Returns `None` when the list holds no usable entry.
    pub fn parse(list: &str) -> Option<Self> {
        let roots: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|root| !root.is_empty())
            .collect();
        if roots.is_empty() {
            None
        } else {
            Some(Self::new(roots))
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn matches(&self, path: &str) -> bool {
        // A root of "/" is stored as "" and matches every path.
        self.roots.iter().any(|root| {
            path.strip_prefix(root.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration used for test setup; needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            renderer_url: DEFAULT_RENDERER_URL.to_string(),
            renderer_timeout: Duration::from_secs(DEFAULT_RENDERER_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            token_cookie: "token".to_string(),
            role_cookie: "role".to_string(),
            paths: GuardPaths::default(),
            matcher: GuardMatcher::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `RENDERER_URL` is not set. The edge has no page
    /// renderer to fall back on, so starting without one is never useful.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let renderer_url = match env {
            Env::Production => {
                env::var("RENDERER_URL").expect("FATAL: RENDERER_URL required in prod")
            }
            Env::Local => env::var("RENDERER_URL").unwrap_or(defaults.renderer_url),
        };

        let matcher = match env::var("GUARD_MATCHER") {
            Ok(list) => GuardMatcher::parse(&list).unwrap_or_else(|| {
                tracing::warn!("GUARD_MATCHER is empty, using the default matcher set");
                defaults.matcher
            }),
            Err(_) => defaults.matcher,
        };

        Self {
            env,
            listen_addr: env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            renderer_url,
            renderer_timeout: Duration::from_secs(parse_or(
                "RENDERER_TIMEOUT_SECS",
                DEFAULT_RENDERER_TIMEOUT_SECS,
            )),
            max_body_bytes: parse_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            token_cookie: env::var("AUTH_TOKEN_COOKIE").unwrap_or(defaults.token_cookie),
            role_cookie: env::var("AUTH_ROLE_COOKIE").unwrap_or(defaults.role_cookie),
            paths: defaults.paths,
            matcher,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{key}={raw:?} is not valid, using default {default}");
            default
        }),
        Err(_) => default,
    }
}
