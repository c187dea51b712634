use pitch_gate::{
    config::GuardPaths,
    decide,
    models::{AuthState, Decision, QueryParam, Role},
    normalize_path,
};

// --- Helpers ---

fn state(has_token: bool, role: Option<&str>) -> AuthState {
    AuthState::from_raw(has_token.then_some("opaque-session-token"), role)
}

fn run(path: &str, has_token: bool, role: Option<&str>) -> Decision {
    decide(path, &state(has_token, role), &GuardPaths::default())
}

fn need_login(path: &str) -> Decision {
    Decision::RedirectWithQuery {
        target: "/site/auth/login".to_string(),
        params: vec![
            QueryParam::new("redirect", path),
            QueryParam::new("msg", "needLogin"),
        ],
    }
}

// --- Admin auth pages ---

#[test]
fn test_admin_login_redirects_authenticated_admin() {
    assert_eq!(
        run("/admin/auth/login", true, Some("admin")),
        Decision::redirect("/admin")
    );
}

#[test]
fn test_admin_login_allows_anonymous() {
    assert_eq!(run("/admin/auth/login", false, None), Decision::Allow);
}

#[test]
fn test_admin_login_allows_non_admin_session() {
    // A customer session may still open the admin login page to switch accounts.
    assert_eq!(
        run("/admin/auth/login", true, Some("customer")),
        Decision::Allow
    );
}

#[test]
fn test_admin_register_behaves_like_admin_login() {
    assert_eq!(
        run("/admin/auth/register", true, Some("admin")),
        Decision::redirect("/admin")
    );
    assert_eq!(run("/admin/auth/register", false, None), Decision::Allow);
}

#[test]
fn test_admin_role_without_token_is_not_an_admin_session() {
    assert_eq!(run("/admin/auth/login", false, Some("admin")), Decision::Allow);
    assert_eq!(
        run("/admin/dashboard", false, Some("admin")),
        Decision::redirect("/admin/auth/login")
    );
}

// --- Admin protected pages ---

#[test]
fn test_admin_page_redirects_anonymous_to_admin_login() {
    assert_eq!(
        run("/admin/dashboard", false, None),
        Decision::redirect("/admin/auth/login")
    );
}

#[test]
fn test_admin_page_checks_token_presence_only() {
    // The backend rejects non-admins on the actual API calls.
    assert_eq!(
        run("/admin/dashboard", true, Some("customer")),
        Decision::Allow
    );
    assert_eq!(run("/admin/dashboard", true, None), Decision::Allow);
}

#[test]
fn test_admin_root_is_protected() {
    assert_eq!(
        run("/admin", false, None),
        Decision::redirect("/admin/auth/login")
    );
    assert_eq!(run("/admin", true, Some("admin")), Decision::Allow);
}

#[test]
fn test_other_admin_auth_pages_are_protected() {
    // Only login and register are exact-match exemptions.
    assert_eq!(
        run("/admin/auth/forgot-password", false, None),
        Decision::redirect("/admin/auth/login")
    );
}

// --- User auth pages ---

#[test]
fn test_user_login_sends_admin_session_to_admin_home() {
    assert_eq!(
        run("/site/auth/login", true, Some("admin")),
        Decision::redirect("/admin")
    );
}

#[test]
fn test_user_login_sends_customer_session_to_storefront() {
    assert_eq!(
        run("/site/auth/login", true, Some("customer")),
        Decision::redirect("/site")
    );
    assert_eq!(
        run("/site/auth/register", true, None),
        Decision::redirect("/site")
    );
}

#[test]
fn test_user_auth_pages_allow_anonymous() {
    assert_eq!(run("/site/auth/login", false, None), Decision::Allow);
    assert_eq!(run("/site/auth", false, None), Decision::Allow);
    assert_eq!(run("/site/auth/reset/abc", false, None), Decision::Allow);
}

// --- Protected storefront pages ---

#[test]
fn test_profile_requires_login_with_return_path() {
    let decision = run("/site/profile", false, None);
    assert_eq!(decision, need_login("/site/profile"));
    assert_eq!(
        decision.location().as_deref(),
        Some("/site/auth/login?redirect=%2Fsite%2Fprofile&msg=needLogin")
    );
}

#[test]
fn test_every_protected_prefix_requires_login() {
    for path in [
        "/site/profile/edit",
        "/site/orders",
        "/site/orders/42",
        "/site/checkout",
        "/site/checkout/payment",
        "/site/new-booking",
        "/site/new-booking/field/7",
    ] {
        assert_eq!(run(path, false, None), need_login(path), "path {path}");
        assert_eq!(run(path, true, Some("customer")), Decision::Allow, "path {path}");
    }
}

#[test]
fn test_protected_pages_allow_admin_sessions() {
    assert_eq!(run("/site/orders", true, Some("admin")), Decision::Allow);
}

// --- Default rule ---

#[test]
fn test_unmatched_paths_are_allowed() {
    assert_eq!(run("/site/catalog", false, None), Decision::Allow);
    assert_eq!(run("/site", false, None), Decision::Allow);
    assert_eq!(run("/", false, None), Decision::Allow);
    assert_eq!(run("/site/fields/3", true, Some("admin")), Decision::Allow);
}

// --- Properties ---

#[test]
fn test_exact_prefix_matches_like_sub_path() {
    let paths = GuardPaths::default();
    for prefix in &paths.protected_prefixes {
        let nested = format!("{prefix}/anything");
        assert_eq!(run(prefix, false, None), need_login(prefix));
        assert_eq!(run(&nested, false, None), need_login(&nested));
    }
    assert_eq!(run("/admin", false, None), run("/admin/settings", false, None));
}

#[test]
fn test_prefix_matching_is_literal_and_loose() {
    // Shares a prefix without a segment boundary, still treated as protected.
    assert_eq!(
        run("/site/profile-cards", false, None),
        need_login("/site/profile-cards")
    );
    assert_eq!(
        run("/administrators", false, None),
        Decision::redirect("/admin/auth/login")
    );
    assert_eq!(
        run("/site/authors", true, None),
        Decision::redirect("/site")
    );
}

#[test]
fn test_decide_is_idempotent() {
    let inputs = [
        ("/admin/auth/login", true, Some("admin")),
        ("/admin/dashboard", false, None),
        ("/site/auth/login", true, Some("customer")),
        ("/site/profile", false, None),
        ("/site/catalog", false, None),
    ];
    for (path, has_token, role) in inputs {
        assert_eq!(
            run(path, has_token, role),
            run(path, has_token, role),
            "path {path}"
        );
    }
}

#[test]
fn test_decide_is_total_over_all_credential_combinations() {
    let paths = [
        "/",
        "/admin",
        "/admin/auth/login",
        "/admin/auth/register",
        "/admin/users",
        "/site",
        "/site/auth/login",
        "/site/profile",
        "/site/orders/1",
        "/site/checkout",
        "/site/new-booking",
        "/site/catalog",
    ];
    let tokens = [false, true];
    let roles = [None, Some(""), Some("admin"), Some("ADMIN"), Some("customer")];

    for path in paths {
        for has_token in tokens {
            for role in roles {
                let decision = run(path, has_token, role);
                if let Some(location) = decision.location() {
                    assert!(location.starts_with('/'), "{path} -> {location}");
                    assert_ne!(location, path, "redirect loop at {path}");
                }
            }
        }
    }
}

#[test]
fn test_role_case_is_ignored_at_classification() {
    assert_eq!(state(true, Some("Admin")).role, Role::Admin);
    assert_eq!(
        run("/site/auth/login", true, Some(" ADMIN ")),
        Decision::redirect("/admin")
    );
}

#[test]
fn test_custom_paths_are_honored() {
    let paths = GuardPaths {
        protected_prefixes: vec!["/site/wishlist".to_string()],
        need_login_msg: "loginFirst".to_string(),
        ..GuardPaths::default()
    };
    let decision = decide("/site/wishlist", &AuthState::anonymous(), &paths);
    assert_eq!(
        decision.location().as_deref(),
        Some("/site/auth/login?redirect=%2Fsite%2Fwishlist&msg=loginFirst")
    );
    assert_eq!(
        decide("/site/profile", &AuthState::anonymous(), &paths),
        Decision::Allow
    );
}

// --- Path normalization ---

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("/site/profile/"), "/site/profile");
    assert_eq!(normalize_path("//admin///dashboard"), "/admin/dashboard");
    assert_eq!(normalize_path("site/orders"), "/site/orders");
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path(""), "/");
}

#[test]
fn test_normalize_path_resolves_dot_segments() {
    assert_eq!(normalize_path("/site/catalog/../profile"), "/site/profile");
    assert_eq!(normalize_path("/site/./orders/./12"), "/site/orders/12");
    assert_eq!(normalize_path("/site/catalog/%2e%2e/checkout"), "/site/checkout");
    assert_eq!(normalize_path("/site/catalog/%2E./new-booking"), "/site/new-booking");
    assert_eq!(normalize_path("/site/%2e/profile"), "/site/profile");
    // `..` never climbs above the root.
    assert_eq!(normalize_path("/../../admin"), "/admin");
    assert_eq!(normalize_path("/site/.."), "/");
    // Dots inside a segment are ordinary characters.
    assert_eq!(normalize_path("/site/v1.2/..x"), "/site/v1.2/..x");
}

#[test]
fn test_dot_segments_cannot_sidestep_protected_pages() {
    let path = normalize_path("/site/catalog/../profile");
    assert_eq!(run(&path, false, None), need_login("/site/profile"));
}

#[test]
fn test_decision_locations() {
    assert_eq!(Decision::Allow.location(), None);
    assert_eq!(
        Decision::redirect("/admin").location().as_deref(),
        Some("/admin")
    );
    let bare = Decision::RedirectWithQuery {
        target: "/site/auth/login".to_string(),
        params: vec![],
    };
    assert_eq!(bare.location().as_deref(), Some("/site/auth/login"));
}
