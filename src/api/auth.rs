//! Admin authentication: password hashing, the session cookie, and the
//! login/logout/change-password form actions.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{AdminUser, DbPool};
use crate::session;
use crate::AppState;

/// Session cookie name
pub const SESSION_COOKIE: &str = "admin_session";

/// Cookie scope: the admin area only
const SESSION_COOKIE_PATH: &str = "/admin";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verify admin credentials.
///
/// Unknown usernames, bad passwords, and database failures all return
/// `false` so the response shape never reveals whether an account exists.
pub async fn verify_admin(pool: &DbPool, username: &str, password: &str) -> bool {
    let user: Option<AdminUser> =
        match sqlx::query_as("SELECT * FROM admin_users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(pool)
            .await
        {
            Ok(u) => u,
            Err(e) => {
                tracing::error!("verify_admin query failed: {}", e);
                return false;
            }
        };

    match user {
        Some(user) => verify_password(password, &user.password_hash),
        None => false,
    }
}

/// Re-hash and overwrite the stored password for `username`.
pub async fn update_admin_password(
    pool: &DbPool,
    username: &str,
    new_password: &str,
) -> Result<()> {
    let password_hash = hash_password(new_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    sqlx::query("UPDATE admin_users SET password_hash = ? WHERE username = ?")
        .bind(&password_hash)
        .bind(username)
        .execute(pool)
        .await?;
    Ok(())
}

/// Seed the single admin account when the table is empty.
///
/// The default password is a deliberate bootstrap convenience; deployments
/// must rotate it immediately.
pub async fn ensure_admin_user(
    pool: &DbPool,
    username: &str,
    default_password: &str,
) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(default_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash default password: {}", e))?;
    let created_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO admin_users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(&password_hash)
    .bind(&created_at)
    .execute(pool)
    .await?;

    tracing::warn!(
        "Seeded default admin account '{}' with the default password; rotate it now",
        username
    );
    Ok(())
}

fn redirect_with_error(path: &str, error: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(error)))
}

fn session_cookie(value: String, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path(SESSION_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(production)
        .max_age(time::Duration::seconds(session::SESSION_MAX_AGE_SECS))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path(SESSION_COOKIE_PATH)
        .build()
}

/// A verified admin session extracted from the request cookie.
///
/// Rejection redirects to the login page; every admin handler takes this
/// extractor so each request re-verifies the token.
pub struct AdminSession {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/admin/login"))?;
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/admin/login"))?;
        let claims = session::verify(state.config.session.secret.as_deref(), &token)
            .ok_or_else(|| Redirect::to("/admin/login"))?;
        Ok(AdminSession {
            username: claims.username,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return redirect_with_error("/admin/login", "Username and password are required.")
            .into_response();
    }

    if !verify_admin(&state.db, username, &form.password).await {
        return redirect_with_error("/admin/login", "Invalid username or password.")
            .into_response();
    }

    let token = match session::issue(state.config.session.secret.as_deref(), username) {
        Ok(token) => token,
        Err(e) => {
            // Deployment problem, not a user error; keep the message generic
            tracing::error!("Cannot issue session: {}", e);
            return redirect_with_error(
                "/admin/login",
                "Login is temporarily unavailable. Contact the site operator.",
            )
            .into_response();
        }
    };

    let jar = jar.add(session_cookie(token, state.config.server.production));
    (jar, Redirect::to("/admin")).into_response()
}

/// POST /admin/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(removal_cookie());
    (jar, Redirect::to("/admin/login"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /admin/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> impl IntoResponse {
    const PAGE: &str = "/admin/change-password";

    if form.current_password.is_empty()
        || form.new_password.is_empty()
        || form.confirm_password.is_empty()
    {
        return redirect_with_error(PAGE, "All fields are required.").into_response();
    }
    if form.new_password.len() < 8 {
        return redirect_with_error(PAGE, "New password must be at least 8 characters.")
            .into_response();
    }
    if form.new_password != form.confirm_password {
        return redirect_with_error(PAGE, "New password and confirmation do not match.")
            .into_response();
    }

    if !verify_admin(&state.db, &session.username, &form.current_password).await {
        return redirect_with_error(PAGE, "Current password is incorrect.").into_response();
    }

    if let Err(e) = update_admin_password(&state.db, &session.username, &form.new_password).await {
        tracing::error!("Password update failed: {}", e);
        return redirect_with_error(PAGE, "Failed to update password.").into_response();
    }

    // Force a fresh login under the new password
    let jar = jar.remove(removal_cookie());
    (jar, Redirect::to("/admin/login?passwordChanged=1")).into_response()
}
