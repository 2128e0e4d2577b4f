//! Browser session: a cookie holding the backend access token.

use crate::backend::HabitStore;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;
use crate::tracker::{CompletionTracker, PendingSet};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::error;

pub const SESSION_COOKIE: &str = "habits_session";

pub fn session_cookie(access_token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// A signed-in user plus data access scoped to their token.
///
/// Page routes redirect to `/login` when the session is missing or expired;
/// `/api` routes answer 401 instead.
pub struct Authenticated {
    pub user: User,
    pub store: Arc<dyn HabitStore>,
    pub pending: PendingSet,
}

impl Authenticated {
    /// A tracker that sees completion changes this user has in flight elsewhere.
    pub fn tracker(&self, today: NaiveDate) -> CompletionTracker {
        CompletionTracker::shared(today, self.pending.clone(), &self.user.id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let wants_json = parts.uri.path().starts_with("/api/");
        let deny = |jar: CookieJar| {
            if wants_json {
                (clear_session(jar), AppError::unauthorized()).into_response()
            } else {
                (clear_session(jar), Redirect::to("/login")).into_response()
            }
        };

        let Some(access_token) = access_token(&jar) else {
            return Err(deny(jar));
        };

        match state.backend.get_user(&access_token).await {
            Ok(Some(user)) => Ok(Self {
                store: state.backend.store(&access_token),
                pending: state.pending.clone(),
                user,
            }),
            Ok(None) => Err(deny(jar)),
            Err(err) => {
                error!(error = %err, "failed to verify session");
                Err(AppError::failed("verify your session").into_response())
            }
        }
    }
}
