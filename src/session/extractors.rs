use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::store;
use crate::{error::AppError, state::AppState};

/// Resolves the session cookie to an active session, or rejects with 401.
pub struct AuthUser {
    pub user_id: i64,
    pub session_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_owned())
            .ok_or_else(AppError::unauthorized)?;

        let Some(record) = store::load(&state.db, &session_id).await? else {
            debug!("unknown or expired session");
            return Err(AppError::unauthorized());
        };

        Ok(AuthUser {
            user_id: record.user_id,
            session_id: record.id,
        })
    }
}
