use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{required, LoginRequest, PublicUser, SignupRequest},
        repo::NewUser,
        repo_types::User,
    },
    error::AppError,
    session::{self, AuthUser},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/check_session", get(check_session))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<PublicUser>), AppError> {
    let Json(payload) = payload.inspect_err(|e| warn!(error = %e, "signup body rejected"))?;
    let (Some(username), Some(password)) =
        (required(&payload.username), required(&payload.password))
    else {
        warn!("signup missing username or password");
        return Err(AppError::Unprocessable(
            "Username and password are required.".into(),
        ));
    };

    // The user row and its first session commit together.
    let mut tx = state.db.begin().await.map_err(anyhow::Error::from)?;
    let created = User::create_tx(
        &mut tx,
        NewUser {
            username,
            password,
            image_url: payload.image_url.as_deref(),
            bio: payload.bio.as_deref(),
        },
    )
    .await;
    let user = match created {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, username, "signup failed");
            tx.rollback().await.map_err(anyhow::Error::from)?;
            return Err(AppError::Unprocessable(e.to_string()));
        }
    };
    let jar = session::start(&mut tx, &state.config.session, jar, user.id).await?;
    if let Err(e) = tx.commit().await {
        warn!(error = %e, username, "signup commit failed");
        return Err(AppError::Unprocessable(e.to_string()));
    }

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<PublicUser>), AppError> {
    let Ok(Json(payload)) = payload else {
        warn!("login body rejected");
        return Err(AppError::unauthorized());
    };
    let (Some(username), Some(password)) =
        (required(&payload.username), required(&payload.password))
    else {
        warn!("login missing username or password");
        return Err(AppError::unauthorized());
    };

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        warn!(username, "login unknown username");
        return Err(AppError::unauthorized());
    };

    if !user.authenticate(password)? {
        warn!(username, user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized());
    }

    let mut tx = state.db.begin().await.map_err(anyhow::Error::from)?;
    let jar = session::start(&mut tx, &state.config.session, jar, user.id).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((jar, Json(user.into())))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn check_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    match User::find_by_id(&state.db, auth.user_id).await? {
        Some(user) => Ok(Json(user.into())),
        None => {
            warn!("session bound to a missing user");
            Err(AppError::Unauthorized("User not found".into()))
        }
    }
}

#[instrument(skip(state, jar, auth), fields(user_id = auth.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<(StatusCode, CookieJar), AppError> {
    let mut tx = state.db.begin().await.map_err(anyhow::Error::from)?;
    let jar = session::end(&mut tx, &state.config.session, jar, &auth.session_id).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;
    info!("user logged out");
    Ok((StatusCode::NO_CONTENT, jar))
}
