use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    recipes::{
        dto::CreateRecipeRequest,
        repo,
        repo_types::{NewRecipe, Recipe},
    },
    session::AuthUser,
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = repo::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let Json(payload) = payload.inspect_err(|e| warn!(error = %e, "recipe body rejected"))?;
    let recipe = NewRecipe::from(payload);
    if let Err(msg) = recipe.validate() {
        warn!(%msg, "recipe rejected");
        return Err(AppError::Unprocessable(msg));
    }

    let mut tx = state.db.begin().await.map_err(anyhow::Error::from)?;
    let created = match repo::insert_tx(&mut tx, auth.user_id, &recipe).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "insert recipe failed");
            tx.rollback().await.map_err(anyhow::Error::from)?;
            return Err(AppError::Unprocessable(e.to_string()));
        }
    };
    if let Err(e) = tx.commit().await {
        warn!(error = %e, "recipe commit failed");
        return Err(AppError::Unprocessable(e.to_string()));
    }

    info!(recipe_id = created.id, "recipe created");
    Ok((StatusCode::CREATED, Json(created)))
}
