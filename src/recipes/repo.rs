use sqlx::{Sqlite, SqlitePool, Transaction};

use super::repo_types::{NewRecipe, Recipe};

/// All recipes owned by `user_id`, in insertion order.
pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, title, instructions, minutes_to_complete
        FROM recipes
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert a validated recipe owned by `user_id` within a transaction.
pub async fn insert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    recipe: &NewRecipe,
) -> anyhow::Result<Recipe> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, instructions, minutes_to_complete
        "#,
    )
    .bind(&recipe.title)
    .bind(&recipe.instructions)
    .bind(recipe.minutes_to_complete)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}
