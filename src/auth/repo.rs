use crate::auth::repo_types::User;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Fields of a user about to be inserted. The password is hashed on insert.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub image_url: Option<&'a str>,
    pub bio: Option<&'a str>,
}

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user within a transaction, storing a salted hash of the password.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Sqlite>,
        new: NewUser<'_>,
    ) -> anyhow::Result<User> {
        let hash = User::hash_password(new.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password_hash, image_url, bio
            "#,
        )
        .bind(new.username)
        .bind(hash)
        .bind(new.image_url)
        .bind(new.bio)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }
}
