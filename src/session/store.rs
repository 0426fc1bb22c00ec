use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

/// A row of the `sessions` table. Timestamps are unix seconds.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Start a new session for `user_id` under a fresh random id within a transaction.
pub async fn create_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    ttl: Duration,
) -> anyhow::Result<SessionRecord> {
    let now = OffsetDateTime::now_utc();
    let record = sqlx::query_as::<_, SessionRecord>(
        r#"
        INSERT INTO sessions (id, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, created_at, expires_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(now.unix_timestamp())
    .bind((now + ttl).unix_timestamp())
    .fetch_one(&mut **tx)
    .await?;
    debug!(
        user_id,
        created_at = record.created_at,
        expires_at = record.expires_at,
        "session created"
    );
    Ok(record)
}

/// Load a session that has not expired yet.
pub async fn load(db: &SqlitePool, id: &str) -> anyhow::Result<Option<SessionRecord>> {
    let record = sqlx::query_as::<_, SessionRecord>(
        r#"
        SELECT id, user_id, created_at, expires_at
        FROM sessions
        WHERE id = ? AND expires_at > ?
        "#,
    )
    .bind(id)
    .bind(OffsetDateTime::now_utc().unix_timestamp())
    .fetch_optional(db)
    .await?;
    Ok(record)
}

pub async fn destroy_tx(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn purge_expired(db: &SqlitePool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn user(db: &SqlitePool, username: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (username, password_hash) VALUES (?, 'x') RETURNING id",
        )
        .bind(username)
        .fetch_one(db)
        .await
        .unwrap();
        id
    }

    async fn create(db: &SqlitePool, user_id: i64, ttl: Duration) -> anyhow::Result<SessionRecord> {
        let mut tx = db.begin().await?;
        let record = create_tx(&mut tx, user_id, ttl).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn destroy(db: &SqlitePool, id: &str) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;
        let gone = destroy_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(gone)
    }

    #[tokio::test]
    async fn create_load_destroy() {
        let db = db::in_memory().await;
        let uid = user(&db, "al").await;

        let s = create(&db, uid, Duration::minutes(5)).await.unwrap();
        assert_eq!(s.user_id, uid);
        assert!(s.expires_at > s.created_at);

        let loaded = load(&db, &s.id).await.unwrap().expect("active session");
        assert_eq!(loaded.user_id, uid);

        assert!(destroy(&db, &s.id).await.unwrap());
        assert!(load(&db, &s.id).await.unwrap().is_none());
        assert!(!destroy(&db, &s.id).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_unique_per_session() {
        let db = db::in_memory().await;
        let uid = user(&db, "al").await;
        let a = create(&db, uid, Duration::minutes(5)).await.unwrap();
        let b = create(&db, uid, Duration::minutes(5)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn expired_sessions_are_ignored_and_purged() {
        let db = db::in_memory().await;
        let uid = user(&db, "al").await;
        let stale = create(&db, uid, Duration::minutes(-1)).await.unwrap();
        let fresh = create(&db, uid, Duration::minutes(5)).await.unwrap();

        assert!(load(&db, &stale.id).await.unwrap().is_none());
        assert_eq!(purge_expired(&db).await.unwrap(), 1);
        assert!(load(&db, &fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_the_user_drops_its_sessions() {
        let db = db::in_memory().await;
        let uid = user(&db, "al").await;
        let s = create(&db, uid, Duration::minutes(5)).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(uid)
            .execute(&db)
            .await
            .unwrap();
        assert!(load(&db, &s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_created_in_a_rolled_back_transaction_does_not_exist() {
        let db = db::in_memory().await;
        let uid = user(&db, "al").await;
        let mut tx = db.begin().await.unwrap();
        let s = create_tx(&mut tx, uid, Duration::minutes(5)).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(load(&db, &s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let db = db::in_memory().await;
        assert!(load(&db, "not-a-session").await.unwrap().is_none());
    }
}
