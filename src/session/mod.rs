//! Server-side sessions keyed by an opaque id carried in a cookie.
//!
//! A session is loaded by the [`AuthUser`] extractor at the start of a
//! request and saved or destroyed explicitly by the handlers that change it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::{Sqlite, Transaction};
use time::Duration;

use crate::config::SessionConfig;

mod extractors;
pub mod store;

pub use extractors::AuthUser;

/// Bind a fresh session to `user_id`, dropping any session the client
/// already carried, and return the jar with the new cookie set. Nothing is
/// visible until the caller commits `tx`.
pub async fn start(
    tx: &mut Transaction<'_, Sqlite>,
    cfg: &SessionConfig,
    jar: CookieJar,
    user_id: i64,
) -> anyhow::Result<CookieJar> {
    if let Some(previous) = jar.get(&cfg.cookie_name) {
        store::destroy_tx(tx, previous.value()).await?;
    }
    let record = store::create_tx(tx, user_id, Duration::minutes(cfg.ttl_minutes)).await?;
    Ok(jar.add(session_cookie(cfg, record.id)))
}

/// Destroy the session and expire its cookie.
pub async fn end(
    tx: &mut Transaction<'_, Sqlite>,
    cfg: &SessionConfig,
    jar: CookieJar,
    session_id: &str,
) -> anyhow::Result<CookieJar> {
    store::destroy_tx(tx, session_id).await?;
    Ok(jar.remove(Cookie::build((cfg.cookie_name.clone(), "")).path("/")))
}

fn session_cookie(cfg: &SessionConfig, id: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.secure_cookie)
        .max_age(Duration::minutes(cfg.ttl_minutes))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(secure: bool) -> SessionConfig {
        SessionConfig {
            cookie_name: "sid".into(),
            ttl_minutes: 10,
            secure_cookie: secure,
        }
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let c = session_cookie(&cfg(false), "abc".into());
        assert_eq!(c.name(), "sid");
        assert_eq!(c.value(), "abc");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.max_age(), Some(Duration::minutes(10)));
    }

    #[test]
    fn secure_flag_follows_config() {
        assert_eq!(session_cookie(&cfg(true), "x".into()).secure(), Some(true));
        assert_eq!(session_cookie(&cfg(false), "x".into()).secure(), Some(false));
    }
}
