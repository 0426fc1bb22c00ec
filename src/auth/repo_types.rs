use std::fmt;

use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sqlx::FromRow;

/// User record in the database.
///
/// The password hash is write-only. It is produced by [`User::hash_password`]
/// on insert and can only be checked through [`User::authenticate`].
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    password_hash: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl User {
    /// Salted argon2id hash of a new user's password, in PHC string form.
    pub(super) fn hash_password(plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("hash password for new user: {e}"))
    }

    /// Checks `plain` against the stored hash.
    pub fn authenticate(&self, plain: &str) -> anyhow::Result<bool> {
        let stored = PasswordHash::new(&self.password_hash)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("stored password hash of user {} is unreadable", self.id))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &stored)
            .is_ok())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("image_url", &self.image_url)
            .field("bio", &self.bio)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(password_hash: String) -> User {
        User {
            id: 7,
            username: "al".into(),
            password_hash,
            image_url: None,
            bio: None,
        }
    }

    #[test]
    fn signup_password_authenticates_and_others_do_not() {
        let al = user_with_hash(User::hash_password("soup-lover").unwrap());
        assert!(al.authenticate("soup-lover").unwrap());
        assert!(!al.authenticate("Soup-lover").unwrap());
        assert!(!al.authenticate("").unwrap());
    }

    #[test]
    fn two_users_with_one_password_get_different_hashes() {
        let a = User::hash_password("x").unwrap();
        let b = User::hash_password("x").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn corrupt_stored_hash_names_the_user() {
        let err = user_with_hash("plaintext".into())
            .authenticate("plaintext")
            .unwrap_err();
        assert!(err.to_string().contains("user 7"));
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let al = user_with_hash(User::hash_password("x").unwrap());
        let shown = format!("{al:?}");
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("$argon2"));
    }
}
