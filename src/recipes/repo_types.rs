use serde::Serialize;
use sqlx::FromRow;

pub const MIN_INSTRUCTIONS_LEN: usize = 50;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i64>,
}

/// A recipe that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i64>,
}

impl NewRecipe {
    /// Runs the field rules in order and returns the first failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("Title must be provided.".into());
        }
        if self.instructions.chars().count() < MIN_INSTRUCTIONS_LEN {
            return Err(format!(
                "Instructions must be at least {MIN_INSTRUCTIONS_LEN} characters long."
            ));
        }
        Ok(())
    }
}
