use serde::Deserialize;

use super::repo_types::NewRecipe;

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
}

impl From<CreateRecipeRequest> for NewRecipe {
    fn from(r: CreateRecipeRequest) -> Self {
        Self {
            title: r.title.unwrap_or_default(),
            instructions: r.instructions.unwrap_or_default(),
            minutes_to_complete: r.minutes_to_complete,
        }
    }
}
