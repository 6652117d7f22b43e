use super::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// A recipe the user saved to their favorites.
///
/// Uniqueness is by `id`; see [`crate::RecipeStore::add_favorite`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub title: String,
    pub image: String,
    /// Zero when the API did not report a cooking time
    pub ready_in_minutes: i32,
    /// Rounded calorie count, zero when unknown
    pub calories: i32,
}

impl From<&Recipe> for Favorite {
    fn from(recipe: &Recipe) -> Self {
        Favorite {
            id: recipe.id,
            title: recipe.title.clone(),
            image: recipe.image.clone(),
            ready_in_minutes: recipe.ready_in_minutes.unwrap_or(0),
            calories: recipe.calories().map(|c| c.round() as i32).unwrap_or(0),
        }
    }
}

/// A cached copy of a search result, kept so screens can render a recipe
/// row without another network round trip.
///
/// Has the same shape as a favorite but lives in its own collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRecipe {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: i32,
    pub calories: i32,
}

impl From<&Recipe> for CachedRecipe {
    fn from(recipe: &Recipe) -> Self {
        let favorite = Favorite::from(recipe);
        CachedRecipe {
            id: favorite.id,
            title: favorite.title,
            image: favorite.image,
            ready_in_minutes: favorite.ready_in_minutes,
            calories: favorite.calories,
        }
    }
}

/// A named grocery entry on the shopping list.
///
/// Uniqueness is by `name`; there is no separate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    #[serde(default)]
    pub is_checked: bool,
}

impl ShoppingItem {
    pub(crate) fn new(name: String) -> Self {
        ShoppingItem {
            name,
            is_checked: false,
        }
    }
}
