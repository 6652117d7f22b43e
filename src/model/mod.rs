//! Data types shared by the API client, the search session and the store.
//!
//! Wire types mirror the JSON emitted by the recipe API; record types are
//! the shapes kept in the on-device store.

mod recipe;
mod records;

pub use recipe::{
    Ingredient, Instruction, Nutrient, NutritionInfo, Recipe, RecipeDetail, SearchResponse, Step,
};
pub use records::{CachedRecipe, Favorite, ShoppingItem};
