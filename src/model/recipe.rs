use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Name of the nutrient that carries the calorie count of a recipe.
const CALORIES_NUTRIENT: &str = "Calories";

/// A single nutrient entry as reported by the recipe API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

/// Nutrition block attached to search results and recipe details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionInfo {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

impl NutritionInfo {
    /// Returns the amount of the nutrient with the given name.
    ///
    /// Names are compared case-insensitively; the first match wins.
    pub fn amount_of(&self, name: &str) -> Option<f64> {
        self.nutrients
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .map(|n| n.amount)
    }
}

/// A recipe as returned by the search endpoint.
///
/// Search results are transient: they are shown, sorted and paged but
/// never persisted as-is. See [`crate::Favorite`] for the stored form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ready_in_minutes: Option<i32>,
    #[serde(default)]
    pub nutrition: Option<NutritionInfo>,
}

impl Recipe {
    /// Returns the calorie count of this recipe, if the API reported one.
    pub fn calories(&self) -> Option<f64> {
        self.nutrition
            .as_ref()
            .and_then(|n| n.amount_of(CALORIES_NUTRIENT))
    }
}

/// Body of a `complexSearch` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<Recipe>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

/// An ingredient line of a recipe detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    /// The ingredient line as written in the source recipe
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub image: String,
}

/// A single numbered instruction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub number: u32,
    pub step: String,
}

/// A named block of instruction steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Full information about one recipe, fetched on demand by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ready_in_minutes: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub vegan: Option<bool>,
    #[serde(default)]
    pub gluten_free: Option<bool>,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default)]
    pub nutrition: Option<NutritionInfo>,
    #[serde(default)]
    pub extended_ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub analyzed_instructions: Option<Vec<Instruction>>,
}

impl RecipeDetail {
    /// Returns the calorie count of this recipe, if the API reported one.
    pub fn calories(&self) -> Option<f64> {
        self.nutrition
            .as_ref()
            .and_then(|n| n.amount_of(CALORIES_NUTRIENT))
    }

    /// Returns the summary with its HTML markup removed.
    ///
    /// The API embeds `<b>` and `<a href>` tags in summaries; hosts that
    /// render plain text want them gone.
    pub fn plain_summary(&self) -> String {
        static TAG_RE: OnceLock<Regex> = OnceLock::new();
        let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
        re.replace_all(&self.summary, "").trim().to_string()
    }

    /// Returns the ingredient list, empty when the API sent none.
    pub fn ingredients(&self) -> &[Ingredient] {
        self.extended_ingredients.as_deref().unwrap_or_default()
    }

    /// Returns the ingredient names in recipe order.
    ///
    /// These are the names used as shopping item keys.
    pub fn ingredient_names(&self) -> Vec<String> {
        self.ingredients().iter().map(|i| i.name.clone()).collect()
    }

    /// Returns all instruction steps flattened across instruction blocks.
    pub fn steps(&self) -> Vec<&Step> {
        self.analyzed_instructions
            .iter()
            .flatten()
            .flat_map(|block| block.steps.iter())
            .collect()
    }
}
