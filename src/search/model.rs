use crate::model::Recipe;
use std::fmt;
use std::str::FromStr;

/// Client-side ordering applied to fetched results.
///
/// The API does not sort; ordering happens after a page arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    None,
    /// Ascending by ready-in-minutes, missing values count as 0
    CookingTime,
    /// Ascending by the "Calories" nutrient, missing values count as 0
    Calories,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::None => "none",
            SortOption::CookingTime => "cookingTime",
            SortOption::Calories => "calories",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort option: {0}")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortOption::None),
            "cookingTime" => Ok(SortOption::CookingTime),
            "calories" => Ok(SortOption::Calories),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

/// Sorts recipes in place, ascending by the chosen key.
///
/// The sort is stable: recipes with equal keys keep their relative order.
pub fn sort_recipes(recipes: &mut [Recipe], sort: SortOption) {
    match sort {
        SortOption::None => {}
        SortOption::CookingTime => {
            recipes.sort_by_key(|r| r.ready_in_minutes.unwrap_or(0));
        }
        SortOption::Calories => {
            recipes.sort_by(|a, b| calorie_key(a).total_cmp(&calorie_key(b)));
        }
    }
}

fn calorie_key(recipe: &Recipe) -> f64 {
    recipe.calories().unwrap_or(0.0)
}

/// A page fetch handed out by [`super::SearchSession::begin_page`].
///
/// Carries the generation of the query it was issued for, so a response
/// that arrives after the query changed can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub offset: u32,
    pub number: u32,
}

/// What happened when a page response was applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page added this many results and advanced the offset
    Loaded { added: usize },
    /// The page was empty; no further pages will be fetched
    Exhausted,
    /// The response belonged to an older query and was discarded
    Stale,
}
