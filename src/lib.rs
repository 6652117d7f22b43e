pub mod client;
pub mod config;
pub mod ffi;
pub mod logging;
pub mod model;
pub mod search;
pub mod store;

pub use client::{parse_ingredients, ApiError, Diet, Filters, Intolerance, RecipeClient};
pub use config::ClientConfig;
pub use model::*;
pub use search::{sort_recipes, SearchSession, SortOption};
pub use store::{AddOutcome, RecipeStore, RemoveOutcome, StoreChange, StoreError, UpdateOutcome};

uniffi::setup_scaffolding!();
