//! UniFFI bindings for cross-platform support (iOS, Android).
//!
//! This module provides FFI-safe types and functions for use with UniFFI.
//! Complex types are converted to simpler representations suitable for FFI.

use crate::client::{parse_ingredients as parse_ingredients_internal, ApiError, RecipeClient};
use crate::config::{ClientConfig, ConfigError};
use crate::model::{CachedRecipe, Favorite, Ingredient, Recipe, RecipeDetail, ShoppingItem};
use crate::search::{PageOutcome, SearchSession, SortOption};
use crate::store::{
    AddOutcome, RecipeStore, RemoveOutcome, StoreChange, StoreError, StoreObserver,
    SubscriptionId, UpdateOutcome,
};
use camino::Utf8Path;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// FFI-safe error type that wraps all possible errors.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum RecipeFinderError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Config error: {message}")]
    Config { message: String },
}

impl From<ApiError> for RecipeFinderError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Network(message) => RecipeFinderError::Network { message },
            ApiError::Http { status, body } => RecipeFinderError::Http {
                status,
                message: body,
            },
            ApiError::Decode(e) => RecipeFinderError::Decode {
                message: e.to_string(),
            },
        }
    }
}

impl From<StoreError> for RecipeFinderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidName(name) => RecipeFinderError::InvalidInput {
                message: format!("Invalid shopping item name: {name:?}"),
            },
            other => RecipeFinderError::Storage {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for RecipeFinderError {
    fn from(e: ConfigError) -> Self {
        RecipeFinderError::Config {
            message: e.to_string(),
        }
    }
}

/// FFI-safe representation of a search result.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRecipe {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: Option<i32>,
    /// Calorie count if the API reported one
    pub calories: Option<f64>,
}

impl From<&Recipe> for FfiRecipe {
    fn from(r: &Recipe) -> Self {
        FfiRecipe {
            id: r.id,
            title: r.title.clone(),
            image: r.image.clone(),
            ready_in_minutes: r.ready_in_minutes,
            calories: r.calories(),
        }
    }
}

impl From<FfiRecipe> for Favorite {
    fn from(r: FfiRecipe) -> Self {
        Favorite {
            id: r.id,
            title: r.title,
            image: r.image,
            ready_in_minutes: r.ready_in_minutes.unwrap_or(0),
            calories: r.calories.map(|c| c.round() as i32).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIngredient {
    pub id: i64,
    pub name: String,
    /// Ingredient line as written in the recipe
    pub original: String,
    pub amount: f64,
    pub unit: String,
    pub image: String,
}

impl From<&Ingredient> for FfiIngredient {
    fn from(i: &Ingredient) -> Self {
        FfiIngredient {
            id: i.id,
            name: i.name.clone(),
            original: i.original.clone(),
            amount: i.amount,
            unit: i.unit.clone(),
            image: i.image.clone(),
        }
    }
}

/// FFI-safe representation of a recipe detail.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecipeDetail {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: Option<i32>,
    pub servings: Option<i32>,
    /// Summary with HTML markup removed
    pub summary: String,
    pub vegan: Option<bool>,
    pub gluten_free: Option<bool>,
    pub health_score: Option<f64>,
    pub calories: Option<f64>,
    pub ingredients: Vec<FfiIngredient>,
    /// Instruction steps in order, flattened across instruction blocks
    pub steps: Vec<String>,
}

impl From<&RecipeDetail> for FfiRecipeDetail {
    fn from(d: &RecipeDetail) -> Self {
        FfiRecipeDetail {
            id: d.id,
            title: d.title.clone(),
            image: d.image.clone(),
            ready_in_minutes: d.ready_in_minutes,
            servings: d.servings,
            summary: d.plain_summary(),
            vegan: d.vegan,
            gluten_free: d.gluten_free,
            health_score: d.health_score,
            calories: d.calories(),
            ingredients: d.ingredients().iter().map(FfiIngredient::from).collect(),
            steps: d.steps().iter().map(|s| s.step.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFavorite {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: i32,
    pub calories: i32,
}

impl From<Favorite> for FfiFavorite {
    fn from(f: Favorite) -> Self {
        FfiFavorite {
            id: f.id,
            title: f.title,
            image: f.image,
            ready_in_minutes: f.ready_in_minutes,
            calories: f.calories,
        }
    }
}

impl From<FfiRecipe> for CachedRecipe {
    fn from(r: FfiRecipe) -> Self {
        let favorite = Favorite::from(r);
        CachedRecipe {
            id: favorite.id,
            title: favorite.title,
            image: favorite.image,
            ready_in_minutes: favorite.ready_in_minutes,
            calories: favorite.calories,
        }
    }
}

/// A cached search result as stored on device.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCachedRecipe {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: i32,
    pub calories: i32,
}

impl From<CachedRecipe> for FfiCachedRecipe {
    fn from(c: CachedRecipe) -> Self {
        FfiCachedRecipe {
            id: c.id,
            title: c.title,
            image: c.image,
            ready_in_minutes: c.ready_in_minutes,
            calories: c.calories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiShoppingItem {
    pub name: String,
    pub is_checked: bool,
}

impl From<ShoppingItem> for FfiShoppingItem {
    fn from(i: ShoppingItem) -> Self {
        FfiShoppingItem {
            name: i.name,
            is_checked: i.is_checked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSortOption {
    None,
    CookingTime,
    Calories,
}

impl From<FfiSortOption> for SortOption {
    fn from(s: FfiSortOption) -> Self {
        match s {
            FfiSortOption::None => SortOption::None,
            FfiSortOption::CookingTime => SortOption::CookingTime,
            FfiSortOption::Calories => SortOption::Calories,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiPageOutcome {
    Loaded { added: u32 },
    Exhausted,
    Stale,
}

impl From<PageOutcome> for FfiPageOutcome {
    fn from(o: PageOutcome) -> Self {
        match o {
            PageOutcome::Loaded { added } => FfiPageOutcome::Loaded {
                added: added as u32,
            },
            PageOutcome::Exhausted => FfiPageOutcome::Exhausted,
            PageOutcome::Stale => FfiPageOutcome::Stale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiAddOutcome {
    Added,
    AlreadyExists,
}

impl From<AddOutcome> for FfiAddOutcome {
    fn from(o: AddOutcome) -> Self {
        match o {
            AddOutcome::Added => FfiAddOutcome::Added,
            AddOutcome::AlreadyExists => FfiAddOutcome::AlreadyExists,
        }
    }
}

/// Outcome of a delete or update by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiChangeOutcome {
    Changed,
    NotFound,
}

impl From<RemoveOutcome> for FfiChangeOutcome {
    fn from(o: RemoveOutcome) -> Self {
        match o {
            RemoveOutcome::Removed => FfiChangeOutcome::Changed,
            RemoveOutcome::NotFound => FfiChangeOutcome::NotFound,
        }
    }
}

impl From<UpdateOutcome> for FfiChangeOutcome {
    fn from(o: UpdateOutcome) -> Self {
        match o {
            UpdateOutcome::Updated => FfiChangeOutcome::Changed,
            UpdateOutcome::NotFound => FfiChangeOutcome::NotFound,
        }
    }
}

/// FFI-safe representation of a store change notification.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStoreChange {
    FavoriteAdded { id: i64 },
    FavoriteRemoved { id: i64 },
    FavoritesCleared,
    ShoppingItemAdded { name: String },
    ShoppingItemRemoved { name: String },
    ShoppingItemUpdated { name: String, is_checked: bool },
    ShoppingListCleared,
    RecipeCached { id: i64 },
}

impl From<&StoreChange> for FfiStoreChange {
    fn from(c: &StoreChange) -> Self {
        match c.clone() {
            StoreChange::FavoriteAdded { id } => FfiStoreChange::FavoriteAdded { id },
            StoreChange::FavoriteRemoved { id } => FfiStoreChange::FavoriteRemoved { id },
            StoreChange::FavoritesCleared => FfiStoreChange::FavoritesCleared,
            StoreChange::ShoppingItemAdded { name } => FfiStoreChange::ShoppingItemAdded { name },
            StoreChange::ShoppingItemRemoved { name } => {
                FfiStoreChange::ShoppingItemRemoved { name }
            }
            StoreChange::ShoppingItemUpdated { name, is_checked } => {
                FfiStoreChange::ShoppingItemUpdated { name, is_checked }
            }
            StoreChange::ShoppingListCleared => FfiStoreChange::ShoppingListCleared,
            StoreChange::RecipeCached { id } => FfiStoreChange::RecipeCached { id },
        }
    }
}

/// Implemented by the host to hear about store changes.
#[uniffi::export(callback_interface)]
pub trait FfiStoreObserver: Send + Sync {
    fn on_change(&self, change: FfiStoreChange);
}

struct ObserverBridge(Box<dyn FfiStoreObserver>);

impl StoreObserver for ObserverBridge {
    fn on_change(&self, change: &StoreChange) {
        self.0.on_change(FfiStoreChange::from(change));
    }
}

fn to_filters(filters: HashMap<String, String>) -> BTreeMap<String, String> {
    filters.into_iter().collect()
}

// ============================================================================
// Exported FFI Objects
// ============================================================================

/// FFI-safe handle to the recipe API client.
#[derive(uniffi::Object)]
pub struct FfiRecipeClient {
    inner: RecipeClient,
}

#[uniffi::export(async_runtime = "tokio")]
impl FfiRecipeClient {
    /// Creates a client for the given API key.
    ///
    /// `base_url` defaults to the public recipe API endpoint.
    #[uniffi::constructor]
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Arc<Self>, RecipeFinderError> {
        let mut config = ClientConfig::with_api_key(api_key);
        if let Some(base_url) = base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.validate()?;
        Ok(Arc::new(FfiRecipeClient {
            inner: RecipeClient::new(config),
        }))
    }

    /// Creates a client from a YAML config file, with environment overrides.
    #[uniffi::constructor]
    pub fn from_config_file(path: String) -> Result<Arc<Self>, RecipeFinderError> {
        let config = ClientConfig::from_yaml_file(Utf8Path::new(&path))?.with_env_overrides();
        config.validate()?;
        Ok(Arc::new(FfiRecipeClient {
            inner: RecipeClient::new(config),
        }))
    }

    /// Searches recipes by ingredients and pass-through filters.
    pub async fn search(
        &self,
        ingredients: Vec<String>,
        filters: HashMap<String, String>,
    ) -> Result<Vec<FfiRecipe>, RecipeFinderError> {
        let recipes = self
            .inner
            .search(&ingredients, &to_filters(filters))
            .await?;
        Ok(recipes.iter().map(FfiRecipe::from).collect())
    }

    /// Fetches the detail of one recipe.
    pub async fn fetch_detail(&self, id: i64) -> Result<FfiRecipeDetail, RecipeFinderError> {
        let detail = self.inner.fetch_detail(id).await?;
        Ok(FfiRecipeDetail::from(&detail))
    }
}

/// FFI-safe paged search.
///
/// The session lock is not held while a page is in flight; the loading
/// guard refuses overlapping calls and responses to a query replaced by
/// [`FfiSearchSession::reset`] come back as `Stale`.
#[derive(uniffi::Object)]
pub struct FfiSearchSession {
    client: Arc<FfiRecipeClient>,
    session: Mutex<SearchSession>,
}

impl FfiSearchSession {
    fn lock(&self) -> MutexGuard<'_, SearchSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl FfiSearchSession {
    #[uniffi::constructor]
    pub fn new(
        client: Arc<FfiRecipeClient>,
        ingredients: Vec<String>,
        filters: HashMap<String, String>,
        sort: FfiSortOption,
    ) -> Arc<Self> {
        let page_size = client.inner.config().page_size;
        let query = crate::client::SearchQuery::new(ingredients, to_filters(filters));
        Arc::new(FfiSearchSession {
            client,
            session: Mutex::new(SearchSession::new(query, sort.into(), page_size)),
        })
    }

    /// Loads the next page. Returns `None` if a page is already loading or
    /// pagination has stopped.
    pub async fn load_next_page(&self) -> Result<Option<FfiPageOutcome>, RecipeFinderError> {
        let (request, query) = {
            let mut session = self.lock();
            match session.begin_page() {
                Some(request) => (request, session.query().clone()),
                None => return Ok(None),
            }
        };

        let response = self
            .client
            .inner
            .search_page(&query, request.offset, request.number)
            .await;

        let outcome = self.lock().complete_page(request, response)?;
        Ok(Some(outcome.into()))
    }

    /// Replaces the query and starts over from the first page.
    pub fn reset(
        &self,
        ingredients: Vec<String>,
        filters: HashMap<String, String>,
        sort: FfiSortOption,
    ) {
        self.lock()
            .reset(ingredients, to_filters(filters), sort.into());
    }

    /// Re-sorts the loaded results.
    pub fn set_sort(&self, sort: FfiSortOption) {
        self.lock().set_sort(sort.into());
    }

    pub fn results(&self) -> Vec<FfiRecipe> {
        self.lock().results().iter().map(FfiRecipe::from).collect()
    }

    pub fn offset(&self) -> u32 {
        self.lock().offset()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }
}

/// FFI-safe handle to the favorites and shopping-list store.
#[derive(uniffi::Object)]
pub struct FfiRecipeStore {
    inner: RecipeStore,
}

#[uniffi::export]
impl FfiRecipeStore {
    /// Opens (or creates) the store file at `path`.
    #[uniffi::constructor]
    pub fn open(path: String) -> Result<Arc<Self>, RecipeFinderError> {
        let inner = RecipeStore::open(Utf8Path::new(&path))?;
        Ok(Arc::new(FfiRecipeStore { inner }))
    }

    /// Creates a store that lives in memory only.
    #[uniffi::constructor]
    pub fn in_memory() -> Arc<Self> {
        Arc::new(FfiRecipeStore {
            inner: RecipeStore::in_memory(),
        })
    }

    pub fn add_favorite(&self, recipe: FfiRecipe) -> Result<FfiAddOutcome, RecipeFinderError> {
        Ok(self.inner.add_favorite_record(recipe.into())?.into())
    }

    pub fn remove_favorite(&self, id: i64) -> Result<FfiChangeOutcome, RecipeFinderError> {
        Ok(self.inner.remove_favorite(id)?.into())
    }

    pub fn list_favorites(&self) -> Result<Vec<FfiFavorite>, RecipeFinderError> {
        Ok(self
            .inner
            .list_favorites()?
            .into_iter()
            .map(FfiFavorite::from)
            .collect())
    }

    pub fn is_favorite(&self, id: i64) -> Result<bool, RecipeFinderError> {
        Ok(self.inner.is_favorite(id)?)
    }

    /// Deletes all favorites and returns how many were removed.
    pub fn clear_favorites(&self) -> Result<u32, RecipeFinderError> {
        Ok(self.inner.clear_favorites()? as u32)
    }

    pub fn add_shopping_item(&self, name: String) -> Result<FfiAddOutcome, RecipeFinderError> {
        Ok(self.inner.add_shopping_item(&name)?.into())
    }

    pub fn remove_shopping_item(&self, name: String) -> Result<FfiChangeOutcome, RecipeFinderError> {
        Ok(self.inner.remove_shopping_item(&name)?.into())
    }

    pub fn set_shopping_item_checked(
        &self,
        name: String,
        is_checked: bool,
    ) -> Result<FfiChangeOutcome, RecipeFinderError> {
        Ok(self.inner.set_shopping_item_checked(&name, is_checked)?.into())
    }

    pub fn list_shopping_items(&self) -> Result<Vec<FfiShoppingItem>, RecipeFinderError> {
        Ok(self
            .inner
            .list_shopping_items()?
            .into_iter()
            .map(FfiShoppingItem::from)
            .collect())
    }

    /// Deletes every shopping item and returns how many were removed.
    pub fn clear_all(&self) -> Result<u32, RecipeFinderError> {
        Ok(self.inner.clear_all()? as u32)
    }

    /// Stores or refreshes the cache row for a search result.
    pub fn cache_recipe(&self, recipe: FfiRecipe) -> Result<(), RecipeFinderError> {
        Ok(self.inner.cache_recipe_record(recipe.into())?)
    }

    pub fn cached_recipes(&self) -> Result<Vec<FfiCachedRecipe>, RecipeFinderError> {
        Ok(self
            .inner
            .cached_recipes()?
            .into_iter()
            .map(FfiCachedRecipe::from)
            .collect())
    }

    /// Registers an observer and returns its subscription id.
    pub fn subscribe(&self, observer: Box<dyn FfiStoreObserver>) -> u64 {
        self.inner
            .subscribe(Arc::new(ObserverBridge(observer)))
            .value()
    }

    pub fn unsubscribe(&self, subscription: u64) -> bool {
        self.inner.unsubscribe(SubscriptionId(subscription))
    }
}

// ============================================================================
// Exported FFI Functions
// ============================================================================

/// Splits a comma-separated ingredient entry into trimmed, non-empty terms.
#[uniffi::export]
pub fn parse_ingredients(input: String) -> Vec<String> {
    parse_ingredients_internal(&input)
}

/// Installs the library's log subscriber. Safe to call more than once.
///
/// # Arguments
/// * `filter` - `EnvFilter` directives such as `"recipe_finder=debug"`;
///   falls back to `RUST_LOG`, then `info`
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    crate::logging::init(filter.as_deref())
}

/// Returns the library version.
#[uniffi::export]
pub fn library_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
