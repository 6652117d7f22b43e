//! On-device store for favorites, the shopping list and cached recipes.
//!
//! The store is an explicit handle: create one with [`RecipeStore::open`]
//! (backed by a JSON file) or [`RecipeStore::in_memory`] and share it, for
//! example behind an `Arc`. All mutations run under a single lock and are
//! written to disk before the lock is released, so an insert-if-absent can
//! never race with another insert of the same key.

use crate::model::{CachedRecipe, Favorite, Recipe, ShoppingItem};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

mod model;

pub use model::{
    AddOutcome, RemoveOutcome, StoreChange, StoreObserver, SubscriptionId, UpdateOutcome,
};
use model::StoreState;

/// Errors that can occur when reading or writing the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize store: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid shopping item name: {0:?}")]
    InvalidName(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

type Observers = Vec<(SubscriptionId, Arc<dyn StoreObserver>)>;

/// Handle to the record store.
pub struct RecipeStore {
    path: Option<Utf8PathBuf>,
    state: Mutex<StoreState>,
    observers: Mutex<Observers>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RecipeStore {
    /// Opens the store file at `path`, creating an empty store if the file
    /// does not exist yet. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            StoreState::default()
        };
        info!(%path, "opened recipe store");
        Ok(Self::from_state(Some(path), state))
    }

    /// Creates a store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::from_state(None, StoreState::default())
    }

    fn from_state(path: Option<Utf8PathBuf>, state: StoreState) -> Self {
        RecipeStore {
            path,
            state: Mutex::new(state),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Saves a search result as a favorite unless one with the same id exists.
    pub fn add_favorite(&self, recipe: &Recipe) -> Result<AddOutcome, StoreError> {
        self.add_favorite_record(Favorite::from(recipe))
    }

    /// Saves a favorite record unless one with the same id exists.
    pub fn add_favorite_record(&self, favorite: Favorite) -> Result<AddOutcome, StoreError> {
        self.mutate(|state| {
            if state.favorites.iter().any(|f| f.id == favorite.id) {
                return (AddOutcome::AlreadyExists, None);
            }
            let id = favorite.id;
            state.favorites.push(favorite);
            (AddOutcome::Added, Some(StoreChange::FavoriteAdded { id }))
        })
    }

    /// Deletes every favorite with the given id.
    pub fn remove_favorite(&self, id: i64) -> Result<RemoveOutcome, StoreError> {
        self.mutate(|state| {
            let before = state.favorites.len();
            state.favorites.retain(|f| f.id != id);
            if state.favorites.len() == before {
                (RemoveOutcome::NotFound, None)
            } else {
                (RemoveOutcome::Removed, Some(StoreChange::FavoriteRemoved { id }))
            }
        })
    }

    pub fn list_favorites(&self) -> Result<Vec<Favorite>, StoreError> {
        Ok(self.lock_state()?.favorites.clone())
    }

    pub fn is_favorite(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock_state()?.favorites.iter().any(|f| f.id == id))
    }

    /// Deletes all favorites and returns how many there were.
    pub fn clear_favorites(&self) -> Result<usize, StoreError> {
        self.mutate(|state| {
            let count = state.favorites.len();
            if count == 0 {
                return (0, None);
            }
            state.favorites.clear();
            (count, Some(StoreChange::FavoritesCleared))
        })
    }

    // ------------------------------------------------------------------
    // Shopping list
    // ------------------------------------------------------------------

    /// Adds an unchecked shopping item unless one with the same name exists.
    ///
    /// Names are trimmed; a blank name is rejected.
    pub fn add_shopping_item(&self, name: &str) -> Result<AddOutcome, StoreError> {
        let name = normalize_name(name)?;
        self.mutate(|state| {
            if state.shopping_items.iter().any(|i| i.name == name) {
                return (AddOutcome::AlreadyExists, None);
            }
            state.shopping_items.push(ShoppingItem::new(name.clone()));
            (AddOutcome::Added, Some(StoreChange::ShoppingItemAdded { name }))
        })
    }

    /// Deletes the shopping item with the given name.
    ///
    /// The name is trimmed; a blank name matches nothing.
    pub fn remove_shopping_item(&self, name: &str) -> Result<RemoveOutcome, StoreError> {
        let name = name.trim();
        self.mutate(|state| {
            let before = state.shopping_items.len();
            state.shopping_items.retain(|i| i.name != name);
            if state.shopping_items.len() == before {
                (RemoveOutcome::NotFound, None)
            } else {
                let name = name.to_string();
                (RemoveOutcome::Removed, Some(StoreChange::ShoppingItemRemoved { name }))
            }
        })
    }

    /// Sets the checked flag of a shopping item.
    ///
    /// Setting the flag to its current value succeeds without notifying.
    pub fn set_shopping_item_checked(
        &self,
        name: &str,
        is_checked: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let name = name.trim();
        self.mutate(|state| {
            let Some(item) = state.shopping_items.iter_mut().find(|i| i.name == name) else {
                return (UpdateOutcome::NotFound, None);
            };
            if item.is_checked == is_checked {
                return (UpdateOutcome::Updated, None);
            }
            item.is_checked = is_checked;
            let name = name.to_string();
            (
                UpdateOutcome::Updated,
                Some(StoreChange::ShoppingItemUpdated { name, is_checked }),
            )
        })
    }

    pub fn list_shopping_items(&self) -> Result<Vec<ShoppingItem>, StoreError> {
        Ok(self.lock_state()?.shopping_items.clone())
    }

    /// Deletes every shopping item and returns how many there were.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        self.mutate(|state| {
            let count = state.shopping_items.len();
            if count == 0 {
                return (0, None);
            }
            state.shopping_items.clear();
            (count, Some(StoreChange::ShoppingListCleared))
        })
    }

    // ------------------------------------------------------------------
    // Recipe cache
    // ------------------------------------------------------------------

    /// Stores or refreshes the cache row for a search result.
    pub fn cache_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.cache_recipe_record(CachedRecipe::from(recipe))
    }

    /// Stores or refreshes a cache row, keyed by recipe id.
    pub fn cache_recipe_record(&self, row: CachedRecipe) -> Result<(), StoreError> {
        self.mutate(|state| {
            let id = row.id;
            match state.cached_recipes.iter().position(|r| r.id == id) {
                Some(i) if state.cached_recipes[i] == row => return ((), None),
                Some(i) => state.cached_recipes[i] = row,
                None => state.cached_recipes.push(row),
            }
            ((), Some(StoreChange::RecipeCached { id }))
        })
    }

    pub fn cached_recipes(&self) -> Result<Vec<CachedRecipe>, StoreError> {
        Ok(self.lock_state()?.cached_recipes.clone())
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Registers an observer for every successful mutation.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, observer));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    fn notify(&self, change: &StoreChange) {
        // Snapshot so observers can subscribe or unsubscribe from a callback.
        let observers: Vec<Arc<dyn StoreObserver>> = self
            .lock_observers()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        debug!(?change, observers = observers.len(), "store changed");
        for observer in observers {
            observer.on_change(change);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Runs `f` on a copy of the state; if it reports a change, the copy is
    /// saved and swapped in, then observers are notified.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> (T, Option<StoreChange>),
    ) -> Result<T, StoreError> {
        let mut state = self.lock_state()?;
        let mut draft = state.clone();
        let (value, change) = f(&mut draft);

        if let Some(change) = change {
            self.save(&draft)?;
            *state = draft;
            drop(state);
            info!(?change, "store updated");
            self.notify(&change);
        }
        Ok(value)
    }

    fn save(&self, state: &StoreState) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(state)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    fn lock_observers(&self) -> MutexGuard<'_, Observers> {
        // Observer list stays consistent even if a holder panicked.
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn normalize_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Nutrient, NutritionInfo};
    use std::thread;
    use tempfile::TempDir;

    fn recipe(id: i64) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {id}"),
            image: format!("https://img.example.com/{id}.jpg"),
            ready_in_minutes: Some(25),
            nutrition: Some(NutritionInfo {
                nutrients: vec![Nutrient {
                    name: "Calories".to_string(),
                    amount: 410.4,
                    unit: "kcal".to_string(),
                }],
            }),
        }
    }

    fn recording_observer(store: &RecipeStore) -> Arc<Mutex<Vec<StoreChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(Arc::new(move |change: &StoreChange| {
            sink.lock().unwrap().push(change.clone());
        }));
        seen
    }

    fn temp_store_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("data").join("store.json")).unwrap()
    }

    #[test]
    fn test_add_favorite_twice() {
        let store = RecipeStore::in_memory();
        assert_eq!(store.add_favorite(&recipe(1)).unwrap(), AddOutcome::Added);
        assert_eq!(
            store.add_favorite(&recipe(1)).unwrap(),
            AddOutcome::AlreadyExists
        );

        let favorites = store.list_favorites().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].calories, 410);
        assert_eq!(favorites[0].ready_in_minutes, 25);
        assert!(store.is_favorite(1).unwrap());
    }

    #[test]
    fn test_remove_missing_favorite() {
        let store = RecipeStore::in_memory();
        store.add_favorite(&recipe(1)).unwrap();

        assert_eq!(store.remove_favorite(2).unwrap(), RemoveOutcome::NotFound);
        assert_eq!(store.list_favorites().unwrap().len(), 1);

        assert_eq!(store.remove_favorite(1).unwrap(), RemoveOutcome::Removed);
        assert!(store.list_favorites().unwrap().is_empty());
    }

    #[test]
    fn test_clear_favorites() {
        let store = RecipeStore::in_memory();
        store.add_favorite(&recipe(1)).unwrap();
        store.add_favorite(&recipe(2)).unwrap();

        assert_eq!(store.clear_favorites().unwrap(), 2);
        assert_eq!(store.clear_favorites().unwrap(), 0);
        assert!(store.list_favorites().unwrap().is_empty());
    }

    #[test]
    fn test_shopping_item_added_once() {
        let store = RecipeStore::in_memory();
        assert_eq!(store.add_shopping_item("flour").unwrap(), AddOutcome::Added);
        for _ in 0..3 {
            assert_eq!(
                store.add_shopping_item(" flour ").unwrap(),
                AddOutcome::AlreadyExists
            );
        }

        let items = store.list_shopping_items().unwrap();
        assert_eq!(
            items,
            vec![ShoppingItem {
                name: "flour".to_string(),
                is_checked: false
            }]
        );
    }

    #[test]
    fn test_blank_shopping_item_rejected() {
        let store = RecipeStore::in_memory();
        assert!(matches!(
            store.add_shopping_item("   "),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_blank_shopping_item_lookups_are_not_found() {
        let store = RecipeStore::in_memory();
        store.add_shopping_item("milk").unwrap();

        let changes = recording_observer(&store);

        assert_eq!(store.remove_shopping_item("  ").unwrap(), RemoveOutcome::NotFound);
        assert_eq!(store.remove_shopping_item("").unwrap(), RemoveOutcome::NotFound);
        assert_eq!(
            store.set_shopping_item_checked(" ", true).unwrap(),
            UpdateOutcome::NotFound
        );
        assert_eq!(store.list_shopping_items().unwrap().len(), 1);
        assert!(changes.lock().unwrap().is_empty());

        assert_eq!(store.remove_shopping_item(" milk ").unwrap(), RemoveOutcome::Removed);
    }

    #[test]
    fn test_shopping_item_checked_and_removed() {
        let store = RecipeStore::in_memory();
        store.add_shopping_item("milk").unwrap();
        store.add_shopping_item("eggs").unwrap();

        assert_eq!(
            store.set_shopping_item_checked("milk", true).unwrap(),
            UpdateOutcome::Updated
        );
        assert_eq!(
            store.set_shopping_item_checked("butter", true).unwrap(),
            UpdateOutcome::NotFound
        );
        assert!(store.list_shopping_items().unwrap()[0].is_checked);

        assert_eq!(
            store.remove_shopping_item("butter").unwrap(),
            RemoveOutcome::NotFound
        );
        assert_eq!(
            store.remove_shopping_item("milk").unwrap(),
            RemoveOutcome::Removed
        );
        assert_eq!(store.clear_all().unwrap(), 1);
        assert!(store.list_shopping_items().unwrap().is_empty());
    }

    #[test]
    fn test_cache_recipe_upserts() {
        let store = RecipeStore::in_memory();
        store.cache_recipe(&recipe(5)).unwrap();

        let mut renamed = recipe(5);
        renamed.title = "Renamed".to_string();
        store.cache_recipe(&renamed).unwrap();

        let cached = store.cached_recipes().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "Renamed");
        // Cache rows are independent of favorites
        assert!(store.list_favorites().unwrap().is_empty());
    }

    #[test]
    fn test_observers_see_only_real_changes() {
        let store = RecipeStore::in_memory();
        let seen = recording_observer(&store);

        store.add_favorite(&recipe(1)).unwrap();
        store.add_favorite(&recipe(1)).unwrap();
        store.remove_favorite(9).unwrap();
        store.add_shopping_item("salt").unwrap();
        store.set_shopping_item_checked("salt", true).unwrap();
        store.set_shopping_item_checked("salt", true).unwrap();
        store.clear_all().unwrap();
        store.clear_all().unwrap();
        store.remove_favorite(1).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StoreChange::FavoriteAdded { id: 1 },
                StoreChange::ShoppingItemAdded {
                    name: "salt".to_string()
                },
                StoreChange::ShoppingItemUpdated {
                    name: "salt".to_string(),
                    is_checked: true
                },
                StoreChange::ShoppingListCleared,
                StoreChange::FavoriteRemoved { id: 1 },
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let store = RecipeStore::in_memory();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(Arc::new(move |_: &StoreChange| {
            *sink.lock().unwrap() += 1;
        }));

        store.add_shopping_item("rice").unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_shopping_item("beans").unwrap();

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_observer_can_read_store() {
        let store = Arc::new(RecipeStore::in_memory());
        let counts = Arc::new(Mutex::new(Vec::new()));
        let reader = Arc::downgrade(&store);
        let sink = Arc::clone(&counts);
        store.subscribe(Arc::new(move |_: &StoreChange| {
            if let Some(store) = reader.upgrade() {
                let count = store.list_favorites().unwrap().len();
                sink.lock().unwrap().push(count);
            }
        }));

        store.add_favorite(&recipe(1)).unwrap();
        store.add_favorite(&recipe(2)).unwrap();
        assert_eq!(*counts.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_concurrent_inserts_store_one_record() {
        let store = Arc::new(RecipeStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.add_favorite(&recipe(77)).unwrap())
            })
            .collect();

        let outcomes: Vec<AddOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let added = outcomes.iter().filter(|o| **o == AddOutcome::Added).count();
        assert_eq!(added, 1);
        assert_eq!(store.list_favorites().unwrap().len(), 1);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_store_path(&temp_dir);

        {
            let store = RecipeStore::open(&path).unwrap();
            store.add_favorite(&recipe(3)).unwrap();
            store.add_shopping_item("basil").unwrap();
            store.set_shopping_item_checked("basil", true).unwrap();
            store.cache_recipe(&recipe(4)).unwrap();
        }

        let store = RecipeStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.list_favorites().unwrap()[0].id, 3);
        assert!(store.list_shopping_items().unwrap()[0].is_checked);
        assert_eq!(store.cached_recipes().unwrap()[0].id, 4);
        assert_eq!(
            store.add_favorite(&recipe(3)).unwrap(),
            AddOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_open_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("store.json")).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            RecipeStore::open(&path),
            Err(StoreError::SerializationError(_))
        ));
    }
}
