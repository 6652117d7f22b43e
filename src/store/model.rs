use crate::model::{CachedRecipe, Favorite, ShoppingItem};
use serde::{Deserialize, Serialize};

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A record with the same key was already stored; nothing changed
    AlreadyExists,
}

/// Result of a delete by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// No record matched; nothing changed
    NotFound,
}

/// Result of an in-place update by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No record matched; nothing changed
    NotFound,
}

/// Describes a successful mutation of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    FavoriteAdded { id: i64 },
    FavoriteRemoved { id: i64 },
    FavoritesCleared,
    ShoppingItemAdded { name: String },
    ShoppingItemRemoved { name: String },
    ShoppingItemUpdated { name: String, is_checked: bool },
    ShoppingListCleared,
    RecipeCached { id: i64 },
}

/// Receives [`StoreChange`] notifications.
///
/// Observers are called after the mutation is saved and the store lock is
/// released, so they may read the store.
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, change: &StoreChange);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreChange) + Send + Sync,
{
    fn on_change(&self, change: &StoreChange) {
        self(change)
    }
}

/// Handle returned by [`super::RecipeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// On-disk document holding the three record collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default)]
    pub shopping_items: Vec<ShoppingItem>,
    #[serde(default)]
    pub cached_recipes: Vec<CachedRecipe>,
}
