//! Paged search over the recipe API with client-side sorting.
//!
//! A [`SearchSession`] holds the state of one query: the offset of the next
//! page, a loading guard that stops overlapping page fetches, and a
//! generation counter that lets responses to an abandoned query be
//! discarded instead of overwriting newer results.

use crate::client::{ApiError, RecipeClient, SearchQuery};
use crate::model::Recipe;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

mod model;

pub use model::{sort_recipes, PageOutcome, PageRequest, SortOption, UnknownSortOption};

/// Pagination state for one search query.
#[derive(Debug, Clone)]
pub struct SearchSession {
    query: SearchQuery,
    sort: SortOption,
    page_size: u32,
    offset: u32,
    loading: bool,
    exhausted: bool,
    generation: u64,
    /// Results in the order the API returned them
    fetched: Vec<Recipe>,
    results: Vec<Recipe>,
}

impl SearchSession {
    /// Creates a session for the given query. `page_size` of 0 is treated as 1.
    pub fn new(query: SearchQuery, sort: SortOption, page_size: u32) -> Self {
        SearchSession {
            query,
            sort,
            page_size: page_size.max(1),
            offset: 0,
            loading: false,
            exhausted: false,
            generation: 0,
            fetched: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    /// Offset of the next page to fetch.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns true once an empty page or a failed fetch stopped pagination.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All results loaded so far, in the session's sort order.
    pub fn results(&self) -> &[Recipe] {
        &self.results
    }

    /// Replaces the query and starts over from the first page.
    ///
    /// Any page still in flight for the previous query becomes stale.
    pub fn reset(
        &mut self,
        ingredients: Vec<String>,
        filters: BTreeMap<String, String>,
        sort: SortOption,
    ) {
        self.generation += 1;
        self.query = SearchQuery::new(ingredients, filters);
        self.sort = sort;
        self.offset = 0;
        self.loading = false;
        self.exhausted = false;
        self.fetched.clear();
        self.results.clear();
        debug!(generation = self.generation, "search session reset");
    }

    /// Changes the sort order and re-sorts the results already loaded.
    ///
    /// [`SortOption::None`] restores the order the API returned.
    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
        self.rebuild_results();
    }

    fn rebuild_results(&mut self) {
        self.results.clone_from(&self.fetched);
        sort_recipes(&mut self.results, self.sort);
    }

    /// Claims the next page fetch.
    ///
    /// Returns `None` while another page is loading or after pagination
    /// stopped. The guard is a plain flag: a refused call is not queued.
    pub fn begin_page(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(PageRequest {
            generation: self.generation,
            offset: self.offset,
            number: self.page_size,
        })
    }

    /// Applies the response to a request handed out by [`Self::begin_page`].
    ///
    /// # Errors
    ///
    /// A failed fetch is returned to the caller and stops pagination; pages
    /// loaded before it are kept.
    pub fn complete_page(
        &mut self,
        request: PageRequest,
        response: Result<Vec<Recipe>, ApiError>,
    ) -> Result<PageOutcome, ApiError> {
        if request.generation != self.generation {
            info!(
                stale = request.generation,
                current = self.generation,
                "discarding response for an outdated search"
            );
            return Ok(PageOutcome::Stale);
        }
        self.loading = false;

        let page = match response {
            Ok(page) => page,
            Err(e) => {
                warn!(offset = request.offset, error = %e, "page fetch failed, stopping pagination");
                self.exhausted = true;
                return Err(e);
            }
        };

        if page.is_empty() {
            debug!(offset = self.offset, "empty page, search exhausted");
            self.exhausted = true;
            return Ok(PageOutcome::Exhausted);
        }

        let added = page.len();
        self.fetched.extend(page);
        self.offset += self.page_size;
        self.rebuild_results();
        debug!(added, offset = self.offset, "page loaded");
        Ok(PageOutcome::Loaded { added })
    }

    /// Fetches and applies the next page.
    ///
    /// Returns `Ok(None)` when [`Self::begin_page`] refused to start a fetch.
    pub async fn load_next_page(
        &mut self,
        client: &RecipeClient,
    ) -> Result<Option<PageOutcome>, ApiError> {
        let Some(request) = self.begin_page() else {
            return Ok(None);
        };
        let response = client
            .search_page(&self.query, request.offset, request.number)
            .await;
        self.complete_page(request, response).map(Some)
    }

    /// Loads up to `max_pages` pages, stopping early at the first empty page.
    ///
    /// Returns the number of results added.
    pub async fn load_pages(
        &mut self,
        client: &RecipeClient,
        max_pages: usize,
    ) -> Result<usize, ApiError> {
        let mut total = 0;
        for _ in 0..max_pages {
            match self.load_next_page(client).await? {
                Some(PageOutcome::Loaded { added }) => total += added,
                _ => break,
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_with, results_body, FakeTransport};

    fn session() -> SearchSession {
        SearchSession::new(SearchQuery::default(), SortOption::None, 10)
    }

    fn recipes(ids: &[i64]) -> Vec<Recipe> {
        ids.iter()
            .map(|&id| Recipe {
                id,
                title: format!("Recipe {id}"),
                image: String::new(),
                ready_in_minutes: Some(100 - id as i32),
                nutrition: None,
            })
            .collect()
    }

    fn ids(session: &SearchSession) -> Vec<i64> {
        session.results().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_offset_advances_by_page_size() {
        let mut session = session();
        for n in 1..=3 {
            let request = session.begin_page().unwrap();
            assert_eq!(request.offset, 10 * (n - 1));
            let outcome = session
                .complete_page(request, Ok(recipes(&[n as i64])))
                .unwrap();
            assert_eq!(outcome, PageOutcome::Loaded { added: 1 });
            assert_eq!(session.offset(), 10 * n);
        }
    }

    #[test]
    fn test_guard_refuses_overlapping_pages() {
        let mut session = session();
        let request = session.begin_page().unwrap();
        assert!(session.is_loading());
        assert!(session.begin_page().is_none());

        session.complete_page(request, Ok(recipes(&[1]))).unwrap();
        assert!(!session.is_loading());
        assert!(session.begin_page().is_some());
    }

    #[test]
    fn test_empty_page_stops_pagination() {
        let mut session = session();
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(recipes(&[1, 2]))).unwrap();

        let request = session.begin_page().unwrap();
        let outcome = session.complete_page(request, Ok(vec![])).unwrap();
        assert_eq!(outcome, PageOutcome::Exhausted);
        assert_eq!(session.offset(), 10);
        assert!(session.begin_page().is_none());
    }

    #[test]
    fn test_error_keeps_loaded_pages() {
        let mut session = session();
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(recipes(&[1, 2]))).unwrap();

        let request = session.begin_page().unwrap();
        let result = session.complete_page(request, Err(ApiError::Network("offline".to_string())));
        assert!(matches!(result, Err(ApiError::Network(_))));
        assert_eq!(ids(&session), vec![1, 2]);
        assert_eq!(session.offset(), 10);
        assert!(!session.is_loading());
        assert!(session.begin_page().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = session();
        let old = session.begin_page().unwrap();

        session.reset(vec!["egg".to_string()], BTreeMap::new(), SortOption::None);
        let current = session.begin_page().unwrap();
        session.complete_page(current, Ok(recipes(&[7]))).unwrap();

        let outcome = session.complete_page(old, Ok(recipes(&[1, 2, 3]))).unwrap();
        assert_eq!(outcome, PageOutcome::Stale);
        assert_eq!(ids(&session), vec![7]);
        assert_eq!(session.offset(), 10);
    }

    #[test]
    fn test_stale_response_does_not_release_guard() {
        let mut session = session();
        let old = session.begin_page().unwrap();
        session.reset(vec![], BTreeMap::new(), SortOption::None);
        let _current = session.begin_page().unwrap();

        session.complete_page(old, Ok(vec![])).unwrap();
        assert!(session.is_loading());
        assert!(!session.is_exhausted());
    }

    #[test]
    fn test_results_sorted_across_pages() {
        let mut session = SearchSession::new(SearchQuery::default(), SortOption::CookingTime, 10);
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(recipes(&[1, 2]))).unwrap();
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(recipes(&[3]))).unwrap();

        // ready_in_minutes is 100 - id
        assert_eq!(ids(&session), vec![3, 2, 1]);

        session.set_sort(SortOption::None);
        assert_eq!(ids(&session), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_none_restores_api_order() {
        let mut session = SearchSession::new(SearchQuery::default(), SortOption::CookingTime, 10);
        let mut page = recipes(&[1, 2, 3]);
        page[0].ready_in_minutes = Some(50);
        page[1].ready_in_minutes = Some(10);
        page[2].ready_in_minutes = Some(30);
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(page)).unwrap();
        assert_eq!(ids(&session), vec![2, 3, 1]);

        session.set_sort(SortOption::None);
        assert_eq!(ids(&session), vec![1, 2, 3]);

        // later pages append behind the API order, not a stale sorted order
        let request = session.begin_page().unwrap();
        session.complete_page(request, Ok(recipes(&[4]))).unwrap();
        assert_eq!(ids(&session), vec![1, 2, 3, 4]);

        session.set_sort(SortOption::CookingTime);
        assert_eq!(ids(&session), vec![2, 3, 1, 4]);
    }

    #[tokio::test]
    async fn test_load_pages_stops_at_empty_page() {
        let transport = FakeTransport::new();
        transport.push_body(results_body(&[1, 2]));
        transport.push_body(results_body(&[3]));
        transport.push_body(results_body(&[]));
        transport.push_body(results_body(&[4]));
        let client = client_with(transport.clone());

        let mut session = SearchSession::new(
            SearchQuery::new(vec!["egg".to_string()], BTreeMap::new()),
            SortOption::None,
            10,
        );
        let added = session.load_pages(&client, 10).await.unwrap();

        assert_eq!(added, 3);
        assert_eq!(session.offset(), 20);
        assert!(session.is_exhausted());

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].ends_with("&query=egg&offset=0&number=10"));
        assert!(requests[1].ends_with("&offset=10&number=10"));
        assert!(requests[2].ends_with("&offset=20&number=10"));
    }

    #[tokio::test]
    async fn test_load_next_page_after_reset_starts_over() {
        let transport = FakeTransport::new();
        transport.push_body(results_body(&[1]));
        transport.push_body(results_body(&[9]));
        let client = client_with(transport.clone());

        let mut session = session();
        session.load_next_page(&client).await.unwrap();
        session.reset(vec!["milk".to_string()], BTreeMap::new(), SortOption::Calories);
        let outcome = session.load_next_page(&client).await.unwrap();

        assert_eq!(outcome, Some(PageOutcome::Loaded { added: 1 }));
        assert_eq!(ids(&session), vec![9]);
        assert!(transport.requests()[1].contains("&query=milk&offset=0"));
    }
}
