use std::collections::HashMap;

use tracing::debug;

use crate::adjacent::{find_adjacent, is_loaded_end, locate, Adjacent};
use crate::error::{PagerError, Result};
use crate::page::{FetchDirection, Page, PageItem, PageQuery, PageRequest};

/// Pages of one query in arrival order, plus the single-flight fetch guard.
#[derive(Debug)]
pub struct PagedList<T> {
    query: PageQuery,
    pages: Vec<Page<T>>,
    fetch_in_flight: bool,
    last_error: Option<PagerError>,
}

impl<T> PagedList<T> {
    pub fn new(query: PageQuery) -> Self {
        Self {
            query,
            pages: Vec::new(),
            fetch_in_flight: false,
            last_error: None,
        }
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn last_error(&self) -> Option<&PagerError> {
        self.last_error.as_ref()
    }

    /// Cursor for the next page: `Some(None)` before the first page,
    /// `None` once the listing is exhausted.
    fn continuation(&self) -> Option<Option<&str>> {
        match self.pages.last() {
            None => Some(None),
            Some(page) => page.next_cursor.as_deref().map(Some),
        }
    }

    pub fn has_more(&self) -> bool {
        self.continuation().is_some()
    }

    /// Claim the next forward fetch. Returns `None` when a fetch is already
    /// outstanding or there is nothing left to load.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.fetch_in_flight {
            return None;
        }
        let cursor = self.continuation()?.map(str::to_string);
        self.fetch_in_flight = true;
        debug!(
            location = %self.query.location,
            cursor = ?cursor,
            "page fetch started"
        );
        Some(PageRequest {
            query: self.query.clone(),
            cursor,
            limit: self.query.page_size,
            direction: FetchDirection::Forward,
        })
    }

    /// Land a fetch started by [`Self::begin_fetch`].
    pub fn complete(&mut self, result: Result<Page<T>>) {
        self.fetch_in_flight = false;
        match result {
            Ok(page) => {
                debug!(
                    location = %self.query.location,
                    items = page.items.len(),
                    more = page.next_cursor.is_some(),
                    "page fetch landed"
                );
                self.pages.push(page);
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(e),
        }
    }
}

impl<T: PageItem> PagedList<T> {
    /// Neighbours of `target`, plus the next-page request when `target` is
    /// the last loaded item and more pages exist.
    pub fn resolve_adjacent(&mut self, target: &str) -> (Adjacent, Option<PageRequest>) {
        let adjacent = find_adjacent(&self.pages, target);
        let fell_off_end = locate(&self.pages, target)
            .is_some_and(|(page, item)| is_loaded_end(&self.pages, page, item));
        let request = if fell_off_end {
            self.begin_fetch()
        } else {
            None
        };
        (adjacent, request)
    }
}

/// Paged lists keyed by query. Shared between every view of the same listing.
#[derive(Debug)]
pub struct PageCache<T> {
    lists: HashMap<PageQuery, PagedList<T>>,
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &PageQuery) -> Option<&PagedList<T>> {
        self.lists.get(query)
    }

    pub fn list_mut(&mut self, query: &PageQuery) -> &mut PagedList<T> {
        self.lists
            .entry(query.clone())
            .or_insert_with(|| PagedList::new(query.clone()))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

impl<T: PageItem> PageCache<T> {
    pub fn resolve_adjacent(
        &mut self,
        query: &PageQuery,
        target: &str,
    ) -> (Adjacent, Option<PageRequest>) {
        self.list_mut(query).resolve_adjacent(target)
    }
}
