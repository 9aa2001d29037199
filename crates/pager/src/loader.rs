use std::cell::RefCell;
use std::rc::Rc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adjacent::Adjacent;
use crate::cache::PageCache;
use crate::page::{PageItem, PageQuery, PageRequest};
use crate::source::PageSource;

/// Drives a [`PageSource`] into a shared [`PageCache`].
///
/// Fetches run as local tasks, so every method that may start one must be
/// called from inside a `tokio::task::LocalSet`. A fetch owns clones of the
/// cache and source handles and lands its page even if the loader that
/// started it has been dropped.
pub struct PageLoader<T, S> {
    cache: Rc<RefCell<PageCache<T>>>,
    source: Rc<S>,
}

impl<T, S> Clone for PageLoader<T, S> {
    fn clone(&self) -> Self {
        Self {
            cache: Rc::clone(&self.cache),
            source: Rc::clone(&self.source),
        }
    }
}

impl<T, S> PageLoader<T, S>
where
    T: PageItem + 'static,
    S: PageSource<T> + 'static,
{
    pub fn new(source: S) -> Self {
        Self::with_cache(source, Rc::new(RefCell::new(PageCache::new())))
    }

    pub fn with_cache(source: S, cache: Rc<RefCell<PageCache<T>>>) -> Self {
        Self {
            cache,
            source: Rc::new(source),
        }
    }

    pub fn cache(&self) -> Rc<RefCell<PageCache<T>>> {
        Rc::clone(&self.cache)
    }

    /// Start the next page of `query` unless one is outstanding or the
    /// listing is exhausted.
    pub fn load_more(&self, query: &PageQuery) -> Option<JoinHandle<()>> {
        let request = self.cache.borrow_mut().list_mut(query).begin_fetch()?;
        Some(self.spawn_fetch(request))
    }

    /// Resolve neighbours from what is loaded now. Falling off the loaded end
    /// starts a background fetch; call again once it lands.
    pub fn resolve_adjacent(
        &self,
        query: &PageQuery,
        target: &str,
    ) -> (Adjacent, Option<JoinHandle<()>>) {
        let (adjacent, request) = self.cache.borrow_mut().resolve_adjacent(query, target);
        let handle = request.map(|request| self.spawn_fetch(request));
        (adjacent, handle)
    }

    fn spawn_fetch(&self, request: PageRequest) -> JoinHandle<()> {
        let cache = Rc::clone(&self.cache);
        let source = Rc::clone(&self.source);
        tokio::task::spawn_local(async move {
            let result = source.fetch_page(&request).await;
            match &result {
                Ok(page) => debug!(
                    location = %request.query.location,
                    items = page.items.len(),
                    "background page loaded"
                ),
                Err(e) => warn!(
                    "page fetch for {} failed: {e}",
                    request.query.location
                ),
            }
            cache.borrow_mut().list_mut(&request.query).complete(result);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    use crate::error::{PagerError, Result};
    use crate::page::Page;

    /// Pages keyed by the cursor that requests them.
    struct ScriptedSource {
        pages: HashMap<Option<String>, Page<String>>,
        calls: Rc<Cell<usize>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<(Option<&str>, Vec<&str>, Option<&str>)>) -> Self {
            let pages = pages
                .into_iter()
                .map(|(cursor, ids, next)| {
                    (
                        cursor.map(str::to_string),
                        Page::new(
                            ids.iter().map(|id| (*id).to_string()).collect(),
                            next.map(str::to_string),
                        ),
                    )
                })
                .collect();
            Self {
                pages,
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl PageSource<String> for ScriptedSource {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Page<String>> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            self.pages
                .get(&request.cursor)
                .cloned()
                .ok_or_else(|| PagerError::Status {
                    status: 404,
                    body: "no such cursor".to_string(),
                })
        }
    }

    fn query() -> PageQuery {
        PageQuery::new("/logs", 2)
    }

    fn two_pages() -> ScriptedSource {
        ScriptedSource::new(vec![
            (None, vec!["x1", "x2"], Some("c1")),
            (Some("c1"), vec!["x3", "x4"], None),
        ])
    }

    #[tokio::test]
    async fn falling_off_the_end_loads_the_next_page() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let source = two_pages();
                let calls = Rc::clone(&source.calls);
                let loader = PageLoader::new(source);

                loader.load_more(&query()).unwrap().await.unwrap();
                let (adjacent, fetch) = loader.resolve_adjacent(&query(), "x2");
                assert_eq!(adjacent.next_id, None);

                // a second call while the fetch is outstanding does not refetch
                let (_, duplicate) = loader.resolve_adjacent(&query(), "x2");
                assert!(duplicate.is_none());

                fetch.unwrap().await.unwrap();
                let (adjacent, fetch) = loader.resolve_adjacent(&query(), "x2");
                assert_eq!(adjacent.previous_id.as_deref(), Some("x1"));
                assert_eq!(adjacent.next_id.as_deref(), Some("x3"));
                assert!(fetch.is_none());
                assert_eq!(calls.get(), 2);
            })
            .await;
    }

    #[tokio::test]
    async fn fetch_lands_after_the_loader_is_dropped() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let loader = PageLoader::new(two_pages());
                let cache = loader.cache();
                let fetch = loader.load_more(&query()).unwrap();
                drop(loader);

                fetch.await.unwrap();
                let cache = cache.borrow();
                let list = cache.get(&query()).unwrap();
                assert_eq!(list.items().count(), 2);
                assert!(!list.is_fetching());
            })
            .await;
    }

    #[tokio::test]
    async fn failed_fetch_is_recorded_and_retryable() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let loader = PageLoader::new(ScriptedSource::new(vec![(
                    None,
                    vec!["x1"],
                    Some("missing"),
                )]));
                loader.load_more(&query()).unwrap().await.unwrap();
                let (_, fetch) = loader.resolve_adjacent(&query(), "x1");
                fetch.unwrap().await.unwrap();

                let cache = loader.cache();
                assert!(cache.borrow().get(&query()).unwrap().last_error().is_some());
                assert!(loader.load_more(&query()).is_some());
            })
            .await;
    }

    #[tokio::test]
    async fn unknown_target_starts_nothing() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let source = two_pages();
                let calls = Rc::clone(&source.calls);
                let loader = PageLoader::new(source);
                let (adjacent, fetch) = loader.resolve_adjacent(&query(), "ghost");
                assert_eq!(adjacent, Adjacent::default());
                assert!(fetch.is_none());
                assert_eq!(calls.get(), 0);
            })
            .await;
    }
}
