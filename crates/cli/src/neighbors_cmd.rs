use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;
use tscope_pager::{
    find_adjacent, Adjacent, HttpPageSource, PageLoader, PageQuery, PageSource, RemoteItem,
};

use crate::config::load_config;
use crate::output::OutputFormat;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NeighborsArgs {
    pub id: String,
    pub location: String,
    pub filter: Option<String>,
    pub order: Option<String>,
    pub server: Option<String>,
    pub page_size: Option<usize>,
    pub max_pages: usize,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct NeighborsReport<'a> {
    id: &'a str,
    found: bool,
    previous_id: Option<String>,
    next_id: Option<String>,
    pages_loaded: usize,
}

pub async fn run_neighbors(args: NeighborsArgs) -> Result<()> {
    let config = load_config()?;
    let server = args
        .server
        .clone()
        .unwrap_or_else(|| config.pager.server_url.clone());
    let query = PageQuery::new(
        args.location.clone(),
        args.page_size.unwrap_or(config.pager.page_size),
    )
    .with_filter(args.filter.clone().unwrap_or_default())
    .with_ordering(
        args.order
            .clone()
            .unwrap_or_else(|| config.pager.ordering.as_str().to_string()),
    );
    let source = HttpPageSource::new(&server, REQUEST_TIMEOUT)
        .with_context(|| format!("Failed to build HTTP client for {server}"))?;

    let local = tokio::task::LocalSet::new();
    let (adjacent, found, pages_loaded) = local
        .run_until(resolve(source, &query, &args.id, args.max_pages))
        .await?;

    let report = NeighborsReport {
        id: &args.id,
        found,
        previous_id: adjacent.previous_id,
        next_id: adjacent.next_id,
        pages_loaded,
    };
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            if !report.found {
                println!("{} not found in {} loaded page(s)", report.id, report.pages_loaded);
            }
            println!("previous: {}", report.previous_id.as_deref().unwrap_or("-"));
            println!("next:     {}", report.next_id.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

/// Page through the listing until `id` is located with its next neighbour
/// resolved, the listing runs out, or `max_pages` have been loaded. The page
/// budget is checked before a fetch is claimed, so none is left dangling.
async fn resolve<S>(
    source: S,
    query: &PageQuery,
    id: &str,
    max_pages: usize,
) -> Result<(Adjacent, bool, usize)>
where
    S: PageSource<RemoteItem> + 'static,
{
    let loader: PageLoader<RemoteItem, S> = PageLoader::new(source);
    let cache = loader.cache();
    let pages_loaded = || cache.borrow().get(query).map_or(0, |list| list.pages().len());

    loop {
        let loaded = pages_loaded();
        let (found, settled) = cache.borrow().get(query).map_or((false, None), |list| {
            let found = list.items().any(|item| item.id == id);
            (found, found.then(|| find_adjacent(list.pages(), id)))
        });

        if loaded >= max_pages {
            return Ok((settled.unwrap_or_default(), found, loaded));
        }

        let fetch = if found {
            match loader.resolve_adjacent(query, id) {
                (_, Some(fetch)) => fetch,
                (adjacent, None) => return Ok((adjacent, true, loaded)),
            }
        } else {
            match loader.load_more(query) {
                Some(fetch) => fetch,
                None => return Ok((Adjacent::default(), false, loaded)),
            }
        };

        fetch.await.context("page fetch task failed")?;
        if let Some(err) = cache.borrow().get(query).and_then(|list| list.last_error()) {
            anyhow::bail!("Failed to fetch page from server: {err}");
        }
        debug!(pages = pages_loaded(), "page landed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use tscope_pager::{Page, PageRequest};

    /// Serves x1..x5 two per page and counts requests.
    struct CountingSource {
        pages: HashMap<Option<String>, Page<RemoteItem>>,
        calls: Rc<Cell<usize>>,
    }

    fn item(id: &str) -> RemoteItem {
        RemoteItem {
            id: id.to_string(),
            fields: serde_json::Map::new(),
        }
    }

    fn listing() -> CountingSource {
        let mut pages = HashMap::new();
        pages.insert(None, Page::new(vec![item("x1"), item("x2")], Some("c1".into())));
        pages.insert(
            Some("c1".to_string()),
            Page::new(vec![item("x3"), item("x4")], Some("c2".into())),
        );
        pages.insert(Some("c2".to_string()), Page::new(vec![item("x5")], None));
        CountingSource {
            pages,
            calls: Rc::new(Cell::new(0)),
        }
    }

    impl PageSource<RemoteItem> for CountingSource {
        async fn fetch_page(
            &self,
            request: &PageRequest,
        ) -> tscope_pager::Result<Page<RemoteItem>> {
            self.calls.set(self.calls.get() + 1);
            self.pages
                .get(&request.cursor)
                .cloned()
                .ok_or_else(|| tscope_pager::PagerError::Status {
                    status: 404,
                    body: "no such cursor".to_string(),
                })
        }
    }

    async fn run(id: &str, max_pages: usize) -> (Adjacent, bool, usize, usize) {
        let source = listing();
        let calls = Rc::clone(&source.calls);
        let query = PageQuery::new("/logs", 2);
        let local = tokio::task::LocalSet::new();
        let (adjacent, found, loaded) = local
            .run_until(resolve(source, &query, id, max_pages))
            .await
            .unwrap();
        (adjacent, found, loaded, calls.get())
    }

    #[tokio::test]
    async fn resolves_across_page_boundaries() {
        let (adjacent, found, loaded, calls) = run("x2", 20).await;
        assert!(found);
        assert_eq!(adjacent.previous_id.as_deref(), Some("x1"));
        assert_eq!(adjacent.next_id.as_deref(), Some("x3"));
        assert_eq!((loaded, calls), (2, 2));
    }

    #[tokio::test]
    async fn page_budget_stops_before_claiming_a_fetch() {
        let (adjacent, found, loaded, calls) = run("x4", 2).await;
        assert!(found);
        assert_eq!(adjacent.previous_id.as_deref(), Some("x3"));
        assert_eq!(adjacent.next_id, None);
        assert_eq!((loaded, calls), (2, 2));

        let (_, found, loaded, calls) = run("x5", 1).await;
        assert!(!found);
        assert_eq!((loaded, calls), (1, 1));
    }

    #[tokio::test]
    async fn exhausted_listing_reports_not_found() {
        let (adjacent, found, loaded, calls) = run("ghost", 20).await;
        assert!(!found);
        assert_eq!(adjacent, Adjacent::default());
        assert_eq!((loaded, calls), (3, 3));
    }
}
