//! Cursor-paginated listings: a query-keyed page cache, previous/next
//! resolution across loaded pages and background loading of the next page.

pub mod adjacent;
pub mod cache;
pub mod error;
pub mod loader;
pub mod page;
pub mod source;

pub use adjacent::{find_adjacent, Adjacent};
pub use cache::{PageCache, PagedList};
pub use error::{PagerError, Result};
pub use loader::PageLoader;
pub use page::{FetchDirection, Page, PageItem, PageQuery, PageRequest, RemoteItem};
pub use source::{HttpPageSource, PageSource};
