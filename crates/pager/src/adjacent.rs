use crate::page::{Page, PageItem};

/// Neighbours of an item across the loaded pages. Absent means "not loaded
/// yet" as much as "does not exist".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacent {
    pub previous_id: Option<String>,
    pub next_id: Option<String>,
}

/// `(page_index, item_index)` of the first item with `target` as id.
pub(crate) fn locate<T: PageItem>(pages: &[Page<T>], target: &str) -> Option<(usize, usize)> {
    pages.iter().enumerate().find_map(|(page_index, page)| {
        page.items
            .iter()
            .position(|item| item.item_id() == target)
            .map(|item_index| (page_index, item_index))
    })
}

/// Whether `(page_index, item_index)` is the final loaded item. Empty pages
/// after it do not count.
pub(crate) fn is_loaded_end<T>(pages: &[Page<T>], page_index: usize, item_index: usize) -> bool {
    item_index + 1 == pages[page_index].items.len()
        && pages[page_index + 1..].iter().all(|page| page.items.is_empty())
}

/// Previous and next ids around `target`, scanning pages in arrival order.
/// Empty pages are skipped. Never fetches.
pub fn find_adjacent<T: PageItem>(pages: &[Page<T>], target: &str) -> Adjacent {
    let Some((page_index, item_index)) = locate(pages, target) else {
        return Adjacent::default();
    };
    let page = &pages[page_index];

    let previous_id = if item_index > 0 {
        page.items.get(item_index - 1)
    } else {
        pages[..page_index]
            .iter()
            .rev()
            .find_map(|prev| prev.items.last())
    };
    let next_id = page.items.get(item_index + 1).or_else(|| {
        pages[page_index + 1..]
            .iter()
            .find_map(|next| next.items.first())
    });

    Adjacent {
        previous_id: previous_id.map(|item| item.item_id().to_string()),
        next_id: next_id.map(|item| item.item_id().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str]) -> Page<String> {
        Page::new(ids.iter().map(|id| (*id).to_string()).collect(), None)
    }

    fn adjacent(previous: Option<&str>, next: Option<&str>) -> Adjacent {
        Adjacent {
            previous_id: previous.map(str::to_string),
            next_id: next.map(str::to_string),
        }
    }

    #[test]
    fn single_page_neighbours() {
        let pages = vec![page(&["x1", "x2", "x3"])];
        assert_eq!(find_adjacent(&pages, "x2"), adjacent(Some("x1"), Some("x3")));
        assert_eq!(find_adjacent(&pages, "x1"), adjacent(None, Some("x2")));
        assert_eq!(find_adjacent(&pages, "x3"), adjacent(Some("x2"), None));
    }

    #[test]
    fn neighbours_cross_page_boundaries() {
        let pages = vec![page(&["x1", "x2"]), page(&["x3", "x4"])];
        assert_eq!(find_adjacent(&pages, "x2"), adjacent(Some("x1"), Some("x3")));
        assert_eq!(find_adjacent(&pages, "x3"), adjacent(Some("x2"), Some("x4")));
    }

    #[test]
    fn unknown_id_has_no_neighbours() {
        let pages = vec![page(&["x1", "x2"])];
        assert_eq!(find_adjacent(&pages, "nope"), Adjacent::default());
        assert_eq!(find_adjacent::<String>(&[], "x1"), Adjacent::default());
    }

    #[test]
    fn empty_pages_are_skipped() {
        let pages = vec![page(&["x1"]), page(&[]), page(&["x2"])];
        assert_eq!(find_adjacent(&pages, "x1"), adjacent(None, Some("x2")));
        assert_eq!(find_adjacent(&pages, "x2"), adjacent(Some("x1"), None));
    }

    #[test]
    fn loaded_end_is_last_item_of_last_page() {
        let pages = vec![page(&["x1", "x2"]), page(&["x3"])];
        assert!(!is_loaded_end(&pages, 0, 1));
        assert!(is_loaded_end(&pages, 1, 0));
    }

    #[test]
    fn trailing_empty_pages_extend_the_loaded_end() {
        let pages = vec![page(&["x1", "x2"]), page(&[]), page(&[])];
        assert!(is_loaded_end(&pages, 0, 1));
        assert!(!is_loaded_end(&pages, 0, 0));
    }
}
