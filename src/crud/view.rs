//! Pagination and category filtering over an already-loaded collection.

use super::entity::Entity;

/// Category value that disables filtering.
pub const ALL_CATEGORIES: &str = "all";

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Slice out 1-based `page`. A page beyond the end, or page 0, yields an
/// empty slice with the totals still filled in. `per_page` of 0 is treated
/// as 1.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let slice = match page.checked_sub(1).and_then(|p| p.checked_mul(per_page)) {
        Some(start) if start < total_items => {
            let end = (start + per_page).min(total_items);
            &items[start..end]
        }
        _ => &items[..0],
    };

    Page {
        items: slice,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Keep entities whose category equals `category` exactly. `"all"` keeps
/// everything.
pub fn filter_by_category<'a, E: Entity>(items: &'a [E], category: &str) -> Vec<&'a E> {
    if category == ALL_CATEGORIES {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|e| e.category() == Some(category))
        .collect()
}
