use serde::Deserialize;

use super::deserializers::deserialize_page;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            per_page: QUESTIONS_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn page<T>(&self, items: Vec<T>, page: usize) -> Vec<T> {
        paginate(items, page, self.per_page)
    }
}

/// `?page=N`, 1-indexed. Missing or garbage values read as the first page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

/// Slices an already materialized, store-ordered list. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    items.into_iter().skip(start).take(per_page).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_is_first_window() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(items, 1, 10), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn last_page_is_clipped() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(items, 3, 10), (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items: Vec<u32> = (0..25).collect();
        assert!(paginate(items.clone(), 4, 10).is_empty());
        assert!(paginate(items, usize::MAX, 10).is_empty());
    }

    #[test]
    fn windows_never_exceed_page_size() {
        let items: Vec<u32> = (0..95).collect();
        for page in 1..=12 {
            let window = paginate(items.clone(), page, QUESTIONS_PER_PAGE);
            assert!(window.len() <= QUESTIONS_PER_PAGE);
            if let Some(first) = window.first() {
                assert_eq!(*first as usize, (page - 1) * QUESTIONS_PER_PAGE);
            }
        }
    }

    #[test]
    fn default_pagination_uses_ten_per_page() {
        let items: Vec<u32> = (0..15).collect();
        assert_eq!(Pagination::default().page(items, 2), (10..15).collect::<Vec<_>>());
    }
}
