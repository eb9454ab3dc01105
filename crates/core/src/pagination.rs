//! Limit/offset pagination with server-side clamping.

use crate::value_object::ValueObject;

pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 50;

/// A normalized page request.
///
/// A missing or non-positive limit becomes [`DEFAULT_LIMIT`]; anything above
/// [`MAX_LIMIT`] is clamped. Negative offsets become 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT as i64) as u32,
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        Self { limit, offset }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The window of an already-ordered slice this page covers.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.offset as usize).min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl ValueObject for Page {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_limit_means_default() {
        assert_eq!(Page::new(Some(0), None).limit(), DEFAULT_LIMIT);
        assert_eq!(Page::new(None, None).limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn oversized_limit_is_clamped() {
        assert_eq!(Page::new(Some(1000), Some(3)).limit(), MAX_LIMIT);
        assert_eq!(Page::new(Some(1000), Some(3)).offset(), 3);
    }

    #[test]
    fn offset_past_end_is_empty() {
        let items: Vec<u32> = (0..7).collect();
        assert!(Page::new(Some(5), Some(7)).slice(&items).is_empty());
        assert_eq!(Page::new(Some(5), Some(5)).slice(&items), &[5, 6]);
    }

    proptest! {
        #[test]
        fn limit_always_within_bounds(limit in any::<i64>(), offset in any::<i64>()) {
            let page = Page::new(Some(limit), Some(offset));
            prop_assert!(page.limit() >= 1 && page.limit() <= MAX_LIMIT);
        }

        #[test]
        fn slice_never_exceeds_limit(len in 0usize..200, limit in 0i64..100, offset in 0i64..250) {
            let items: Vec<usize> = (0..len).collect();
            let page = Page::new(Some(limit), Some(offset));
            let window = page.slice(&items);
            prop_assert!(window.len() <= page.limit() as usize);
            if let Some(first) = window.first() {
                prop_assert_eq!(*first, offset as usize);
            }
        }
    }
}
