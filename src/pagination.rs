//! Visible page window for the paginator.

use std::ops::RangeInclusive;

use crate::constants::PAGE_WINDOW;

/// The page buttons to show around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Consecutive page numbers to render, empty when there is only one page
    pub pages: Vec<usize>,
    /// The page the shopper is on
    pub current: usize,
    /// Whether a "previous" control is enabled
    pub has_prev: bool,
    /// Whether a "next" control is enabled
    pub has_next: bool,
}

impl PageWindow {
    /// Whether the paginator should be hidden.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether the window skips pages before its first button.
    pub fn starts_after_first(&self) -> bool {
        self.pages.first().is_some_and(|&p| p > 1)
    }
}

/// Compute the window of at most [`PAGE_WINDOW`] page numbers around `current`.
///
/// `current` is clamped into `[1, total]` first.
pub fn page_window(current: usize, total: usize) -> PageWindow {
    if total <= 1 {
        return PageWindow {
            pages: Vec::new(),
            current: 1,
            has_prev: false,
            has_next: false,
        };
    }

    let current = current.clamp(1, total);
    let range = window_range(current, total);

    PageWindow {
        pages: range.collect(),
        current,
        has_prev: current > 1,
        has_next: current < total,
    }
}

fn window_range(current: usize, total: usize) -> RangeInclusive<usize> {
    let half = PAGE_WINDOW / 2;
    let span = PAGE_WINDOW - 1;

    let mut start = current.saturating_sub(half).max(1);
    let end = (start + span).min(total);
    // Near the last page, shift left to keep the window full
    if end - start < span {
        start = end.saturating_sub(span).max(1);
    }
    start..=end
}
