//! Pagination over an already sorted list.

use shopfront_core::PageRequest;

/// The items on the requested page.
///
/// Page 0 and pages past the end yield an empty slice rather than an error.
pub fn page_slice<T>(items: &[T], request: PageRequest) -> &[T] {
    let Some(start) = request.offset() else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(request.page_size).min(items.len());
    &items[start..end]
}

/// Expected length of a page, from the total alone.
pub fn page_len(total: usize, request: PageRequest) -> usize {
    match request.offset() {
        Some(start) => total.saturating_sub(start).min(request.page_size),
        None => 0,
    }
}
