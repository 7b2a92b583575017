//! Pagination utilities shared by listing operations
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Clamp to sane defaults and convert to `u64` (zero-based page index, page size)
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }

    /// Normalized values as they should be echoed back to callers.
    pub fn effective(self) -> (u32, u32) {
        let (idx, per) = self.normalize();
        (idx as u32 + 1, per as u32)
    }

    /// Slice an in-memory, already ordered result set.
    pub fn slice<T>(self, items: Vec<T>) -> Vec<T> {
        let (idx, per) = self.normalize();
        items.into_iter().skip((idx * per) as usize).take(per as usize).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}
