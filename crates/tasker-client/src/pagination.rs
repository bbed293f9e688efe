//! `GET /api/<entity>/paged?page=&pageSize=` (§6).
//!
//! `pageSize ∈ [1,100]`, `page ≥ 1`; out-of-range is a 400 with no
//! auto-correction on the manager side, so [`PageRequest::new`]
//! validates client-side too rather than letting an operator pay for a
//! round trip just to be told the same thing.

use crate::error::{ClientError, ClientResult};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> ClientResult<Self> {
        if page < 1 {
            return Err(ClientError::ValidationFailure(
                "page must be >= 1".to_string(),
            ));
        }
        if !(1..=100).contains(&page_size) {
            return Err(ClientError::ValidationFailure(
                "pageSize must be in [1,100]".to_string(),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub(crate) fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

/// One page of a manager's `paged` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_page_below_one() {
        assert!(PageRequest::new(0, 10).is_err());
    }

    #[test]
    fn rejects_page_size_out_of_range() {
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 101).is_err());
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(PageRequest::new(1, 1).is_ok());
        assert!(PageRequest::new(1, 100).is_ok());
    }
}
