//! Route handlers, grouped by resource.

pub mod ask;
pub mod employees;
pub mod feedback;
pub mod knowledge_base;
pub mod policies;

use hr_onboard_core::services::DEFAULT_PAGE_LIMIT;
use serde::Deserialize;

/// `?offset=&limit=` shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Paging {
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}
