use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Clamped page bounds for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

impl PageRequest {
    /// Non-positive or missing values fall back to defaults; `limit` is capped at `max_limit`.
    pub fn new(page: Option<i64>, limit: Option<i64>, max_limit: u64) -> Self {
        let page = page.filter(|p| *p > 0).map_or(DEFAULT_PAGE, |p| p as u64);
        let limit = limit.filter(|l| *l > 0).map_or(DEFAULT_LIMIT, |l| l as u64);
        Self { page, limit: limit.min(max_limit.max(1)) }
    }

    /// Row offset of the page, or `None` when it lies past any addressable row.
    pub fn offset(&self) -> Option<i64> {
        (self.page - 1).checked_mul(self.limit).and_then(|o| i64::try_from(o).ok())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub items_per_page: u64,
}

impl PageMeta {
    pub fn new(total_items: u64, request: &PageRequest) -> Self {
        Self {
            total_items,
            total_pages: total_items.div_ceil(request.limit),
            current_page: request.page,
            items_per_page: request.limit,
        }
    }
}
