use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const MAX_PER_PAGE: u32 = 100;

#[derive(Deserialize, JsonSchema)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

impl Pagination {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> u32 {
        (self.page().saturating_sub(1)).saturating_mul(self.per_page())
    }
}

#[derive(Serialize, JsonSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: &Pagination, total: u64) -> Self {
        let per_page = pagination.per_page() as usize;
        let total = usize::try_from(total).unwrap_or(usize::MAX);
        PaginatedResponse {
            data,
            page: pagination.page() as usize,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}
