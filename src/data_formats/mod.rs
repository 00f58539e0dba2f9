mod request;
mod response;

pub use request::*;
pub use response::*;

use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Deserialize, Serialize, Debug)]
pub struct ArticleQueryParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default = "get_default_page")]
    pub page: u32,
    #[serde(default = "get_default_page_size")]
    pub page_size: u32,
}

impl ArticleQueryParams {
    /// Page-number pagination clamped to the maximum page size.
    pub fn limit_offset(&self) -> (i64, i64) {
        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE) as i64;
        let page = self.page.max(1) as i64;
        (page_size, (page - 1) * page_size)
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentQueryParams {
    #[serde(default)]
    pub article: Option<i64>,
    #[serde(default)]
    pub author: Option<i64>,
}

fn get_default_page() -> u32 {
    1
}

fn get_default_page_size() -> u32 {
    10
}
