use serde::{Deserialize, Serialize};

use crate::types::TypeFilter;
use crate::{Error, Result};

pub const DEFAULT_QUERY: &str = "technology";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw inbound search parameters, as they arrive on the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// A validated article search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQuery {
    pub query: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub author: Option<String>,
    pub type_filter: TypeFilter,
    pub page_size: u32,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            date_from: None,
            date_to: None,
            author: None,
            type_filter: TypeFilter::All,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NewsQuery {
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let type_filter = match non_empty(&params.type_filter) {
            Some(raw) => raw.parse()?,
            None => TypeFilter::All,
        };
        let page_size = match non_empty(&params.page_size) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidQuery(format!("pageSize must be an integer, got {}", raw)))?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self::default()
            .with_query(non_empty(&params.q).unwrap_or(DEFAULT_QUERY))
            .with_dates(non_empty(&params.from), non_empty(&params.to))
            .with_author(non_empty(&params.author))
            .with_type_filter(type_filter)
            .with_page_size(page_size))
    }

    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = if query.is_empty() { DEFAULT_QUERY.to_string() } else { query.to_string() };
        self
    }

    pub fn with_dates(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(str::to_string);
        self.date_to = to.map(str::to_string);
        self
    }

    pub fn with_author(mut self, author: Option<&str>) -> Self {
        self.author = author.filter(|a| !a.is_empty()).map(str::to_string);
        self
    }

    pub fn with_type_filter(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
