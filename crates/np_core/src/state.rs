//! Dashboard application state and its reducer.
//!
//! Every mutation goes through [`DashboardState::reduce`], which consumes
//! the old state and returns the new one. Payouts and analytics are derived
//! on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::payout;
use crate::query::{NewsQuery, DEFAULT_PAGE_SIZE};
use crate::types::{Article, AuthorCount, AuthorPayout, Category, RateSet, Session, TypeFilter, UserRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub search_query: String,
    pub author: String,
    pub date_from: String,
    pub date_to: String,
    pub type_filter: TypeFilter,
    pub page_size: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            author: String::new(),
            date_from: String::new(),
            date_to: String::new(),
            type_filter: TypeFilter::All,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Filters {
    pub fn to_query(&self) -> NewsQuery {
        let opt = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        NewsQuery::default()
            .with_query(&self.search_query)
            .with_dates(opt(&self.date_from).as_deref(), opt(&self.date_to).as_deref())
            .with_author(opt(&self.author).as_deref())
            .with_type_filter(self.type_filter)
            .with_page_size(self.page_size)
    }
}

/// Partial filter update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    pub search_query: Option<String>,
    pub author: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub type_filter: Option<TypeFilter>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFilters(FilterPatch),
    FetchStarted,
    FetchSucceeded(Vec<Article>),
    FetchFailed(String),
    SetRates(RateSet),
    UpdateRate { category: Category, rate: f64 },
    LoggedIn(UserRecord),
    LoggedOut,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub articles: Vec<Article>,
    pub filtered_articles: Vec<Article>,
    pub filters: Filters,
    pub rates: RateSet,
    pub session: Session,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    pub fn new(rates: RateSet, session: Session) -> Self {
        Self { rates, session, ..Default::default() }
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetFilters(patch) => {
                let filters = &mut self.filters;
                if let Some(q) = patch.search_query {
                    filters.search_query = q;
                }
                if let Some(author) = patch.author {
                    filters.author = author;
                }
                if let Some(from) = patch.date_from {
                    filters.date_from = from;
                }
                if let Some(to) = patch.date_to {
                    filters.date_to = to;
                }
                if let Some(type_filter) = patch.type_filter {
                    filters.type_filter = type_filter;
                }
                if let Some(page_size) = patch.page_size {
                    filters.page_size = page_size;
                }
            }
            Action::FetchStarted => {
                self.loading = true;
            }
            Action::FetchSucceeded(articles) => {
                // Filtering already happened at the source adapter.
                self.filtered_articles = articles.clone();
                self.articles = articles;
                self.loading = false;
                self.error = None;
            }
            Action::FetchFailed(message) => {
                self.articles.clear();
                self.filtered_articles.clear();
                self.loading = false;
                self.error = Some(message);
            }
            Action::SetRates(rates) => {
                self.rates = rates;
            }
            Action::UpdateRate { category, rate } => {
                self.rates.update_rate(category, rate);
            }
            Action::LoggedIn(user) => {
                self.session.user = Some(user);
            }
            Action::LoggedOut => {
                self.session.user = None;
            }
        }
        self
    }

    pub fn author_payouts(&self) -> Vec<AuthorPayout> {
        payout::aggregate(&self.filtered_articles, &self.rates)
    }

    pub fn author_counts(&self) -> Vec<AuthorCount> {
        payout::author_counts(&self.filtered_articles)
    }
}
