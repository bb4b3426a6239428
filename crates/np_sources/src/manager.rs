use np_core::{Action, Article, ArticleSource, DashboardState, NewsQuery};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::sources::apply_filters;

/// Result of a search: upstream failures become an empty list plus a
/// message instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub async fn fetch_articles(source: &dyn ArticleSource, query: &NewsQuery) -> FetchOutcome {
    match source.search(query).await {
        Ok(articles) => {
            let total = articles.len();
            let articles = apply_filters(articles, query);
            info!(
                "📰 {} returned {} articles, {} after filters",
                source.name(),
                total,
                articles.len()
            );
            FetchOutcome { articles, error: None }
        }
        Err(e) => {
            warn!("⚠️ Failed to fetch from {}: {}", source.name(), e);
            FetchOutcome {
                articles: Vec::new(),
                error: Some(format!("Failed to fetch news: {}", e)),
            }
        }
    }
}

#[derive(Clone)]
pub struct SourceManager {
    source: Arc<dyn ArticleSource>,
}

impl SourceManager {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, query: &NewsQuery) -> FetchOutcome {
        fetch_articles(self.source.as_ref(), query).await
    }

    /// Re-queries the source with the state's current filters.
    pub async fn refresh(&self, state: DashboardState) -> DashboardState {
        let query = state.filters.to_query();
        let state = state.reduce(Action::FetchStarted);
        Self::complete(state, self.fetch(&query).await)
    }

    /// Folds a finished fetch into the state.
    pub fn complete(state: DashboardState, outcome: FetchOutcome) -> DashboardState {
        match outcome.error {
            None => state.reduce(Action::FetchSucceeded(outcome.articles)),
            Some(message) => state.reduce(Action::FetchFailed(message)),
        }
    }
}
