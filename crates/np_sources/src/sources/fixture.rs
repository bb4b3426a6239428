use async_trait::async_trait;
use np_core::{Article, ArticleSource, Error, NewsQuery, Result};
use std::sync::Mutex;

/// Serves a fixed article list instead of calling out to the network.
/// Used by tests and for offline runs of the CLI.
pub struct StaticSource {
    articles: Vec<Article>,
    failure: Option<String>,
    last_query: Mutex<Option<NewsQuery>>,
}

impl StaticSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            failure: None,
            last_query: Mutex::new(None),
        }
    }

    /// A source whose every search fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            articles: Vec::new(),
            failure: Some(message.to_string()),
            last_query: Mutex::new(None),
        }
    }

    pub fn last_query(&self) -> Option<NewsQuery> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.clone());
        }
        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }
        Ok(self
            .articles
            .iter()
            .take(query.page_size as usize)
            .cloned()
            .collect())
    }
}
