use async_trait::async_trait;
use crate::query::NewsQuery;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human readable name of the upstream, used in logs
    fn name(&self) -> &str;

    /// Issues exactly one upstream search with the query text, date range
    /// and page size. Author and type narrowing happen afterwards.
    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>>;
}
