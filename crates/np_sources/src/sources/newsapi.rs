use async_trait::async_trait;
use np_core::{Article, ArticleSource, Error, NewsQuery, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::utils;
use crate::logging::Logger;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";
const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }
}

impl SourceConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    author: Option<String>,
    published_at: Option<String>,
    url: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    fn normalize(self) -> Article {
        let published_at = self.published_at.as_deref().and_then(|raw| {
            let parsed = utils::parse_timestamp(raw);
            if parsed.is_none() {
                tracing::debug!("Dropping unparsable publishedAt: {}", raw);
            }
            parsed
        });

        Article {
            title: utils::clean(self.title).unwrap_or_default(),
            author: utils::clean(self.author),
            published_at,
            source_name: utils::clean(self.source.and_then(|s| s.name)).unwrap_or_default(),
            url: utils::clean(self.url).unwrap_or_default(),
        }
    }
}

/// Decodes an `/everything` response body into normalized articles.
pub fn parse_response(body: &str) -> Result<Vec<Article>> {
    let response: RawResponse = serde_json::from_str(body)?;
    if response.status.as_deref() == Some("error") {
        return Err(Error::Upstream(
            response.message.unwrap_or_else(|| "upstream reported an error".to_string()),
        ));
    }
    Ok(response.articles.into_iter().map(RawArticle::normalize).collect())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<RawResponse>(body)
        .ok()
        .and_then(|r| r.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

pub struct NewsApiSource {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    logger: Logger,
}

impl NewsApiSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let base_url = utils::parse_url(&config.base_url)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let logger = Logger::new().with_prefix(format!("[{}]", base_url.host_str().unwrap_or("newsapi")));
        if config.api_key.is_none() {
            logger.warn("⚠️ No API key configured, upstream will likely reject requests");
        }
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            logger,
        })
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn search(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(from) = &query.date_from {
            params.push(("from", from.clone()));
        }
        if let Some(to) = &query.date_to {
            params.push(("to", to.clone()));
        }

        let mut request = self.client.get(self.base_url.clone()).query(&params);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        self.logger.info(&format!("🔎 Searching for \"{}\" (pageSize={})", query.query, query.page_size));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = format!("{}: {}", status, error_message(&body));
            self.logger.error(&format!("❌ Upstream request failed: {}", message));
            return Err(Error::Upstream(message));
        }

        let articles = parse_response(&body)?;
        self.logger.debug(&format!("📥 Received {} articles", articles.len()));
        Ok(articles)
    }
}
