use np_core::{Article, NewsQuery};

pub mod fixture;
pub mod newsapi;

pub use fixture::StaticSource;
pub use newsapi::{NewsApiSource, SourceConfig};

/// Narrows an upstream result set by author substring and article type,
/// the two filters the upstream search cannot apply itself.
pub fn apply_filters(articles: Vec<Article>, query: &NewsQuery) -> Vec<Article> {
    let author = query.author.as_deref().unwrap_or("");
    articles
        .into_iter()
        .filter(|a| a.author_matches(author))
        .filter(|a| query.type_filter.accepts(a.category()))
        .collect()
}

/// Common utilities for sources
pub(crate) mod utils {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use np_core::{Error, Result};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidQuery(format!("Failed to parse URL: {}", e)))
    }

    /// RFC 3339 timestamps, falling back to bare dates at midnight UTC.
    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
    }

    /// Trims and drops blank strings.
    pub fn clean(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
