use clap::Args;
use np_core::{Article, FilterPatch, NewsQuery, TypeFilter};

use crate::manager::{FetchOutcome, SourceManager};

/// Search parameters shared by every command that fetches articles.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Search text sent upstream
    #[arg(short, long, default_value = "technology")]
    pub query: String,
    /// Earliest publication date, passed through to the upstream unchanged
    #[arg(long)]
    pub from: Option<String>,
    /// Latest publication date, passed through to the upstream unchanged
    #[arg(long)]
    pub to: Option<String>,
    /// Keep only authors containing this text (case-insensitive)
    #[arg(long)]
    pub author: Option<String>,
    /// all, news or blog
    #[arg(long = "type", default_value = "all")]
    pub type_filter: TypeFilter,
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,
}

impl QueryArgs {
    pub fn to_query(&self) -> NewsQuery {
        NewsQuery::default()
            .with_query(&self.query)
            .with_dates(self.from.as_deref(), self.to.as_deref())
            .with_author(self.author.as_deref())
            .with_type_filter(self.type_filter)
            .with_page_size(self.page_size)
    }

    pub fn to_filter_patch(&self) -> FilterPatch {
        FilterPatch {
            search_query: Some(self.query.clone()),
            author: Some(self.author.clone().unwrap_or_default()),
            date_from: Some(self.from.clone().unwrap_or_default()),
            date_to: Some(self.to.clone().unwrap_or_default()),
            type_filter: Some(self.type_filter),
            page_size: Some(self.page_size),
        }
    }
}

pub async fn handle_fetch(args: &QueryArgs, manager: &SourceManager) -> FetchOutcome {
    let outcome = manager.fetch(&args.to_query()).await;
    if let Some(error) = &outcome.error {
        eprintln!("⚠️ {}", error);
    }
    println!("Found {} articles", outcome.articles.len());
    for line in article_rows(&outcome.articles) {
        println!("{}", line);
    }
    outcome
}

/// One line per article: date, category, author, source, title.
pub fn article_rows(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .map(|a| {
            let date = a
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            let emoji = match a.category() {
                np_core::Category::News => "📰",
                np_core::Category::Blog => "✍️",
            };
            format!("{} {} {:<24} {:<20} {}", date, emoji, a.author_name(), a.source_name, a.title)
        })
        .collect()
}
