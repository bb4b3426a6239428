pub mod cli;
pub mod logging;
pub mod manager;
pub mod sources;

pub use manager::{fetch_articles, FetchOutcome, SourceManager};
pub use sources::{apply_filters, NewsApiSource, SourceConfig, StaticSource};
