pub mod error;
pub mod payout;
pub mod query;
pub mod source;
pub mod state;
pub mod storage;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use query::{NewsQuery, QueryParams};
pub use source::ArticleSource;
pub use state::{Action, DashboardState, FilterPatch, Filters};
pub use storage::KeyValueStore;
pub use types::{
    Article, ArticlePayout, AuthorCount, AuthorPayout, Category, PayoutRate, RateSet, Session, TypeFilter,
    UserRecord,
};
