use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Author attributed to articles that carry no author.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: String,
    pub url: String,
}

impl Article {
    /// Blog when the source name contains "blog" in any casing, news otherwise.
    pub fn category(&self) -> Category {
        Category::classify(&self.source_name)
    }

    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Case-insensitive substring match on the author. An empty needle
    /// matches everything, an absent author matches nothing else.
    pub fn author_matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.author
            .as_deref()
            .map(|author| author.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    News,
    Blog,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::News, Category::Blog];

    pub fn classify(source_name: &str) -> Self {
        if source_name.to_lowercase().contains("blog") {
            Category::Blog
        } else {
            Category::News
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "news",
            Category::Blog => "blog",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "news" => Ok(Category::News),
            "blog" => Ok(Category::Blog),
            other => Err(Error::InvalidQuery(format!("Unknown category: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    News,
    Blog,
}

impl TypeFilter {
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::News => category == Category::News,
            TypeFilter::Blog => category == Category::Blog,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::News => "news",
            TypeFilter::Blog => "blog",
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "news" => Ok(TypeFilter::News),
            "blog" => Ok(TypeFilter::Blog),
            other => Err(Error::InvalidQuery(format!(
                "Unknown type filter: {} (expected all, news or blog)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutRate {
    #[serde(alias = "type")]
    pub category: Category,
    pub rate: f64,
}

/// Per-category payout rates, at most one entry per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSet {
    rates: Vec<PayoutRate>,
}

impl Default for RateSet {
    fn default() -> Self {
        Self {
            rates: vec![
                PayoutRate { category: Category::News, rate: 50.0 },
                PayoutRate { category: Category::Blog, rate: 75.0 },
            ],
        }
    }
}

impl RateSet {
    /// Builds a rate set from untrusted input.
    pub fn validated(rates: Vec<PayoutRate>) -> Result<Self> {
        for (i, rate) in rates.iter().enumerate() {
            validate_rate(rate.rate)?;
            if rates[..i].iter().any(|r| r.category == rate.category) {
                return Err(Error::InvalidRate(format!(
                    "Duplicate rate for category {}",
                    rate.category
                )));
            }
        }
        Ok(Self { rates })
    }

    /// Configured rate for a category, 0 when none is configured.
    pub fn rate_for(&self, category: Category) -> f64 {
        self.rates
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.rate)
            .unwrap_or(0.0)
    }

    /// Replaces the rate of one category, leaving the others untouched.
    /// No validation happens here; callers check the value first.
    pub fn update_rate(&mut self, category: Category, rate: f64) {
        match self.rates.iter_mut().find(|r| r.category == category) {
            Some(existing) => existing.rate = rate,
            None => self.rates.push(PayoutRate { category, rate }),
        }
    }

    pub fn rates(&self) -> &[PayoutRate] {
        &self.rates
    }
}

/// Accepts finite, non-negative amounts.
pub fn validate_rate(value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidRate(format!(
            "Rate must be a non-negative number, got {}",
            value
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayout {
    pub title: String,
    pub category: Category,
    pub payout: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayout {
    pub author: String,
    pub article_count: usize,
    pub total_payout: f64,
    pub articles: Vec<ArticlePayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<UserRecord>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| {
            if u.name.trim().is_empty() {
                u.email.as_str()
            } else {
                u.name.as_str()
            }
        })
    }
}
