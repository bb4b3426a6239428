use std::collections::HashMap;

use crate::types::{Article, ArticlePayout, AuthorCount, AuthorPayout, RateSet};

/// Groups articles by author and sums the per-category rate of each one.
///
/// Authors come out in order of first appearance in `articles`, so two
/// runs over the same input always agree.
pub fn aggregate(articles: &[Article], rates: &RateSet) -> Vec<AuthorPayout> {
    let mut payouts: Vec<AuthorPayout> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for article in articles {
        let author = article.author_name();
        let category = article.category();
        let rate = rates.rate_for(category);

        let slot = *index.entry(author).or_insert_with(|| {
            payouts.push(AuthorPayout {
                author: author.to_string(),
                article_count: 0,
                total_payout: 0.0,
                articles: Vec::new(),
            });
            payouts.len() - 1
        });

        let entry = &mut payouts[slot];
        entry.article_count += 1;
        entry.total_payout += rate;
        entry.articles.push(ArticlePayout {
            title: article.title.clone(),
            category,
            payout: rate,
        });
    }

    payouts
}

/// Article count per author, same ordering as [`aggregate`].
pub fn author_counts(articles: &[Article]) -> Vec<AuthorCount> {
    let mut counts: Vec<AuthorCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for article in articles {
        let author = article.author_name();
        let slot = *index.entry(author).or_insert_with(|| {
            counts.push(AuthorCount { author: author.to_string(), count: 0 });
            counts.len() - 1
        });
        counts[slot].count += 1;
    }

    counts
}

pub fn grand_total(payouts: &[AuthorPayout]) -> f64 {
    payouts.iter().map(|p| p.total_payout).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, PayoutRate};

    fn article(title: &str, author: Option<&str>, source: &str) -> Article {
        Article {
            title: title.to_string(),
            author: author.map(str::to_string),
            published_at: None,
            source_name: source.to_string(),
            url: format!("https://example.com/{}", title),
        }
    }

    fn sample() -> Vec<Article> {
        vec![
            article("one", Some("A"), "Daily"),
            article("two", Some("A"), "Tech Blog"),
            article("three", Some("B"), "Daily"),
        ]
    }

    #[test]
    fn test_aggregate_groups_in_first_appearance_order() {
        let payouts = aggregate(&sample(), &RateSet::default());
        assert_eq!(payouts.len(), 2);

        assert_eq!(payouts[0].author, "A");
        assert_eq!(payouts[0].article_count, 2);
        assert_eq!(payouts[0].total_payout, 125.0);
        assert_eq!(payouts[0].articles[1].category, Category::Blog);
        assert_eq!(payouts[0].articles[1].payout, 75.0);

        assert_eq!(payouts[1].author, "B");
        assert_eq!(payouts[1].article_count, 1);
        assert_eq!(payouts[1].total_payout, 50.0);
    }

    #[test]
    fn test_missing_author_goes_to_unknown() {
        let articles = vec![
            article("x", None, "Daily"),
            article("y", Some("B"), "Daily"),
            article("z", None, "My Blog"),
        ];
        let payouts = aggregate(&articles, &RateSet::default());
        assert_eq!(payouts[0].author, "Unknown");
        assert_eq!(payouts[0].article_count, 2);
        assert_eq!(payouts[0].total_payout, 125.0);
    }

    #[test]
    fn test_news_rate_change_leaves_blog_totals() {
        let articles = vec![
            article("n", Some("News Only"), "Daily"),
            article("b", Some("Blog Only"), "Some Blog"),
        ];
        let before = aggregate(&articles, &RateSet::default());

        let mut rates = RateSet::default();
        rates.update_rate(Category::News, 100.0);
        let after = aggregate(&articles, &rates);

        assert_eq!(before[0].total_payout, 50.0);
        assert_eq!(after[0].total_payout, 100.0);
        assert_eq!(before[1].total_payout, after[1].total_payout);
    }

    #[test]
    fn test_unconfigured_category_pays_zero() {
        let rates = RateSet::validated(vec![PayoutRate { category: Category::News, rate: 50.0 }]).unwrap();
        let payouts = aggregate(&sample(), &rates);
        assert_eq!(payouts[0].total_payout, 50.0);
        assert_eq!(payouts[0].articles[1].payout, 0.0);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let articles = sample();
        let rates = RateSet::default();
        assert_eq!(aggregate(&articles, &rates), aggregate(&articles, &rates));
        assert!(aggregate(&[], &rates).is_empty());
    }

    #[test]
    fn test_author_counts_and_grand_total() {
        let counts = author_counts(&sample());
        assert_eq!(
            counts,
            vec![
                AuthorCount { author: "A".to_string(), count: 2 },
                AuthorCount { author: "B".to_string(), count: 1 },
            ]
        );
        assert_eq!(grand_total(&aggregate(&sample(), &RateSet::default())), 175.0);
    }
}
