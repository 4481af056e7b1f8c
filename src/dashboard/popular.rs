use serde::Serialize;
use std::collections::HashMap;

use crate::api::resource::RecordId;
use crate::models::{parse_timestamp, Comment, News};

#[derive(Debug, Clone, Serialize)]
pub struct PopularPost {
    #[serde(flatten)]
    pub news: News,
    pub comment_count: usize,
}

/// Rank articles by how many comments point at them. Ties keep list order.
pub fn popular_posts(news: &[News], comments: &[Comment], limit: usize) -> Vec<PopularPost> {
    let mut counts: HashMap<RecordId, usize> = HashMap::new();
    for comment in comments {
        if let Some(id) = comment.news {
            *counts.entry(id).or_default() += 1;
        }
    }

    let mut ranked: Vec<PopularPost> = news
        .iter()
        .map(|article| PopularPost {
            comment_count: counts.get(&article.id).copied().unwrap_or(0),
            news: article.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
    ranked.truncate(limit);
    ranked
}

/// Newest publish date first; undated or unparseable articles go last in list order
pub fn recent_posts(news: &[News], limit: usize) -> Vec<News> {
    let mut dated: Vec<(Option<_>, &News)> = news
        .iter()
        .map(|article| (article.publish_date.as_deref().and_then(parse_timestamp), article))
        .collect();
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    dated.into_iter().take(limit).map(|(_, article)| article.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn news(values: serde_json::Value) -> Vec<News> {
        serde_json::from_value(values).unwrap()
    }

    fn comments(values: serde_json::Value) -> Vec<Comment> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn ranks_by_comment_count() {
        let news = news(json!([{"id": 1}, {"id": 2}]));
        let comments = comments(json!([
            {"id": 10, "news": 1},
            {"id": 11, "news": 1},
            {"id": 12, "news": 2}
        ]));

        let ranked = popular_posts(&news, &comments, 10);
        assert_eq!(ranked[0].news.id, RecordId(1));
        assert_eq!(ranked[0].comment_count, 2);
        assert_eq!(ranked[1].news.id, RecordId(2));
        assert_eq!(ranked[1].comment_count, 1);
    }

    #[test]
    fn ties_keep_list_order_and_limit_applies() {
        let news = news(json!([{"id": 3}, {"id": 1}, {"id": 2}]));
        let comments = comments(json!([{"id": 10, "news": 2}]));

        let ranked = popular_posts(&news, &comments, 2);
        let ids: Vec<_> = ranked.iter().map(|p| p.news.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn recent_puts_undated_last() {
        let news = news(json!([
            {"id": 1, "publish_date": "2024-01-01"},
            {"id": 2},
            {"id": 3, "publish_date": "2024-03-01T10:00:00Z"},
            {"id": 4, "publish_date": "garbage"}
        ]));
        let ids: Vec<_> = recent_posts(&news, 10).iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2, 4]);
        assert_eq!(recent_posts(&news, 1).len(), 1);
    }
}
