use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::models::{parse_timestamp, Comment, News, User};

/// Characters of a comment quoted in its activity entry
const QUOTE_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    #[serde(rename = "News Published")]
    NewsPublished,
    #[serde(rename = "Comment Added")]
    CommentAdded,
    #[serde(rename = "User Registered")]
    UserRegistered,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::NewsPublished => "News Published",
            ActivityKind::CommentAdded => "Comment Added",
            ActivityKind::UserRegistered => "User Registered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub at: DateTime<FixedOffset>,
    pub title: String,
    pub text: String,
    /// Only the newest entry is active
    pub active: bool,
}

/// Merge news, comments and users into one feed, newest first.
/// Entries without a parseable timestamp are left out.
pub fn activity_feed(news: &[News], comments: &[Comment], users: &[User]) -> Vec<ActivityEntry> {
    let published = news.iter().filter_map(|article| {
        let raw = article
            .publish_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(article.created_at.as_deref())?;
        entry(
            ActivityKind::NewsPublished,
            raw,
            article.title.clone().unwrap_or_default(),
            "was published.".to_string(),
        )
    });

    let commented = comments.iter().filter_map(|comment| {
        entry(
            ActivityKind::CommentAdded,
            comment.created_at.as_deref()?,
            comment.author_name().to_string(),
            format!("commented: \"{}\"", quote(comment.content.as_deref().unwrap_or_default())),
        )
    });

    let registered = users.iter().filter_map(|user| {
        entry(
            ActivityKind::UserRegistered,
            user.date_joined.as_deref()?,
            user.display_name().to_string(),
            "registered.".to_string(),
        )
    });

    let mut feed: Vec<ActivityEntry> = published.chain(commented).chain(registered).collect();
    feed.sort_by(|a, b| b.at.cmp(&a.at));
    if let Some(newest) = feed.first_mut() {
        newest.active = true;
    }
    feed
}

fn entry(kind: ActivityKind, raw: &str, title: String, text: String) -> Option<ActivityEntry> {
    let at = parse_timestamp(raw)?;
    Some(ActivityEntry {
        kind,
        at,
        title,
        text,
        active: false,
    })
}

fn quote(content: &str) -> String {
    if content.chars().count() > QUOTE_CHARS {
        let head: String = content.chars().take(QUOTE_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merges_newest_first_and_marks_the_head_active() {
        let news: Vec<News> = serde_json::from_value(json!([
            {"id": 1, "title": "Budget passed", "publish_date": "2024-04-02T09:00:00Z"},
            {"id": 2, "title": "Draft", "created_at": "2024-04-01T09:00:00Z"}
        ]))
        .unwrap();
        let comments: Vec<Comment> = serde_json::from_value(json!([
            {"id": 5, "content": "Great coverage", "created_at": "2024-04-03T09:00:00Z", "username": "ravi"}
        ]))
        .unwrap();
        let users: Vec<User> = serde_json::from_value(json!([
            {"id": 9, "username": "meera", "date_joined": "2024-03-30T09:00:00Z"}
        ]))
        .unwrap();

        let feed = activity_feed(&news, &comments, &users);
        let kinds: Vec<_> = feed.iter().map(|e| e.kind.label()).collect();
        assert_eq!(kinds, vec!["Comment Added", "News Published", "News Published", "User Registered"]);
        assert!(feed[0].active);
        assert!(feed[1..].iter().all(|e| !e.active));
        assert_eq!(feed[0].title, "ravi");
        assert_eq!(feed[0].text, "commented: \"Great coverage\"");
        assert_eq!(feed[2].title, "Draft");
    }

    #[test]
    fn missing_timestamps_are_excluded_not_defaulted() {
        let news: Vec<News> = serde_json::from_value(json!([{"id": 1, "title": "Undated"}])).unwrap();
        let comments: Vec<Comment> =
            serde_json::from_value(json!([{"id": 2, "content": "x", "created_at": "not a date"}])).unwrap();
        let users: Vec<User> = serde_json::from_value(json!([{"id": 3, "username": "a"}])).unwrap();

        assert!(activity_feed(&news, &comments, &users).is_empty());
    }

    #[test]
    fn long_comments_are_quoted_with_ellipsis() {
        let long = "a".repeat(31);
        assert_eq!(quote(&long), format!("{}...", "a".repeat(30)));
        assert_eq!(quote(&"b".repeat(30)), "b".repeat(30));
    }
}
