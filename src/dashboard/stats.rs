use serde::Serialize;

/// Totals shown on the dashboard summary cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub articles: usize,
    pub authors: usize,
    pub comments: usize,
}

impl Stats {
    pub fn count(articles: usize, authors: usize, comments: usize) -> Self {
        Self {
            articles,
            authors,
            comments,
        }
    }
}
